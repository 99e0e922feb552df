//! Learning-rate schedules

use serde::{Deserialize, Serialize};

/// Offset of the harmonic schedule (`B` in `A / (B + t)`).
pub const HARMONIC_OFFSET: f64 = 100.0;

/// Step-size schedule indexed by the episode counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaSchedule {
    /// `alpha0 * B / (B + t)`; equals `alpha0` at `t = 0`
    Linear { alpha0: f64 },
    /// `ln(t + 1) / (t + 1)`
    Log,
}

impl AlphaSchedule {
    pub fn linear(alpha0: f64) -> Self {
        AlphaSchedule::Linear { alpha0 }
    }

    /// Learning rate for episode `t`
    pub fn rate(&self, t: usize) -> f64 {
        match *self {
            AlphaSchedule::Linear { alpha0 } => alpha_linear(alpha0, t),
            AlphaSchedule::Log => alpha_log(t),
        }
    }
}

/// Harmonic decay `A / (B + t)` with `A = alpha0 * B`.
///
/// Tends to zero while its sum over `t` diverges.
pub fn alpha_linear(alpha0: f64, t: usize) -> f64 {
    let a = alpha0 * HARMONIC_OFFSET;
    a / (HARMONIC_OFFSET + t as f64)
}

/// `ln(t + 1) / (t + 1)`. Zero at `t = 0`.
pub fn alpha_log(t: usize) -> f64 {
    let t = t as f64 + 1.0;
    t.ln() / t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_linear_starts_at_alpha0() {
        assert!((alpha_linear(0.1, 0) - 0.1).abs() < 1e-15);
        assert!((alpha_linear(0.5, 0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_alpha_linear_strictly_decreasing() {
        let rates: Vec<f64> = (0..500).map(|t| alpha_linear(0.3, t)).collect();
        assert!(rates.windows(2).all(|w| w[1] < w[0]));
        assert!((alpha_linear(0.3, 100) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_log_values() {
        assert_eq!(alpha_log(0), 0.0);
        assert!((alpha_log(1) - std::f64::consts::LN_2 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_schedules_are_interchangeable() {
        let schedules = [AlphaSchedule::linear(0.2), AlphaSchedule::Log];
        let first: Vec<f64> = schedules.iter().map(|s| s.rate(9)).collect();
        assert!((first[0] - alpha_linear(0.2, 9)).abs() < 1e-15);
        assert!((first[1] - alpha_log(9)).abs() < 1e-15);
    }
}
