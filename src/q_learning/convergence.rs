//! Convergence trace and stopping test

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{Error, Result};

/// Append-only trace of summed value-table deltas, one entry per episode.
///
/// Seeded with a leading `0.0` sentinel, so after `n` recorded episodes the
/// trace holds `n + 1` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceTracker {
    phi: f64,
    trace: Vec<f64>,
}

impl ConvergenceTracker {
    pub fn new(phi: f64) -> Self {
        Self {
            phi,
            trace: vec![0.0],
        }
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn trace(&self) -> &[f64] {
        &self.trace
    }

    /// Number of recorded episodes (sentinel excluded)
    pub fn episodes(&self) -> usize {
        self.trace.len() - 1
    }

    pub fn last(&self) -> f64 {
        self.trace.last().copied().unwrap_or(0.0)
    }

    /// Record the summed delta `sum` and test for convergence.
    ///
    /// Converged iff the trace has more than two entries after appending and
    /// `0 <= sum - previous < phi`. Decreasing sums never converge.
    pub fn record(&mut self, sum: f64) -> bool {
        let previous = self.last();
        self.trace.push(sum);
        let change = sum - previous;
        self.trace.len() > 2 && (0.0..self.phi).contains(&change)
    }

    /// Sum every entry of `delta` and [`Self::record`] it
    pub fn update<'a, I>(&mut self, delta: I) -> bool
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let sum: f64 = delta.into_iter().sum();
        self.record(sum)
    }

    /// Write the trace, one float per line, replacing previous contents
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Self::write_trace(path, &self.trace)
    }

    pub(crate) fn write_trace<P: AsRef<Path>>(path: P, trace: &[f64]) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create convergence trace {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        for value in trace {
            writeln!(writer, "{value}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a trace written by [`Self::save`]
    pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::StorageNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read convergence trace {}", path.display()),
            source,
        })?;
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.parse::<f64>().map_err(|_| Error::InvalidTableValue {
                    row,
                    column: 0,
                    value: line.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_trace_starts_with_sentinel() {
        let tracker = ConvergenceTracker::new(0.01);
        assert_eq!(tracker.trace(), &[0.0]);
        assert_eq!(tracker.episodes(), 0);
    }

    #[test]
    fn test_small_positive_change_converges() {
        let mut tracker = ConvergenceTracker::new(0.01);
        assert!(!tracker.record(5.0));
        assert!(tracker.record(5.005));
        assert_eq!(tracker.trace(), &[0.0, 5.0, 5.005]);
    }

    #[test]
    fn test_negative_change_never_converges() {
        let mut tracker = ConvergenceTracker::new(0.01);
        tracker.record(5.0);
        assert!(!tracker.record(4.5));
        assert!(!tracker.record(4.499));
    }

    #[test]
    fn test_zero_change_converges() {
        let mut tracker = ConvergenceTracker::new(0.01);
        tracker.record(1.0);
        assert!(tracker.record(1.0));
    }

    #[test]
    fn test_first_record_cannot_converge() {
        // 0 -> 0.0 is inside [0, phi) but the trace only has two entries
        let mut tracker = ConvergenceTracker::new(0.01);
        assert!(!tracker.record(0.0));
    }

    #[test]
    fn test_change_at_threshold_does_not_converge() {
        let mut tracker = ConvergenceTracker::new(0.5);
        tracker.record(1.0);
        assert!(!tracker.record(1.5));
    }

    #[test]
    fn test_update_sums_delta_entries() {
        let mut tracker = ConvergenceTracker::new(0.01);
        tracker.update(&[1.0, 2.0, -0.5]);
        assert!((tracker.last() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_save_and_load_trace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conv.csv");

        let mut tracker = ConvergenceTracker::new(0.01);
        tracker.record(1.25);
        tracker.record(-3.0);
        tracker.save(&path).unwrap();

        let trace = ConvergenceTracker::load_trace(&path).unwrap();
        assert_eq!(trace, vec![0.0, 1.25, -3.0]);
    }
}
