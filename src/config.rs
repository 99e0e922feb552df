//! Configuration types for training runs.

use std::{fmt, path::Path};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    envs::{GridConfig, LineConfig},
};

/// Stopping rule of a training run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum QuitMode {
    /// Stop after exactly `train_rounds` episodes
    #[default]
    #[serde(alias = "r")]
    #[value(alias = "r")]
    Rounds,
    /// Stop when the convergence test passes; fail at `maximum_iteration`
    #[serde(alias = "c")]
    #[value(alias = "c")]
    Convergence,
}

impl fmt::Display for QuitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuitMode::Rounds => write!(f, "rounds"),
            QuitMode::Convergence => write!(f, "convergence"),
        }
    }
}

/// Learning parameters of a training run.
///
/// Every field has a default; [`QConfig::validate`] checks ranges and is run
/// by the trainer before anything else happens.
///
/// # Examples
///
/// ```
/// use treasure_hunt::config::{QConfig, QuitMode};
///
/// let config = QConfig::default()
///     .with_epsilon(0.8)
///     .with_quit_mode(QuitMode::Convergence)
///     .with_seed(42);
/// config.validate()?;
/// # Ok::<(), treasure_hunt::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QConfig {
    /// Exploit threshold: a uniform draw above it triggers exploration
    pub epsilon: f64,
    /// Discount factor
    pub gamma: f64,
    /// Learning-rate scale (`alpha0` of the harmonic schedule)
    pub alpha: f64,
    /// Heuristic bonus constant
    pub eta: f64,
    /// Heuristic weight
    pub iota: f64,
    /// Convergence threshold
    pub phi: f64,
    /// Episode ceiling in convergence mode
    pub maximum_iteration: usize,
    /// Stopping rule
    pub quit_mode: QuitMode,
    /// Episode count in rounds mode
    pub train_rounds: usize,
    /// Use the heuristic-augmented selector
    pub heuristic: bool,
    /// Call the environment display hook while training
    pub display: bool,
    /// Pause after each displayed transition, in milliseconds
    pub sleep_ms: u64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Start state by position in the state set (negative counts from the end)
    pub start_index: Option<isize>,
    /// Terminal states by position in the state set
    pub terminal_indices: Option<Vec<isize>>,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.9,
            gamma: 0.9,
            alpha: 0.1,
            eta: 0.9,
            iota: 0.9,
            phi: 0.01,
            maximum_iteration: 200_000,
            quit_mode: QuitMode::Rounds,
            train_rounds: 300,
            heuristic: false,
            display: false,
            sleep_ms: 0,
            seed: None,
            start_index: None,
            terminal_indices: None,
        }
    }
}

impl QConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_phi(mut self, phi: f64) -> Self {
        self.phi = phi;
        self
    }

    pub fn with_heuristic(mut self, eta: f64, iota: f64) -> Self {
        self.heuristic = true;
        self.eta = eta;
        self.iota = iota;
        self
    }

    pub fn with_quit_mode(mut self, mode: QuitMode) -> Self {
        self.quit_mode = mode;
        self
    }

    pub fn with_train_rounds(mut self, rounds: usize) -> Self {
        self.train_rounds = rounds;
        self
    }

    pub fn with_maximum_iteration(mut self, limit: usize) -> Self {
        self.maximum_iteration = limit;
        self
    }

    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_start_index(mut self, index: isize) -> Self {
        self.start_index = Some(index);
        self
    }

    pub fn with_terminal_indices(mut self, indices: Vec<isize>) -> Self {
        self.terminal_indices = Some(indices);
        self
    }

    /// Check every parameter range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        fn invalid(message: String) -> Result<()> {
            Err(Error::InvalidConfiguration { message })
        }

        if !(0.0..=1.0).contains(&self.epsilon) {
            return invalid(format!("epsilon must be in [0, 1], got {}", self.epsilon));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return invalid(format!("alpha must be positive, got {}", self.alpha));
        }
        if !(self.phi.is_finite() && self.phi > 0.0) {
            return invalid(format!("phi must be positive, got {}", self.phi));
        }
        if !self.eta.is_finite() {
            return invalid(format!("eta must be finite, got {}", self.eta));
        }
        if !self.iota.is_finite() {
            return invalid(format!("iota must be finite, got {}", self.iota));
        }
        if self.maximum_iteration == 0 {
            return invalid("maximum_iteration must be at least 1".to_string());
        }
        if self.train_rounds == 0 {
            return invalid("train_rounds must be at least 1".to_string());
        }
        if matches!(&self.terminal_indices, Some(indices) if indices.is_empty()) {
            return invalid("terminal_indices must not be empty".to_string());
        }
        Ok(())
    }
}

/// Contents of a YAML configuration file.
///
/// ```yaml
/// q:
///   epsilon: 0.9
///   gamma: 0.9
///   alpha: 0.1
///   phi: 0.01
/// grid:
///   size: 8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub q: QConfig,
    pub grid: GridConfig,
    pub line: LineConfig,
}

impl ConfigFile {
    /// Parse and validate a configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ConfigFile = serde_yaml::from_str(yaml)?;
        config.q.validate()?;
        config.grid.validate()?;
        config.line.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config file {}", path.display()),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }
}
