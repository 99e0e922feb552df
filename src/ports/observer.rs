//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the training
//! loop to specific output formats or metrics.

use crate::{
    Result,
    config::QuitMode,
    q_learning::{EpisodeSummary, TrainingReport},
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during training.
/// Examples include:
/// - Progress bars for user feedback
/// - JSONL export for analysis
/// - Metrics tracking for evaluation
///
/// # Event Sequence
///
/// 1. `on_training_start(mode, budget)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_episode_end(summary)` - after the checkpoint is written
/// 3. `on_training_end(report)` - Once, only when training completes
///
/// # Examples
///
/// ```no_run
/// use treasure_hunt::{ports::Observer, q_learning::EpisodeSummary};
///
/// struct StepCounter {
///     steps: usize,
/// }
///
/// impl Observer for StepCounter {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> treasure_hunt::Result<()> {
///         self.steps += summary.steps;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    ///
    /// # Parameters
    ///
    /// * `mode` - Stopping rule of the run
    /// * `budget` - Episode count in rounds mode, iteration ceiling in
    ///   convergence mode
    fn on_training_start(&mut self, _mode: QuitMode, _budget: usize) -> Result<()> {
        Ok(())
    }

    /// Called before each episode (0-based index).
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each episode has been checkpointed.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes normally.
    ///
    /// Not called when training aborts with an error.
    fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
        Ok(())
    }
}
