//! Repository port for checkpoint persistence.
//!
//! This module defines the trait boundary between the training loop and the
//! storage holding the value table and the convergence trace.

use crate::{Result, q_learning::ValueTable};

/// Port for persisting and loading training checkpoints.
///
/// The trainer saves through this port after every episode, so the stored
/// table lags the in-memory table by at most one episode.
///
/// # Examples
///
/// ```no_run
/// use treasure_hunt::adapters::CsvRepository;
/// use treasure_hunt::ports::CheckpointRepository;
/// use treasure_hunt::q_learning::ValueTable;
///
/// let repo = CsvRepository::new("q.csv", "conv.csv");
/// repo.save_table(&ValueTable::zeros(4, 2))?;
/// let table = repo.load_table(4, 2)?;
/// # Ok::<(), treasure_hunt::Error>(())
/// ```
pub trait CheckpointRepository {
    /// Load a value table of the given shape.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Nothing has been stored yet ([`crate::Error::StorageNotFound`])
    /// - The stored table has a different shape
    /// - The stored data is corrupted
    fn load_table(&self, rows: usize, cols: usize) -> Result<ValueTable>;

    /// Save the value table, replacing any previous checkpoint.
    fn save_table(&self, table: &ValueTable) -> Result<()>;

    /// Save the convergence trace, replacing any previous checkpoint.
    fn save_trace(&self, trace: &[f64]) -> Result<()>;
}
