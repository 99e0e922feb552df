//! In-memory checkpoint repository for testing.
//!
//! This adapter provides a pure in-memory implementation of
//! CheckpointRepository, enabling fast tests without any file system I/O.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Error, Result, ports::CheckpointRepository, q_learning::ValueTable};

#[derive(Debug, Default)]
struct Stored {
    table: Option<ValueTable>,
    trace: Vec<f64>,
    table_saves: usize,
    trace_saves: usize,
}

/// In-memory repository for testing.
///
/// All clones share the same underlying storage, so a test can keep a handle
/// while the trainer owns another and inspect what was checkpointed.
///
/// # Examples
///
/// ```
/// use treasure_hunt::adapters::InMemoryRepository;
/// use treasure_hunt::ports::CheckpointRepository;
/// use treasure_hunt::q_learning::ValueTable;
///
/// let repo = InMemoryRepository::new();
/// repo.save_table(&ValueTable::zeros(2, 2))?;
/// assert_eq!(repo.table_saves(), 1);
/// # Ok::<(), treasure_hunt::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<Stored>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository already holding `table`.
    pub fn with_table(table: ValueTable) -> Self {
        let repo = Self::new();
        repo.lock().table = Some(table);
        repo
    }

    fn lock(&self) -> MutexGuard<'_, Stored> {
        // A poisoned lock only means a test panicked mid-save; the data is still usable.
        self.storage.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Latest saved table, if any.
    pub fn table(&self) -> Option<ValueTable> {
        self.lock().table.clone()
    }

    /// Latest saved trace (empty if never saved).
    pub fn trace(&self) -> Vec<f64> {
        self.lock().trace.clone()
    }

    /// Number of table checkpoints written so far.
    pub fn table_saves(&self) -> usize {
        self.lock().table_saves
    }

    /// Number of trace checkpoints written so far.
    pub fn trace_saves(&self) -> usize {
        self.lock().trace_saves
    }
}

impl CheckpointRepository for InMemoryRepository {
    fn load_table(&self, rows: usize, cols: usize) -> Result<ValueTable> {
        let stored = self.lock();
        let table = stored.table.as_ref().ok_or_else(|| Error::StorageNotFound {
            path: "<memory>".into(),
        })?;
        if (table.rows(), table.cols()) != (rows, cols) {
            return Err(Error::TableShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: table.rows(),
                cols: table.cols(),
            });
        }
        Ok(table.clone())
    }

    fn save_table(&self, table: &ValueTable) -> Result<()> {
        let mut stored = self.lock();
        stored.table = Some(table.clone());
        stored.table_saves += 1;
        Ok(())
    }

    fn save_trace(&self, trace: &[f64]) -> Result<()> {
        let mut stored = self.lock();
        stored.trace = trace.to_vec();
        stored.trace_saves += 1;
        Ok(())
    }
}
