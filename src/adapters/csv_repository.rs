//! CSV implementation of the checkpoint repository.
//!
//! The value table goes to a header-less CSV file (rows = states, columns =
//! actions) and the convergence trace to a one-float-per-line file.

use std::path::{Path, PathBuf};

use crate::{
    Result,
    ports::CheckpointRepository,
    q_learning::{ConvergenceTracker, ValueTable},
};

/// File-backed checkpoint repository.
///
/// # Examples
///
/// ```no_run
/// use treasure_hunt::adapters::CsvRepository;
/// use treasure_hunt::ports::CheckpointRepository;
///
/// let repo = CsvRepository::new("Treasure2DQ.csv", "Treasure2Dconv.csv");
/// repo.save_trace(&[0.0, 1.5])?;
/// # Ok::<(), treasure_hunt::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CsvRepository {
    table_path: PathBuf,
    trace_path: PathBuf,
}

impl CsvRepository {
    pub fn new(table_path: impl Into<PathBuf>, trace_path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
            trace_path: trace_path.into(),
        }
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    pub fn trace_path(&self) -> &Path {
        &self.trace_path
    }
}

impl CheckpointRepository for CsvRepository {
    fn load_table(&self, rows: usize, cols: usize) -> Result<ValueTable> {
        ValueTable::load(&self.table_path, rows, cols)
    }

    fn save_table(&self, table: &ValueTable) -> Result<()> {
        table.save(&self.table_path)
    }

    fn save_trace(&self, trace: &[f64]) -> Result<()> {
        ConvergenceTracker::write_trace(&self.trace_path, trace)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        Error,
        types::{ActionId, StateId},
    };

    #[test]
    fn test_csv_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = CsvRepository::new(
            temp_dir.path().join("q.csv"),
            temp_dir.path().join("conv.csv"),
        );

        let mut table = ValueTable::zeros(5, 4);
        table.set(StateId::new(4), ActionId::new(2), -0.5);
        repo.save_table(&table).expect("Failed to save");
        let loaded = repo.load_table(5, 4).expect("Failed to load");

        assert_eq!(loaded, table);
    }

    #[test]
    fn test_trace_written_one_value_per_line() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = CsvRepository::new(
            temp_dir.path().join("q.csv"),
            temp_dir.path().join("conv.csv"),
        );

        repo.save_trace(&[0.0, 2.5, 2.25]).expect("Failed to save");
        let contents = std::fs::read_to_string(repo.trace_path()).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_load_nonexistent_returns_storage_not_found() {
        let repo = CsvRepository::new("/tmp/nonexistent_12345.csv", "/tmp/conv_12345.csv");
        let result = repo.load_table(2, 2);
        assert!(matches!(result, Err(Error::StorageNotFound { .. })));
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let repo = CsvRepository::new("/invalid_dir_12345/q.csv", "/invalid_dir_12345/c.csv");
        let result = repo.save_table(&ValueTable::zeros(1, 1));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
