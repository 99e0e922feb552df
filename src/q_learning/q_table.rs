//! Dense value table for tabular Q-learning

use std::{fs::File, path::Path};

use rand::{Rng, seq::IndexedRandom};

use crate::{
    Error, Result,
    types::{ActionId, StateId},
};

/// Dense |states| x |actions| table of value estimates.
///
/// Rows follow the order of the state space and columns the order of the
/// action space. Persisted tables carry no labels, so a saved table can only
/// be reloaded under the same orderings.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ValueTable {
    /// Create a zero-initialized table
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn offset(&self, state: StateId, action: ActionId) -> usize {
        debug_assert!(state.index() < self.rows && action.index() < self.cols);
        state.index() * self.cols + action.index()
    }

    /// Get the value for a state-action pair
    pub fn get(&self, state: StateId, action: ActionId) -> f64 {
        self.values[self.offset(state, action)]
    }

    /// Set the value for a state-action pair
    pub fn set(&mut self, state: StateId, action: ActionId, value: f64) {
        let offset = self.offset(state, action);
        self.values[offset] = value;
    }

    /// Add `delta` to the value of a state-action pair
    pub fn add(&mut self, state: StateId, action: ActionId, delta: f64) {
        let offset = self.offset(state, action);
        self.values[offset] += delta;
    }

    /// All values of one state, in action order
    pub fn row(&self, state: StateId) -> &[f64] {
        let start = state.index() * self.cols;
        &self.values[start..start + self.cols]
    }

    pub(crate) fn row_mut(&mut self, state: StateId) -> &mut [f64] {
        let start = state.index() * self.cols;
        &mut self.values[start..start + self.cols]
    }

    /// Maximum value over every action of a state
    pub fn row_max(&self, state: StateId) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// An action attaining [`Self::row_max`], uniformly at random among ties
    pub fn row_argmax<R: Rng + ?Sized>(&self, state: StateId, rng: &mut R) -> ActionId {
        let all: Vec<ActionId> = (0..self.cols).map(ActionId::new).collect();
        self.argmax_among(state, &all, rng)
    }

    /// First action attaining the row maximum
    pub fn first_argmax(&self, state: StateId) -> ActionId {
        let row = self.row(state);
        let max = self.row_max(state);
        let index = row.iter().position(|&v| v == max).unwrap_or(0);
        ActionId::new(index)
    }

    /// Greedy choice restricted to `actions`, ties broken uniformly at random
    ///
    /// `actions` must not be empty.
    pub fn argmax_among<R: Rng + ?Sized>(
        &self,
        state: StateId,
        actions: &[ActionId],
        rng: &mut R,
    ) -> ActionId {
        let max = actions
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<ActionId> = actions
            .iter()
            .copied()
            .filter(|&action| self.get(state, action) == max)
            .collect();
        *ties.choose(rng).unwrap_or(&actions[0])
    }

    /// Reset every entry to zero
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Reset every entry of one state's row to zero
    pub fn clear_row(&mut self, state: StateId) {
        self.row_mut(state).iter_mut().for_each(|v| *v = 0.0);
    }

    /// Sum over all entries of `self - baseline`
    ///
    /// Both tables must have the same shape.
    pub fn delta_sum(&self, baseline: &ValueTable) -> f64 {
        debug_assert_eq!((self.rows, self.cols), (baseline.rows, baseline.cols));
        self.values
            .iter()
            .zip(&baseline.values)
            .map(|(now, then)| now - then)
            .sum()
    }

    /// Load a table written by [`Self::save`]
    ///
    /// # Errors
    ///
    /// - [`Error::StorageNotFound`] if `path` does not exist
    /// - [`Error::TableShapeMismatch`] if the file is not `rows` x `cols`
    /// - [`Error::InvalidTableValue`] if a cell is not a float
    pub fn load<P: AsRef<Path>>(path: P, rows: usize, cols: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::StorageNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open value table {}", path.display()),
            source,
        })?;
        Self::read_from(file, rows, cols)
    }

    pub(crate) fn read_from<R: std::io::Read>(reader: R, rows: usize, cols: usize) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut values = Vec::with_capacity(rows * cols);
        let mut found_rows = 0;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != cols {
                return Err(Error::TableShapeMismatch {
                    expected_rows: rows,
                    expected_cols: cols,
                    rows: row + 1,
                    cols: record.len(),
                });
            }
            for (column, field) in record.iter().enumerate() {
                let value = field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidTableValue {
                        row,
                        column,
                        value: field.to_string(),
                    })?;
                values.push(value);
            }
            found_rows += 1;
        }

        if found_rows != rows {
            return Err(Error::TableShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: found_rows,
                cols,
            });
        }

        Ok(Self { rows, cols, values })
    }

    /// Write the table as header-less CSV, replacing any previous contents
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create value table {}", path.display()),
            source,
        })?;
        self.write_to(file)
    }

    pub(crate) fn write_to<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        for row in self.values.chunks(self.cols.max(1)) {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}
