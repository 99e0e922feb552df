//! Heuristic exploration bonus table

use crate::{
    q_learning::q_table::ValueTable,
    types::{ActionId, StateId},
};

/// Per-step bonus table shaped like the value table.
///
/// After each transition only the chosen action of the visited state carries
/// a bonus: the gap between the state's best value and the chosen action's
/// value, plus `eta`. Every other entry of that row is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicTable {
    table: ValueTable,
}

impl HeuristicTable {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            table: ValueTable::zeros(rows, cols),
        }
    }

    /// Zero the whole table (start of a training run)
    pub fn reset(&mut self) {
        self.table.clear();
    }

    pub fn get(&self, state: StateId, action: ActionId) -> f64 {
        self.table.get(state, action)
    }

    pub fn row(&self, state: StateId) -> &[f64] {
        self.table.row(state)
    }

    /// Rebuild the row of `state` after choosing `action`.
    ///
    /// Must run before the value update of the same transition.
    pub fn update(&mut self, q: &ValueTable, state: StateId, action: ActionId, eta: f64) {
        let bonus = q.row_max(state) - q.get(state, action) + eta;
        self.table.clear_row(state);
        self.table.set(state, action, bonus);
    }
}
