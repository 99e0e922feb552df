//! Greedy deployment of a trained value table

use tracing::debug;

use crate::{
    Error, Result,
    ports::Environment,
    q_learning::{policy, q_table::ValueTable},
    types::Space,
};

/// Path taken by a greedy walk
#[derive(Debug, Clone, PartialEq)]
pub struct Walk<S> {
    /// Visited states, start and final state included
    pub path: Vec<S>,
    /// Undiscounted sum of rewards
    pub total_reward: f64,
}

impl<S> Walk<S> {
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn final_state(&self) -> Option<&S> {
        self.path.last()
    }
}

/// Follow the greedy policy of `table` from the start state to a terminal.
///
/// The environment is reset first. `display` is called for the start state
/// and after every transition when `show` is set.
///
/// # Errors
///
/// - [`Error::TableShapeMismatch`] if `table` does not fit the environment
/// - [`Error::StepLimitExceeded`] if no terminal state is reached within
///   `max_steps` transitions
pub fn walk<E: Environment>(
    env: &mut E,
    table: &ValueTable,
    max_steps: usize,
    show: bool,
) -> Result<Walk<E::State>> {
    let states = Space::new(env.states())?;
    let actions = Space::new(env.actions())?;
    if (table.rows(), table.cols()) != (states.len(), actions.len()) {
        return Err(Error::TableShapeMismatch {
            expected_rows: states.len(),
            expected_cols: actions.len(),
            rows: table.rows(),
            cols: table.cols(),
        });
    }
    let terminals = env.terminal_states();

    env.init();
    let mut state = env.start_state();
    let mut path = vec![state.clone()];
    let mut total_reward = 0.0;
    if show {
        env.display(&state);
    }

    for _ in 0..max_steps {
        let id = states.state_id(&state)?;
        let action = &actions.labels()[policy::choose_optimal(table, id).index()];
        total_reward += env.reward(&state, action);
        let next = env.transition(&state, action);
        debug!(from = ?state, ?action, to = ?next, "greedy step");
        if show {
            env.display(&next);
        }
        path.push(next.clone());
        if terminals.contains(&next) || env.is_episode_over(&next) {
            return Ok(Walk { path, total_reward });
        }
        state = next;
    }

    Err(Error::StepLimitExceeded { limit: max_steps })
}
