//! Environment port - the game a learner is trained in
//!
//! The training loop only ever talks to a game through this trait. Concrete
//! games (see [`crate::envs`]) are adapters implementing it.

use std::{fmt::Debug, hash::Hash};

/// Environment trait - state/action sets, dynamics, and display hook
///
/// # Contract
///
/// - [`states`](Environment::states) and [`actions`](Environment::actions)
///   are fixed for the lifetime of a training run; their order defines the
///   row/column layout of the value table and of persisted tables.
/// - [`available_actions`](Environment::available_actions) returns a
///   non-empty subsequence of the action set for every non-terminal state.
///   The trainer performs no independent legality check.
/// - [`transition`](Environment::transition) returns a member of the state
///   set.
///
/// # Examples
///
/// ```
/// use treasure_hunt::ports::Environment;
///
/// struct Corridor {
///     position: u8,
/// }
///
/// impl Environment for Corridor {
///     type State = u8;
///     type Action = i8;
///
///     fn states(&self) -> Vec<u8> {
///         vec![0, 1, 2]
///     }
///
///     fn actions(&self) -> Vec<i8> {
///         vec![1]
///     }
///
///     fn available_actions(&self, _state: &u8) -> Vec<i8> {
///         vec![1]
///     }
///
///     fn reward(&self, state: &u8, _action: &i8) -> f64 {
///         if *state == 1 { 1.0 } else { 0.0 }
///     }
///
///     fn transition(&mut self, state: &u8, _action: &i8) -> u8 {
///         self.position = state + 1;
///         self.position
///     }
///
///     fn init(&mut self) {
///         self.position = 0;
///     }
///
///     fn start_state(&self) -> u8 {
///         0
///     }
///
///     fn terminal_states(&self) -> Vec<u8> {
///         vec![2]
///     }
/// }
/// ```
pub trait Environment {
    /// State identifier
    type State: Clone + Eq + Hash + Debug;

    /// Action identifier
    type Action: Clone + Eq + Hash + Debug;

    /// Ordered state set.
    fn states(&self) -> Vec<Self::State>;

    /// Ordered action set.
    fn actions(&self) -> Vec<Self::Action>;

    /// Actions legal from `state`.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Immediate reward for taking `action` in `state`.
    fn reward(&self, state: &Self::State, action: &Self::Action) -> f64;

    /// Successor of `state` under `action`.
    ///
    /// May update environment bookkeeping such as the agent's visited path.
    fn transition(&mut self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Reset the environment to its start condition.
    fn init(&mut self);

    /// State every episode starts from, unless overridden by configuration.
    fn start_state(&self) -> Self::State;

    /// States that end an episode, unless overridden by configuration.
    fn terminal_states(&self) -> Vec<Self::State>;

    /// Environment-specific end condition checked after each transition.
    ///
    /// # Default Implementation
    ///
    /// Returns `false`; episodes end only at terminal states.
    fn is_episode_over(&self, _state: &Self::State) -> bool {
        false
    }

    /// Show the environment with the agent at `state`.
    ///
    /// Called at episode start and after each transition when display is
    /// enabled.
    ///
    /// # Default Implementation
    ///
    /// Does nothing.
    fn display(&self, _state: &Self::State) {}
}
