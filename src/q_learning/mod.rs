//! Tabular Q-learning engine
//!
//! This module holds the training core: the dense value table, the heuristic
//! bonus table, the action selectors, the learning-rate schedules, the
//! convergence tracker, and the episodic trainer tying them together.
//!
//! ## Update rule
//!
//! For a transition `(s, a) -> s'` with reward `r` in episode `t`:
//!
//! ```text
//! target   = r                          if s' is terminal
//!          = r + gamma * max_a' Q(s', a')  otherwise
//! Q(s, a) += alpha(t) * (target - Q(s, a))
//! ```
//!
//! with `alpha(t) = alpha0 * 100 / (100 + t)`.
//!
//! ## Usage Example
//!
//! ```no_run
//! use treasure_hunt::{
//!     adapters::InMemoryRepository,
//!     config::{QConfig, QuitMode},
//!     envs::LineWorld,
//!     q_learning::{Trainer, deploy},
//! };
//!
//! let config = QConfig::default()
//!     .with_quit_mode(QuitMode::Rounds)
//!     .with_train_rounds(50)
//!     .with_seed(1);
//! let mut trainer = Trainer::new(
//!     LineWorld::new(5, 1.0)?,
//!     config,
//!     Box::new(InMemoryRepository::new()),
//! )?;
//! trainer.train()?;
//!
//! let (mut env, table) = trainer.into_parts();
//! let walk = deploy::walk(&mut env, &table, 100, false)?;
//! assert_eq!(walk.final_state(), Some(&5));
//! # Ok::<(), treasure_hunt::Error>(())
//! ```

pub mod convergence;
pub mod deploy;
pub mod heuristic;
pub mod policy;
pub mod q_table;
pub mod schedule;
pub mod trainer;

// Public re-exports
pub use convergence::ConvergenceTracker;
pub use deploy::Walk;
pub use heuristic::HeuristicTable;
pub use q_table::ValueTable;
pub use schedule::{AlphaSchedule, alpha_linear, alpha_log};
pub use trainer::{EpisodeSummary, Trainer, TrainingReport, build_rng};
