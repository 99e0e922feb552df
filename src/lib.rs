//! Tabular Q-learning for treasure-hunt games
//!
//! This crate provides:
//! - A dense value table with CSV persistence and an auxiliary heuristic table
//! - Epsilon-greedy, heuristic-augmented, and greedy action selection
//! - An episodic training loop with convergence detection and per-episode
//!   checkpoints
//! - Line and grid treasure-hunt environments
//! - Observers for progress bars, metrics, and JSONL export

pub mod adapters;
pub mod cli;
pub mod config;
pub mod envs;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use config::{ConfigFile, QConfig, QuitMode};
pub use error::{Error, Result};
pub use types::{ActionId, Space, StateId};
