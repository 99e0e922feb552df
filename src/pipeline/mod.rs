//! Training pipeline plumbing
//!
//! This module provides the pieces that sit around a training loop:
//! - Observers for progress display, metrics, and JSONL export
//! - Pacers that slow down displayed runs

pub mod observers;
pub mod pacing;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use pacing::{NoPacer, Pacer, SleepPacer};

pub use crate::ports::Observer;
