//! CLI command implementations

pub mod run;
pub mod train;

use clap::ValueEnum;
use serde::Serialize;

/// Which treasure hunt to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Demo {
    /// One-dimensional corridor
    Line,
    /// Two-dimensional map with walls and traps
    #[default]
    Grid,
}
