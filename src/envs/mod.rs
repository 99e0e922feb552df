//! Treasure-hunt environments
//!
//! Concrete games implementing [`crate::ports::Environment`]:
//!
//! - [`LineWorld`]: a corridor with the treasure at the far end
//! - [`GridWorld`]: a square map with walls, traps, and a treasure

pub mod grid;
pub mod line;

pub use grid::{Cell, Coord, GridConfig, GridMap, GridWorld, Move};
pub use line::{Direction, LineConfig, LineWorld};
