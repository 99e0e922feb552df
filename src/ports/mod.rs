//! Ports (trait boundaries) for external collaborators.
//!
//! These traits are owned by the training core and implemented by adapters:
//! games in [`crate::envs`], storage in [`crate::adapters`], and observers
//! and pacers in [`crate::pipeline`].

pub mod environment;
pub mod observer;
pub mod repository;

pub use environment::Environment;
pub use observer::Observer;
pub use repository::CheckpointRepository;
