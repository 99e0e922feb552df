//! Infrastructure adapters implementing domain ports.
//!
//! This module contains concrete implementations of the port traits defined
//! in the `ports` module. Games live separately in [`crate::envs`].

pub mod csv_repository;
pub mod in_memory_repository;

pub use csv_repository::CsvRepository;
pub use in_memory_repository::InMemoryRepository;
