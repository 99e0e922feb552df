//! CLI infrastructure for the treasure-hunt trainer
//!
//! This module provides the command-line interface for training agents and
//! replaying learned policies.

pub mod commands;
pub mod output;
