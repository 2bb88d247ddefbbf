//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: Marathon HTTP calls,
//! process execution, SSH, config loading, and state persistence.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod marathon;
pub mod sleeper;
pub mod ssh;
pub mod state;
