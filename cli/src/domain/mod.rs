//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod app;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod retry;
pub mod state;

pub use app::{AppInfo, SshEndpoint};
pub use config::{ConnectionConfig, DriverConfig, ResolvedConfig};
pub use descriptor::{AppDescriptor, generate_app_id};
pub use error::{ConfigError, DriverError, MarathonError, Transient};
pub use retry::RetryPolicy;
pub use state::{LifecycleState, SshTarget};
