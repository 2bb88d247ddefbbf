//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

/// Errors that may succeed when the same call is repeated after a pause.
pub trait Transient {
    /// Returns `true` when the retry policies should try again.
    fn is_transient(&self) -> bool;
}

// ── Marathon errors ───────────────────────────────────────────────────────────

/// Error kinds reported by a Marathon API call.
#[derive(Debug, Error)]
pub enum MarathonError {
    #[error("Marathon timed out: {0}")]
    Timeout(String),

    #[error("Marathon app '{0}' not found")]
    NotFound(String),

    #[error("Marathon rejected the credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Marathon rejected the request (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    #[error("Marathon server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("cannot reach Marathon: {0}")]
    Transport(String),

    #[error("unexpected response from Marathon: {0}")]
    Decode(String),
}

impl Transient for MarathonError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

// ── Driver errors ─────────────────────────────────────────────────────────────

/// Errors raised by the lifecycle driver itself.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Marathon(#[from] MarathonError),

    #[error("App '{0}' is not running.")]
    NotRunning(String),

    #[error(
        "App '{0}' has no port mapping labelled SERVICE=ssh.\n\n\
         Add a mapping with \"labels\": {{\"SERVICE\": \"ssh\"}} to the app template."
    )]
    SshPortMappingMissing(String),

    #[error("App '{app_id}' task on {host} exposes {available} port(s), SSH mapping is at index {index}")]
    SshPortMissing {
        app_id: String,
        host: String,
        index: usize,
        available: usize,
    },

    #[error(
        "Invalid Marathon app id '{0}': path segments may only contain lowercase letters, \
         digits, '-' and '.', and must start and end with a letter or digit"
    )]
    InvalidAppId(String),

    #[error("Instance has no {0} recorded. Run 'kitchen-marathon create' first.")]
    MissingState(&'static str),
}

impl Transient for DriverError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Marathon(e) => e.is_transient(),
            Self::NotRunning(_) => true,
            _ => false,
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to resolving the driver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("marathon_proxy_address is set but marathon_proxy_port is missing")]
    ProxyPortMissing,

    #[error("{key} must be greater than zero")]
    ZeroDuration { key: &'static str },

    #[error("marathon_host must start with http:// or https:// (got '{0}')")]
    InvalidHost(String),

    #[error("cannot derive an instance name: set instance_name or pass --instance")]
    NoInstanceName,
}
