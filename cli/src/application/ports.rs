//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::ExitStatus;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{AppDescriptor, AppInfo, MarathonError, SshTarget};

// ── Marathon Port ─────────────────────────────────────────────────────────────

/// The three Marathon app endpoints the driver needs.
#[allow(async_fn_in_trait)]
pub trait MarathonApi {
    /// Submit a new app. Returns the id Marathon reports, if any.
    async fn create_app(&self, descriptor: &AppDescriptor) -> Result<Option<String>, MarathonError>;
    /// Fetch the current status of an app.
    async fn get_app(&self, app_id: &str) -> Result<AppInfo, MarathonError>;
    /// Delete an app and all its tasks.
    async fn delete_app(&self, app_id: &str) -> Result<(), MarathonError>;
}

// ── Clock Port ────────────────────────────────────────────────────────────────

/// Pauses between retry attempts.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

// ── Host Lifecycle Port ───────────────────────────────────────────────────────

/// Default per-phase behaviour once the instance endpoint is known.
#[allow(async_fn_in_trait)]
pub trait HostLifecycle {
    /// Converge the instance (install and configure the code under test).
    async fn converge(&self, target: &SshTarget) -> Result<()>;
    /// Prepare the instance for verification.
    async fn setup(&self, target: &SshTarget) -> Result<()>;
    /// Run the verification suite.
    async fn verify(&self, target: &SshTarget) -> Result<()>;
    /// Open an interactive session.
    async fn login(&self, target: &SshTarget) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with inherited stdio and return its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit an informational message.
    fn info(&self, message: &str);
}
