//! Application context — unified state passed to every command handler.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::ResolvedConfig;
use crate::infra::config::YamlConfigStore;
use crate::infra::state::StateManager;
use crate::output::OutputContext;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Explicit config file path.
    pub config: Option<PathBuf>,
    /// Instance name override.
    pub instance: Option<String>,
}

/// Unified application context passed to every lifecycle command.
///
/// Configuration is resolved exactly once here and never changes afterwards.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Fully resolved driver configuration.
    pub config: ResolvedConfig,
    /// Lifecycle state file for the selected instance.
    pub state_mgr: StateManager,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be read or the
    /// configuration is invalid.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let store = YamlConfigStore::new(flags.config, &cwd);
        let config = store.resolve(&cwd, flags.instance.as_deref())?;
        let state_mgr = StateManager::for_instance(&cwd, &config.instance_name);

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config,
            state_mgr,
        })
    }
}
