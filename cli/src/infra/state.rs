//! Lifecycle state persistence.
//!
//! One JSON file per instance under `.kitchen/`, written atomically
//! (temp file + rename) with mode 600.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::LifecycleState;

/// State file manager for a single instance.
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// State file for `instance` under `<cwd>/.kitchen/`.
    #[must_use]
    pub fn for_instance(cwd: &Path, instance: &str) -> Self {
        Self::with_path(cwd.join(".kitchen").join(format!("{instance}.json")))
    }

    /// Create a state manager with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, or an empty state when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<LifecycleState> {
        if !self.path.exists() {
            return Ok(LifecycleState::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading state file {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing state file {}", self.path.display()))
    }

    /// Save state to disk with mode 600.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot be written.
    pub fn save(&self, state: &LifecycleState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(state).context("serializing state")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing state file {}", self.path.display()))
    }
}
