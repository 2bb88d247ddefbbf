//! Loads `.kitchen-marathon.yml` and resolves it against the process
//! environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::{DriverConfig, ResolveContext, ResolvedConfig};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".kitchen-marathon.yml";

/// YAML config file on disk.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Use `path` when given, else `<cwd>/.kitchen-marathon.yml`.
    #[must_use]
    pub fn new(path: Option<PathBuf>, cwd: &Path) -> Self {
        Self {
            path: path.unwrap_or_else(|| cwd.join(CONFIG_FILE)),
        }
    }

    /// Read the raw config. A missing file yields all defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<DriverConfig> {
        if !self.path.exists() {
            return Ok(DriverConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(DriverConfig::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }

    /// Load and resolve in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the settings are invalid.
    pub fn resolve(&self, cwd: &Path, instance: Option<&str>) -> Result<ResolvedConfig> {
        let home = dirs::home_dir();
        let ctx = ResolveContext {
            cwd,
            home: home.as_deref(),
            instance,
        };
        self.load()?
            .resolve(&ctx)
            .with_context(|| format!("invalid configuration in {}", self.path.display()))
    }
}
