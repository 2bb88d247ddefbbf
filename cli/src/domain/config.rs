//! Driver configuration schema and resolution.
//!
//! Pure functions only — no I/O, no async, no filesystem access. The caller
//! supplies the working directory, home directory and instance name.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::ConfigError;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_APP_PREFIX: &str = "kitchen";
pub const DEFAULT_MARATHON_HOST: &str = "http://localhost:8080";
pub const DEFAULT_SSH_USERNAME: &str = "kitchen";
pub const DEFAULT_LAUNCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ── Config schema ────────────────────────────────────────────────────────────

/// Driver configuration as written in `.kitchen-marathon.yml`.
///
/// Every field is optional; unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub app_prefix: Option<String>,
    pub app_template: Option<PathBuf>,
    pub app_config: Map<String, Value>,
    pub app_launch_timeout: Option<u64>,

    #[serde(alias = "host")]
    pub marathon_host: Option<String>,
    #[serde(alias = "username")]
    pub marathon_username: Option<String>,
    #[serde(alias = "password")]
    pub marathon_password: Option<String>,
    #[serde(alias = "verify_ssl")]
    pub marathon_verify_ssl: Option<bool>,
    pub marathon_request_timeout: Option<u64>,

    #[serde(alias = "http_proxyaddr")]
    pub marathon_proxy_address: Option<String>,
    #[serde(alias = "http_proxyport")]
    pub marathon_proxy_port: Option<u16>,
    #[serde(alias = "http_proxyuser")]
    pub marathon_proxy_username: Option<String>,
    #[serde(alias = "http_proxypass")]
    pub marathon_proxy_password: Option<String>,

    pub ssh_username: Option<String>,
    pub ssh_private_key: Option<PathBuf>,
    pub instance_name: Option<String>,

    pub converge_commands: Vec<String>,
    pub setup_commands: Vec<String>,
    pub verify_commands: Vec<String>,
}

/// Inputs that come from the process environment rather than the file.
pub struct ResolveContext<'a> {
    pub cwd: &'a Path,
    pub home: Option<&'a Path>,
    /// Instance name passed on the command line; beats `instance_name`.
    pub instance: Option<&'a str>,
}

// ── Resolved config ──────────────────────────────────────────────────────────

/// Fully defaulted, immutable configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub instance_name: String,
    pub app: AppSettings,
    pub connection: ConnectionConfig,
    pub ssh: SshSettings,
    pub commands: HostCommands,
}

/// How test apps are named and described.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub prefix: String,
    pub template: Option<PathBuf>,
    pub overrides: Map<String, Value>,
    pub launch_timeout: Duration,
}

/// Marathon endpoint and transport settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: bool,
    pub request_timeout: Duration,
    pub proxy: Option<ProxyConfig>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub address: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SshSettings {
    pub username: String,
    pub private_key: PathBuf,
}

/// Commands run over SSH for each delegated lifecycle phase.
#[derive(Debug, Clone, Default)]
pub struct HostCommands {
    pub converge: Vec<String>,
    pub setup: Vec<String>,
    pub verify: Vec<String>,
}

fn redact(secret: Option<&String>) -> Option<&'static str> {
    secret.map(|_| "***")
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &redact(self.password.as_ref()))
            .field("verify_ssl", &self.verify_ssl)
            .field("request_timeout", &self.request_timeout)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &redact(self.password.as_ref()))
            .finish()
    }
}

impl ProxyConfig {
    /// Proxy URL without credentials, e.g. `http://proxy.local:3128`.
    #[must_use]
    pub fn url(&self) -> String {
        if self.address.contains("://") {
            format!("{}:{}", self.address.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.address, self.port)
        }
    }
}

// ── Resolution ───────────────────────────────────────────────────────────────

/// Expand a leading `~` and anchor relative paths at `cwd`.
#[must_use]
pub fn expand_path(path: &Path, cwd: &Path, home: Option<&Path>) -> PathBuf {
    let expanded = match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}

fn positive_secs(value: Option<u64>, default: u64, key: &'static str) -> Result<Duration, ConfigError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigError::ZeroDuration { key }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

impl DriverConfig {
    /// Apply defaults and validate, producing the immutable configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the proxy is half-configured, a timeout is
    /// zero, the Marathon URL has no http(s) scheme, or no instance name can
    /// be derived.
    pub fn resolve(self, ctx: &ResolveContext<'_>) -> Result<ResolvedConfig, ConfigError> {
        let instance_name = ctx
            .instance
            .map(str::to_string)
            .or(self.instance_name)
            .or_else(|| {
                ctx.cwd
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .filter(|n| !n.is_empty())
            .ok_or(ConfigError::NoInstanceName)?;

        let url = self
            .marathon_host
            .unwrap_or_else(|| DEFAULT_MARATHON_HOST.to_string());
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidHost(url));
        }

        let proxy = match (self.marathon_proxy_address, self.marathon_proxy_port) {
            (None, _) => None,
            (Some(_), None) => return Err(ConfigError::ProxyPortMissing),
            (Some(address), Some(port)) => Some(ProxyConfig {
                address,
                port,
                username: self.marathon_proxy_username,
                password: self.marathon_proxy_password,
            }),
        };

        let private_key = self.ssh_private_key.map_or_else(
            || ctx.cwd.join(".kitchen").join("kitchen.pem"),
            |p| expand_path(&p, ctx.cwd, ctx.home),
        );

        Ok(ResolvedConfig {
            instance_name,
            app: AppSettings {
                prefix: self
                    .app_prefix
                    .unwrap_or_else(|| DEFAULT_APP_PREFIX.to_string()),
                template: self
                    .app_template
                    .map(|p| expand_path(&p, ctx.cwd, ctx.home)),
                overrides: self.app_config,
                launch_timeout: positive_secs(
                    self.app_launch_timeout,
                    DEFAULT_LAUNCH_TIMEOUT_SECS,
                    "app_launch_timeout",
                )?,
            },
            connection: ConnectionConfig {
                url,
                username: self.marathon_username,
                password: self.marathon_password,
                verify_ssl: self.marathon_verify_ssl.unwrap_or(true),
                request_timeout: positive_secs(
                    self.marathon_request_timeout,
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                    "marathon_request_timeout",
                )?,
                proxy,
            },
            ssh: SshSettings {
                username: self
                    .ssh_username
                    .unwrap_or_else(|| DEFAULT_SSH_USERNAME.to_string()),
                private_key,
            },
            commands: HostCommands {
                converge: self.converge_commands,
                setup: self.setup_commands,
                verify: self.verify_commands,
            },
        })
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
