//! Per-instance lifecycle state threaded through every driver call.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::app::SshEndpoint;
use crate::domain::error::DriverError;

/// State persisted to `.kitchen/<instance>.json`.
///
/// Keys this driver does not know about are kept in `extra` so a
/// load/save cycle never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleState {
    /// Marathon app id, set by `create` and cleared by `destroy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Agent host running the first task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Host port mapped to the container's SSH port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// SSH login user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// SSH private key path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<PathBuf>,
    /// When the app was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Everything needed to open an SSH session to the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub private_key: PathBuf,
}

impl LifecycleState {
    /// Record a freshly resolved endpoint.
    pub fn set_endpoint(&mut self, endpoint: SshEndpoint) {
        self.hostname = Some(endpoint.hostname);
        self.port = Some(endpoint.port);
    }

    /// Forget the remote app and its endpoint.
    pub fn clear_app(&mut self) {
        self.app_id = None;
        self.hostname = None;
        self.port = None;
        self.created_at = None;
    }

    /// Build the SSH target from recorded fields.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::MissingState`] naming the first absent field.
    pub fn ssh_target(&self) -> Result<SshTarget, DriverError> {
        Ok(SshTarget {
            hostname: self
                .hostname
                .clone()
                .ok_or(DriverError::MissingState("hostname"))?,
            port: self.port.ok_or(DriverError::MissingState("port"))?,
            username: self
                .username
                .clone()
                .ok_or(DriverError::MissingState("username"))?,
            private_key: self
                .ssh_key
                .clone()
                .ok_or(DriverError::MissingState("ssh_key"))?,
        })
    }
}
