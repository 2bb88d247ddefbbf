//! Marathon app status model and SSH endpoint extraction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::DriverError;

/// Port-mapping label key that marks the SSH port.
pub const SERVICE_LABEL: &str = "SERVICE";
/// Label value identifying the SSH port mapping.
pub const SSH_SERVICE: &str = "ssh";

/// Subset of the Marathon `app` object the driver reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tasks_running: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub container: Option<Container>,
}

/// A task Marathon placed on an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    pub host: String,
    #[serde(default)]
    pub ports: Vec<u16>,
}

/// App container settings.
///
/// Marathon before 1.5 nests port mappings under `docker`; later versions
/// keep them on the container itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub docker: Option<DockerContainer>,
    #[serde(default)]
    pub port_mappings: Option<Vec<PortMapping>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerContainer {
    #[serde(default)]
    pub port_mappings: Option<Vec<PortMapping>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    #[serde(default)]
    pub container_port: Option<u32>,
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
}

impl PortMapping {
    fn is_ssh(&self) -> bool {
        self.labels
            .as_ref()
            .and_then(|l| l.get(SERVICE_LABEL))
            .is_some_and(|v| v == SSH_SERVICE)
    }
}

/// Host and port a test run connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshEndpoint {
    pub hostname: String,
    pub port: u16,
}

impl AppInfo {
    /// Port mappings, preferring the legacy `container.docker` location.
    #[must_use]
    pub fn port_mappings(&self) -> &[PortMapping] {
        let Some(container) = &self.container else {
            return &[];
        };
        container
            .docker
            .as_ref()
            .and_then(|d| d.port_mappings.as_deref())
            .filter(|m| !m.is_empty())
            .or(container.port_mappings.as_deref())
            .unwrap_or_default()
    }

    /// Index of the first port mapping labelled `SERVICE=ssh`.
    #[must_use]
    pub fn ssh_port_index(&self) -> Option<usize> {
        self.port_mappings().iter().position(PortMapping::is_ssh)
    }

    /// Whether at least one task is running and reported.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.tasks_running > 0 && !self.tasks.is_empty()
    }

    /// Resolve the SSH endpoint from the first task.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotRunning`] when no task is running,
    /// [`DriverError::SshPortMappingMissing`] when no mapping carries the SSH
    /// label, and [`DriverError::SshPortMissing`] when the task exposes fewer
    /// ports than the mapping index.
    pub fn ssh_endpoint(&self) -> Result<SshEndpoint, DriverError> {
        let task = match self.tasks.first() {
            Some(task) if self.is_running() => task,
            _ => return Err(DriverError::NotRunning(self.id.clone())),
        };
        let index = self
            .ssh_port_index()
            .ok_or_else(|| DriverError::SshPortMappingMissing(self.id.clone()))?;
        let port = task
            .ports
            .get(index)
            .copied()
            .ok_or_else(|| DriverError::SshPortMissing {
                app_id: self.id.clone(),
                host: task.host.clone(),
                index,
                available: task.ports.len(),
            })?;
        Ok(SshEndpoint {
            hostname: task.host.clone(),
            port,
        })
    }
}

/// Envelope returned by `GET /v2/apps/{id}`.
#[derive(Debug, Deserialize)]
pub struct AppEnvelope {
    pub app: AppInfo,
}
