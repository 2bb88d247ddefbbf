//! Marathon-backed instance lifecycle: create, converge, setup, verify,
//! login, destroy.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::application::ports::{HostLifecycle, MarathonApi, ProgressReporter, Sleeper};
use crate::application::services::retry::with_backoff;
use crate::domain::config::{AppSettings, SshSettings};
use crate::domain::{
    AppDescriptor, DriverError, LifecycleState, MarathonError, ResolvedConfig, RetryPolicy,
    generate_app_id,
};

/// Lifecycle phases delegated to the host once the endpoint is fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Converge,
    Setup,
    Verify,
    Login,
}

impl Phase {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Converge => "converge",
            Self::Setup => "setup",
            Self::Verify => "verify",
            Self::Login => "login",
        }
    }
}

/// Adapter between the kitchen lifecycle and one Marathon endpoint.
///
/// Holds the immutable settings resolved at construction; the lifecycle
/// state is passed into every call.
pub struct InstanceDriver<M, S> {
    api: M,
    sleeper: S,
    instance_name: String,
    app: AppSettings,
    ssh: SshSettings,
}

impl<M: MarathonApi, S: Sleeper> InstanceDriver<M, S> {
    #[must_use]
    pub fn new(config: &ResolvedConfig, api: M, sleeper: S) -> Self {
        Self {
            api,
            sleeper,
            instance_name: config.instance_name.clone(),
            app: config.app.clone(),
            ssh: config.ssh.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn api(&self) -> &M {
        &self.api
    }

    /// Submit a new app and wait for its SSH endpoint.
    ///
    /// Does nothing when `state.app_id` is already set. If submission
    /// succeeds but the app never becomes ready, `app_id` stays recorded so
    /// a later `destroy` can remove it.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be read, submission fails
    /// with a non-transient error or exhausts its retries, or readiness
    /// resolution fails.
    pub async fn create(
        &self,
        state: &mut LifecycleState,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        if state.app_id.is_some() {
            return Ok(());
        }

        self.apply_ssh_settings(state);

        let descriptor = self.generate_descriptor()?;
        let app_id = self.submit(&descriptor, reporter).await?;
        state.app_id = Some(app_id.clone());
        state.created_at = Some(Utc::now());

        if let Err(e) = self.refresh_endpoint(state, reporter).await {
            reporter.warn(&format!(
                "app {app_id} was created but is not ready. Run 'kitchen-marathon destroy' to remove it."
            ));
            return Err(e);
        }
        Ok(())
    }

    /// Converge the instance over a freshly resolved endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if readiness resolution or the host phase fails.
    pub async fn converge(
        &self,
        state: &mut LifecycleState,
        host: &impl HostLifecycle,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        self.run_phase(Phase::Converge, state, host, reporter).await
    }

    /// # Errors
    ///
    /// Returns an error if readiness resolution or the host phase fails.
    pub async fn setup(
        &self,
        state: &mut LifecycleState,
        host: &impl HostLifecycle,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        self.run_phase(Phase::Setup, state, host, reporter).await
    }

    /// # Errors
    ///
    /// Returns an error if readiness resolution or the host phase fails.
    pub async fn verify(
        &self,
        state: &mut LifecycleState,
        host: &impl HostLifecycle,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        self.run_phase(Phase::Verify, state, host, reporter).await
    }

    /// # Errors
    ///
    /// Returns an error if readiness resolution or the SSH session fails.
    pub async fn login(
        &self,
        state: &mut LifecycleState,
        host: &impl HostLifecycle,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        self.run_phase(Phase::Login, state, host, reporter).await
    }

    /// Refresh host/port, then hand the SSH target to the host phase.
    ///
    /// The task may have been rescheduled since the previous call, so the
    /// endpoint is always re-read.
    ///
    /// # Errors
    ///
    /// Returns an error if no app is recorded, readiness resolution fails,
    /// or the host phase fails.
    pub async fn run_phase(
        &self,
        phase: Phase,
        state: &mut LifecycleState,
        host: &impl HostLifecycle,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        self.refresh_endpoint(state, reporter).await?;
        if state.username.is_none() || state.ssh_key.is_none() {
            self.apply_ssh_settings(state);
        }
        let target = state.ssh_target()?;
        let result = match phase {
            Phase::Converge => host.converge(&target).await,
            Phase::Setup => host.setup(&target).await,
            Phase::Verify => host.verify(&target).await,
            Phase::Login => host.login(&target).await,
        };
        result.with_context(|| {
            format!("{} failed on {}:{}", phase.name(), target.hostname, target.port)
        })
    }

    /// Delete the app, treating "not found" as already done.
    ///
    /// # Errors
    ///
    /// Returns an error for any Marathon failure other than not found; the
    /// app id is kept in that case.
    pub async fn destroy(
        &self,
        state: &mut LifecycleState,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        let Some(app_id) = state.app_id.clone() else {
            return Ok(());
        };

        reporter.step(&format!("deleting app {app_id}..."));
        match self.api.delete_app(&app_id).await {
            Ok(()) => reporter.success(&format!("app {app_id} deleted")),
            Err(MarathonError::NotFound(_)) => {
                reporter.info(&format!("app {app_id} not found, nothing to delete"));
            }
            Err(e) => return Err(anyhow::Error::new(e).context(format!("deleting app {app_id}"))),
        }

        state.clear_app();
        Ok(())
    }

    /// Poll Marathon until the app has a running task, then record its
    /// SSH host and port.
    ///
    /// # Errors
    ///
    /// Returns an error if no app is recorded, the app keeps reporting no
    /// running tasks after every attempt, Marathon fails with a
    /// non-transient error, or no SSH port mapping can be found.
    pub async fn refresh_endpoint(
        &self,
        state: &mut LifecycleState,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        let app_id = state
            .app_id
            .clone()
            .ok_or(DriverError::MissingState("app_id"))?;

        reporter.step(&format!("refreshing host and port for {app_id}..."));
        let api = &self.api;
        let id = app_id.as_str();
        let endpoint = with_backoff(
            RetryPolicy::readiness(self.app.launch_timeout),
            &self.sleeper,
            reporter,
            || async move {
                let info = api.get_app(id).await?;
                info.ssh_endpoint()
            },
        )
        .await
        .with_context(|| format!("waiting for app {app_id} to run"))?;

        reporter.success(&format!(
            "{app_id} running on {}:{}",
            endpoint.hostname, endpoint.port
        ));
        state.set_endpoint(endpoint);
        Ok(())
    }

    /// Build the descriptor for a new app from template, overrides, and a
    /// freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the template exists but is not a JSON object, or
    /// the generated id is not a valid Marathon path.
    pub fn generate_descriptor(&self) -> Result<AppDescriptor> {
        let app_id = generate_app_id(&self.app.prefix, &self.instance_name)?;
        let template = load_template(self.app.template.as_deref())?;
        Ok(AppDescriptor::build(template, &self.app.overrides, &app_id))
    }

    async fn submit(
        &self,
        descriptor: &AppDescriptor,
        reporter: &impl ProgressReporter,
    ) -> Result<String> {
        let api = &self.api;
        let created = with_backoff(RetryPolicy::submission(), &self.sleeper, reporter, || async move {
            reporter.step(&format!("creating app {}...", descriptor.id()));
            api.create_app(descriptor).await
        })
        .await
        .with_context(|| format!("creating app {}", descriptor.id()))?;

        let app_id = created.unwrap_or_else(|| descriptor.id().to_string());
        reporter.success(&format!("app {app_id} submitted"));
        Ok(app_id)
    }

    fn apply_ssh_settings(&self, state: &mut LifecycleState) {
        state.username = Some(self.ssh.username.clone());
        state.ssh_key = Some(self.ssh.private_key.clone());
    }
}

/// Read the JSON template when `path` names a regular file.
fn load_template(path: Option<&Path>) -> Result<Option<Map<String, Value>>> {
    let Some(path) = path.filter(|p| p.is_file()) else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading app template {}", path.display()))?;
    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("parsing app template {}", path.display()))?
    {
        Value::Object(map) => Ok(Some(map)),
        _ => anyhow::bail!("app template {} must contain a JSON object", path.display()),
    }
}
