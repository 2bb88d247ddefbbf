//! Single lifecycle actions: create, converge, setup, verify, destroy, login.
//!
//! State is persisted after every action, including failed ones, so a
//! half-created app is never forgotten.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::InstanceDriver;
use crate::application::ports::{HostLifecycle, MarathonApi, ProgressReporter, Sleeper};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::marathon::MarathonClient;
use crate::infra::sleeper::TokioSleeper;
use crate::infra::ssh::SshHost;
use crate::infra::state::StateManager;
use crate::output::TerminalReporter;

/// One kitchen lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Converge,
    Setup,
    Verify,
    Destroy,
    Login,
}

impl Action {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Converge => "converge",
            Self::Setup => "setup",
            Self::Verify => "verify",
            Self::Destroy => "destroy",
            Self::Login => "login",
        }
    }
}

/// Driver, host and state file for one instance.
pub struct Session<'a, M, S, H> {
    pub driver: InstanceDriver<M, S>,
    pub host: H,
    pub state_mgr: &'a StateManager,
}

impl<M: MarathonApi, S: Sleeper, H: HostLifecycle> Session<'_, M, S, H> {
    /// Load state, run `action`, then save state whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns the action's error first; a save failure is returned only
    /// when the action itself succeeded.
    pub async fn run(&self, action: Action, reporter: &impl ProgressReporter) -> Result<()> {
        let mut state = self.state_mgr.load()?;
        let result = match action {
            Action::Create => self.driver.create(&mut state, reporter).await,
            Action::Converge => self.driver.converge(&mut state, &self.host, reporter).await,
            Action::Setup => self.driver.setup(&mut state, &self.host, reporter).await,
            Action::Verify => self.driver.verify(&mut state, &self.host, reporter).await,
            Action::Destroy => self.driver.destroy(&mut state, reporter).await,
            Action::Login => self.driver.login(&mut state, &self.host, reporter).await,
        };
        let saved = self.state_mgr.save(&state);
        result?;
        saved
    }
}

/// Build a production session from the application context.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn session(
    ctx: &AppContext,
) -> Result<Session<'_, MarathonClient, TokioSleeper, SshHost<TokioCommandRunner>>> {
    let api = MarathonClient::new(&ctx.config.connection)?;
    Ok(Session {
        driver: InstanceDriver::new(&ctx.config, api, TokioSleeper),
        host: SshHost::new(TokioCommandRunner, ctx.config.commands.clone()),
        state_mgr: &ctx.state_mgr,
    })
}

/// Run a single lifecycle action.
///
/// # Errors
///
/// Returns an error if the action fails or state cannot be persisted.
pub async fn run(ctx: &AppContext, action: Action) -> Result<()> {
    let session = session(ctx)?;
    let reporter = TerminalReporter::new(&ctx.output, &ctx.config.instance_name);
    ctx.output
        .header(&format!("{} {}", action.name(), ctx.config.instance_name));
    session.run(action, &reporter).await?;
    ctx.output.success(&format!("{} finished", action.name()));
    Ok(())
}
