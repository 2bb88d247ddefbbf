//! Infrastructure implementation of the `HostLifecycle` port over `ssh`.
//!
//! Test instances are ephemeral and get a new host key on every launch, so
//! host-key checking is disabled and nothing is written to `known_hosts`.

use std::process::ExitStatus;

use anyhow::Result;

use crate::application::ports::{CommandRunner, HostLifecycle};
use crate::domain::SshTarget;
use crate::domain::config::HostCommands;

/// Options passed to every `ssh` invocation.
const SSH_OPTIONS: &[&str] = &[
    "-o",
    "StrictHostKeyChecking=no",
    "-o",
    "UserKnownHostsFile=/dev/null",
    "-o",
    "LogLevel=ERROR",
    "-o",
    "IdentitiesOnly=yes",
];

/// Runs each phase's configured commands on the instance over SSH.
pub struct SshHost<R> {
    runner: R,
    commands: HostCommands,
}

impl<R: CommandRunner> SshHost<R> {
    #[must_use]
    pub fn new(runner: R, commands: HostCommands) -> Self {
        Self { runner, commands }
    }

    async fn run_all(&self, target: &SshTarget, commands: &[String]) -> Result<()> {
        for command in commands {
            let args = ssh_args(target, Some(command), true);
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let status = self.runner.run_status("ssh", &args).await?;
            if !status.success() {
                anyhow::bail!("'{command}' exited with {}", exit_code(status));
            }
        }
        Ok(())
    }
}

fn exit_code(status: ExitStatus) -> String {
    status
        .code()
        .map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Build `ssh` arguments for `target`.
///
/// `batch` disables password prompts; interactive logins leave it off and
/// request a TTY instead.
#[must_use]
pub fn ssh_args(target: &SshTarget, command: Option<&str>, batch: bool) -> Vec<String> {
    let mut args: Vec<String> = SSH_OPTIONS.iter().map(|s| (*s).to_string()).collect();
    if batch {
        args.extend(["-o".to_string(), "BatchMode=yes".to_string()]);
    } else {
        args.push("-t".to_string());
    }
    args.extend([
        "-i".to_string(),
        target.private_key.display().to_string(),
        "-p".to_string(),
        target.port.to_string(),
        format!("{}@{}", target.username, target.hostname),
    ]);
    if let Some(command) = command {
        args.push("--".to_string());
        args.push(command.to_string());
    }
    args
}

impl<R: CommandRunner> HostLifecycle for SshHost<R> {
    async fn converge(&self, target: &SshTarget) -> Result<()> {
        self.run_all(target, &self.commands.converge).await
    }

    async fn setup(&self, target: &SshTarget) -> Result<()> {
        self.run_all(target, &self.commands.setup).await
    }

    async fn verify(&self, target: &SshTarget) -> Result<()> {
        self.run_all(target, &self.commands.verify).await
    }

    async fn login(&self, target: &SshTarget) -> Result<()> {
        let args = ssh_args(target, None, false);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let status = self.runner.run_status("ssh", &args).await?;
        if !status.success() {
            anyhow::bail!("ssh session exited with {}", exit_code(status));
        }
        Ok(())
    }
}
