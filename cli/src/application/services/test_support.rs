//! Shared fakes for application service tests.
//!
//! Every fake records what it was asked to do so tests can assert on the
//! exact sequence of Marathon calls, sleeps, and progress messages.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use crate::application::ports::{HostLifecycle, MarathonApi, ProgressReporter, Sleeper};
use crate::domain::{AppDescriptor, AppInfo, MarathonError, SshTarget};

// ── Sleeper ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSleeper {
    delays: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
    }
}

// ── Reporter ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    fn of(&self, kind: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.of("warn")
    }

    pub fn infos(&self) -> Vec<String> {
        self.of("info")
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.borrow_mut().push(("step", message.to_string()));
    }
    fn success(&self, message: &str) {
        self.events.borrow_mut().push(("success", message.to_string()));
    }
    fn warn(&self, message: &str) {
        self.events.borrow_mut().push(("warn", message.to_string()));
    }
    fn info(&self, message: &str) {
        self.events.borrow_mut().push(("info", message.to_string()));
    }
}

// ── Marathon ──────────────────────────────────────────────────────────────────

/// Scripted Marathon: each call pops the next queued result.
#[derive(Default)]
pub struct FakeMarathon {
    pub create_results: RefCell<VecDeque<Result<Option<String>, MarathonError>>>,
    pub get_results: RefCell<VecDeque<Result<AppInfo, MarathonError>>>,
    pub delete_results: RefCell<VecDeque<Result<(), MarathonError>>>,
    pub created: RefCell<Vec<AppDescriptor>>,
    pub fetched: RefCell<Vec<String>>,
    pub deleted: RefCell<Vec<String>>,
}

impl FakeMarathon {
    pub fn push_create(&self, result: Result<Option<String>, MarathonError>) -> &Self {
        self.create_results.borrow_mut().push_back(result);
        self
    }

    pub fn push_get(&self, result: Result<AppInfo, MarathonError>) -> &Self {
        self.get_results.borrow_mut().push_back(result);
        self
    }

    pub fn push_delete(&self, result: Result<(), MarathonError>) -> &Self {
        self.delete_results.borrow_mut().push_back(result);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.created.borrow().len() + self.fetched.borrow().len() + self.deleted.borrow().len()
    }
}

impl MarathonApi for FakeMarathon {
    async fn create_app(&self, descriptor: &AppDescriptor) -> Result<Option<String>, MarathonError> {
        self.created.borrow_mut().push(descriptor.clone());
        self.create_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn get_app(&self, app_id: &str) -> Result<AppInfo, MarathonError> {
        self.fetched.borrow_mut().push(app_id.to_string());
        self.get_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(MarathonError::Transport("no scripted response".into())))
    }

    async fn delete_app(&self, app_id: &str) -> Result<(), MarathonError> {
        self.deleted.borrow_mut().push(app_id.to_string());
        self.delete_results.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

/// App status with `tasks_running` tasks and an SSH mapping at index 1.
pub fn app_status(id: &str, tasks_running: u32) -> AppInfo {
    let tasks = if tasks_running == 0 {
        json!([])
    } else {
        json!([{"host": "agent-7.mesos", "ports": [31080, 31022]}])
    };
    serde_json::from_value(json!({
        "id": id,
        "tasksRunning": tasks_running,
        "tasks": tasks,
        "container": {"docker": {"portMappings": [
            {"containerPort": 80, "labels": {"SERVICE": "http"}},
            {"containerPort": 22, "labels": {"SERVICE": "ssh"}}
        ]}}
    }))
    .unwrap_or_default()
}

// ── Host ──────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingHost {
    pub calls: RefCell<Vec<(&'static str, SshTarget)>>,
    pub fail: Cell<bool>,
}

impl RecordingHost {
    fn record(&self, phase: &'static str, target: &SshTarget) -> Result<()> {
        self.calls.borrow_mut().push((phase, target.clone()));
        if self.fail.get() {
            anyhow::bail!("{phase} failed");
        }
        Ok(())
    }
}

impl HostLifecycle for RecordingHost {
    async fn converge(&self, target: &SshTarget) -> Result<()> {
        self.record("converge", target)
    }
    async fn setup(&self, target: &SshTarget) -> Result<()> {
        self.record("setup", target)
    }
    async fn verify(&self, target: &SshTarget) -> Result<()> {
        self.record("verify", target)
    }
    async fn login(&self, target: &SshTarget) -> Result<()> {
        self.record("login", target)
    }
}

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}
