//! `show` command: print the recorded state for the instance.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::domain::LifecycleState;

/// Print the instance's state file, as JSON with `--json`.
///
/// # Errors
///
/// Returns an error if the state file exists but cannot be parsed.
pub fn run(ctx: &AppContext, json: bool) -> Result<()> {
    let state = ctx.state_mgr.load()?;

    if json {
        let out = serde_json::to_string_pretty(&state).context("JSON serialization")?;
        println!("{out}");
        return Ok(());
    }

    ctx.output.header(&ctx.config.instance_name);
    for (key, value) in rows(&state) {
        ctx.output.kv(key, &value);
    }
    ctx.output
        .kv("state file", &ctx.state_mgr.path().display().to_string());
    Ok(())
}

/// Human-readable key/value rows; absent fields print as `<none>`.
#[must_use]
pub fn rows(state: &LifecycleState) -> Vec<(&'static str, String)> {
    fn or_none(value: Option<String>) -> String {
        value.unwrap_or_else(|| "<none>".to_string())
    }

    vec![
        ("app id", or_none(state.app_id.clone())),
        ("hostname", or_none(state.hostname.clone())),
        ("port", or_none(state.port.map(|p| p.to_string()))),
        ("username", or_none(state.username.clone())),
        (
            "ssh key",
            or_none(state.ssh_key.as_ref().map(|k| k.display().to_string())),
        ),
        ("created", or_none(state.created_at.map(|t| t.to_rfc3339()))),
    ]
}
