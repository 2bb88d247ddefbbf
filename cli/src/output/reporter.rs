//! Terminal implementation of `ProgressReporter`.

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Prints driver progress, tagging each line with the instance name.
///
/// Inherits `quiet` from the wrapped context.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    instance: &'a str,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext, instance: &'a str) -> Self {
        Self { ctx, instance }
    }

    fn tagged(&self, message: &str) -> String {
        format!("[{}] {message}", self.instance)
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.ctx.step(&self.tagged(message));
    }

    fn success(&self, message: &str) {
        self.ctx.success(&self.tagged(message));
    }

    fn warn(&self, message: &str) {
        self.ctx.warn(&self.tagged(message));
    }

    fn info(&self, message: &str) {
        self.ctx.info(&self.tagged(message));
    }
}
