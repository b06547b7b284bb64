//! Scripted [`CommandRunner`] for assembler tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use opencode_bridge_config::CommandConfig;
use opencode_bridge_core::BoxFuture;
use opencode_bridge_core::capture::{Capture, CaptureFailure, CommandRunner};

/// Answers commands from a table keyed by their display form and records
/// every call. Unscripted commands fail with [`CaptureFailure::Launch`].
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, Capture>,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with `stdout` for `command`.
    pub fn respond(mut self, command: &str, stdout: &str) -> Self {
        self.responses
            .insert(command.to_string(), Capture::Text(stdout.to_string()));
        self
    }

    /// Fail `command` with `failure`.
    pub fn fail(mut self, command: &str, failure: CaptureFailure) -> Self {
        self.responses
            .insert(command.to_string(), Capture::Failed(failure));
        self
    }

    /// Commands run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock_calls().iter().map(|(cmd, _)| cmd.clone()).collect()
    }

    /// Timeouts passed with each call, in order.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.lock_calls().iter().map(|(_, t)| *t).collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(String, Duration)>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CommandRunner for ScriptedRunner {
    fn run<'a>(&'a self, command: &'a CommandConfig, timeout: Duration) -> BoxFuture<'a, Capture> {
        let key = command.to_string();
        self.lock_calls().push((key.clone(), timeout));
        let capture = self.responses.get(&key).cloned().unwrap_or_else(|| {
            Capture::Failed(CaptureFailure::Launch(format!("unscripted command: {key}")))
        });
        Box::pin(async move { capture })
    }
}
