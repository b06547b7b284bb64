//! Context assembler: runs every capture step in a fixed order and collects
//! the non-empty results into a [`ContextBundle`].
//!
//! ## Capture order
//!
//! ```text
//! 1. SYSTEM RUNTIME STATE      always present
//! 2. FILE: <key file>          one per existing, non-empty key file
//! 3. PROJECT STRUCTURE         directory listing command
//! 4. GIT STATUS                status command
//! 5. RECENT CHANGES (DIFF)     diff command
//! ```
//!
//! Steps run one after another on the calling task. No step is retried and
//! no step can abort the run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use opencode_bridge_config::{BridgeConfig, CommandConfig};
use tracing::{info, warn};

use crate::bundle::{
    ContextBundle, ContextSection, DIFF_LABEL, STATUS_LABEL, STRUCTURE_LABEL, file_label,
};
use crate::capture::{CommandRunner, ProcessRunner, read_text_file};
use crate::mode::{RuntimeState, resolve_runtime_state};

/// Builds one bundle per call to [`assemble`](Self::assemble).
pub struct ContextAssembler {
    config: BridgeConfig,
    root: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl ContextAssembler {
    /// Assembler for the project at `root`, spawning real processes there.
    pub fn new(config: BridgeConfig, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let runner = Arc::new(ProcessRunner::new(root.clone()));
        Self {
            config,
            root,
            runner,
        }
    }

    /// Replace the command runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// The configuration this assembler captures with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.capture.timeout_secs)
    }

    /// Resolve the runtime mode against the project root.
    pub async fn runtime_state(&self, timestamp: Option<&str>) -> RuntimeState {
        let mode = &self.config.mode;
        resolve_runtime_state(
            &self.root.join(&mode.env_file),
            &mode.key,
            &mode.default,
            timestamp,
        )
        .await
    }

    /// Run all capture steps and return the bundle.
    pub async fn assemble(&self, timestamp: Option<&str>) -> ContextBundle {
        let mut bundle = ContextBundle::new();

        bundle.push_always(self.runtime_state(timestamp).await.section());

        for file in &self.config.capture.key_files {
            if let Some(section) = self.capture_key_file(file).await {
                bundle.push(section);
            }
        }

        let capture = &self.config.capture;

        info!("capturing project structure");
        match self.run(&capture.structure_command).await {
            Some(text) => {
                bundle.push(ContextSection::new(STRUCTURE_LABEL, text));
            }
            None => warn!(command = %capture.structure_command, "could not capture project structure"),
        }

        info!("capturing version-control status");
        match self.run(&capture.status_command).await {
            Some(text) => {
                bundle.push(ContextSection::new(STATUS_LABEL, text));
            }
            None => warn!(command = %capture.status_command, "could not capture version-control status"),
        }

        match self.run(&capture.diff_command).await {
            Some(text) => {
                bundle.push(ContextSection::new(DIFF_LABEL, text));
            }
            // An empty diff is the normal clean-tree outcome.
            None => info!("no pending changes to include"),
        }

        info!(sections = bundle.len(), "context assembled");
        bundle
    }

    async fn capture_key_file(&self, file: &str) -> Option<ContextSection> {
        let path = self.root.join(file);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!(file, "key file does not exist");
            return None;
        }

        info!(file, "reading key file");
        match read_text_file(&path).await.non_empty() {
            Some(content) => Some(ContextSection::new(file_label(file), content)),
            None => {
                warn!(file, "key file is empty or unreadable");
                None
            }
        }
    }

    async fn run(&self, command: &CommandConfig) -> Option<String> {
        self.runner.run(command, self.timeout()).await.non_empty()
    }
}
