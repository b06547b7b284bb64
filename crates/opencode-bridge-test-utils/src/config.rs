//! Configuration builders for tests.

use opencode_bridge_config::{BridgeConfig, CommandConfig};

/// Fluent builder for [`BridgeConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .key_files(&["README.md"])
///     .timeout_secs(1)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: BridgeConfig,
}

impl TestConfigBuilder {
    /// Defaults with a fixed `ls -1` listing, so tests behave the same on
    /// every platform.
    pub fn new() -> Self {
        let mut config = BridgeConfig::default();
        config.capture.structure_command = CommandConfig::shell("ls -1");
        Self { config }
    }

    pub fn key_files(mut self, files: &[&str]) -> Self {
        self.config.capture.key_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.capture.timeout_secs = secs;
        self
    }

    pub fn structure_command(mut self, command: CommandConfig) -> Self {
        self.config.capture.structure_command = command;
        self
    }

    pub fn status_command(mut self, command: CommandConfig) -> Self {
        self.config.capture.status_command = command;
        self
    }

    pub fn diff_command(mut self, command: CommandConfig) -> Self {
        self.config.capture.diff_command = command;
        self
    }

    pub fn env_file(mut self, path: &str) -> Self {
        self.config.mode.env_file = path.to_string();
        self
    }

    pub fn mode_key(mut self, key: &str) -> Self {
        self.config.mode.key = key.to_string();
        self
    }

    pub fn build(self) -> BridgeConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
