#![deny(unsafe_code)]

//! Configuration loading and validation for opencode-bridge.
//!
//! Loads an optional TOML file and validates it. Every table and field has a
//! default, so an empty document (or no document at all) describes the stock
//! capture plan: four key files, a directory listing, `git status` and
//! `git diff`, written to `opencode_context.tmp`.

/// Minimum log severity.
pub mod level;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use level::{LogLevel, ParseLevelError};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level bridge configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// What to capture and how.
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Runtime mode lookup.
    #[serde(default)]
    pub mode: ModeConfig,

    /// Where the bundle is written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Logging configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum severity. Overridden by `OPENCODE_LOG_LEVEL` and `-v`.
    #[serde(default)]
    pub level: LogLevel,
}

/// A command to capture, either handed to the platform shell or spawned
/// directly from an argument list.
///
/// ```toml
/// status_command = "git status"
/// diff_command = ["git", "diff", "--stat"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    /// Interpreted by `sh -c` (or `cmd /C` on Windows).
    Shell(String),
    /// Program followed by its arguments; no shell involved.
    Argv(Vec<String>),
}

impl CommandConfig {
    pub fn shell(command: &str) -> Self {
        CommandConfig::Shell(command.to_string())
    }

    pub fn argv<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandConfig::Argv(args.into_iter().map(Into::into).collect())
    }

    fn is_blank(&self) -> bool {
        match self {
            CommandConfig::Shell(cmd) => cmd.trim().is_empty(),
            CommandConfig::Argv(args) => args.first().is_none_or(|prog| prog.trim().is_empty()),
        }
    }
}

impl fmt::Display for CommandConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandConfig::Shell(cmd) => f.write_str(cmd),
            CommandConfig::Argv(args) => f.write_str(&args.join(" ")),
        }
    }
}

/// Capture plan: key files and the three project commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Files read in order, relative to the project root.
    #[serde(default = "default_key_files")]
    pub key_files: Vec<String>,

    /// Hard per-command timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Directory listing.
    #[serde(default = "default_structure_command")]
    pub structure_command: CommandConfig,

    /// Version-control status.
    #[serde(default = "default_status_command")]
    pub status_command: CommandConfig,

    /// Pending changes.
    #[serde(default = "default_diff_command")]
    pub diff_command: CommandConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            key_files: default_key_files(),
            timeout_secs: default_timeout_secs(),
            structure_command: default_structure_command(),
            status_command: default_status_command(),
            diff_command: default_diff_command(),
        }
    }
}

fn default_key_files() -> Vec<String> {
    ["PROMPT_MAESTRO.md", ".gitignore", "README.md", ".env"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_structure_command() -> CommandConfig {
    if cfg!(windows) {
        CommandConfig::shell("dir /b")
    } else {
        CommandConfig::shell("ls -1")
    }
}

fn default_status_command() -> CommandConfig {
    CommandConfig::shell("git status")
}

fn default_diff_command() -> CommandConfig {
    CommandConfig::shell("git diff")
}

/// Where the runtime mode comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Local `KEY=VALUE` file scanned for the mode declaration.
    #[serde(default = "default_env_file")]
    pub env_file: String,

    /// Declaration key.
    #[serde(default = "default_mode_key")]
    pub key: String,

    /// Mode used when no declaration is found.
    #[serde(default = "default_mode")]
    pub default: String,

    /// Environment variable holding the timestamp for the runtime header.
    #[serde(default = "default_timestamp_var")]
    pub timestamp_var: String,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            env_file: default_env_file(),
            key: default_mode_key(),
            default: default_mode(),
            timestamp_var: default_timestamp_var(),
        }
    }
}

fn default_env_file() -> String {
    ".env".to_string()
}

fn default_mode_key() -> String {
    "MAESTRO_MODE".to_string()
}

fn default_mode() -> String {
    "AUTO".to_string()
}

fn default_timestamp_var() -> String {
    "TIME".to_string()
}

/// Output artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Artifact path, relative to the project root unless absolute.
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "opencode_context.tmp".to_string()
}

impl BridgeConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let capture = &self.capture;
        if capture.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "capture.timeout_secs must be non-zero".to_string(),
            ));
        }
        for (i, file) in capture.key_files.iter().enumerate() {
            if file.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "capture.key_files[{i}] must not be empty"
                )));
            }
        }
        let commands = [
            ("structure_command", &capture.structure_command),
            ("status_command", &capture.status_command),
            ("diff_command", &capture.diff_command),
        ];
        for (name, command) in commands {
            if command.is_blank() {
                return Err(ConfigError::Validation(format!(
                    "capture.{name} must name a program"
                )));
            }
        }

        if self.mode.key.is_empty() || self.mode.key.contains('=') {
            return Err(ConfigError::Validation(format!(
                "mode.key must be non-empty and must not contain '=', got {:?}",
                self.mode.key
            )));
        }
        if self.mode.default.trim().is_empty() {
            return Err(ConfigError::Validation(
                "mode.default must not be empty".to_string(),
            ));
        }
        if self.mode.env_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "mode.env_file must not be empty".to_string(),
            ));
        }

        if self.output.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
