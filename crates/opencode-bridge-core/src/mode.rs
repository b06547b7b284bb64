//! Runtime mode resolution and the runtime header section.
//!
//! The mode is declared in a local `KEY=VALUE` file (`.env` by default) as
//! `MAESTRO_MODE=<value>`. Resolution never fails: a missing file, an
//! unreadable file, or a missing declaration all fall back to the default.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::bundle::ContextSection;

/// Label of the runtime header section.
pub const RUNTIME_SECTION_LABEL: &str = "SYSTEM RUNTIME STATE";

/// Timestamp written when none was supplied.
pub const UNKNOWN_TIMESTAMP: &str = "UNKNOWN";

/// Operator-set tag naming the downstream assistant identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimeMode(String);

impl RuntimeMode {
    pub const AUTO: &'static str = "AUTO";

    /// Wrap an already-parsed mode value.
    pub fn new(mode: impl Into<String>) -> Self {
        Self(mode.into())
    }

    /// The fallback mode, leaving identity selection to the consumer.
    pub fn auto() -> Self {
        Self::new(Self::AUTO)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RuntimeMode {
    fn default() -> Self {
        Self::auto()
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Find the value of the last `KEY=VALUE` line in `content`.
///
/// Only lines that start with `KEY=` count. The value is everything after
/// the first `=`, trimmed; empty values are ignored.
pub fn parse_mode_declaration(content: &str, key: &str) -> Option<String> {
    let mut found = None;
    for line in content.lines() {
        let Some(rest) = line.strip_prefix(key) else {
            continue;
        };
        let Some(value) = rest.strip_prefix('=') else {
            continue;
        };
        // Only the first `=` separates key from value, so tagged values such
        // as `tag=v2` survive intact instead of being cut at the second `=`.
        let value = value.trim();
        if !value.is_empty() {
            found = Some(value.to_string());
        }
    }
    found
}

/// Resolve the runtime mode from `env_file`, falling back to `default`.
pub async fn resolve_mode(env_file: &Path, key: &str, default: &str) -> RuntimeMode {
    let bytes = match tokio::fs::read(env_file).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %env_file.display(), mode = default, "no mode file, using default");
            return RuntimeMode::new(default);
        }
        Err(e) => {
            warn!(
                path = %env_file.display(),
                error = %e,
                mode = default,
                "failed to read mode file, using default"
            );
            return RuntimeMode::new(default);
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    match parse_mode_declaration(&content, key) {
        Some(value) => RuntimeMode::new(value),
        None => {
            debug!(path = %env_file.display(), key, mode = default, "no mode declaration, using default");
            RuntimeMode::new(default)
        }
    }
}

/// The resolved mode plus the externally supplied timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeState {
    pub key: String,
    pub mode: RuntimeMode,
    pub timestamp: String,
}

impl RuntimeState {
    /// An absent or blank timestamp becomes [`UNKNOWN_TIMESTAMP`].
    pub fn new(key: &str, mode: RuntimeMode, timestamp: Option<&str>) -> Self {
        let timestamp = timestamp
            .map(str::trim)
            .filter(|ts| !ts.is_empty())
            .unwrap_or(UNKNOWN_TIMESTAMP)
            .to_string();
        Self {
            key: key.to_string(),
            mode,
            timestamp,
        }
    }

    /// The header section. Never empty.
    pub fn section(&self) -> ContextSection {
        ContextSection::new(
            RUNTIME_SECTION_LABEL,
            format!(
                "{}={}\nTIMESTAMP={}\n",
                self.key, self.mode, self.timestamp
            ),
        )
    }
}

/// Resolve the mode and build the runtime state in one step.
pub async fn resolve_runtime_state(
    env_file: &Path,
    key: &str,
    default: &str,
    timestamp: Option<&str>,
) -> RuntimeState {
    let mode = resolve_mode(env_file, key, default).await;
    info!(key, mode = %mode, "injecting runtime mode into context");
    RuntimeState::new(key, mode, timestamp)
}
