//! Diagnostics setup.
//!
//! The minimum severity is resolved once at startup into [`LogSettings`] and
//! installed as the process subscriber. Records are single lines: severity
//! tag, message, then structured fields. No timestamps, no ANSI colours,
//! written to stderr so stdout stays free for reports and `--print`.

use opencode_bridge_config::{LogLevel, LoggingConfig};
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Environment variable overriding `[logging] level`.
pub const LOG_LEVEL_ENV: &str = "OPENCODE_LOG_LEVEL";

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    /// An environment value that could not be parsed, reported after install.
    pub rejected_env: Option<String>,
}

impl LogSettings {
    /// Precedence: `-v` count, then the environment value, then the config
    /// file.
    pub fn resolve(config: &LoggingConfig, env_value: Option<&str>, verbosity: u8) -> Self {
        let mut rejected_env = None;
        let env_level = env_value.and_then(|raw| match raw.parse::<LogLevel>() {
            Ok(level) => Some(level),
            Err(_) => {
                rejected_env = Some(raw.to_string());
                None
            }
        });

        let level = LogLevel::from_verbosity(verbosity)
            .or(env_level)
            .unwrap_or(config.level);

        Self {
            level,
            rejected_env,
        }
    }
}

/// Build the line-oriented subscriber writing to `writer`.
pub fn build_subscriber<W>(level: LogLevel, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.as_filter()))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish()
}

/// Install the process-wide subscriber on stderr.
pub fn install(settings: &LogSettings) -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(build_subscriber(settings.level, std::io::stderr))?;
    if let Some(raw) = &settings.rejected_env {
        tracing::warn!(
            var = LOG_LEVEL_ENV,
            value = %raw,
            level = %settings.level,
            "ignoring unrecognised log level"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn config(level: LogLevel) -> LoggingConfig {
        LoggingConfig { level }
    }

    #[test]
    fn test_resolve_defaults_to_config() {
        let settings = LogSettings::resolve(&config(LogLevel::Warn), None, 0);
        assert_eq!(settings.level, LogLevel::Warn);
        assert_eq!(settings.rejected_env, None);
    }

    #[test]
    fn test_resolve_env_overrides_config() {
        let settings = LogSettings::resolve(&config(LogLevel::Info), Some("WARNING"), 0);
        assert_eq!(settings.level, LogLevel::Warn);
    }

    #[test]
    fn test_resolve_verbosity_overrides_env() {
        let settings = LogSettings::resolve(&config(LogLevel::Info), Some("ERROR"), 2);
        assert_eq!(settings.level, LogLevel::Trace);
    }

    #[test]
    fn test_resolve_rejects_bad_env_value() {
        let settings = LogSettings::resolve(&config(LogLevel::Info), Some("chatty"), 0);
        assert_eq!(settings.level, LogLevel::Info);
        assert_eq!(settings.rejected_env.as_deref(), Some("chatty"));
    }

    #[test]
    fn test_records_are_single_tagged_lines() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = build_subscriber(LogLevel::Info, move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden below threshold");
            tracing::info!("capturing project structure");
            tracing::warn!(file = "README.md", "key file does not exist");
        });

        let output = buffer.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("capturing project structure"));
        assert!(lines[1].contains("WARN"));
        assert!(lines[1].contains("file=\"README.md\""));
        assert!(!output.contains("hidden"));
    }
}
