//! Identity self-check: what would a downstream consumer inherit?
//!
//! Inspects context text the same way the consumer does, by looking for the
//! first `KEY=` line, and classifies the mode it finds.

use std::fmt;

/// Identity implied by an inherited mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStatus {
    /// `KIMI_ONLY`
    Kimi,
    /// `GPT_ONLY`
    Gpt,
    /// Any other mode: automatic selection, GPT by default.
    Auto(String),
    /// No mode line in the context.
    Missing,
}

impl IdentityStatus {
    pub fn from_mode(mode: &str) -> Self {
        match mode {
            "KIMI_ONLY" => IdentityStatus::Kimi,
            "GPT_ONLY" => IdentityStatus::Gpt,
            other => IdentityStatus::Auto(other.to_string()),
        }
    }

    pub fn expected_identity(&self) -> Option<&'static str> {
        match self {
            IdentityStatus::Kimi => Some("[SYSTEM: GENERATED BY KIMI AI ...]"),
            IdentityStatus::Gpt => Some("[SYSTEM: GENERATED BY GPT CODEX ...]"),
            IdentityStatus::Auto(_) => Some("[MODEL: GPT-5.2 CODEX] (auto mode)"),
            IdentityStatus::Missing => None,
        }
    }

    /// Whether inheritance worked at all.
    pub fn inherited(&self) -> bool {
        !matches!(self, IdentityStatus::Missing)
    }

    fn verdict(&self) -> &'static str {
        match self {
            IdentityStatus::Kimi => "OK (Kimi active)",
            IdentityStatus::Gpt => "OK (GPT active)",
            IdentityStatus::Auto(_) => "AUTO MODE (GPT by default)",
            IdentityStatus::Missing => "CRITICAL FAILURE (no inheritance)",
        }
    }
}

/// Result of inspecting context text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityReport {
    /// The mode line as received, if any.
    pub received: Option<String>,
    pub status: IdentityStatus,
}

/// Inspect `context` for a `key=` line.
pub fn inspect(context: &str, key: &str) -> IdentityReport {
    let needle = format!("{key}=");
    let received = context
        .lines()
        .find(|line| line.contains(&needle))
        .map(str::to_string);

    let status = match &received {
        Some(line) => {
            let mode = line
                .split_once(&needle)
                .map(|(_, value)| value.trim())
                .unwrap_or_default();
            IdentityStatus::from_mode(mode)
        }
        None => IdentityStatus::Missing,
    };

    IdentityReport { received, status }
}

impl fmt::Display for IdentityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- IDENTITY INHERITANCE CHECK ---")?;
        match &self.received {
            Some(line) => writeln!(f, "1. Context received: {line}")?,
            None => writeln!(f, "1. Context received: NONE")?,
        }
        if let Some(identity) = self.status.expected_identity() {
            writeln!(f, "2. Expected identity: {identity}")?;
        }
        writeln!(f, "3. Status: {}", self.status.verdict())?;
        write!(f, "----------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const HEADER: &str = "--- SYSTEM RUNTIME STATE ---\nMAESTRO_MODE=KIMI_ONLY\nTIMESTAMP=UNKNOWN\n";

    #[test]
    fn test_kimi_mode_inherited() {
        let report = inspect(HEADER, "MAESTRO_MODE");
        assert_eq!(report.received.as_deref(), Some("MAESTRO_MODE=KIMI_ONLY"));
        assert_eq!(report.status, IdentityStatus::Kimi);
        assert!(report.status.inherited());
    }

    #[test]
    fn test_gpt_mode_inherited() {
        let report = inspect("MAESTRO_MODE=GPT_ONLY\n", "MAESTRO_MODE");
        assert_eq!(report.status, IdentityStatus::Gpt);
    }

    #[test]
    fn test_other_modes_are_auto() {
        let report = inspect("MAESTRO_MODE=AUTO\n", "MAESTRO_MODE");
        assert_eq!(report.status, IdentityStatus::Auto("AUTO".to_string()));

        let report = inspect("MAESTRO_MODE=NIGHTLY\n", "MAESTRO_MODE");
        assert_eq!(report.status, IdentityStatus::Auto("NIGHTLY".to_string()));
    }

    #[test]
    fn test_missing_mode_line() {
        let report = inspect("--- FILE: README.md ---\nhello\n", "MAESTRO_MODE");
        assert_eq!(report.received, None);
        assert_eq!(report.status, IdentityStatus::Missing);
        assert!(!report.status.inherited());
    }

    #[test]
    fn test_report_rendering() {
        let rendered = inspect(HEADER, "MAESTRO_MODE").to_string();
        assert!(rendered.contains("Context received: MAESTRO_MODE=KIMI_ONLY"));
        assert!(rendered.contains("KIMI AI"));
        assert!(rendered.contains("OK (Kimi active)"));

        let missing = inspect("", "MAESTRO_MODE").to_string();
        assert!(missing.contains("Context received: NONE"));
        assert!(!missing.contains("Expected identity"));
        assert!(missing.contains("CRITICAL FAILURE"));
    }
}
