//! Capture primitives: a guarded file reader and a guarded command runner.
//!
//! Neither primitive returns an error. Every failure is logged where it
//! happens and handed back as [`Capture::Failed`] with a tagged reason, so
//! the assembler only ever has to decide between "text" and "omit".

pub mod command;
pub mod file;

use std::time::Duration;

pub use command::{CommandRunner, ProcessRunner};
pub use file::read_text_file;

/// Outcome of one capture step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Captured text. May be empty.
    Text(String),
    /// The capture failed; the failure has already been logged.
    Failed(CaptureFailure),
}

impl Capture {
    /// The captured text, or an empty string for a failed capture.
    pub fn into_text(self) -> String {
        match self {
            Capture::Text(text) => text,
            Capture::Failed(_) => String::new(),
        }
    }

    /// `Some(text)` only for a successful, non-empty capture.
    pub fn non_empty(self) -> Option<String> {
        match self {
            Capture::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Capture::Failed(_))
    }

    pub fn failure(&self) -> Option<&CaptureFailure> {
        match self {
            Capture::Failed(failure) => Some(failure),
            Capture::Text(_) => None,
        }
    }
}

/// Why a capture produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureFailure {
    #[error("not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("exited with {}", exit_label(.code))]
    NonZeroExit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("failed to launch: {0}")]
    Launch(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_text_on_failure_is_empty() {
        assert_eq!(Capture::Failed(CaptureFailure::NotFound).into_text(), "");
        assert_eq!(Capture::Text("abc".into()).into_text(), "abc");
    }

    #[test]
    fn test_non_empty_filters_empty_and_failed() {
        assert_eq!(Capture::Text(String::new()).non_empty(), None);
        assert_eq!(
            Capture::Failed(CaptureFailure::PermissionDenied).non_empty(),
            None
        );
        assert_eq!(
            Capture::Text(" \n".into()).non_empty(),
            Some(" \n".to_string())
        );
    }

    #[test]
    fn test_failure_display() {
        let failure = CaptureFailure::NonZeroExit {
            code: Some(128),
            stdout: String::new(),
            stderr: "fatal: not a git repository".into(),
        };
        assert_eq!(failure.to_string(), "exited with status 128");

        let killed = CaptureFailure::NonZeroExit {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("signal"));

        let timeout = CaptureFailure::TimedOut(Duration::from_secs(10));
        assert_eq!(timeout.to_string(), "timed out after 10s");
    }
}
