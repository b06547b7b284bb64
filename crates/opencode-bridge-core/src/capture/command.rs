//! Guarded command runner.
//!
//! [`CommandRunner`] is the seam between the assembler and the host: the
//! assembler only sees [`Capture`] values, and tests swap in a scripted
//! runner instead of spawning `git`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use opencode_bridge_config::CommandConfig;
use tracing::{debug, error};

use super::{Capture, CaptureFailure};
use crate::BoxFuture;

/// Runs one command to completion and returns its standard output.
///
/// Implementations must never fail: a non-zero exit, an expired timeout, or
/// a launch failure is logged and reported as [`Capture::Failed`].
pub trait CommandRunner: Send + Sync {
    fn run<'a>(&'a self, command: &'a CommandConfig, timeout: Duration) -> BoxFuture<'a, Capture>;
}

/// Spawns real child processes in a fixed working directory.
///
/// Shell strings go through `sh -c` (`cmd /C` on Windows); argument lists are
/// spawned directly. The child is killed if the timeout expires.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    workdir: PathBuf,
}

impl ProcessRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

fn build_command(command: &CommandConfig) -> Option<tokio::process::Command> {
    match command {
        CommandConfig::Shell(line) => {
            let (shell, flag) = if cfg!(windows) {
                ("cmd", "/C")
            } else {
                ("sh", "-c")
            };
            let mut proc = tokio::process::Command::new(shell);
            proc.arg(flag).arg(line);
            Some(proc)
        }
        CommandConfig::Argv(args) => {
            let (program, rest) = args.split_first()?;
            let mut proc = tokio::process::Command::new(program);
            proc.args(rest);
            Some(proc)
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(&'a self, command: &'a CommandConfig, timeout: Duration) -> BoxFuture<'a, Capture> {
        Box::pin(async move {
            let Some(mut proc) = build_command(command) else {
                error!(command = %command, "cannot run an empty argument list");
                return Capture::Failed(CaptureFailure::Launch(
                    "empty argument list".to_string(),
                ));
            };

            proc.current_dir(&self.workdir)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            debug!(command = %command, workdir = %self.workdir.display(), "spawning command");

            let child = match proc.spawn() {
                Ok(child) => child,
                Err(e) => {
                    error!(command = %command, error = %e, cause = ?e, "failed to launch command");
                    return Capture::Failed(CaptureFailure::Launch(e.to_string()));
                }
            };

            // Dropping the wait future on timeout drops the child, which kills it.
            let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    error!(command = %command, error = %e, cause = ?e, "failed waiting for command");
                    return Capture::Failed(CaptureFailure::Io(e.to_string()));
                }
                Err(_) => {
                    error!(
                        command = %command,
                        timeout_secs = timeout.as_secs_f64(),
                        "command timed out"
                    );
                    return Capture::Failed(CaptureFailure::TimedOut(timeout));
                }
            };

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            if output.status.success() {
                debug!(command = %command, bytes = stdout.len(), "command completed");
                return Capture::Text(stdout);
            }

            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            let code = output.status.code();
            error!(command = %command, exit_code = ?code, "command failed");
            if !stdout.trim().is_empty() {
                debug!(command = %command, stdout = ?stdout.trim(), "partial output");
            }
            if !stderr.trim().is_empty() {
                debug!(command = %command, stderr = ?stderr.trim(), "error output");
            }
            Capture::Failed(CaptureFailure::NonZeroExit {
                code,
                stdout,
                stderr,
            })
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Instant;

    use opencode_bridge_test_utils::tracing_setup::LogCapture;
    use pretty_assertions::assert_eq;
    use tracing::Level;

    use super::*;

    fn runner() -> ProcessRunner {
        ProcessRunner::new(std::env::temp_dir())
    }

    #[tokio::test]
    async fn test_shell_command_stdout() {
        let capture = runner()
            .run(&CommandConfig::shell("echo hello bridge"), Duration::from_secs(5))
            .await;
        assert_eq!(capture, Capture::Text("hello bridge\n".to_string()));
    }

    #[tokio::test]
    async fn test_argv_command_is_not_shell_interpreted() {
        let capture = runner()
            .run(
                &CommandConfig::argv(["echo", "$HOME", "a|b"]),
                Duration::from_secs(5),
            )
            .await;
        assert_eq!(capture, Capture::Text("$HOME a|b\n".to_string()));
    }

    #[tokio::test]
    async fn test_runs_in_workdir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();

        let runner = ProcessRunner::new(dir.path());
        assert_eq!(runner.workdir(), dir.path());

        let capture = runner
            .run(&CommandConfig::shell("ls"), Duration::from_secs(5))
            .await;
        assert!(capture.into_text().contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_stderr_is_not_captured_on_success() {
        let capture = runner()
            .run(
                &CommandConfig::shell("echo out; echo err >&2"),
                Duration::from_secs(5),
            )
            .await;
        assert_eq!(capture, Capture::Text("out\n".to_string()));
    }

    #[test_log::test(tokio::test)]
    async fn test_non_zero_exit_keeps_partial_output() {
        let capture = runner()
            .run(
                &CommandConfig::shell("echo partial; echo broken >&2; exit 3"),
                Duration::from_secs(5),
            )
            .await;
        match capture {
            Capture::Failed(CaptureFailure::NonZeroExit {
                code,
                stdout,
                stderr,
            }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "broken\n");
            }
            other => panic!("expected non-zero exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_zero_exit_logs_command_and_streams() {
        let logs = LogCapture::new();
        let _guard = logs.set_default();
        let command = CommandConfig::shell("echo partial; echo broken >&2; exit 3");

        runner().run(&command, Duration::from_secs(5)).await;

        let failed = logs.matching("command failed");
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].level, Level::ERROR);
        assert_eq!(failed[0].field("command"), Some(command.to_string().as_str()));
        assert_eq!(failed[0].field("exit_code"), Some("Some(3)"));

        assert_eq!(logs.levels_of("partial output"), vec![Level::DEBUG]);
        assert_eq!(logs.levels_of("error output"), vec![Level::DEBUG]);
        assert_eq!(logs.matching("partial output")[0].field("stdout"), Some("\"partial\""));
        assert_eq!(logs.matching("error output")[0].field("stderr"), Some("\"broken\""));
    }

    #[test_log::test(tokio::test)]
    async fn test_timeout_kills_child() {
        let start = Instant::now();
        let capture = runner()
            .run(&CommandConfig::argv(["sleep", "10"]), Duration::from_millis(100))
            .await;
        assert_eq!(
            capture,
            Capture::Failed(CaptureFailure::TimedOut(Duration::from_millis(100)))
        );
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let capture = runner()
            .run(
                &CommandConfig::argv(["/nonexistent/opencode-bridge-test-binary"]),
                Duration::from_secs(5),
            )
            .await;
        assert!(matches!(
            capture,
            Capture::Failed(CaptureFailure::Launch(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_argv_is_launch_failure() {
        let capture = runner()
            .run(&CommandConfig::Argv(Vec::new()), Duration::from_secs(5))
            .await;
        assert!(matches!(
            capture,
            Capture::Failed(CaptureFailure::Launch(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let capture = runner()
            .run(
                &CommandConfig::shell(r"printf 'ok\377\376done'"),
                Duration::from_secs(5),
            )
            .await;
        let text = capture.into_text();
        assert!(text.starts_with("ok"));
        assert!(text.ends_with("done"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_whitespace_output_is_kept_verbatim() {
        let capture = runner()
            .run(&CommandConfig::shell("printf '  \\n'"), Duration::from_secs(5))
            .await;
        assert_eq!(capture.non_empty(), Some("  \n".to_string()));
    }
}
