//! Output sink: persists the rendered bundle.
//!
//! Unlike every capture step, a sink failure is fatal to the invocation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

/// Errors from writing the context artifact.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("permission denied writing {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    /// The artifact path the write was aimed at.
    pub fn path(&self) -> &Path {
        match self {
            SinkError::PermissionDenied { path } | SinkError::Io { path, .. } => path,
        }
    }
}

/// Write `text` to `path` as UTF-8, replacing any previous content.
pub async fn write_bundle(path: &Path, text: &str) -> Result<(), SinkError> {
    tokio::fs::write(path, text.as_bytes())
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => SinkError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => SinkError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
    info!(path = %path.display(), bytes = text.len(), "context written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use opencode_bridge_test_utils::project::TestProject;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_write_creates_file() {
        let project = TestProject::new();
        let path = project.path("opencode_context.tmp");

        write_bundle(&path, "--- A ---\nx\n").await.unwrap();
        assert_eq!(project.read("opencode_context.tmp"), "--- A ---\nx\n");
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_content() {
        let project = TestProject::new();
        project.write("opencode_context.tmp", "a much longer previous artifact\n");
        let path = project.path("opencode_context.tmp");

        write_bundle(&path, "new\n").await.unwrap();
        assert_eq!(project.read("opencode_context.tmp"), "new\n");
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let project = TestProject::new();
        let path = project.path("no/such/dir/out.tmp");

        let err = write_bundle(&path, "x").await.unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
        assert_eq!(err.path(), path.as_path());
        assert!(err.to_string().contains("out.tmp"));
    }

    #[tokio::test]
    async fn test_write_onto_directory_fails() {
        let project = TestProject::new();
        project.mkdir("taken");

        let err = write_bundle(&project.path("taken"), "x").await.unwrap_err();
        assert!(err.to_string().contains("taken"));
    }
}
