//! Guarded file reader.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, error, warn};

use super::{Capture, CaptureFailure};

/// Read a whole file as UTF-8.
///
/// "Not found" is logged as a warning, "permission denied" as an error, and
/// any other I/O failure (invalid UTF-8 included) as an error carrying the
/// underlying cause.
pub async fn read_text_file(path: &Path) -> Capture {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            debug!(path = %path.display(), bytes = content.len(), "read file");
            Capture::Text(content)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "file not found");
            Capture::Failed(CaptureFailure::NotFound)
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            error!(path = %path.display(), "permission denied reading file");
            Capture::Failed(CaptureFailure::PermissionDenied)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, cause = ?e, "unexpected error reading file");
            Capture::Failed(CaptureFailure::Io(e.to_string()))
        }
    }
}
