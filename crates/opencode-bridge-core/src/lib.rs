#![deny(unsafe_code)]

//! opencode-bridge core: assembles a one-shot context bundle describing a
//! project for an external coding assistant.
//!
//! The bundle is built from key file contents, a directory listing,
//! version-control status, and the pending diff, preceded by a runtime
//! header naming the operator-selected mode. Every capture step is
//! best-effort: failures are logged and the step's section is omitted.
//! Only writing the final artifact can fail the run.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future, used where a trait is consumed
/// as `dyn Trait` (native `async fn` in traits is not object-safe).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Ordered capture pipeline.
pub mod assembler;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Sections and the bundle.
pub mod bundle;
/// Guarded file reader and command runner.
pub mod capture;
/// Identity inheritance self-check.
pub mod identity;
/// Subscriber setup and log level resolution.
pub mod logging;
/// Runtime mode resolution.
pub mod mode;
/// Artifact writer.
pub mod sink;

pub use assembler::ContextAssembler;
pub use bundle::{ContextBundle, ContextSection};
pub use capture::{Capture, CaptureFailure, CommandRunner, ProcessRunner};
pub use identity::{IdentityReport, IdentityStatus};
pub use logging::LogSettings;
pub use mode::{RuntimeMode, RuntimeState};
pub use sink::{SinkError, write_bundle};
