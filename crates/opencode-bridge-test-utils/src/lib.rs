#![deny(unsafe_code)]

//! Shared test utilities for the opencode-bridge workspace.
//!
//! Provides temporary project directories, a scripted command runner,
//! config builders, and tracing helpers so that individual crate tests stay
//! concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! opencode-bridge-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod project;
pub mod runner;
pub mod tracing_setup;
