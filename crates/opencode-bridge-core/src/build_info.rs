//! Build metadata embedded by the build script, shown by `--version`.

/// Short git commit hash, or `unknown` outside a checkout.
pub const GIT_HASH: &str = env!("OPENCODE_BRIDGE_GIT_HASH");

/// Build time as a Unix epoch string.
pub const BUILD_TIMESTAMP: &str = env!("OPENCODE_BRIDGE_BUILD_TIMESTAMP");

/// Cargo profile (`debug` or `release`).
pub const BUILD_PROFILE: &str = env!("OPENCODE_BRIDGE_BUILD_PROFILE");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// e.g. `"0.1.0 (abc1234, release)"`, usable in `#[command(long_version)]`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("OPENCODE_BRIDGE_GIT_HASH"),
    ", ",
    env!("OPENCODE_BRIDGE_BUILD_PROFILE"),
    ")"
);
