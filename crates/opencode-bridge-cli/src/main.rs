#![deny(unsafe_code)]

//! opencode-bridge CLI: captures project context for an external coding
//! assistant and writes it to a well-known file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opencode_bridge_config::BridgeConfig;
use opencode_bridge_core::build_info;
use opencode_bridge_core::identity::{self, IdentityReport};
use opencode_bridge_core::logging::{self, LOG_LEVEL_ENV, LogSettings};
use opencode_bridge_core::{ContextAssembler, SinkError, write_bundle};
use tracing::{error, info};

/// opencode-bridge: hand a coding assistant the state of a project in one file.
#[derive(Parser)]
#[command(
    name = "opencode-bridge",
    version,
    long_version = build_info::LONG_VERSION,
    about,
    long_about = None
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "opencode-bridge.toml")]
    config: PathBuf,

    /// Project root; key files, commands and the mode file are resolved here.
    #[arg(short = 'C', long, default_value = ".")]
    workdir: PathBuf,

    /// Write the bundle here instead of the configured output path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also print the bundle to stdout.
    #[arg(long)]
    print: bool,

    /// Report the identity a downstream consumer would inherit, then exit
    /// without capturing anything.
    #[arg(long)]
    test_identity: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config).await;

    // A broken config file still gets reported through the log subscriber,
    // at the level chosen by `-v` and the environment.
    let logging_config = loaded
        .as_ref()
        .map(|(config, _)| config.logging.clone())
        .unwrap_or_default();
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let settings = LogSettings::resolve(&logging_config, env_level.as_deref(), cli.verbose);
    logging::install(&settings).context("failed to install log subscriber")?;

    let (config, found) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            report_config_error(&cli.config, &e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if !found {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    if let Some(Commands::Config { show }) = cli.command {
        cmd_config(&cli.config, &config, show)?;
        return Ok(ExitCode::SUCCESS);
    }

    let timestamp = std::env::var(&config.mode.timestamp_var).ok();

    if cli.test_identity {
        let report = identity_report(config, &cli.workdir, timestamp.as_deref()).await;
        println!("\n{report}\n");
        return Ok(ExitCode::SUCCESS);
    }

    let output = cli
        .output
        .unwrap_or_else(|| cli.workdir.join(&config.output.path));
    match run_capture(config, &cli.workdir, &output, timestamp.as_deref(), cli.print).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

/// Assemble the bundle and write it. Only a write failure is fatal.
async fn run_capture(
    config: BridgeConfig,
    workdir: &Path,
    output: &Path,
    timestamp: Option<&str>,
    print: bool,
) -> Result<(), SinkError> {
    info!(workdir = %workdir.display(), "Starting context capture");
    let bundle = ContextAssembler::new(config, workdir)
        .assemble(timestamp)
        .await;
    let text = bundle.render();

    if print {
        print!("{text}");
    }

    if let Err(e) = write_bundle(output, &text).await {
        error!(path = %e.path().display(), error = %e, "Failed to write context");
        return Err(e);
    }
    info!(path = %output.display(), sections = bundle.len(), "Context captured");
    Ok(())
}

/// Resolve only the runtime header and inspect it as a consumer would.
async fn identity_report(
    config: BridgeConfig,
    workdir: &Path,
    timestamp: Option<&str>,
) -> IdentityReport {
    let assembler = ContextAssembler::new(config, workdir);
    let header = assembler.runtime_state(timestamp).await.section().to_string();
    identity::inspect(&header, &assembler.config().mode.key)
}

fn cmd_config(config_path: &Path, config: &BridgeConfig, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

fn report_config_error(path: &Path, err: &anyhow::Error) {
    let chain = format!("{err:#}");
    error!(path = %path.display(), error = %chain, "Invalid configuration");
}

/// Load the config file, or defaults if it does not exist. The flag reports
/// whether the file was found.
async fn load_config(path: &Path) -> Result<(BridgeConfig, bool)> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let config = BridgeConfig::load(path)
            .await
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
        Ok((config, true))
    } else {
        Ok((BridgeConfig::default(), false))
    }
}
