//! Stackway - A stacking window manager with a protocol-agnostic core
//!
//! Openbox-style window management over Wayland and XWayland clients:
//! floating views with server-side decorations, configurable key and mouse
//! bindings, workspaces and a window menu.
//!
//! This binary drives the core through the headless backend. It validates
//! configuration and replays scripted sessions, printing the resulting
//! window state as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stackway_backend_headless::{script, HeadlessBackend};
use stackway_core::config::Config;

/// Stackway - A stacking window manager
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run in debug mode with verbose logging
    #[arg(short, long)]
    debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Print default configuration to stdout
    #[arg(long)]
    print_default_config: bool,

    /// Replay a JSON session script through the headless backend
    #[arg(short, long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Run `Execute` actions from the script instead of only logging them
    #[arg(long)]
    spawn: bool,
}

fn init_logging(debug: bool) -> Result<()> {
    let level = if debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug)?;

    info!("Stackway v{} starting...", env!("CARGO_PKG_VERSION"));

    if args.print_default_config {
        println!("{}", Config::default_config_string());
        return Ok(());
    }

    if args.validate {
        let config = Config::load(args.config.as_deref()).context("Invalid configuration")?;
        config.validate().context("Invalid configuration")?;
        info!("Configuration is valid");
        return Ok(());
    }

    let config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    };

    let Some(path) = args.replay else {
        warn!("No session to replay; pass --replay <FILE>");
        return Ok(());
    };
    let steps = script::load(&path)?;

    let mut backend = HeadlessBackend::new(config).with_config_path(args.config);
    backend.set_spawn_processes(args.spawn);
    backend.run(&steps)?;

    let summary = serde_json::to_string_pretty(&backend.summary())
        .context("Failed to serialize session summary")?;
    println!("{summary}");

    info!("Stackway shutdown complete");
    Ok(())
}
