//! `ccdctl` entry point.
//!
//! Bench tool for the readout controller: quantize intervals for
//! inspection, apply a timing configuration through a transport, and
//! echo the resolved configuration.

use anyhow::{bail, Context, Result};
use ccd_common::{AppliedStateCache, ControllerConfig, TransportKind};
use ccd_controller::CcdController;
use ccd_timing::ClockCode;
use ccd_transport::SimulatedTransport;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

/// `ccdctl` command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "ccdctl",
    about = "CCD readout controller timing tool",
    version,
    long_about = None
)]
struct Args {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the hardware clock code for a microsecond interval.
    Quantize {
        /// Interval in microseconds.
        microseconds: f64,
    },

    /// Apply the configured timing parameter set to the controller.
    Apply {
        /// Path to a controller configuration file (TOML).
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Force the simulated transport regardless of configuration.
        #[arg(long, short = 's')]
        simulated: bool,

        /// Apply even if the configuration matches the last-applied state.
        #[arg(long)]
        force: bool,
    },

    /// Print the resolved effective configuration as TOML.
    ShowConfig {
        /// Path to a controller configuration file (TOML).
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    match args.command {
        Command::Quantize { microseconds } => cmd_quantize(microseconds),
        Command::Apply {
            config,
            simulated,
            force,
        } => cmd_apply(config.as_deref(), simulated, force),
        Command::ShowConfig { config } => cmd_show_config(config.as_deref()),
    }
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!(
        "ccdctl={level},ccd_controller={level},ccd_transport={level},ccd_timing={level},ccd_common={level}"
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `CCD_CONFIG_PATH` environment variable
/// 3. `config/default.toml` (local development)
/// 4. Built-in defaults
///
/// Also returns the path the configuration came from, when it came from
/// a file; change detection is skipped for built-in defaults.
fn load_config(arg_path: Option<&std::path::Path>) -> Result<(ControllerConfig, Option<PathBuf>)> {
    if let Some(path) = arg_path {
        info!(?path, "Loading config from command-line argument");
        let config = ControllerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        return Ok((config, Some(path.to_path_buf())));
    }

    if let Ok(env_path) = std::env::var("CCD_CONFIG_PATH") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            info!(?path, "Loading config from CCD_CONFIG_PATH");
            let config = ControllerConfig::from_file(&path)
                .with_context(|| format!("Failed to load config from CCD_CONFIG_PATH={env_path}"))?;
            return Ok((config, Some(path)));
        }
        warn!(
            path = %env_path,
            "CCD_CONFIG_PATH set but file does not exist, checking other locations"
        );
    }

    let local_path = PathBuf::from("config/default.toml");
    if local_path.exists() {
        info!(?local_path, "Loading config from local path");
        let config = ControllerConfig::from_file(&local_path)
            .with_context(|| format!("Failed to load config from {}", local_path.display()))?;
        return Ok((config, Some(local_path)));
    }

    info!("No config file found, using built-in defaults");
    Ok((ControllerConfig::default(), None))
}

fn cmd_quantize(microseconds: f64) -> Result<()> {
    let code = ClockCode::quantize(microseconds);
    println!(
        "{:.4} us -> {} ({} regime, {} steps)",
        microseconds,
        code,
        code.regime(),
        code.step()
    );
    Ok(())
}

fn cmd_apply(config_path: Option<&std::path::Path>, simulated: bool, force: bool) -> Result<()> {
    let (config, source) = load_config(config_path)?;
    let fingerprint = config
        .fingerprint()
        .context("Failed to fingerprint configuration")?;

    let cache = source.as_deref().map(AppliedStateCache::for_config);
    if let Some(cache) = &cache {
        if cache.matches(fingerprint) && !force {
            println!("Configuration unchanged since last apply; nothing to do (use --force to reapply).");
            return Ok(());
        }
    }

    let kind = if simulated {
        TransportKind::Simulated
    } else {
        config.transport.kind
    };
    if kind == TransportKind::Hardware {
        bail!(
            "the hardware transport is provided by the site integration; \
             run with --simulated or set transport.kind = \"simulated\""
        );
    }

    let mut controller = CcdController::new(SimulatedTransport::new());
    controller
        .apply_timing_config(&config.timing)
        .context("Failed to apply timing parameters")?;

    println!(
        "Applied {} timing commands (integrator speed: {}).",
        controller.transport().call_count(),
        controller.integrator_speed()
    );
    for request in controller.transport().requests() {
        println!(
            "  {} {}",
            request.code,
            request
                .args
                .iter()
                .map(|a| format!("0x{a:08X}"))
                .collect::<Vec<_>>()
                .join(" ")
        );
    }

    if let Some(cache) = &cache {
        cache
            .store(fingerprint)
            .context("Failed to record applied configuration state")?;
        info!(path = %cache.path().display(), "Recorded applied configuration fingerprint");
    }

    Ok(())
}

fn cmd_show_config(config_path: Option<&std::path::Path>) -> Result<()> {
    let (config, source) = load_config(config_path)?;
    match &source {
        Some(path) => println!("# resolved from {}", path.display()),
        None => println!("# built-in defaults"),
    }
    print!(
        "{}",
        config
            .to_toml()
            .context("Failed to serialize configuration")?
    );
    Ok(())
}
