mod runtime;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};

use meterwatch_config::{config_dir, config_file_path, load_config, validate};
use meterwatch_coordinator::PollScheduler;
use meterwatch_gateway::{start_server, GatewayState};
use meterwatch_logging::{init_logger, redact_secrets};

#[derive(Parser)]
#[command(name = "meterwatch")]
#[command(about = "Vision-based utility meter reading service")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.meterwatch/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler and HTTP gateway until interrupted
    Serve {
        /// Port to bind the HTTP gateway to (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run a single read cycle and print the result
    Read {
        /// Print the raw result record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the config file and report all findings
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    match cli.command {
        Commands::Serve { port } => serve(&config_path, port).await,
        Commands::Read { json } => read_once(&config_path, json).await,
        Commands::Check => check(&config_path).await,
    }
}

async fn serve(config_path: &PathBuf, port: Option<u16>) -> Result<()> {
    let config = load_config(config_path).await?;
    init_logger(
        &config.logging.level,
        config.logging.dir.as_deref().map(std::path::Path::new),
    );
    info!(path = %config_path.display(), "Using config");

    ensure_valid(&config)?;

    let coordinator = runtime::build_coordinator(&config, config_path).await?;
    let interval = Duration::from_secs(config.meter.poll_interval_seconds);

    let scheduler = PollScheduler::new(Arc::clone(&coordinator), interval);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    let bind = config.gateway.bind.clone();
    let port = port.unwrap_or(config.gateway.port);
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid gateway address {bind}:{port}"))?;
    let state = Arc::new(GatewayState { coordinator });

    tokio::select! {
        result = start_server(addr, state) => {
            if let Err(e) = result {
                error!(error = %e, "Gateway server exited");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c, shutting down");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = scheduler_handle.await;
    Ok(())
}

async fn read_once(config_path: &PathBuf, json: bool) -> Result<()> {
    let config = load_config(config_path).await?;
    init_logger(&config.logging.level, None);
    ensure_valid(&config)?;

    let coordinator = runtime::build_coordinator(&config, config_path).await?;
    let result = coordinator.read_now().await;

    // Exiting would drop the runtime and abort the delayed light-off, so
    // wait it out before the process ends.
    coordinator.settle_illumination().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        match result.value {
            Some(value) => println!("{value} m³ ({})", result.timestamp.to_rfc3339()),
            None => println!(
                "read failed: {}",
                result.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn check(config_path: &PathBuf) -> Result<()> {
    init_logger("warn", None);
    let config = load_config(config_path).await?;
    let report = validate(&config);

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {}", redact_secrets(&error.to_string()));
    }

    if report.is_valid() {
        println!("config OK: {}", config_path.display());
        Ok(())
    } else {
        bail!("config has {} error(s)", report.errors.len());
    }
}

fn ensure_valid(config: &meterwatch_config::MeterWatchConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    if !report.is_valid() {
        for error in &report.errors {
            tracing::error!("{}", redact_secrets(&error.to_string()));
        }
        bail!("invalid config: {} error(s)", report.errors.len());
    }
    Ok(())
}
