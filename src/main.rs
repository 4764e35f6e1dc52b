use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zonedir::config::{Config, LoggingConfig};
use zonedir::directory::{DirectoryCache, HttpProber};
use zonedir::server::{DirectoryResponse, ZonedirServer};
use zonedir::Result as ZonedirResult;

#[derive(Parser)]
#[command(
    name = "zonedir",
    version,
    about = "Cached directory of DNS zones with liveness probing",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the directory over HTTP until Ctrl-C
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the bind address
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Run one refresh cycle and print the snapshot as JSON
    Snapshot {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report active zones as alive without probing
        #[arg(long, default_value = "false")]
        no_probe: bool,
    },

    /// Probe a single zone
    Check {
        /// Zone name, e.g. example.com
        zone: String,

        /// Probe timeout in milliseconds
        #[arg(short, long, default_value = "5000")]
        timeout_ms: u64,
    },
}

impl Commands {
    fn config_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Serve { config, .. } | Self::Snapshot { config, .. } => config.as_deref(),
            Self::Check { .. } => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.command.config_path())?;

    let verbose = cli.verbose || debug_env();
    setup_tracing(&config.logging, cli.log_format.as_deref(), verbose)?;

    tracing::info!("zonedir {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { bind, .. } => {
            tracing::info!(bind = ?bind, "Starting serve command");
            serve(config, bind).await?;
        }

        Commands::Snapshot { no_probe, .. } => {
            tracing::info!(no_probe = %no_probe, "Starting snapshot command");
            snapshot(config, no_probe).await?;
        }

        Commands::Check { zone, timeout_ms } => {
            tracing::info!(zone = %zone, timeout_ms = %timeout_ms, "Starting check command");
            check(&zone, timeout_ms).await?;
        }
    }

    Ok(())
}

/// `DEBUG=true` enables verbose logging
fn debug_env() -> bool {
    std::env::var("DEBUG")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn setup_tracing(logging: &LoggingConfig, format: Option<&str>, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("zonedir=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("zonedir={},warn", logging.level))
            .context("Invalid log level")?
    };

    match format.unwrap_or(logging.format.as_str()) {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn serve(mut config: Config, bind: Option<SocketAddr>) -> ZonedirResult<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    let server = ZonedirServer::new(config)?;
    println!("{}", server.info().display());

    server.start_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

async fn snapshot(mut config: Config, no_probe: bool) -> ZonedirResult<()> {
    if no_probe {
        config.probe.enabled = false;
    }
    config.validate()?;

    let cache = DirectoryCache::from_config(&config)?;
    let snapshot = cache.get(false).await;

    let response = DirectoryResponse::from_snapshot(&snapshot, chrono::Utc::now());
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn check(zone: &str, timeout_ms: u64) -> ZonedirResult<()> {
    let prober = HttpProber::new(Duration::from_millis(timeout_ms))?;

    match prober.check(zone).await {
        Ok(status) => println!("{zone}: alive ({status})"),
        Err(e) => println!("{zone}: not alive ({e})"),
    }

    Ok(())
}
