//! stratoqa smoke binary
//!
//! Quick deployment checks outside the test suites: verify auth works,
//! pick a flavor, sweep the catalogs. Useful right after a deployment
//! before pointing the full scenarios at it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use stratoqa::api::client::ApiClient;
use stratoqa::compute::Flavors;
use stratoqa::config::Config;
use stratoqa::image::Images;
use stratoqa::network::Networks;

/// Smoke checks for a Strato deployment
#[derive(Parser, Debug)]
#[command(name = "stratoqa", version, about, long_about = None)]
struct Args {
    /// Config file (defaults to STRATOQA_CONFIG or the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify that a scoped token can be issued
    Auth,
    /// Pick the best matching flavor for the given minimums
    Flavors {
        #[arg(long, default_value_t = 2)]
        min_cpu: u64,
        #[arg(long, default_value_t = 2048)]
        min_ram: u64,
    },
    /// Token plus flavor/image/network catalog sweep
    Smoke,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(
            non_blocking
                .with_max_level(tracing_level)
                .and(std::io::stderr.with_max_level(tracing_level)),
        )
        .with_ansi(false)
        .with_target(true)
        .init();

    tracing::info!("stratoqa started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("stratoqa").join("stratoqa.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".stratoqa").join("stratoqa.log");
    }
    PathBuf::from("stratoqa.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = setup_logging(args.log_level);

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };

    match args.command {
        Command::Auth => auth_check(&config).await,
        Command::Flavors { min_cpu, min_ram } => flavor_check(&config, min_cpu, min_ram).await,
        Command::Smoke => smoke(&config).await,
    }
}

async fn auth_check(config: &Config) -> Result<()> {
    let client = ApiClient::project_scoped(config, config.project_name())?;
    let token = client.token().await.context("token issuance failed")?;
    println!("auth OK (token length {})", token.len());
    Ok(())
}

async fn flavor_check(config: &Config, min_cpu: u64, min_ram: u64) -> Result<()> {
    let client = ApiClient::project_scoped(config, config.project_name())?;
    let flavors = Flavors::new(client, config.project_id());

    match flavors.best_match(min_cpu, min_ram).await? {
        Some(flavor_id) => println!(
            "best flavor for {} vCPU / {} MB: {}",
            min_cpu, min_ram, flavor_id
        ),
        None => anyhow::bail!("no flavor satisfies {} vCPU / {} MB", min_cpu, min_ram),
    }
    Ok(())
}

async fn smoke(config: &Config) -> Result<()> {
    let client = ApiClient::project_scoped(config, config.project_name())?;
    client.token().await.context("token issuance failed")?;
    println!("auth OK");

    let flavors = Flavors::new(client.clone(), config.project_id());
    let catalog = flavors.list_detail().await?;
    println!("flavors: {}", catalog.len());

    let images = Images::new(client.clone());
    let public = images.list_by_visibility("public").await?;
    println!("public images: {}", public.len());

    let networks = Networks::new(client);
    let nets = networks.list().await?;
    println!("networks: {}", nets.len());

    Ok(())
}
