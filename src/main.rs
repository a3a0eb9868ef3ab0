//! Field-service dashboard entry point

use anyhow::Context;
use clap::Parser;
use medserv_api::start_server;
use medserv_config::Config;
use medserv_source::{JsonSnapshotSource, SourceRef};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "medserv")]
#[command(version = "0.1.0")]
#[command(about = "Field-service reporting dashboard for medical-device maintenance", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.init {
        if args.config.exists() {
            anyhow::bail!("{} already exists, not overwriting", args.config.display());
        }
        std::fs::write(&args.config, Config::generate_default())
            .with_context(|| format!("Failed to write {}", args.config.display()))?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    log::info!(
        "Config loaded: source={}, listening on {}",
        config.source.path.display(),
        config.bind_address()
    );
    if !config.source.path.is_dir() {
        log::warn!("Snapshot directory not found: {}", config.source.path.display());
    }

    let source: SourceRef = Arc::new(JsonSnapshotSource::new(config.source.path.clone()));

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, source))
}
