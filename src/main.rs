use std::path::PathBuf;

use clap::Parser;
use tempest::config::Config;
use tempest::server;

/// Tempest web server
#[derive(Parser, Debug)]
#[command(name = "tempest", version, about)]
struct Cli {
    /// the directory accessible to clients
    dir: Option<PathBuf>,

    /// the port to listen on (default: 8080)
    port: Option<u16>,

    /// avoid possibly platform-specific system calls
    #[arg(long)]
    portable: bool,

    /// YAML file with listen address, served directories and mounts
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = cli.dir {
        cfg.root = Some(dir);
    }
    if let Some(port) = cli.port {
        cfg.set_port(port);
    }
    cfg.portable |= cli.portable;
    cfg.apply_env();

    tokio::select! {
        res = server::listener::run(&cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
