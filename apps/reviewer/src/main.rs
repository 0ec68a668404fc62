use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::HttpBackend;
use review_core::{ReviewEvent, ReviewRuntime};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, DEFAULT_CONFIG_FILE};
use terminal::{parse_command, render_view, Command, TerminalSurface, HELP};

#[derive(Parser, Debug)]
#[command(about = "Step through a folder of structure files and accept or decline each one")]
struct Args {
    /// Review backend base URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Folder to load on startup.
    #[arg(long)]
    folder: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Tracing filter, e.g. `debug` or `review_core=trace`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let mut settings = load_settings(&args.config);
    settings.apply_cli(args.server_url, args.folder);

    let backend = HttpBackend::new(&settings.server_url, settings.request_timeout())
        .with_context(|| format!("failed to configure backend client for {}", settings.server_url))?;
    info!(server_url = %settings.server_url, "reviewer starting");

    let runtime = ReviewRuntime::new(Arc::new(backend), TerminalSurface::new(std::io::stdout()));
    let (tx, rx) = mpsc::channel(32);
    if let Some(startup) = settings.startup_event() {
        tx.send(startup)
            .await
            .context("review loop closed before startup")?;
    }
    tokio::spawn(read_commands(tx));

    println!("{HELP}");
    runtime.run(rx, |view| println!("{}", render_view(view))).await;
    info!("reviewer stopped");
    Ok(())
}

fn init_tracing(log_level: Option<&str>) {
    let filter = log_level
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_commands(tx: mpsc::Sender<ReviewEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                warn!(%error, "failed to read input");
                break;
            }
        };
        match parse_command(&line) {
            Some(Command::Event(event)) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Some(Command::Help) => println!("{HELP}"),
            Some(Command::Quit) => break,
            None if line.trim().is_empty() => {}
            None => warn!(command = line.trim(), "unrecognized command"),
        }
    }
}
