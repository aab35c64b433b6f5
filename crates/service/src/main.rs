//! padbridge daemon (padbridged)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use padbridge_service::observability::init_logging;
use padbridge_service::{ConfigStore, DEFAULT_CONFIG_PATH, PadbridgeDaemon, ReplayCapture};
use padbridge_usb::UsbHost;
use padbridge_virtual::BackendKind;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "padbridged", version, about = "USB game controller bridge daemon")]
struct Cli {
    /// Configuration file, created with defaults when missing
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Overrides `log_level` from the configuration file
    #[arg(long)]
    log_level: Option<String>,

    /// Overrides `backend` from the configuration file
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Feed devices from a JSON capture instead of real hardware
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Single-line log output
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = ConfigStore::load(&cli.config)?;
    let mut global = store.global()?;
    if let Some(level) = &cli.log_level {
        global.log_level = level.clone();
    }
    init_logging(&global.log_level, cli.compact)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %store.path().display(),
        "padbridged starting"
    );

    let Some(capture_path) = &cli.replay else {
        anyhow::bail!("No hardware USB host is built in; run with --replay <capture.json>");
    };
    let capture = ReplayCapture::load(capture_path)
        .with_context(|| format!("Failed to load replay capture {}", capture_path.display()))?;
    let session = capture.into_session()?;
    if session.device_count() == 0 {
        warn!(capture = %capture_path.display(), "replay capture has no devices");
    }
    let host: Arc<dyn UsbHost> = session.host();

    let daemon = PadbridgeDaemon::new(store, global, host, cli.backend)?;
    let feeds = session.spawn(&daemon.shutdown_sender());

    daemon.run().await?;

    for feed in feeds {
        feed.abort();
    }
    info!("padbridged stopped");
    Ok(())
}
