//! Structured logging setup for the daemon.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Crates whose events follow the configured level; everything else is
/// limited to warnings.
const PADBRIDGE_TARGETS: [&str; 4] = [
    "padbridge_service",
    "padbridged",
    "padbridge_virtual",
    "padbridge_controllers",
];

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(level: &str) -> String {
    let mut directives: Vec<String> = PADBRIDGE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Installs the global subscriber: `RUST_LOG` wins over `level`. Thread
/// names are printed so each controller's polling thread is identifiable.
pub fn init_logging(level: &str, compact: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let fmt = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if compact {
        registry.with(fmt.compact()).try_init()
    } else {
        registry.with(fmt).try_init()
    };
    installed.context("Failed to install tracing subscriber")
}
