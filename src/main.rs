//! enviro: sensor summary daemon for a single-board computer with an
//! environmental sensor board and a small colour panel.
//!
//! Run with:  `RUST_LOG=info enviro [path/to/enviro.toml]`

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Structured logging; RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("enviro v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Press Ctrl+C to exit");

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(enviro_config::default_path);
    let config = enviro_config::load(&path)?;

    enviro_daemon::run(config).map_err(Into::into)
}
