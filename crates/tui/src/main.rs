mod app;
mod art;

use std::fs::{self, OpenOptions};

use anyhow::Result;
use tracing_subscriber::{prelude::*, EnvFilter};
use walkquote_core::config::{self, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let mut app = app::WalkQuoteApp::new(config);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("walkquote.log");

    let env_filter = EnvFilter::from_default_env();

    // stdout belongs to the terminal UI; everything goes to the file layer
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
