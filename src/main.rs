pub mod config;
pub mod input;
pub mod session;

use color_eyre::{eyre::eyre, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::RecorderConfig;
use crate::input::{DeviceRegistry, GilrsProvider};
use crate::session::recorder::{RecorderHandle, RecorderSettings};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = RecorderConfig::load().map_err(|e| eyre!("Failed to load config: {}", e))?;
    info!("Loaded configuration: {:?}", config);

    let provider = Box::new(GilrsProvider::new());
    let registry = DeviceRegistry::new(provider);

    let settings = RecorderSettings {
        sample_interval_ms: config.sample_interval_ms,
        thresholds: config.thresholds(),
        output_dir: config.output_dir.clone(),
    };

    let handle = RecorderHandle::spawn(settings, registry)
        .map_err(|e| eyre!("Failed to spawn recorder: {}", e))?;
    info!(
        "Recording motion samples every {} ms, press Ctrl-C to stop and export",
        config.sample_interval_ms
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| eyre!("Failed to listen for Ctrl-C: {}", e))?;
    info!("Stop requested");

    let receipt = handle.stop().await?;
    info!(
        "Exported {} samples to {}",
        receipt.samples,
        receipt.path.display()
    );

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
