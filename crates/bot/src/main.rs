#![warn(missing_docs, clippy::pedantic, clippy::perf)]
#![doc = include_str!("../README.md")]

use anyhow::anyhow;
use dirs::config_dir;
use tracing_subscriber::EnvFilter;

mod bot;
mod dispatch;
mod groups;
mod handler;
mod hooks;
mod structures;
mod type_map;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; deployments usually set the variable
    // directly
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    // Get the config
    let config_path = config_dir()
        .ok_or_else(|| anyhow!("no config directory found for this OS"))?
        .join("repwatch.toml");
    tracing::info!("reading config from {config_path:?}");

    let mut client = bot::init(config_path).await?;
    client.start().await?;

    Ok(())
}
