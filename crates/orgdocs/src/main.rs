use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use orgdocs::config::Config;
use orgdocs::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    info!("Starting orgdocs");
    info!("  Document name: {}", config.doc_name);
    info!("  Source file:   {}", config.org_file);
    info!("  Debounce:      {} ms", config.debounce_ms);

    watch::run(config).await
}
