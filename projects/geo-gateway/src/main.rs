use anyhow::Result;
use tracing::info;

use geo_gateway::{api, config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("geo_gateway=info".parse()?)
        )
        .init();

    info!("Starting geo-gateway v{}", env!("CARGO_PKG_VERSION"));

    let cfg = config::load()?;
    info!("Configuration loaded");

    api::serve(cfg).await
}
