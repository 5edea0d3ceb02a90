use std::sync::Arc;

use frissestart_cms::config::CmsConfig;
use frissestart_cms::core::cms::Cms;
use frissestart_cms::server::sync;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = CmsConfig::from_env();
    if config.sync_api_key.is_none() {
        log::warn!("SYNC_API_KEY is not set, the sync endpoint is open");
    }
    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000);

    let cms = Cms::new(config).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let courses = cms.courses().await;
    log::info!("{} courses available at startup", courses.len());

    sync::serve(port, Arc::new(cms)).await
}
