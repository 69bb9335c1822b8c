use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use ibis::api::{create_api_router, AppState};
use ibis::config::Config;
use ibis::resolve::{BulkApiSource, DirectApiSource, ResolutionEngine, SnapshotSource, TierSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    let client = reqwest::Client::builder()
        .user_agent("ibis/0.1.0")
        .build()
        .context("failed to build upstream HTTP client")?;
    let base_url = reqwest::Url::parse(&config.upstream.base_url)
        .context("UPSTREAM_BASE_URL is not a valid URL")?;
    info!("Upstream analytical API: {}", base_url);

    let direct = DirectApiSource::new(
        client.clone(),
        base_url.clone(),
        Duration::from_secs(config.upstream.country_timeout_secs),
        Duration::from_secs(config.upstream.uploaders_timeout_secs),
    );
    let bulk = BulkApiSource::new(
        client,
        base_url,
        Duration::from_secs(config.upstream.bulk_timeout_secs),
        config.upstream.bulk_cache_entries,
        Duration::from_secs(config.upstream.bulk_cache_ttl_secs),
    );
    let snapshot = SnapshotSource::new();

    // Tier order is the trust/latency order: live endpoint, bulk search,
    // bundled snapshot.
    let tiers: Vec<Box<dyn TierSource>> = vec![
        Box::new(direct.clone()),
        Box::new(bulk),
        Box::new(snapshot),
    ];
    let engine = ResolutionEngine::new(tiers);

    let state = Arc::new(AppState {
        engine,
        uploaders: direct,
    });
    let router = create_api_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 API server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
