//! Tier data sources for the resolution chain.
//!
//! A [`TierSource`] is one candidate provider of a country-year record. The
//! engine only sees the trait; the concrete sources wrap the live direct
//! endpoint, the bulk per-campaign endpoint, and the bundled snapshot data.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Client, StatusCode, Url};
use rust_embed::RustEmbed;
use serde_json::Value;
use tracing::debug;

use super::error::{ResolveError, ResolveResult};
use super::models::{Coordinate, CountryStatRecord};
use super::normalize;
use crate::catalog;

/// One candidate data source in the fallback chain. Implementations are pure
/// reads: a fetch has no side effects and may be dropped mid-flight.
#[async_trait]
pub trait TierSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch and normalize the record for one coordinate. Any failure kind
    /// (transport, not-found, malformed) is a fallthrough signal to the
    /// engine, never a terminal error by itself.
    async fn fetch(&self, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord>;
}

/// Tier 1: the per-coordinate live endpoint
/// (`GET {base}/data/{campaign}/{year}/{country}`).
#[derive(Clone)]
pub struct DirectApiSource {
    client: Client,
    base_url: Url,
    detail_timeout: Duration,
    uploaders_timeout: Duration,
}

impl DirectApiSource {
    pub fn new(
        client: Client,
        base_url: Url,
        detail_timeout: Duration,
        uploaders_timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            detail_timeout,
            uploaders_timeout,
        }
    }

    fn endpoint(&self, coordinate: &Coordinate, trailing: Option<&str>) -> ResolveResult<Url> {
        let mut url = self.base_url.clone();
        let year = coordinate.year.to_string();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ResolveError::malformed("direct", "base URL cannot be a base"))?;
            segments.extend([
                "data",
                coordinate.campaign.as_str(),
                year.as_str(),
                coordinate.country.as_str(),
            ]);
            if let Some(segment) = trailing {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url, timeout: Duration, coordinate: &Coordinate) -> ResolveResult<Value> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ResolveError::not_found(coordinate, "direct endpoint returned 404"));
        }
        let response = response.error_for_status()?;
        response
            .json()
            .await
            .map_err(|err| ResolveError::malformed("direct", err.to_string()))
    }

    /// Fetch the per-country uploaders listing. This is a passthrough for
    /// the UI (no canonical shape is defined upstream), with the longer
    /// uploaders-class timeout.
    pub async fn fetch_uploaders(&self, coordinate: &Coordinate) -> ResolveResult<Value> {
        let url = self.endpoint(coordinate, Some("uploaders"))?;
        self.get_json(url, self.uploaders_timeout, coordinate).await
    }
}

#[async_trait]
impl TierSource for DirectApiSource {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord> {
        let url = self.endpoint(coordinate, None)?;
        let payload = self.get_json(url, self.detail_timeout, coordinate).await?;
        normalize::from_direct(&payload, coordinate)
    }
}

/// Tier 2: the bulk per-campaign endpoint (`GET {base}/data/{campaign}`),
/// searched in memory for the requested year and country.
///
/// Bulk payloads cover every year and country of a campaign and change
/// rarely, so they are cached with a TTL to keep repeated fallthroughs from
/// re-fetching them.
pub struct BulkApiSource {
    client: Client,
    base_url: Url,
    timeout: Duration,
    cache: Cache<String, Arc<Value>>,
}

impl BulkApiSource {
    pub fn new(
        client: Client,
        base_url: Url,
        timeout: Duration,
        cache_entries: u64,
        cache_ttl: Duration,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(cache_entries)
            .time_to_live(cache_ttl)
            .build();
        Self {
            client,
            base_url,
            timeout,
            cache,
        }
    }

    async fn campaign_payload(&self, campaign: &str) -> ResolveResult<Arc<Value>> {
        if let Some(payload) = self.cache.get(campaign).await {
            debug!(campaign, "bulk payload served from cache");
            return Ok(payload);
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ResolveError::malformed("bulk", "base URL cannot be a base"))?
            .extend(["data", campaign]);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let payload: Value = response
            .json()
            .await
            .map_err(|err| ResolveError::malformed("bulk", err.to_string()))?;

        let payload = Arc::new(payload);
        self.cache
            .insert(campaign.to_string(), Arc::clone(&payload))
            .await;
        Ok(payload)
    }
}

#[async_trait]
impl TierSource for BulkApiSource {
    fn name(&self) -> &'static str {
        "bulk"
    }

    async fn fetch(&self, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord> {
        let payload = self.campaign_payload(&coordinate.campaign).await?;
        normalize::from_bulk(&payload, coordinate)
    }
}

/// Bundled per-campaign snapshot datasets, embedded at compile time.
#[derive(RustEmbed)]
#[folder = "data/"]
struct SnapshotAssets;

/// Tier 3: the bundled static snapshot, keyed by campaign slug. Loaded from
/// assets embedded at build time, immutable for the process lifetime.
#[derive(Default)]
pub struct SnapshotSource;

impl SnapshotSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TierSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch(&self, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord> {
        // The snapshot files track the catalog; a slug outside it can never
        // have bundled data, whatever files happen to be embedded.
        if catalog::display_name(&coordinate.campaign).is_none() {
            return Err(ResolveError::not_found(
                coordinate,
                format!("unknown campaign {}", coordinate.campaign),
            ));
        }
        let file = format!("{}.json", coordinate.campaign);
        let asset = SnapshotAssets::get(&file).ok_or_else(|| {
            ResolveError::not_found(
                coordinate,
                format!("no bundled snapshot for campaign {}", coordinate.campaign),
            )
        })?;
        let payload: Value = serde_json::from_slice(&asset.data)
            .map_err(|err| ResolveError::malformed("snapshot", err.to_string()))?;
        normalize::from_snapshot(&payload, coordinate)
    }
}
