use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the analytical API, e.g. `https://campaigns.toolforge.org/api`
    pub base_url: String,
    /// Timeout for the per-coordinate country detail fetch (tier 1)
    pub country_timeout_secs: u64,
    /// Timeout for the per-country uploaders fetch
    pub uploaders_timeout_secs: u64,
    /// Timeout for the bulk per-campaign fetch (tier 2)
    pub bulk_timeout_secs: u64,
    /// TTL for cached bulk campaign payloads
    pub bulk_cache_ttl_secs: u64,
    /// Maximum number of cached bulk campaign payloads
    pub bulk_cache_entries: u64,
}

impl UpstreamConfig {
    const fn default_country_timeout_secs() -> u64 {
        60
    }

    const fn default_uploaders_timeout_secs() -> u64 {
        180
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let base_url = std::env::var("UPSTREAM_BASE_URL")
            .unwrap_or_else(|_| "https://campaigns.toolforge.org/api".to_string());

        let country_timeout_secs = env_u64(
            "COUNTRY_TIMEOUT_SECS",
            UpstreamConfig::default_country_timeout_secs(),
        );
        let uploaders_timeout_secs = env_u64(
            "UPLOADERS_TIMEOUT_SECS",
            UpstreamConfig::default_uploaders_timeout_secs(),
        );
        let bulk_timeout_secs = env_u64("BULK_TIMEOUT_SECS", 180);
        let bulk_cache_ttl_secs = env_u64("BULK_CACHE_TTL_SECS", 300);
        let bulk_cache_entries = env_u64("BULK_CACHE_ENTRIES", 64);

        Ok(Config {
            server: ServerConfig { host, port },
            upstream: UpstreamConfig {
                base_url,
                country_timeout_secs,
                uploaders_timeout_secs,
                bulk_timeout_secs,
                bulk_cache_ttl_secs,
                bulk_cache_entries,
            },
        })
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
