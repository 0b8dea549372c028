// src/config.rs
//! Process configuration from environment variables (`.env` is loaded by the binary).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::ingest::config::load_blocklist_default;
use crate::ingest::types::SearchQuery;

pub const ENV_API_BASE: &str = "INGEST_API_BASE";
pub const ENV_TAGS: &str = "INGEST_TAGS";
pub const ENV_NUMERIC_FILTER: &str = "INGEST_NUMERIC_FILTER";
pub const ENV_INTERVAL_SECS: &str = "INGEST_INTERVAL_SECS";
pub const ENV_TIMEOUT_SECS: &str = "INGEST_TIMEOUT_SECS";
pub const ENV_CONCURRENCY: &str = "INGEST_CONCURRENCY";
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";
pub const ENV_FEED_LIMIT: &str = "FEED_LIMIT";

pub const DEFAULT_API_BASE: &str = "https://hn.algolia.com";
pub const DEFAULT_INTERVAL_SECS: u64 = 6 * 3600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_DATABASE_PATH: &str = "db/cabbage_news.sqlite";
pub const DEFAULT_FEED_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub query: SearchQuery,
    pub interval: Duration,
    pub request_timeout: Duration,
    pub concurrency: usize,
    pub database_path: PathBuf,
    pub feed_limit: usize,
    pub blocked_keywords: Vec<String>,
}

impl AppConfig {
    /// Read every setting from the environment, falling back to defaults for
    /// missing or unparsable values. Fails only if the blocklist file is unusable.
    pub fn from_env() -> Result<Self> {
        let defaults = SearchQuery::default();
        let query = SearchQuery {
            tags: env_string(ENV_TAGS).unwrap_or(defaults.tags),
            numeric_filter: env_string(ENV_NUMERIC_FILTER).unwrap_or(defaults.numeric_filter),
        };

        Ok(Self {
            api_base: env_string(ENV_API_BASE).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            query,
            interval: Duration::from_secs(
                parse_u64(env_string(ENV_INTERVAL_SECS))
                    .filter(|s| *s > 0)
                    .unwrap_or(DEFAULT_INTERVAL_SECS),
            ),
            request_timeout: Duration::from_secs(
                parse_u64(env_string(ENV_TIMEOUT_SECS))
                    .map(|s| s.clamp(1, 120))
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            concurrency: parse_u64(env_string(ENV_CONCURRENCY))
                .map(|n| n.clamp(1, 64) as usize)
                .unwrap_or(DEFAULT_CONCURRENCY),
            database_path: env_string(ENV_DATABASE_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            feed_limit: parse_u64(env_string(ENV_FEED_LIMIT))
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_FEED_LIMIT),
            blocked_keywords: load_blocklist_default()?,
        })
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_u64(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.parse::<u64>().ok())
}
