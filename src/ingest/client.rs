// src/ingest/client.rs
use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use crate::error::RemoteError;
use crate::ingest::types::{ItemResponse, SearchQuery, SearchResponse, StorySource};

/// HN Algolia search API client.
#[derive(Clone)]
pub struct AlgoliaClient {
    base: String,
    client: Client,
    timeout: Duration,
}

impl Default for AlgoliaClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl AlgoliaClient {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let t0 = std::time::Instant::now();
        let resp = self
            .client
            .get(format!("{}{}", self.base, path))
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        let body = resp.bytes().await?;
        histogram!("ingest_remote_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        decode(&body)
    }
}

/// Decode a JSON body without serde_json's nesting limit; comment threads on
/// busy stories go deeper than the default 128 levels.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let value = <T as serde::Deserialize>::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

#[async_trait]
impl StorySource for AlgoliaClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>, RemoteError> {
        let resp: SearchResponse = self
            .get_json(
                "/api/v1/search_by_date",
                &[
                    ("tags", query.tags.as_str()),
                    ("numericFilters", query.numeric_filter.as_str()),
                ],
            )
            .await?;
        Ok(resp.hits.into_iter().map(|h| h.object_id).collect())
    }

    async fn item(&self, id: &str) -> Result<ItemResponse, RemoteError> {
        self.get_json(&format!("/api/v1/items/{id}"), &[]).await
    }

    fn name(&self) -> &'static str {
        "algolia"
    }
}
