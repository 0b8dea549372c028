// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// A persisted (or about to be persisted) story.
///
/// `id` and `created_at` are assigned by the store on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoryRecord {
    pub id: Option<i64>,
    pub title: String,
    /// Empty when upstream omits the link (Ask HN and friends).
    pub url: String,
    #[serde(rename = "text")]
    pub body_text: Option<String>,
    /// Anchor targets from the comment tree, document order, duplicates kept.
    #[serde(rename = "urls_in_content")]
    pub referenced_urls: Vec<String>,
    /// Set iff the story had at least one child comment.
    #[serde(rename = "user_sentiment")]
    pub sentiment_score: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl StoryRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>, body_text: Option<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            url: url.into(),
            body_text,
            referenced_urls: Vec::new(),
            sentiment_score: None,
            created_at: None,
        }
    }
}

/// One node of a story's comment tree, as the item endpoint returns it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawComment {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<RawComment>,
}

/// `GET /api/v1/items/{id}` body. Only the fields the pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<RawComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
}

/// Search parameters passed through to `search_by_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub tags: String,
    pub numeric_filter: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            tags: "front_page".to_string(),
            numeric_filter: "points>10".to_string(),
        }
    }
}

/// Remote side of the pipeline: search for story ids, then fetch each item.
#[async_trait::async_trait]
pub trait StorySource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>, RemoteError>;
    async fn item(&self, id: &str) -> Result<ItemResponse, RemoteError>;
    fn name(&self) -> &'static str;
}
