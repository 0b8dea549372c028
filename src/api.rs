use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::config::DEFAULT_FEED_LIMIT;
use crate::error::StorageError;
use crate::ingest::types::StoryRecord;
use crate::store::StoryStore;

pub const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StoryStore>,
    pub feed_limit: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn StoryStore>) -> Self {
        Self {
            store,
            feed_limit: DEFAULT_FEED_LIMIT,
        }
    }

    pub fn with_feed_limit(mut self, limit: usize) -> Self {
        self.feed_limit = limit.max(1);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/feed", get(feed))
        .route("/api/news", get(api_news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Storage failures surface to feed readers as a plain 500.
struct ApiError(StorageError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "feed query failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "storage unavailable" })),
        )
            .into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        Self(e)
    }
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "Hello World" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "message": "OK",
    }))
}

#[derive(Serialize)]
struct NewsOut {
    items: Vec<StoryRecord>,
}

async fn api_news(State(state): State<AppState>) -> Result<Json<NewsOut>, ApiError> {
    let items = state.store.latest(state.feed_limit).await?;
    Ok(Json(NewsOut { items }))
}

#[derive(Serialize)]
pub struct JsonFeed {
    pub version: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub items: Vec<JsonFeedItem>,
}

#[derive(Serialize)]
pub struct JsonFeedItem {
    pub id: Option<i64>,
    pub title: String,
    pub url: String,
    pub content_text: String,
    pub date_published: Option<String>,
    pub summary: Option<String>,
}

impl From<StoryRecord> for JsonFeedItem {
    fn from(rec: StoryRecord) -> Self {
        Self {
            id: rec.id,
            title: rec.title,
            url: rec.url,
            content_text: rec.referenced_urls.join("\n"),
            date_published: rec.created_at.map(|t| t.to_rfc3339()),
            summary: rec.body_text,
        }
    }
}

async fn feed(State(state): State<AppState>) -> Result<Json<JsonFeed>, ApiError> {
    let rows = state.store.latest(state.feed_limit).await?;
    Ok(Json(JsonFeed {
        version: JSON_FEED_VERSION,
        title: "Cabbage.news Feed",
        description: "Curated feed from hackernews",
        items: rows.into_iter().map(JsonFeedItem::from).collect(),
    }))
}
