// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod sentiment;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::AppConfig;
pub use crate::ingest::scheduler::{IngestSchedulerCfg, SchedulerHandle, SchedulerState};
pub use crate::ingest::types::{SearchQuery, StoryRecord, StorySource};
pub use crate::ingest::{run_once, Ingestor};
pub use crate::store::StoryStore;

use crate::ingest::client::AlgoliaClient;
use crate::store::SqliteStore;

/// Start the perpetual ingest loop as a background task. It keeps running
/// until [`SchedulerHandle::shutdown`] or process exit.
pub fn start_ingest(ingestor: Arc<Ingestor>, cfg: IngestSchedulerCfg) -> SchedulerHandle {
    ingest::scheduler::spawn_scheduler(ingestor, cfg)
}

/// Wire the service from config: open storage, start ingest, build the feed router.
pub async fn app(cfg: &AppConfig) -> anyhow::Result<(Router, SchedulerHandle)> {
    let store: Arc<dyn StoryStore> = Arc::new(
        SqliteStore::open(&cfg.database_path)
            .await
            .with_context(|| format!("opening {}", cfg.database_path.display()))?,
    );
    let source = Arc::new(AlgoliaClient::new(cfg.api_base.clone()).with_timeout(cfg.request_timeout));

    let ingestor = Ingestor::new(source, Arc::clone(&store), cfg.blocked_keywords.clone())
        .with_concurrency(cfg.concurrency);
    let scheduler = start_ingest(
        Arc::new(ingestor),
        IngestSchedulerCfg {
            interval: cfg.interval,
            query: cfg.query.clone(),
        },
    );

    let state = api::AppState::new(store).with_feed_limit(cfg.feed_limit);
    Ok((router(state), scheduler))
}
