// src/ingest/mod.rs
pub mod client;
pub mod config;
pub mod fetcher;
pub mod filter;
pub mod scheduler;
pub mod text;
pub mod types;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::config::DEFAULT_CONCURRENCY;
use crate::error::StorageError;
use crate::ingest::fetcher::fetch_story;
use crate::ingest::types::{SearchQuery, StorySource};
use crate::store::StoryStore;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_cycles_total", "Ingest cycles started.");
        describe_counter!(
            "ingest_stories_total",
            "Stories fetched and scored successfully."
        );
        describe_counter!(
            "ingest_filtered_total",
            "Stories dropped because the title contains a blocked keyword."
        );
        describe_counter!(
            "ingest_fetch_errors_total",
            "Story fetches that failed (transport, status, decode, analysis)."
        );
        describe_counter!(
            "ingest_search_errors_total",
            "Search requests that failed; the cycle persisted nothing."
        );
        describe_counter!("ingest_persisted_total", "Records committed to storage.");
        describe_counter!(
            "ingest_storage_errors_total",
            "Batch commits that failed and were rolled back."
        );
        describe_counter!(
            "ingest_cycle_panics_total",
            "Cycles that panicked; the scheduler logged them and kept going."
        );
        describe_histogram!("ingest_cycle_ms", "Wall time of one ingest cycle in milliseconds.");
        describe_histogram!("ingest_remote_ms", "Remote API request time in milliseconds.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when the ingest pipeline last finished a cycle."
        );
    });
}

/// Run one ingest cycle: search, fetch up to `concurrency` stories at a time,
/// then persist every accepted record in a single batch.
///
/// Returns how many records were persisted. A failed search is logged and
/// counts as zero results; only a failed commit is returned as an error.
pub async fn run_once(
    source: &dyn StorySource,
    store: &dyn StoryStore,
    blocked: &[String],
    query: &SearchQuery,
    concurrency: usize,
) -> Result<usize, StorageError> {
    ensure_metrics_described();
    counter!("ingest_cycles_total").increment(1);
    let t0 = std::time::Instant::now();

    let ids = match source.search(query).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(
                target: "ingest",
                provider = source.name(),
                tags = %query.tags,
                filter = %query.numeric_filter,
                error = %e,
                "search failed"
            );
            counter!("ingest_search_errors_total").increment(1);
            return Ok(0);
        }
    };
    let candidates = ids.len();

    // `buffered` keeps search order no matter which fetch finishes first.
    let batch: Vec<_> = stream::iter(ids)
        .map(move |id| async move { fetch_story(source, &id, blocked).await })
        .buffered(concurrency.max(1))
        .filter_map(|rec| async move { rec })
        .collect()
        .await;

    let accepted = batch.len();
    let persisted = if batch.is_empty() {
        0
    } else {
        match store.insert_batch(batch).await {
            Ok(rows) => rows.len(),
            Err(e) => {
                counter!("ingest_storage_errors_total").increment(1);
                return Err(e);
            }
        }
    };

    let now = chrono::Utc::now().timestamp().max(0);
    counter!("ingest_persisted_total").increment(persisted as u64);
    histogram!("ingest_cycle_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    gauge!("ingest_last_run_ts").set(now as f64);

    tracing::info!(
        target: "ingest",
        candidates,
        dropped = candidates - accepted,
        persisted,
        "ingest cycle finished"
    );

    Ok(persisted)
}

/// Everything a cycle needs, bundled so the scheduler can share it.
pub struct Ingestor {
    source: Arc<dyn StorySource>,
    store: Arc<dyn StoryStore>,
    blocked: Vec<String>,
    concurrency: usize,
}

impl Ingestor {
    pub fn new(
        source: Arc<dyn StorySource>,
        store: Arc<dyn StoryStore>,
        blocked: Vec<String>,
    ) -> Self {
        Self {
            source,
            store,
            blocked,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn StoryStore> {
        &self.store
    }

    pub async fn run_once(&self, query: &SearchQuery) -> Result<usize, StorageError> {
        run_once(
            self.source.as_ref(),
            self.store.as_ref(),
            &self.blocked,
            query,
            self.concurrency,
        )
        .await
    }
}
