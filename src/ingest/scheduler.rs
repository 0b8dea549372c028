// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_INTERVAL_SECS;
use crate::ingest::types::SearchQuery;
use crate::ingest::Ingestor;

#[derive(Clone, Debug)]
pub struct IngestSchedulerCfg {
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    pub query: SearchQuery,
}

impl Default for IngestSchedulerCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            query: SearchQuery::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Handle to the background ingest loop.
pub struct SchedulerHandle {
    state: watch::Receiver<SchedulerState>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stop the loop. A cycle in progress is allowed to finish (its batch is
    /// committed or rolled back as a whole); a pending sleep ends immediately.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            tracing::error!(target: "ingest", error = %e, "scheduler task ended abnormally");
        }
    }
}

/// Spawn the perpetual ingest loop: run a cycle, go idle for `interval`, repeat.
///
/// Nothing a cycle does can end the loop. Storage errors and even panics
/// inside a cycle are logged and the next tick proceeds as usual.
pub fn spawn_scheduler(ingestor: Arc<Ingestor>, cfg: IngestSchedulerCfg) -> SchedulerHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let (tx, rx) = watch::channel(SchedulerState::Idle);

    let join = tokio::spawn(async move {
        tracing::info!(
            target: "ingest",
            interval_secs = cfg.interval.as_secs(),
            tags = %cfg.query.tags,
            filter = %cfg.query.numeric_filter,
            "ingest scheduler started"
        );

        while !token.is_cancelled() {
            tx.send_replace(SchedulerState::Running);
            run_cycle(&ingestor, &cfg.query).await;
            tx.send_replace(SchedulerState::Idle);

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(cfg.interval) => {}
            }
        }

        tracing::info!(target: "ingest", "ingest scheduler stopped");
    });

    SchedulerHandle {
        state: rx,
        cancel,
        join,
    }
}

async fn run_cycle(ingestor: &Arc<Ingestor>, query: &SearchQuery) {
    tracing::info!(target: "ingest", "ingesting new stories");

    let ingestor = Arc::clone(ingestor);
    let query = query.clone();
    let outcome = tokio::spawn(async move { ingestor.run_once(&query).await }).await;

    match outcome {
        Ok(Ok(persisted)) => {
            tracing::info!(target: "ingest", persisted, "ingest tick");
        }
        Ok(Err(e)) => {
            tracing::error!(target: "ingest", error = %e, "ingest cycle aborted, batch not persisted");
        }
        Err(e) => {
            counter!("ingest_cycle_panics_total").increment(1);
            tracing::error!(target: "ingest", error = %e, "ingest cycle crashed");
        }
    }
}
