// src/store/memory.rs
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::ingest::types::StoryRecord;
use crate::store::StoryStore;

/// In-process store. Batches are applied under one write lock, so readers see
/// either none or all of a batch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<StoryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Every stored record in insertion order.
    pub async fn all(&self) -> Vec<StoryRecord> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl StoryStore for MemoryStore {
    async fn insert_batch(&self, records: Vec<StoryRecord>) -> Result<Vec<StoryRecord>, StorageError> {
        let mut rows = self.rows.write().await;
        let mut next_id = rows.last().and_then(|r| r.id).unwrap_or(0) + 1;
        let now = Utc::now();

        let mut out = Vec::with_capacity(records.len());
        for mut rec in records {
            rec.id = Some(next_id);
            rec.created_at = Some(now);
            next_id += 1;
            out.push(rec);
        }
        rows.extend(out.iter().cloned());
        Ok(out)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<StoryRecord>, StorageError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }
}
