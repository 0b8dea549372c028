// src/store/mod.rs
//! Durable home for story records. The pipeline only appends; the feed only reads.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::ingest::types::StoryRecord;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Insert all records or none. Returns them with `id` and `created_at` set,
    /// in input order. Readers never observe a partially written batch.
    async fn insert_batch(&self, records: Vec<StoryRecord>) -> Result<Vec<StoryRecord>, StorageError>;

    /// Most recent `limit` records, newest (highest id) first.
    async fn latest(&self, limit: usize) -> Result<Vec<StoryRecord>, StorageError>;
}
