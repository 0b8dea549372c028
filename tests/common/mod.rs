// tests/common/mod.rs
//! In-process fakes for the remote API and storage.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cabbage_news::error::{RemoteError, StorageError};
use cabbage_news::ingest::types::{ItemResponse, RawComment, SearchQuery, StorySource};
use cabbage_news::{StoryRecord, StoryStore};

#[derive(Clone)]
pub enum FakeItem {
    Ok(ItemResponse),
    Delayed(Duration, ItemResponse),
    Timeout,
    Status(u16),
}

#[derive(Default)]
pub struct FakeSource {
    /// `None` makes the search request fail.
    hits: Option<Vec<String>>,
    items: HashMap<String, FakeItem>,
    panic_on_search: bool,
    search_delay: Option<Duration>,
    pub search_calls: AtomicUsize,
    pub item_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn new(hits: &[&str]) -> Self {
        Self {
            hits: Some(hits.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn failing_search() -> Self {
        Self::default()
    }

    pub fn panicking() -> Self {
        Self {
            panic_on_search: true,
            ..Self::new(&[])
        }
    }

    pub fn with_item(mut self, id: &str, item: FakeItem) -> Self {
        self.items.insert(id.to_string(), item);
        self
    }

    pub fn with_search_delay(mut self, d: Duration) -> Self {
        self.search_delay = Some(d);
        self
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorySource for FakeSource {
    async fn search(&self, _query: &SearchQuery) -> Result<Vec<String>, RemoteError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_search {
            panic!("search blew up");
        }
        if let Some(d) = self.search_delay {
            tokio::time::sleep(d).await;
        }
        self.hits.clone().ok_or(RemoteError::Status(503))
    }

    async fn item(&self, id: &str) -> Result<ItemResponse, RemoteError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let out = match self.items.get(id).cloned() {
            Some(FakeItem::Ok(item)) => Ok(item),
            Some(FakeItem::Delayed(d, item)) => {
                tokio::time::sleep(d).await;
                Ok(item)
            }
            Some(FakeItem::Timeout) => Err(RemoteError::Timeout),
            Some(FakeItem::Status(code)) => Err(RemoteError::Status(code)),
            None => Err(RemoteError::Status(404)),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        out
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Store whose commits always fail.
#[derive(Default)]
pub struct FailingStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl StoryStore for FailingStore {
    async fn insert_batch(&self, _records: Vec<StoryRecord>) -> Result<Vec<StoryRecord>, StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable("disk on fire".into()))
    }

    async fn latest(&self, _limit: usize) -> Result<Vec<StoryRecord>, StorageError> {
        Err(StorageError::Unavailable("disk on fire".into()))
    }
}

pub fn story(title: &str, children: Vec<RawComment>) -> ItemResponse {
    ItemResponse {
        title: Some(title.to_string()),
        url: Some(format!("https://example.test/{}", title.replace(' ', "-"))),
        text: None,
        children,
    }
}

pub fn comment(text: &str, children: Vec<RawComment>) -> RawComment {
    RawComment {
        text: Some(text.to_string()),
        children,
    }
}

pub fn blocked() -> Vec<String> {
    vec!["google".to_string(), "bitcoin".to_string()]
}
