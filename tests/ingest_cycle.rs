// tests/ingest_cycle.rs
mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use cabbage_news::ingest::run_once;
use cabbage_news::store::MemoryStore;
use cabbage_news::{Ingestor, SearchQuery, StoryStore};
use common::{blocked, comment, story, FailingStore, FakeItem, FakeSource};

#[tokio::test]
async fn blocked_story_is_dropped_and_neutral_one_kept() {
    let source = FakeSource::new(&["1", "2"])
        .with_item("1", FakeItem::Ok(story("Google buys stuff", vec![])))
        .with_item("2", FakeItem::Ok(story("Neutral news", vec![])));
    let store = MemoryStore::new();

    let n = run_once(&source, &store, &blocked(), &SearchQuery::default(), 4)
        .await
        .unwrap();

    assert_eq!(n, 1);
    let rows = store.all().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Neutral news");
    assert_eq!(rows[0].sentiment_score, None);
    assert!(rows[0].id.is_some());
}

#[tokio::test]
async fn one_failed_fetch_does_not_sink_the_cycle() {
    let source = FakeSource::new(&["1", "2", "3"])
        .with_item("1", FakeItem::Ok(story("Rust 2.0 released", vec![comment("great", vec![])])))
        .with_item("2", FakeItem::Timeout)
        .with_item("3", FakeItem::Status(500));
    let store = MemoryStore::new();

    let n = run_once(&source, &store, &blocked(), &SearchQuery::default(), 4)
        .await
        .unwrap();

    assert_eq!(n, 1);
    let rows = store.all().await;
    assert_eq!(rows[0].title, "Rust 2.0 released");
    assert!(rows[0].sentiment_score.unwrap() > 0.0);
    assert_eq!(source.item_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn running_twice_duplicates_records() {
    let source = FakeSource::new(&["7"]).with_item("7", FakeItem::Ok(story("Same story", vec![])));
    let store = MemoryStore::new();
    let q = SearchQuery::default();

    assert_eq!(run_once(&source, &store, &blocked(), &q, 2).await.unwrap(), 1);
    assert_eq!(run_once(&source, &store, &blocked(), &q, 2).await.unwrap(), 1);

    let rows = store.all().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, rows[1].title);
    assert_ne!(rows[0].id, rows[1].id);
}

#[tokio::test]
async fn batch_keeps_search_order_when_fetches_finish_out_of_order() {
    let source = FakeSource::new(&["a", "b", "c", "d"])
        .with_item("a", FakeItem::Delayed(Duration::from_millis(80), story("first", vec![])))
        .with_item("b", FakeItem::Ok(story("second", vec![])))
        .with_item("c", FakeItem::Delayed(Duration::from_millis(40), story("third", vec![])))
        .with_item("d", FakeItem::Ok(story("fourth", vec![])));
    let store = MemoryStore::new();

    run_once(&source, &store, &blocked(), &SearchQuery::default(), 4)
        .await
        .unwrap();

    let titles: Vec<_> = store.all().await.into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["first", "second", "third", "fourth"]);

    // Feed order is newest id first, i.e. the reverse of search order.
    let feed: Vec<_> = store.latest(10).await.unwrap().into_iter().map(|r| r.title).collect();
    assert_eq!(feed, vec!["fourth", "third", "second", "first"]);
}

#[tokio::test]
async fn fetch_fan_out_is_bounded() {
    let ids: Vec<String> = (0..12).map(|i| i.to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut source = FakeSource::new(&id_refs);
    for id in &ids {
        source = source.with_item(
            id,
            FakeItem::Delayed(Duration::from_millis(20), story(&format!("story {id}"), vec![])),
        );
    }
    let store = MemoryStore::new();

    let n = run_once(&source, &store, &blocked(), &SearchQuery::default(), 3)
        .await
        .unwrap();

    assert_eq!(n, 12);
    let peak = source.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in-flight fetches = {peak}");
    assert!(peak > 1, "fetches should overlap, peak = {peak}");
}

#[tokio::test]
async fn failed_search_is_zero_results() {
    let source = FakeSource::failing_search();
    let store = MemoryStore::new();

    let n = run_once(&source, &store, &blocked(), &SearchQuery::default(), 4)
        .await
        .unwrap();

    assert_eq!(n, 0);
    assert!(store.is_empty().await);
    assert_eq!(source.item_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn storage_failure_aborts_the_cycle() {
    let source = FakeSource::new(&["1"]).with_item("1", FakeItem::Ok(story("Fine story", vec![])));
    let store = FailingStore::default();

    let err = run_once(&source, &store, &blocked(), &SearchQuery::default(), 4)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("disk on fire"));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn nothing_accepted_means_no_write() {
    let source = FakeSource::new(&["1", "2"])
        .with_item("1", FakeItem::Ok(story("bitcoin to the moon", vec![])))
        .with_item("2", FakeItem::Status(404));
    let store = FailingStore::default();

    let n = run_once(&source, &store, &blocked(), &SearchQuery::default(), 4)
        .await
        .unwrap();

    assert_eq!(n, 0);
    assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn untitled_items_are_dropped() {
    let mut untitled = story("x", vec![]);
    untitled.title = None;
    let mut blank = story("x", vec![]);
    blank.title = Some(String::new());
    let source = FakeSource::new(&["1", "2", "3"])
        .with_item("1", FakeItem::Ok(untitled))
        .with_item("2", FakeItem::Ok(story("Titled", vec![])))
        .with_item("3", FakeItem::Ok(blank));
    let store = MemoryStore::new();

    let n = run_once(&source, &store, &blocked(), &SearchQuery::default(), 4)
        .await
        .unwrap();

    assert_eq!(n, 1);
    assert_eq!(store.all().await[0].title, "Titled");
}

#[tokio::test]
async fn ingestor_bundles_the_same_cycle() {
    let source = Arc::new(
        FakeSource::new(&["1"]).with_item(
            "1",
            FakeItem::Ok(story(
                "Comments with links",
                vec![comment(
                    r#"<p>see <a href="https://docs.test/a">docs</a></p>"#,
                    vec![comment("<i>nope</i>", vec![])],
                )],
            )),
        ),
    );
    let store = Arc::new(MemoryStore::new());
    let ingestor = Ingestor::new(source, store.clone(), blocked()).with_concurrency(2);

    assert_eq!(ingestor.run_once(&SearchQuery::default()).await.unwrap(), 1);

    let rows = store.all().await;
    assert_eq!(rows[0].referenced_urls, vec!["https://docs.test/a"]);
    assert!(rows[0].sentiment_score.is_some());
}

#[tokio::test]
async fn cycle_runs_on_a_spawned_task() {
    let source = Arc::new(
        FakeSource::new(&["1", "2"])
            .with_item("1", FakeItem::Ok(story("one", vec![comment("nice", vec![])])))
            .with_item("2", FakeItem::Delayed(Duration::from_millis(10), story("two", vec![]))),
    );
    let store = Arc::new(MemoryStore::new());
    let ingestor = Arc::new(Ingestor::new(source, store.clone(), blocked()).with_concurrency(2));

    let task = tokio::spawn({
        let ingestor = Arc::clone(&ingestor);
        async move { ingestor.run_once(&SearchQuery::default()).await }
    });

    assert_eq!(task.await.unwrap().unwrap(), 2);
    let titles: Vec<_> = store.all().await.into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["one", "two"]);
}
