// src/ingest/fetcher.rs
//! Turn one story id into a scored record, or nothing.

use metrics::counter;

use crate::error::{IngestError, RemoteError};
use crate::ingest::filter::contains_blocked_keyword;
use crate::ingest::text::{extract_text, flatten};
use crate::ingest::types::{ItemResponse, StoryRecord, StorySource};
use crate::sentiment;

/// Fetch, filter and score one story.
///
/// Returns `None` when the story is blocked by keyword or when anything goes
/// wrong fetching or analysing it. Failures are logged here and never reach
/// the caller, so one bad story cannot sink a cycle.
pub async fn fetch_story<S: AsRef<str>>(
    source: &dyn StorySource,
    id: &str,
    blocked: &[S],
) -> Option<StoryRecord> {
    match try_fetch_story(source, id, blocked).await {
        Ok(Some(rec)) => {
            counter!("ingest_stories_total").increment(1);
            Some(rec)
        }
        Ok(None) => {
            counter!("ingest_filtered_total").increment(1);
            None
        }
        Err(e) => {
            tracing::error!(target: "ingest", story_id = id, error = %e, "story fetch failed");
            counter!("ingest_fetch_errors_total").increment(1);
            None
        }
    }
}

async fn try_fetch_story<S: AsRef<str>>(
    source: &dyn StorySource,
    id: &str,
    blocked: &[S],
) -> Result<Option<StoryRecord>, IngestError> {
    let mut item = source.item(id).await?;

    let title = item
        .title
        .take()
        .filter(|t| !t.is_empty())
        .ok_or(RemoteError::MissingField("title"))?;

    if contains_blocked_keyword(blocked, &title) {
        tracing::info!(target: "ingest", story_id = id, title = %title, "filtered: title contains a blocked keyword");
        return Ok(None);
    }

    // Parsing and scoring can take a while on big threads; keep it off the
    // async workers.
    let rec = tokio::task::spawn_blocking(move || build_story(title, item)).await?;
    Ok(Some(rec))
}

/// Build the record for an item whose `title` already passed the keyword filter.
/// The item's own `title` field is ignored.
///
/// Scoring runs whenever the story has children, even if none of them carry
/// text; the score is then 0.0 and `referenced_urls` is empty.
pub fn build_story(title: String, item: ItemResponse) -> StoryRecord {
    let ItemResponse {
        url,
        text,
        children,
        ..
    } = item;

    let body_text = text.as_deref().map(|t| extract_text(t).text);
    let mut rec = StoryRecord::new(title, url.unwrap_or_default(), body_text);

    if !children.is_empty() {
        let comments = extract_text(&flatten(&children));
        rec.sentiment_score = Some(sentiment::score(&comments.text));
        rec.referenced_urls = comments.links;
    }

    rec
}
