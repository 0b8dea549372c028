// src/error.rs
//! Error taxonomy for the ingest pipeline.
//!
//! Remote and extraction errors are recovered close to where they happen
//! (the story or search result is dropped). Storage errors abort the current
//! cycle and are reported to the scheduler, which logs and carries on.

use thiserror::Error;

/// Failure talking to the remote search API.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response is missing required field `{0}`")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else if let Some(status) = e.status() {
            RemoteError::Status(status.as_u16())
        } else {
            RemoteError::Transport(e)
        }
    }
}

/// Markup that cannot be read as text at all. Ill-formed HTML is tolerated.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("markup is not valid UTF-8: {0}")]
    MalformedInput(#[from] std::str::Utf8Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Everything that can stop a single story from becoming a record.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
