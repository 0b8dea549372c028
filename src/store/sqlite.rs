// src/store/sqlite.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::ingest::types::StoryRecord;
use crate::store::StoryStore;

const MIGRATIONS: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS news (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT NOT NULL,
        text TEXT,
        urls_in_content TEXT NOT NULL DEFAULT '[]',
        user_sentiment REAL,
        created_at TEXT NOT NULL
    )
    "#];

pub struct SqliteStore {
    pool: SqlitePool,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the table exists.
    pub async fn open(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        let store = Self {
            pool,
            db_path: Some(db_path.to_path_buf()),
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database. One connection, since every SQLite
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let opts: SqliteConnectOptions = "sqlite::memory:".parse()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        let store = Self {
            pool,
            db_path: None,
        };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        for migration in MIGRATIONS {
            sqlx::query(*migration).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

fn row_to_record(row: &SqliteRow) -> Result<StoryRecord, StorageError> {
    let urls: String = row.try_get("urls_in_content")?;
    Ok(StoryRecord {
        id: Some(row.try_get("id")?),
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        body_text: row.try_get("text")?,
        referenced_urls: serde_json::from_str(&urls)?,
        sentiment_score: row.try_get("user_sentiment")?,
        created_at: Some(row.try_get::<DateTime<Utc>, _>("created_at")?),
    })
}

#[async_trait]
impl StoryStore for SqliteStore {
    async fn insert_batch(&self, records: Vec<StoryRecord>) -> Result<Vec<StoryRecord>, StorageError> {
        let now = Utc::now();
        // Dropping `tx` on any early return rolls the whole batch back.
        let mut tx = self.pool.begin().await?;

        let mut out = Vec::with_capacity(records.len());
        for mut rec in records {
            let urls = serde_json::to_string(&rec.referenced_urls)?;
            let res = sqlx::query(
                r#"
                INSERT INTO news (title, url, text, urls_in_content, user_sentiment, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&rec.title)
            .bind(&rec.url)
            .bind(rec.body_text.as_deref())
            .bind(urls)
            .bind(rec.sentiment_score)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            rec.id = Some(res.last_insert_rowid());
            rec.created_at = Some(now);
            out.push(rec);
        }

        tx.commit().await?;
        Ok(out)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<StoryRecord>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, url, text, urls_in_content, user_sentiment, created_at
            FROM news
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }
}
