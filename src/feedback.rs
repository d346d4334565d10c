//! SQLite store of user-labeled reviews and the model update that replays them.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};
use thiserror::Error;

use crate::dataset::{Record, Sentiment};
use crate::ml::ClassifierError;
use crate::predict::SentimentModel;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Database query failed: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("Database is busy, please retry")]
    Busy,
    #[error("Could not create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Stored review {id} has invalid sentiment {value}")]
    InvalidSentiment { id: i64, value: i64 },
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// A labeled review as stored, with its row id and insertion time (epoch seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReview {
    pub id: i64,
    pub record: Record,
    pub date: i64,
}

/// Reviews collected after deployment, keyed by insertion order.
pub struct ReviewStore {
    connection: Connection,
}

impl ReviewStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FeedbackError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| FeedbackError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let connection = Connection::open(path).map_err(map_sql_error)?;
        Self::with_connection(connection)
    }

    pub fn open_in_memory() -> Result<Self, FeedbackError> {
        Self::with_connection(Connection::open_in_memory().map_err(map_sql_error)?)
    }

    fn with_connection(connection: Connection) -> Result<Self, FeedbackError> {
        connection
            .execute_batch(
                "PRAGMA busy_timeout=5000;
                 CREATE TABLE IF NOT EXISTS reviews (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    review TEXT NOT NULL,
                    sentiment INTEGER NOT NULL,
                    date INTEGER NOT NULL
                 );",
            )
            .map_err(map_sql_error)?;
        Ok(Self { connection })
    }

    pub fn insert(&self, review: &str, sentiment: Sentiment) -> Result<i64, FeedbackError> {
        self.connection
            .execute(
                "INSERT INTO reviews (review, sentiment, date) VALUES (?1, ?2, ?3)",
                params![review, sentiment.label() as i64, now_epoch_seconds()],
            )
            .map_err(map_sql_error)?;
        Ok(self.connection.last_insert_rowid())
    }

    pub fn count(&self) -> Result<u64, FeedbackError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))
            .map_err(map_sql_error)?;
        Ok(count.max(0) as u64)
    }

    /// Up to `size` reviews with id greater than `after_id`, in id order.
    pub fn fetch_batch(&self, after_id: i64, size: usize) -> Result<Vec<StoredReview>, FeedbackError> {
        let mut stmt = self
            .connection
            .prepare_cached(
                "SELECT id, review, sentiment, date FROM reviews
                 WHERE id > ?1 ORDER BY id LIMIT ?2",
            )
            .map_err(map_sql_error)?;
        let rows = stmt
            .query_map(params![after_id, size as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(map_sql_error)?;
        let mut out = Vec::new();
        for row in rows {
            let (id, review, value, date) = row.map_err(map_sql_error)?;
            let sentiment = u8::try_from(value)
                .ok()
                .and_then(Sentiment::from_label)
                .ok_or(FeedbackError::InvalidSentiment { id, value })?;
            out.push(StoredReview {
                id,
                record: Record::new(review, sentiment),
                date,
            });
        }
        Ok(out)
    }
}

/// Replay every stored review into `model`, `batch_size` rows per incremental update.
///
/// Returns the number of reviews applied.
pub fn update_model(
    store: &ReviewStore,
    model: &mut SentimentModel,
    batch_size: usize,
) -> Result<u64, FeedbackError> {
    let batch_size = batch_size.max(1);
    let mut after_id = 0i64;
    let mut applied = 0u64;
    loop {
        let rows = store.fetch_batch(after_id, batch_size)?;
        let Some(last) = rows.last() else {
            break;
        };
        after_id = last.id;
        let texts: Vec<&str> = rows.iter().map(|r| r.record.review.as_str()).collect();
        let labels: Vec<Sentiment> = rows.iter().map(|r| r.record.sentiment).collect();
        model.update(&texts, &labels)?;
        applied += rows.len() as u64;
        tracing::debug!("Applied {} stored reviews (through id {after_id})", rows.len());
    }
    tracing::info!("Updated model with {applied} stored reviews");
    Ok(applied)
}

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn map_sql_error(err: rusqlite::Error) -> FeedbackError {
    match err {
        rusqlite::Error::SqliteFailure(sql_err, _)
            if sql_err.code == rusqlite::ErrorCode::DatabaseBusy =>
        {
            FeedbackError::Busy
        }
        other => FeedbackError::Sql(other),
    }
}
