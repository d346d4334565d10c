//! Labeled review data: the CSV record stream and the tree-to-CSV builder.

use std::path::PathBuf;

use thiserror::Error;

pub mod imdb;
mod record;
mod stream;

pub use record::{Batch, Record, Sentiment};
pub use stream::{MiniBatches, ReviewStream, StreamState};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Malformed row or a label outside `{0, 1}`.
    #[error("invalid review row{}: {source}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Csv {
        line: Option<u64>,
        source: csv::Error,
    },
    #[error("review directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read review {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: csv::Error,
    },
    #[error("failed to flush {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
}
