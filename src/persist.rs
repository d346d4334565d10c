//! Model blobs on disk: the stopword list and the trained classifier.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::config::RevsentConfig;
use crate::features::HashingVectorizer;
use crate::ml::{ClassifierError, SgdClassifier};
use crate::predict::SentimentModel;
use crate::text::{Normalizer, StopwordSet, TextError};

pub const STOPWORDS_FILE_NAME: &str = "stopwords.json";
pub const CLASSIFIER_FILE_NAME: &str = "classifier.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to create model directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Rejected classifier in {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: ClassifierError,
    },
    #[error(transparent)]
    Text(#[from] TextError),
}

/// Write both blobs into `dir`, creating it if needed.
pub fn save(dir: &Path, stopwords: &StopwordSet, classifier: &SgdClassifier) -> Result<(), PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    write_json(&dir.join(STOPWORDS_FILE_NAME), stopwords)?;
    write_json(&dir.join(CLASSIFIER_FILE_NAME), classifier)?;
    tracing::info!("Saved model objects to {}", dir.display());
    Ok(())
}

/// Read both blobs back from `dir`.
pub fn load(dir: &Path) -> Result<(StopwordSet, SgdClassifier), PersistError> {
    let stopwords: StopwordSet = read_json(&dir.join(STOPWORDS_FILE_NAME))?;
    let classifier_path = dir.join(CLASSIFIER_FILE_NAME);
    let classifier: SgdClassifier = read_json(&classifier_path)?;
    classifier
        .validate()
        .map_err(|source| PersistError::Invalid {
            path: classifier_path,
            source,
        })?;
    Ok((stopwords, classifier))
}

/// Load both blobs and rebuild the inference pipeline around them.
///
/// Text and feature settings come from `config`; the feature dimension must match the
/// stored classifier.
pub fn load_model(dir: &Path, config: &RevsentConfig) -> Result<SentimentModel, PersistError> {
    let (stopwords, classifier) = load(dir)?;
    let normalizer = Normalizer::from_settings(&config.text, stopwords)?;
    let vectorizer = HashingVectorizer::new(&config.features, normalizer);
    SentimentModel::new(vectorizer, classifier).map_err(|source| PersistError::Invalid {
        path: dir.join(CLASSIFIER_FILE_NAME),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let bytes = serde_json::to_vec(value).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let bytes = fs::read(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })
}
