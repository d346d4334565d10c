//! Out-of-core training: stream, update, hold out, persist.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::RevsentConfig;
use crate::dataset::{DatasetError, ReviewStream};
use crate::ml::ClassifierError;
use crate::persist::{self, PersistError};
use crate::text::{StopwordSet, TextError};
use crate::predict::SentimentModel;

mod trainer;

pub use trainer::{HoldoutReport, StreamingTrainer, TrainReport};

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Text(#[from] TextError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("no reviews left for the hold-out set")]
    EmptyHoldout,
}

/// Everything a full training run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub train: TrainReport,
    /// `None` when the stream ran dry before the hold-out or the hold-out is disabled.
    pub holdout: Option<HoldoutReport>,
    pub model_dir: PathBuf,
}

/// Train from `csv`, score a hold-out batch and persist the model blobs into `model_dir`.
pub fn run(config: &RevsentConfig, csv: &Path, model_dir: &Path) -> Result<(SentimentModel, RunReport), TrainError> {
    let stopwords = StopwordSet::english();
    let model = SentimentModel::from_config(config, stopwords)?;
    let mut trainer = StreamingTrainer::new(model, config.training.clone());
    let mut stream = ReviewStream::open(csv)?;

    let train = trainer.train(&mut stream)?;
    let holdout = if config.training.holdout_size == 0 {
        None
    } else if !trainer.model().classifier().is_fitted() {
        tracing::warn!("No training batches were applied; skipping hold-out evaluation");
        None
    } else {
        match trainer.holdout(&mut stream) {
            Ok(report) => Some(report),
            Err(TrainError::EmptyHoldout) => {
                tracing::warn!("No reviews left after training; skipping hold-out evaluation");
                None
            }
            Err(err) => return Err(err),
        }
    };

    let model = trainer.into_model();
    persist::save(model_dir, model.stopwords(), model.classifier())?;
    Ok((
        model,
        RunReport {
            train,
            holdout,
            model_dir: model_dir.to_path_buf(),
        },
    ))
}
