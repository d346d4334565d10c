use std::io::Read;

use crate::config::TrainingSettings;
use crate::dataset::{Batch, ReviewStream};
use crate::ml::metrics::{ConfusionMatrix, Evaluation};
use crate::ml::{CLASSES, PartialFitStats};
use crate::predict::SentimentModel;

use super::TrainError;

/// Outcome of the capped mini-batch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainReport {
    /// Non-empty batches fed to the classifier.
    pub batches: usize,
    pub records: u64,
    /// The stream ran dry before the batch cap.
    pub stream_exhausted: bool,
    pub last_loss: Option<f64>,
}

/// Hold-out scoring outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutReport {
    pub records: usize,
    pub evaluation: Evaluation,
    /// Hold-out rows were fed to the classifier after scoring.
    pub fitted: bool,
}

/// Drives mini-batch training of a [`SentimentModel`] from a [`ReviewStream`].
#[derive(Debug, Clone)]
pub struct StreamingTrainer {
    model: SentimentModel,
    settings: TrainingSettings,
}

impl StreamingTrainer {
    pub fn new(model: SentimentModel, settings: TrainingSettings) -> Self {
        Self { model, settings }
    }

    pub fn model(&self) -> &SentimentModel {
        &self.model
    }

    pub fn into_model(self) -> SentimentModel {
        self.model
    }

    /// Pull up to `max_batches` batches of `batch_size` and apply each as one update.
    ///
    /// Stops early on the first empty batch.
    pub fn train<R: Read>(&mut self, stream: &mut ReviewStream<R>) -> Result<TrainReport, TrainError> {
        let mut report = TrainReport::default();
        for _ in 0..self.settings.max_batches {
            let batch = stream.next_batch(self.settings.batch_size)?;
            if batch.is_empty() {
                report.stream_exhausted = true;
                break;
            }
            let stats = self.fit_batch(&batch)?;
            report.batches += 1;
            report.records += batch.len() as u64;
            report.last_loss = Some(stats.mean_loss);
            tracing::debug!(
                "Batch {} ({} reviews): mean loss {:.4}",
                report.batches,
                batch.len(),
                stats.mean_loss
            );
        }
        tracing::info!(
            "Trained on {} reviews in {} batches{}",
            report.records,
            report.batches,
            if report.stream_exhausted {
                " (stream exhausted)"
            } else {
                ""
            }
        );
        Ok(report)
    }

    /// Vectorize one batch and apply it as a single incremental update.
    pub fn fit_batch(&mut self, batch: &Batch) -> Result<PartialFitStats, TrainError> {
        let labels: Vec<_> = batch.records().iter().map(|r| r.sentiment).collect();
        Ok(self.model.update(&batch.texts(), &labels)?)
    }

    /// Score the current model on a labeled batch.
    pub fn evaluate(&self, batch: &Batch) -> Result<Evaluation, TrainError> {
        let vectorizer = self.model.vectorizer();
        let classifier = self.model.classifier();
        let mut predicted = Vec::with_capacity(batch.len());
        for record in batch.records() {
            let row = vectorizer.transform_text(&record.review);
            predicted.push(classifier.predict(&row)?);
        }
        let cm = ConfusionMatrix::from_labels(CLASSES.len(), &batch.labels(), &predicted);
        Ok(Evaluation::from_confusion(cm))
    }

    /// Reserve the next `holdout_size` records, score them and, when configured, learn from them.
    pub fn holdout<R: Read>(&mut self, stream: &mut ReviewStream<R>) -> Result<HoldoutReport, TrainError> {
        let batch = stream.next_batch(self.settings.holdout_size)?;
        if batch.is_empty() {
            return Err(TrainError::EmptyHoldout);
        }
        let evaluation = self.evaluate(&batch)?;
        tracing::info!(
            "Hold-out accuracy on {} reviews: {:.3}",
            batch.len(),
            evaluation.accuracy
        );
        let fitted = self.settings.fit_holdout;
        if fitted {
            self.fit_batch(&batch)?;
        }
        Ok(HoldoutReport {
            records: batch.len(),
            evaluation,
            fitted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeatureSettings, RevsentConfig};
    use crate::text::StopwordSet;

    fn csv(rows: usize) -> String {
        let mut out = String::from("review,sentiment\n");
        for i in 0..rows {
            if i % 2 == 0 {
                out.push_str("\"a wonderful, brilliant film\",1\n");
            } else {
                out.push_str("\"an awful, boring film\",0\n");
            }
        }
        out
    }

    fn trainer(batch_size: usize, max_batches: usize, holdout_size: usize) -> StreamingTrainer {
        trainer_with(TrainingSettings {
            batch_size,
            max_batches,
            holdout_size,
            ..TrainingSettings::default()
        })
    }

    fn trainer_with(settings: TrainingSettings) -> StreamingTrainer {
        let config = RevsentConfig {
            features: FeatureSettings {
                n_features: 1 << 10,
                ..FeatureSettings::default()
            },
            ..RevsentConfig::default()
        };
        let model = SentimentModel::from_config(&config, StopwordSet::english()).unwrap();
        StreamingTrainer::new(model, settings)
    }

    #[test]
    fn stops_at_batch_cap() {
        let data = csv(50);
        let mut stream = ReviewStream::from_reader(data.as_bytes());
        let mut trainer = trainer(10, 3, 5);
        let report = trainer.train(&mut stream).unwrap();
        assert_eq!(report.batches, 3);
        assert_eq!(report.records, 30);
        assert!(!report.stream_exhausted);
        assert_eq!(trainer.model().classifier().batches_seen, 3);
        assert_eq!(stream.position(), 30);
    }

    #[test]
    fn short_stream_keeps_partial_batch() {
        let data = csv(25);
        let mut stream = ReviewStream::from_reader(data.as_bytes());
        let mut trainer = trainer(10, 45, 5);
        let report = trainer.train(&mut stream).unwrap();
        assert_eq!(report.batches, 3);
        assert_eq!(report.records, 25);
        assert!(report.stream_exhausted);
        assert!(matches!(
            trainer.holdout(&mut stream),
            Err(TrainError::EmptyHoldout)
        ));
    }

    #[test]
    fn holdout_scores_then_fits() {
        let data = csv(40);
        let mut stream = ReviewStream::from_reader(data.as_bytes());
        let mut trainer = trainer(10, 3, 10);
        trainer.train(&mut stream).unwrap();
        let report = trainer.holdout(&mut stream).unwrap();
        assert_eq!(report.records, 10);
        assert!(report.fitted);
        assert_eq!(report.evaluation.confusion.total(), 10);
        assert!((report.evaluation.accuracy - 1.0).abs() < 1e-6);
        assert_eq!(trainer.model().classifier().batches_seen, 4);
        assert_eq!(trainer.model().classifier().samples_seen, 40);
    }

    #[test]
    fn holdout_without_fit_leaves_model_untouched() {
        let data = csv(40);
        let mut stream = ReviewStream::from_reader(data.as_bytes());
        let mut trainer = trainer_with(TrainingSettings {
            batch_size: 10,
            max_batches: 3,
            holdout_size: 10,
            fit_holdout: false,
            ..TrainingSettings::default()
        });
        trainer.train(&mut stream).unwrap();
        let before = trainer.model().classifier().clone();
        let report = trainer.holdout(&mut stream).unwrap();
        assert!(!report.fitted);
        assert_eq!(report.records, 10);
        let after = trainer.model().classifier();
        assert_eq!(after.batches_seen, 3);
        assert_eq!(after.samples_seen, before.samples_seen);
        assert_eq!(after.coef(), before.coef());
    }
}
