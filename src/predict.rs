//! Vectorizer and classifier bundled for inference and incremental updates.

use serde::{Deserialize, Serialize};

use crate::config::RevsentConfig;
use crate::dataset::Sentiment;
use crate::features::HashingVectorizer;
use crate::ml::{CLASSES, ClassifierError, PartialFitStats, SgdClassifier};
use crate::text::{Normalizer, StopwordSet, TextError};

/// Label and the probability the classifier assigns to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Sentiment,
    pub probability: f64,
}

/// Explicitly constructed pipeline: raw text in, sentiment out.
#[derive(Debug, Clone)]
pub struct SentimentModel {
    vectorizer: HashingVectorizer,
    classifier: SgdClassifier,
}

impl SentimentModel {
    /// Pair a vectorizer with a classifier over the same feature space.
    pub fn new(
        vectorizer: HashingVectorizer,
        classifier: SgdClassifier,
    ) -> Result<Self, ClassifierError> {
        if vectorizer.n_features() != classifier.n_features {
            return Err(ClassifierError::DimensionMismatch {
                expected: classifier.n_features,
                found: vectorizer.n_features(),
            });
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Untrained model built entirely from configuration.
    pub fn from_config(config: &RevsentConfig, stopwords: StopwordSet) -> Result<Self, TextError> {
        let normalizer = Normalizer::from_settings(&config.text, stopwords)?;
        let vectorizer = HashingVectorizer::new(&config.features, normalizer);
        let classifier = SgdClassifier::new(vectorizer.n_features(), &config.classifier);
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    pub fn vectorizer(&self) -> &HashingVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &SgdClassifier {
        &self.classifier
    }

    pub fn stopwords(&self) -> &StopwordSet {
        self.vectorizer.normalizer().stopwords()
    }

    pub fn predict(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let row = self.vectorizer.transform_text(text);
        let proba = self.classifier.predict_proba(&row)?;
        let label = self.classifier.predict(&row)?;
        let label = Sentiment::from_label(label).ok_or(ClassifierError::InvalidLabel(label))?;
        Ok(Prediction {
            label,
            probability: proba[label.label() as usize],
        })
    }

    /// One incremental update from raw texts.
    pub fn update<S: AsRef<str>>(
        &mut self,
        texts: &[S],
        labels: &[Sentiment],
    ) -> Result<PartialFitStats, ClassifierError> {
        let x = self.vectorizer.transform(texts);
        let y: Vec<u8> = labels.iter().map(|s| s.label()).collect();
        self.classifier.partial_fit(&x, &y, &CLASSES)
    }
}
