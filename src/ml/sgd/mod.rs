//! Online binary logistic regression trained by stochastic gradient descent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClassifierSettings;
use crate::features::SparseVector;

mod train;
mod weights;

pub use train::PartialFitStats;

/// Serialized format version understood by this build.
pub const CLASSIFIER_FORMAT_VERSION: u32 = 1;

/// The fixed label set: 0 = negative, 1 = positive.
pub const CLASSES: [u8; 2] = [0, 1];

/// Step-size schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningRate {
    /// `eta = 1 / (alpha * (t0 + t))` with `t0` picked from `alpha`.
    #[default]
    Optimal,
    /// `eta = eta0` for every step.
    Constant,
}

#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("feature dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("{rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("label {0} is outside the class set {{0, 1}}")]
    InvalidLabel(u8),
    #[error("class set {found:?} does not match {expected:?}")]
    ClassMismatch { expected: Vec<u8>, found: Vec<u8> },
    #[error("classifier has not been fitted yet")]
    NotFitted,
    #[error("unsupported classifier format version {0}")]
    UnsupportedFormat(u32),
    #[error("invalid classifier state: {0}")]
    InvalidState(String),
}

/// Linear model `sigmoid(w . x + b)` updated in place one mini-batch at a time.
///
/// Weights are kept as `wscale * raw` so the L2 shrink on every step is O(1) and a sparse
/// sample only touches its own columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgdClassifier {
    pub format_version: u32,
    pub n_features: usize,
    pub alpha: f64,
    pub learning_rate: LearningRate,
    pub eta0: f64,
    pub shuffle: bool,
    pub seed: u64,
    /// Set by the first `partial_fit`.
    #[serde(default)]
    pub classes: Option<Vec<u8>>,
    #[serde(with = "weights")]
    raw_weights: Vec<f64>,
    wscale: f64,
    pub intercept: f64,
    /// Step counter driving the `optimal` schedule; starts at 1.
    t: f64,
    /// Number of `partial_fit` calls applied so far.
    pub batches_seen: u64,
    pub samples_seen: u64,
}

impl SgdClassifier {
    pub fn new(n_features: usize, settings: &ClassifierSettings) -> Self {
        Self {
            format_version: CLASSIFIER_FORMAT_VERSION,
            n_features,
            alpha: settings.alpha,
            learning_rate: settings.learning_rate,
            eta0: settings.eta0,
            shuffle: settings.shuffle,
            seed: settings.seed,
            classes: None,
            raw_weights: vec![0.0; n_features],
            wscale: 1.0,
            intercept: 0.0,
            t: 1.0,
            batches_seen: 0,
            samples_seen: 0,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.classes.is_some()
    }

    /// Validate dimensions and numeric state, e.g. after deserializing.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.format_version != CLASSIFIER_FORMAT_VERSION {
            return Err(ClassifierError::UnsupportedFormat(self.format_version));
        }
        if self.raw_weights.len() != self.n_features {
            return Err(ClassifierError::InvalidState(format!(
                "weights length {} does not match n_features {}",
                self.raw_weights.len(),
                self.n_features
            )));
        }
        if !self.wscale.is_finite() || self.wscale <= 0.0 {
            return Err(ClassifierError::InvalidState("weight scale must be > 0".to_string()));
        }
        if !self.intercept.is_finite() {
            return Err(ClassifierError::InvalidState("intercept is not finite".to_string()));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(ClassifierError::InvalidState("alpha must be > 0".to_string()));
        }
        if let Some(classes) = &self.classes
            && classes.as_slice() != CLASSES
        {
            return Err(ClassifierError::ClassMismatch {
                expected: CLASSES.to_vec(),
                found: classes.clone(),
            });
        }
        Ok(())
    }

    /// Effective coefficient vector.
    pub fn coef(&self) -> Vec<f64> {
        self.raw_weights.iter().map(|w| w * self.wscale).collect()
    }

    /// Signed distance to the decision boundary; positive favours class 1.
    pub fn decision_function(&self, x: &SparseVector) -> Result<f64, ClassifierError> {
        if !self.is_fitted() {
            return Err(ClassifierError::NotFitted);
        }
        self.check_dim(x)?;
        Ok(self.margin(x))
    }

    /// Probabilities for `[class 0, class 1]`.
    pub fn predict_proba(&self, x: &SparseVector) -> Result<[f64; 2], ClassifierError> {
        let positive = sigmoid(self.decision_function(x)?);
        Ok([1.0 - positive, positive])
    }

    pub fn predict(&self, x: &SparseVector) -> Result<u8, ClassifierError> {
        let decision = self.decision_function(x)?;
        Ok(if decision > 0.0 { CLASSES[1] } else { CLASSES[0] })
    }

    /// Mean accuracy over a labeled set.
    pub fn score(&self, x: &[SparseVector], y: &[u8]) -> Result<f64, ClassifierError> {
        if x.len() != y.len() {
            return Err(ClassifierError::LengthMismatch {
                rows: x.len(),
                labels: y.len(),
            });
        }
        if x.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for (row, &label) in x.iter().zip(y) {
            if self.predict(row)? == label {
                correct += 1;
            }
        }
        Ok(correct as f64 / x.len() as f64)
    }

    fn check_dim(&self, x: &SparseVector) -> Result<(), ClassifierError> {
        if x.dim() != self.n_features {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.n_features,
                found: x.dim(),
            });
        }
        Ok(())
    }

    fn margin(&self, x: &SparseVector) -> f64 {
        x.dot(&self.raw_weights) * self.wscale + self.intercept
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_model_validates_and_refuses_to_predict() {
        let clf = SgdClassifier::new(8, &ClassifierSettings::default());
        clf.validate().unwrap();
        let x = SparseVector::from_sorted(8, [(1, 1.0)]);
        assert_eq!(clf.predict(&x), Err(ClassifierError::NotFitted));
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(-800.0).is_finite());
    }
}
