//! Online classifier and evaluation metrics.

pub mod metrics;
pub mod sgd;

pub use sgd::{CLASSES, ClassifierError, LearningRate, PartialFitStats, SgdClassifier};
