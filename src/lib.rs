//! Out-of-core sentiment classification for movie reviews.
//!
//! Reviews are cleaned and stemmed, hashed into a fixed feature space and fed to an
//! online logistic regression one mini-batch at a time, so the training CSV never has to
//! fit in memory.

/// Application directory helpers.
pub mod app_dirs;
/// TOML configuration.
pub mod config;
/// Review CSV stream and dataset assembly.
pub mod dataset;
/// Hashed bag-of-words features.
pub mod features;
/// Stored user feedback and replay into the model.
pub mod feedback;
/// Tracing setup.
pub mod logging;
/// Online classifier and metrics.
pub mod ml;
/// Model blobs on disk.
pub mod persist;
/// Inference bundle.
pub mod predict;
/// Text normalization.
pub mod text;
/// Mini-batch training loop.
pub mod training;
