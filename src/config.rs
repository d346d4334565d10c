//! TOML configuration for training and inference.
//!
//! Every key has a default, so a missing file or a partial file is valid. The file lives at
//! `config.toml` inside the app root unless a path is passed explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::features::Norm;
use crate::ml::LearningRate;
use crate::text::DEFAULT_NON_WORD_PATTERN;

/// Default filename used to store the configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Aggregate settings for every stage of the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevsentConfig {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub text: TextSettings,
    #[serde(default)]
    pub features: FeatureSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Input and output locations.
///
/// Config keys: `csv_path`, `model_dir`, `feedback_db`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    /// Falls back to the app `model_objects` directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_db: Option<PathBuf>,
}

/// Normalizer behaviour.
///
/// Config keys: `non_word_pattern`, `remove_stopwords`, `stem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSettings {
    #[serde(default = "default_non_word_pattern")]
    pub non_word_pattern: String,
    #[serde(default = "default_true")]
    pub remove_stopwords: bool,
    #[serde(default = "default_true")]
    pub stem: bool,
}

/// Hashed feature space.
///
/// Config keys: `n_features`, `alternate_sign`, `norm`, `binary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSettings {
    #[serde(default = "default_n_features")]
    pub n_features: usize,
    #[serde(default = "default_true")]
    pub alternate_sign: bool,
    #[serde(default)]
    pub norm: Norm,
    #[serde(default)]
    pub binary: bool,
}

/// Online classifier hyper-parameters.
///
/// Config keys: `alpha`, `learning_rate`, `eta0`, `shuffle`, `seed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub learning_rate: LearningRate,
    #[serde(default = "default_eta0")]
    pub eta0: f64,
    #[serde(default = "default_true")]
    pub shuffle: bool,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Mini-batch loop sizes.
///
/// Config keys: `batch_size`, `max_batches`, `holdout_size`, `fit_holdout`,
/// `feedback_batch_size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_batches")]
    pub max_batches: usize,
    #[serde(default = "default_holdout_size")]
    pub holdout_size: usize,
    /// Feed the hold-out batch to the classifier after scoring it.
    #[serde(default = "default_true")]
    pub fit_holdout: bool,
    #[serde(default = "default_feedback_batch_size")]
    pub feedback_batch_size: usize,
}

/// Config keys: `level`, `to_file`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub to_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable config directory available")]
    NoConfigDir,
    #[error("Unable to create config directory {path}: {source}")]
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
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

impl RevsentConfig {
    /// Clamp values that would stall or break the pipeline.
    pub fn normalized(mut self) -> Self {
        self.features.n_features = self.features.n_features.max(1);
        self.training.batch_size = self.training.batch_size.max(1);
        self.training.max_batches = self.training.max_batches.max(1);
        self.training.feedback_batch_size = self.training.feedback_batch_size.max(1);
        if !self.classifier.alpha.is_finite() || self.classifier.alpha <= 0.0 {
            self.classifier.alpha = default_alpha();
        }
        if !self.classifier.eta0.is_finite() || self.classifier.eta0 <= 0.0 {
            self.classifier.eta0 = default_eta0();
        }
        self
    }

    /// Model directory from config, or the app default.
    pub fn model_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data.model_dir {
            Some(dir) => Ok(dir.clone()),
            None => app_dirs::models_dir().map_err(map_app_dir_error),
        }
    }
}

/// Resolve the configuration file path inside the app root.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the app root, returning defaults if missing.
pub fn load_or_default() -> Result<RevsentConfig, ConfigError> {
    load_from(&config_path()?)
}

/// Load configuration from `path`, returning defaults if the file does not exist.
pub fn load_from(path: &Path) -> Result<RevsentConfig, ConfigError> {
    if !path.exists() {
        return Ok(RevsentConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<RevsentConfig>(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(RevsentConfig::normalized)
}

/// Save configuration to a specific path, creating parent directories as needed.
pub fn save_to_path(config: &RevsentConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            model_dir: None,
            feedback_db: None,
        }
    }
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            non_word_pattern: default_non_word_pattern(),
            remove_stopwords: true,
            stem: true,
        }
    }
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            n_features: default_n_features(),
            alternate_sign: true,
            norm: Norm::default(),
            binary: false,
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            learning_rate: LearningRate::default(),
            eta0: default_eta0(),
            shuffle: true,
            seed: default_seed(),
        }
    }
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_batches: default_max_batches(),
            holdout_size: default_holdout_size(),
            fit_holdout: true,
            feedback_batch_size: default_feedback_batch_size(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("movie_data.csv")
}

fn default_non_word_pattern() -> String {
    DEFAULT_NON_WORD_PATTERN.to_string()
}

fn default_n_features() -> usize {
    1 << 21
}

fn default_alpha() -> f64 {
    1e-4
}

fn default_eta0() -> f64 {
    0.01
}

fn default_seed() -> u64 {
    1
}

fn default_batch_size() -> usize {
    1000
}

fn default_max_batches() -> usize {
    45
}

fn default_holdout_size() -> usize {
    5000
}

fn default_feedback_batch_size() -> usize {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}
