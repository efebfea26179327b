//! Configuration management for the trainer and the prediction service

use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "PREDICT_CONFIG";

/// Which model the service exposes on `/predict`
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceVariant {
    /// Iris species classifier - lenient input handling, errors reported with 200
    #[default]
    Iris,
    /// California housing regressor - missing parameters rejected with 400
    Housing,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub service: ServiceConfig,
    pub models: ModelsConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Seconds between metrics summaries (0 disables the reporter)
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,
}

fn default_metrics_interval() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub variant: ServiceVariant,
}

/// Model artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory holding the serialized artifacts
    pub artifacts_dir: String,
    /// Iris pipeline file name
    #[serde(default = "default_iris_artifact")]
    pub iris_artifact: String,
    /// Housing model file name
    #[serde(default = "default_housing_artifact")]
    pub housing_artifact: String,
    /// Re-read the housing artifact from disk for every request
    #[serde(default = "default_true")]
    pub housing_reload_on_request: bool,
}

fn default_iris_artifact() -> String {
    "iris_pipeline.bin".to_string()
}

fn default_housing_artifact() -> String {
    "housing_model.bin".to_string()
}

fn default_true() -> bool {
    true
}

impl ModelsConfig {
    pub fn iris_path(&self) -> PathBuf {
        Path::new(&self.artifacts_dir).join(&self.iris_artifact)
    }

    pub fn housing_path(&self) -> PathBuf {
        Path::new(&self.artifacts_dir).join(&self.housing_artifact)
    }
}

/// Trainer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Seed for the train/test shuffle and the forest's bootstrap sampling
    pub seed: u64,
    /// Fraction of the iris dataset held out for evaluation
    pub iris_test_ratio: f32,
    /// Fraction of the housing dataset held out for evaluation
    pub housing_test_ratio: f32,
    /// Number of trees in the iris forest
    pub n_trees: usize,
    /// Maximum depth of each tree (unbounded when absent)
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// CSV export of the California housing dataset
    #[serde(default)]
    pub housing_csv: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from `PREDICT_CONFIG` or the default file
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path, with `PREDICT__*` environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`AppConfig::load_from_path`], reading overrides from `env`
    /// instead of the process environment when given.
    pub fn load_with_env<P: AsRef<Path>>(
        path: P,
        env: Option<Map<String, String>>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("PREDICT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                metrics_interval_secs: default_metrics_interval(),
            },
            service: ServiceConfig {
                variant: ServiceVariant::Iris,
            },
            models: ModelsConfig {
                artifacts_dir: "artifacts".to_string(),
                iris_artifact: default_iris_artifact(),
                housing_artifact: default_housing_artifact(),
                housing_reload_on_request: true,
            },
            training: TrainingConfig {
                seed: 42,
                iris_test_ratio: 0.3,
                housing_test_ratio: 0.2,
                n_trees: 100,
                max_depth: None,
                housing_csv: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
