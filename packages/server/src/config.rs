use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use evaluator::EvaluatorConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root of the blob tree (`problems/`, `solutions/`).
    pub base_path: PathBuf,
}

/// Which solutions a sweep re-evaluates.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RescoreMode {
    /// Only rows still carrying the sentinel with no reject reason.
    #[default]
    Pending,
    /// Every solution, e.g. after the scorer itself changed.
    All,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RescoreConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub mode: RescoreMode,
    /// Run the evaluator once when a solution is submitted, so it is stored
    /// with a verdict instead of waiting for the next sweep.
    #[serde(default)]
    pub score_on_submit: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for RescoreConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
            mode: RescoreMode::default(),
            score_on_submit: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub rescore: RescoreConfig,
}

impl AppConfig {
    /// Load defaults, then the optional file at `path` (extension may be
    /// omitted), then `LEDGER__*` environment overrides.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("database.url", "sqlite://data/ledger.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("storage.base_path", "data")?
            .set_default("evaluator.scorer_path", "scorer")?
            .set_default("rescore.enabled", true)?
            .set_default("rescore.interval_secs", 60)?
            .set_default("rescore.mode", "pending")?
            .set_default("rescore.score_on_submit", false)?
            .add_source(File::with_name(path).required(false))
            // e.g. LEDGER__EVALUATOR__SCORER_PATH=/opt/scorer
            .add_source(Environment::with_prefix("LEDGER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
