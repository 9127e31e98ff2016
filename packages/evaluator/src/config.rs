use std::path::PathBuf;

use serde::Deserialize;

/// Scorer adapter configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct EvaluatorConfig {
    /// Scorer executable. Default: "scorer" (resolved through PATH).
    #[serde(default = "default_scorer_path")]
    pub scorer_path: PathBuf,
    /// Directory for the temporary input files. Default: the system temp dir.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_scorer_path() -> PathBuf {
    "scorer".into()
}

impl EvaluatorConfig {
    pub fn with_scorer(scorer_path: impl Into<PathBuf>) -> Self {
        Self {
            scorer_path: scorer_path.into(),
            work_dir: None,
        }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            scorer_path: default_scorer_path(),
            work_dir: None,
        }
    }
}
