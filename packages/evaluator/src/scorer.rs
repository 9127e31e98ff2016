use std::process::Stdio;

use async_trait::async_trait;
use common::{AcquiredBonus, Evaluation};
use serde::Deserialize;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::EvaluatorConfig;
use crate::error::EvaluatorError;
use crate::traits::Evaluator;

const REJECTED_BY_SCORER: &str = "rejected by scorer";

/// What the scorer prints in `json` mode.
#[derive(Debug, Deserialize)]
struct ScorerOutput {
    is_valid: bool,
    dislike: i64,
    #[serde(default)]
    bonus: Vec<AcquiredBonus>,
}

/// Runs the external scorer as `<scorer> <problem-file> <solution-file> json`.
pub struct ScorerEvaluator {
    config: EvaluatorConfig,
}

impl ScorerEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    async fn write_input(&self, data: &[u8]) -> Result<NamedTempFile, EvaluatorError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("scorer.").suffix(".json");

        let file = match &self.config.work_dir {
            Some(dir) => {
                fs::create_dir_all(dir)
                    .await
                    .map_err(EvaluatorError::TempFile)?;
                builder.tempfile_in(dir)
            }
            None => builder.tempfile(),
        }
        .map_err(EvaluatorError::TempFile)?;

        fs::write(file.path(), data)
            .await
            .map_err(EvaluatorError::TempFile)?;
        Ok(file)
    }

    async fn run(&self, problem: &[u8], solution: &[u8]) -> Result<ScorerOutput, EvaluatorError> {
        // Both files are removed when these guards drop, on every path out.
        let problem_file = self.write_input(problem).await?;
        let solution_file = self.write_input(solution).await?;

        let output = Command::new(&self.config.scorer_path)
            .arg(problem_file.path())
            .arg(solution_file.path())
            .arg("json")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(EvaluatorError::Launch)?;

        if !output.status.success() {
            return Err(EvaluatorError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl Evaluator for ScorerEvaluator {
    async fn evaluate(&self, problem: &[u8], solution: &[u8]) -> Evaluation {
        match self.run(problem, solution).await {
            Ok(output) if output.is_valid => {
                debug!(dislike = output.dislike, "Scorer accepted solution");
                Evaluation::scored(output.dislike, output.bonus)
            }
            Ok(_) => Evaluation::rejected(REJECTED_BY_SCORER),
            Err(e) => {
                warn!(
                    scorer = %self.config.scorer_path.display(),
                    error = %e,
                    "Scorer run failed, rejecting solution"
                );
                Evaluation::rejected(e.to_string())
            }
        }
    }
}
