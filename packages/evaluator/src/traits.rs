use async_trait::async_trait;
use common::Evaluation;

/// Scores a solution payload against its problem payload.
///
/// Implementations must not fail: anything that goes wrong is reported as a
/// rejected [`Evaluation`] so callers always have a result to store.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, problem: &[u8], solution: &[u8]) -> Evaluation;
}
