use thiserror::Error;

/// Ways a scorer run can go wrong. These never leave the adapter; they
/// become the reject reason of the resulting evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("cannot prepare scorer input: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("cannot launch scorer: {0}")]
    Launch(#[source] std::io::Error),

    #[error("scorer failed ({status}): {stderr}")]
    Exit { status: String, stderr: String },

    #[error("malformed scorer output: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}
