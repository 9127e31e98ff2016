pub mod config;
pub mod error;
pub mod scorer;
pub mod traits;

pub use config::EvaluatorConfig;
pub use error::EvaluatorError;
pub use scorer::ScorerEvaluator;
pub use traits::Evaluator;
