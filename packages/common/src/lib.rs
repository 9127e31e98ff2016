pub mod evaluation;
pub mod schema;
pub mod storage;

pub use evaluation::{AcquiredBonus, DISLIKE_SENTINEL, Evaluation, ScoreState};
pub use schema::{ProblemData, SchemaError, SolutionData};
pub use storage::{BlobKey, BlobStore, ContentHash, StorageError};
