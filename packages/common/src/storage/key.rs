use std::fmt;
use std::path::PathBuf;

use super::hash::ContentHash;

/// Blob namespace. Each kind owns its own directory and key space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlobKind {
    Problem,
    Solution,
}

impl BlobKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Problem => "problems",
            Self::Solution => "solutions",
        }
    }
}

/// Address of a blob: problems are keyed by their caller-assigned ID,
/// solutions by the digest of their canonical payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlobKey {
    Problem(i64),
    Solution(ContentHash),
}

impl BlobKey {
    pub fn kind(&self) -> BlobKind {
        match self {
            Self::Problem(_) => BlobKind::Problem,
            Self::Solution(_) => BlobKind::Solution,
        }
    }

    /// Path relative to the store root, e.g. `problems/17.json`.
    pub fn relative_path(&self) -> PathBuf {
        let file_name = match self {
            Self::Problem(id) => format!("{id}.json"),
            Self::Solution(hash) => format!("{}.json", hash.to_hex()),
        };
        PathBuf::from(self.kind().dir_name()).join(file_name)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Problem(id) => write!(f, "problem/{id}"),
            Self::Solution(hash) => write!(f, "solution/{hash}"),
        }
    }
}
