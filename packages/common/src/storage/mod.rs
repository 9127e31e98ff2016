mod error;
mod hash;
mod key;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use hash::ContentHash;
pub use key::{BlobKey, BlobKind};
pub use traits::BlobStore;
