mod backend;
mod directory;
mod errors;

#[cfg(feature = "s3")]
mod s3;

pub use backend::{private_namespace, StorageBackend};
pub use directory::DirectoryBackend;
pub use errors::*;

#[cfg(feature = "s3")]
pub use s3::S3Backend;
