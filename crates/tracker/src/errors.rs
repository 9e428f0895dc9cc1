use snapvault_filesystem::FileSystemError;
use snapvault_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Local storage failure on '{name}': {source}")]
    LocalIo {
        name: String,
        #[source]
        source: FileSystemError,
    },

    #[error(transparent)]
    InvalidName(#[from] snapvault_utils::UtilsError),

    #[error("Remote request failed: {0}")]
    Remote(#[from] StorageError),
}

impl TrackerError {
    pub(crate) fn local_io(name: &str, source: FileSystemError) -> Self {
        TrackerError::LocalIo {
            name: name.to_string(),
            source,
        }
    }
}
