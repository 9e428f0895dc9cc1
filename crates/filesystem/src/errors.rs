use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    InvalidName(#[from] snapvault_utils::UtilsError),

    #[error("Join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Directory walk failed: {0}")]
    WalkError(#[from] walkdir::Error),
}
