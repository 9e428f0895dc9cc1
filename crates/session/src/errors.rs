use snapvault_filesystem::FileSystemError;
use snapvault_tracker::TrackerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image loaded")]
    NoImage,

    #[error("File is not tracked: {0}")]
    NotTracked(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Local storage error: {0}")]
    FileSystemError(#[from] FileSystemError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}
