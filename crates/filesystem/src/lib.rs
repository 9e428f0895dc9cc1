mod models;
mod operations;
mod errors;

pub use models::LocalStore;
pub use errors::FileSystemError;
