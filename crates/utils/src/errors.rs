use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UtilsError {
    #[error("File name is empty")]
    EmptyName,

    #[error("Invalid file name '{0}': names must not contain path separators")]
    PathSeparator(String),

    #[error("Invalid file name '{0}'")]
    ReservedName(String),
}
