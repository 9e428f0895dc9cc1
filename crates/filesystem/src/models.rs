use std::path::PathBuf;

/// Flat, app-scoped directory of saved images keyed by file name
#[derive(Debug, Clone)]
pub struct LocalStore {
    pub(super) root: PathBuf,
}
