use bytes::Bytes;
use snapvault_config::TrackerSettings;
use snapvault_events::EventBus;
use snapvault_filesystem::LocalStore;
use snapvault_models::{Registry, StorageLocation};
use snapvault_storage::{StorageBackend, StorageError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Decides where each known file lives and keeps it in exactly one place.
///
/// Owned by a single task: every mutation takes `&mut self`, so no locking is
/// involved. Remote requests run as spawned tasks and report back through an
/// internal channel drained with [`LocationTracker::next_completion`]; their
/// outcomes never touch the registry.
pub struct LocationTracker {
    pub(crate) registry: Registry,
    pub(crate) local: LocalStore,
    pub(crate) remote: Arc<dyn StorageBackend>,
    pub(crate) events: Arc<EventBus>,
    pub(crate) settings: TrackerSettings,
    pub(crate) completions_tx: mpsc::UnboundedSender<Completion>,
    pub(crate) completions_rx: mpsc::UnboundedReceiver<Completion>,
    pub(crate) pending: usize,
    /// Latest remote request per name; the next one for that name waits on it
    pub(crate) in_flight: HashMap<String, JoinHandle<()>>,
}

/// Outcome of a remote request, delivered back to the owning task
#[derive(Debug)]
pub enum Completion {
    Uploaded {
        name: String,
        result: Result<(), StorageError>,
    },
    Downloaded {
        name: String,
        result: Result<Bytes, StorageError>,
    },
    Deleted {
        name: String,
        result: Result<(), StorageError>,
    },
}

impl Completion {
    pub fn name(&self) -> &str {
        match self {
            Completion::Uploaded { name, .. }
            | Completion::Downloaded { name, .. }
            | Completion::Deleted { name, .. } => name,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Completion::Uploaded { result, .. } | Completion::Deleted { result, .. } => result.is_ok(),
            Completion::Downloaded { result, .. } => result.is_ok(),
        }
    }
}

/// Kind of remote request, used to report a task that died without answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemoteOp {
    Upload,
    Download,
    Delete,
}

impl RemoteOp {
    pub(crate) fn failed(self, name: String, error: String) -> Completion {
        match self {
            RemoteOp::Upload => Completion::Uploaded {
                result: Err(StorageError::UploadError(name.clone(), error)),
                name,
            },
            RemoteOp::Download => Completion::Downloaded {
                result: Err(StorageError::DownloadError(name.clone(), error)),
                name,
            },
            RemoteOp::Delete => Completion::Deleted {
                result: Err(StorageError::DeleteError(name.clone(), error)),
                name,
            },
        }
    }
}

/// Result of `record_delete`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The entry existed and lived at the given location
    Removed(StorageLocation),
    /// Nothing was tracked under that name; nothing was touched
    Untracked,
}

/// What a `reconcile` sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Local copies of remote entries that were deleted
    pub local_removed: Vec<String>,
    /// Remote deletes issued for local entries
    pub remote_deletes: Vec<String>,
    /// Local files with no registry entry that were deleted
    pub untracked_removed: Vec<String>,
}
