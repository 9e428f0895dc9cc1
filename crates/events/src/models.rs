use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    // Application lifecycle
    Starting,
    Shutdown,

    // Configuration
    ConfigLoading { path: String },
    ConfigLoaded { users_count: usize },
    ConfigCreated { path: String },
    ConfigMigrated { added_fields: Vec<String> },

    // Authentication
    SignedIn { username: String, first_time: bool },
    ConfirmationRequired { username: String },
    SignInRejected { reason: String },
    SignedOut,
    SignOutFailed { error: String },

    // Registry lifecycle
    RegistryLoaded { local: usize, remote: usize },
    RemoteListFailed { error: String },
    RegistryDiscarded,

    // Image screen
    ImageLoaded { name: String, width: u32, height: u32 },
    FilterApplied { name: String },
    ImageCleared,

    // Storage outcomes
    SavedLocally { name: String },
    UploadComplete { name: String },
    UploadFailed { name: String, error: String },
    DownloadComplete { name: String },
    DownloadFailed { name: String, error: String },
    RemoteDeleteFailed { name: String, error: String },
    FileDeleted { name: String },
    LocalIoFailed { name: String, error: String },

    // Errors
    Error { context: String, error: String },
}

impl AppEvent {
    /// Whether the event reports a failure the user should see
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AppEvent::SignInRejected { .. }
                | AppEvent::SignOutFailed { .. }
                | AppEvent::RemoteListFailed { .. }
                | AppEvent::UploadFailed { .. }
                | AppEvent::DownloadFailed { .. }
                | AppEvent::RemoteDeleteFailed { .. }
                | AppEvent::LocalIoFailed { .. }
                | AppEvent::Error { .. }
        )
    }
}

pub struct EventBus {
    pub(super) silent_mode: bool,
    /// Captured events, only kept by buses built with `EventBus::recording`
    pub(super) recorded: Option<Mutex<Vec<AppEvent>>>,
}
