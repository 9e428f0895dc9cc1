// Re-export all public APIs from the workspace crates

pub use snapvault_models::*;
pub use snapvault_events::*;
pub use snapvault_utils::*;
pub use snapvault_filesystem::*;
pub use snapvault_config::*;
pub use snapvault_storage::*;
pub use snapvault_auth::*;
pub use snapvault_tracker::*;
pub use snapvault_session::*;

/// Prelude module for convenient imports
pub mod prelude {
    // Core models
    pub use snapvault_models::{Registry, StorageLocation, TrackedFile};

    // Events
    pub use snapvault_events::{AppEvent, EventBus};

    // Configuration
    pub use snapvault_config::Config;

    // Stores
    pub use snapvault_filesystem::LocalStore;
    pub use snapvault_storage::StorageBackend;

    // Authentication
    pub use snapvault_auth::{ConfigIdentityProvider, IdentityProvider, Login};

    // Tracking
    pub use snapvault_tracker::{Completion, LocationTracker, Removal};

    // Image screen
    pub use snapvault_session::ImageSession;
}
