use image::RgbaImage;
use snapvault_events::EventBus;
use snapvault_tracker::LocationTracker;
use std::sync::Arc;

/// State of the image screen for one signed-in user.
///
/// Owns the [`LocationTracker`] for its whole lifetime: the registry is built
/// when the session opens and dropped when it closes.
pub struct ImageSession {
    pub(crate) username: String,
    pub(crate) tracker: LocationTracker,
    pub(crate) events: Arc<EventBus>,
    pub(crate) current: Option<CurrentImage>,
    /// Remote file whose download will become the current image
    pub(crate) awaiting_download: Option<String>,
}

/// The image on screen
#[derive(Debug, Clone)]
pub struct CurrentImage {
    pub name: String,
    pub image: RgbaImage,
    /// The filter is a display layer, baked in only when the image is encoded
    pub filtered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Decoded from local storage and now current
    Loaded,
    /// Download started; the image becomes current when it completes
    Downloading,
}
