use crate::image_ops::{decode, encode_png, lighten, FILTER_TINT};
use crate::models::{CurrentImage, ImageSession, SelectOutcome};
use crate::SessionError;
use bytes::Bytes;
use snapvault_config::TrackerSettings;
use snapvault_events::{AppEvent, EventBus};
use snapvault_filesystem::LocalStore;
use snapvault_models::{Names, StorageLocation};
use snapvault_storage::StorageBackend;
use snapvault_tracker::{Completion, LocationTracker, Removal, TrackerError};
use snapvault_utils::base_name;
use std::path::Path;
use std::sync::Arc;

type Result<T> = std::result::Result<T, SessionError>;

impl ImageSession {
    /// Enters the image screen: builds the tracker and loads every known file
    pub async fn open(
        username: &str,
        local: LocalStore,
        remote: Arc<dyn StorageBackend>,
        events: Arc<EventBus>,
        settings: TrackerSettings,
    ) -> Result<Self> {
        let mut tracker = LocationTracker::new(local, remote, Arc::clone(&events), settings);
        tracker.rebuild().await?;

        tracing::info!(
            "Image session opened for {} ({} file(s) known)",
            username,
            tracker.len()
        );

        Ok(Self {
            username: username.to_string(),
            tracker,
            events,
            current: None,
            awaiting_download: None,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn current(&self) -> Option<&CurrentImage> {
        self.current.as_ref()
    }

    /// Save, upload, filter and delete only make sense with an image on screen
    pub fn controls_enabled(&self) -> bool {
        self.current.is_some()
    }

    pub fn names(&self) -> Names<'_> {
        self.tracker.list_names()
    }

    pub fn location(&self, name: &str) -> Option<StorageLocation> {
        self.tracker.location(name)
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    pub fn pending(&self) -> usize {
        self.tracker.pending()
    }

    /// Imports an image from outside the app.
    ///
    /// The name is the file's base name, prefixed with "1" when that name is
    /// already tracked so the import never shadows an existing file.
    pub async fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&CurrentImage> {
        let path = path.as_ref();

        let decoded = match tokio::fs::read(path).await {
            Ok(data) => decode(&data),
            Err(e) => Err(e.into()),
        };
        let image = match decoded {
            Ok(image) => image,
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };

        let file_name = path.to_string_lossy();
        let base = base_name(&file_name);
        let name = if self.tracker.contains(base) {
            format!("1{}", base)
        } else {
            base.to_string()
        };

        Ok(self.show(name, image))
    }

    pub fn apply_filter(&mut self) -> Result<()> {
        let current = self.current.as_mut().ok_or(SessionError::NoImage)?;
        current.filtered = true;
        self.events.emit(AppEvent::FilterApplied {
            name: current.name.clone(),
        });
        Ok(())
    }

    /// Writes the current image to local storage and makes local its only home
    pub async fn save_locally(&mut self) -> Result<()> {
        let (name, png) = self.render()?;

        if let Err(e) = self.tracker.local().write(&name, &png).await {
            self.events.emit(AppEvent::LocalIoFailed {
                name: name.clone(),
                error: e.to_string(),
            });
            return Err(e.into());
        }

        self.tracker.record_local_save(&name)?;
        self.reconcile().await?;

        self.events.emit(AppEvent::SavedLocally { name });
        Ok(())
    }

    /// Starts uploading the current image and makes remote its only home.
    ///
    /// The registry flips to remote right away; the upload outcome is reported
    /// when its completion is processed.
    pub async fn upload(&mut self) -> Result<()> {
        let (name, png) = self.render()?;

        self.tracker.spawn_upload(&name, Bytes::from(png));
        if let Err(e) = self.tracker.record_remote_upload(&name).await {
            return Err(self.surface(e));
        }
        self.reconcile().await?;

        Ok(())
    }

    /// Shows a tracked file. Local files load immediately; remote files are
    /// downloaded and become current once the download completes.
    pub async fn select(&mut self, name: &str) -> Result<SelectOutcome> {
        match self.tracker.location(name) {
            None => Err(SessionError::NotTracked(name.to_string())),
            Some(StorageLocation::Local) => {
                let data = match self.tracker.local().read(name).await {
                    Ok(data) => data,
                    Err(e) => {
                        self.events.emit(AppEvent::LocalIoFailed {
                            name: name.to_string(),
                            error: e.to_string(),
                        });
                        self.clear();
                        return Err(e.into());
                    }
                };
                let image = decode(&data)?;
                self.show(name.to_string(), image);
                self.reconcile().await?;
                Ok(SelectOutcome::Loaded)
            }
            Some(StorageLocation::Remote) => {
                self.awaiting_download = Some(name.to_string());
                self.tracker.spawn_download(name);
                Ok(SelectOutcome::Downloading)
            }
        }
    }

    /// Deletes the file on screen from wherever it lives and clears the screen
    pub async fn delete_current(&mut self) -> Result<Removal> {
        let name = self
            .current
            .as_ref()
            .map(|c| c.name.clone())
            .ok_or(SessionError::NoImage)?;

        let removal = match self.tracker.record_delete(&name).await {
            Ok(removal) => removal,
            Err(e) => return Err(self.surface(e)),
        };
        self.reconcile().await?;
        self.clear();

        Ok(removal)
    }

    /// Waits for the next remote outcome and applies it to the screen.
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        let completion = self.tracker.next_completion().await?;
        self.apply_completion(&completion);
        Some(completion)
    }

    fn apply_completion(&mut self, completion: &Completion) {
        let Completion::Downloaded { name, result } = completion else {
            return;
        };
        if self.awaiting_download.as_deref() != Some(name.as_str()) {
            tracing::debug!("Ignoring stale download of {}", name);
            return;
        }
        self.awaiting_download = None;

        match result {
            Ok(data) => match decode(data) {
                Ok(image) => {
                    self.show(name.clone(), image);
                }
                Err(e) => {
                    self.events.emit(AppEvent::DownloadFailed {
                        name: name.clone(),
                        error: e.to_string(),
                    });
                    self.clear();
                }
            },
            Err(_) => self.clear(),
        }
    }

    /// Waits for every in-flight remote request and drops the registry
    pub async fn close(mut self) -> Vec<Completion> {
        let mut drained = Vec::new();
        while let Some(completion) = self.next_completion().await {
            drained.push(completion);
        }
        drained.extend(self.tracker.close().await);
        tracing::info!("Image session closed for {}", self.username);
        drained
    }

    async fn reconcile(&mut self) -> Result<()> {
        match self.tracker.reconcile().await {
            Ok(_) => Ok(()),
            Err(e) => Err(self.surface(e)),
        }
    }

    /// Encodes the current image, filter included
    fn render(&self) -> Result<(String, Vec<u8>)> {
        let current = self.current.as_ref().ok_or(SessionError::NoImage)?;

        let png = if current.filtered {
            let mut image = current.image.clone();
            lighten(&mut image, FILTER_TINT);
            encode_png(&image)?
        } else {
            encode_png(&current.image)?
        };

        Ok((current.name.clone(), png))
    }

    /// Puts `image` on screen; a download still in flight no longer replaces it
    fn show(&mut self, name: String, image: image::RgbaImage) -> &CurrentImage {
        self.awaiting_download = None;
        self.events.emit(AppEvent::ImageLoaded {
            name: name.clone(),
            width: image.width(),
            height: image.height(),
        });
        self.current.insert(CurrentImage {
            name,
            image,
            filtered: false,
        })
    }

    fn clear(&mut self) {
        self.awaiting_download = None;
        if self.current.take().is_some() {
            self.events.emit(AppEvent::ImageCleared);
        }
    }

    /// Reports local failures to the user before handing the error back
    fn surface(&self, error: TrackerError) -> SessionError {
        if let TrackerError::LocalIo { name, source } = &error {
            self.events.emit(AppEvent::LocalIoFailed {
                name: name.clone(),
                error: source.to_string(),
            });
        }
        error.into()
    }
}
