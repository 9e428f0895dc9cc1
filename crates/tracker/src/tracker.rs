use crate::errors::TrackerError;
use crate::models::{Completion, LocationTracker, ReconcileReport, Removal};
use snapvault_config::TrackerSettings;
use snapvault_events::{AppEvent, EventBus};
use snapvault_filesystem::LocalStore;
use snapvault_models::{Names, Registry, StorageLocation};
use snapvault_storage::StorageBackend;
use snapvault_utils::validate_file_name;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

type Result<T> = std::result::Result<T, TrackerError>;

impl LocationTracker {
    /// Creates an empty tracker; call [`LocationTracker::rebuild`] to load existing files
    pub fn new(
        local: LocalStore,
        remote: Arc<dyn StorageBackend>,
        events: Arc<EventBus>,
        settings: TrackerSettings,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            registry: Registry::new(),
            local,
            remote,
            events,
            settings,
            completions_tx,
            completions_rx,
            pending: 0,
            in_flight: HashMap::new(),
        }
    }

    /// Reloads the registry from local storage, then the remote listing.
    ///
    /// Remote names win over local ones. A failed remote listing is reported
    /// and leaves the local names loaded.
    pub async fn rebuild(&mut self) -> Result<()> {
        self.registry.clear();

        let local_names = self
            .local
            .list()
            .await
            .map_err(|e| TrackerError::local_io("<listing>", e))?;
        for name in &local_names {
            if validate_file_name(name).is_ok() {
                self.registry.mark(name, StorageLocation::Local);
            }
        }

        match self.remote.list("").await {
            Ok(remote_names) => {
                for name in &remote_names {
                    self.registry.mark(name, StorageLocation::Remote);
                }
            }
            Err(e) => {
                tracing::warn!("Remote listing of {} failed: {}", self.remote.namespace(), e);
                self.events.emit(AppEvent::RemoteListFailed {
                    error: e.to_string(),
                });
            }
        }

        self.events.emit(AppEvent::RegistryLoaded {
            local: self.registry.count(StorageLocation::Local),
            remote: self.registry.count(StorageLocation::Remote),
        });

        Ok(())
    }

    /// Marks `name` as living locally. A previous remote copy is deleted in
    /// the background; the registry change does not wait for it.
    pub fn record_local_save(&mut self, name: &str) -> Result<Option<StorageLocation>> {
        validate_file_name(name)?;

        let previous = self.registry.mark(name, StorageLocation::Local);
        if previous == Some(StorageLocation::Remote) {
            self.spawn_delete(name);
        }

        tracing::debug!("{} -> local (was {:?})", name, previous);
        Ok(previous)
    }

    /// Marks `name` as living remotely, before the upload confirms.
    /// A previous local copy is deleted right away.
    pub async fn record_remote_upload(&mut self, name: &str) -> Result<Option<StorageLocation>> {
        validate_file_name(name)?;

        let previous = self.registry.mark(name, StorageLocation::Remote);
        if previous == Some(StorageLocation::Local) {
            self.local
                .delete(name)
                .await
                .map_err(|e| TrackerError::local_io(name, e))?;
        }

        tracing::debug!("{} -> remote (was {:?})", name, previous);
        Ok(previous)
    }

    /// Forgets `name` and removes it from wherever it lived.
    ///
    /// The entry is dropped even if the remote delete later fails. Untracked
    /// names are left alone and reported as [`Removal::Untracked`].
    pub async fn record_delete(&mut self, name: &str) -> Result<Removal> {
        validate_file_name(name)?;

        let Some(location) = self.registry.location(name) else {
            tracing::warn!("Delete requested for untracked file {}", name);
            return Ok(Removal::Untracked);
        };

        if location == StorageLocation::Remote {
            self.spawn_delete(name);
        }
        self.registry.remove(name);

        self.local
            .delete(name)
            .await
            .map_err(|e| TrackerError::local_io(name, e))?;

        self.events.emit(AppEvent::FileDeleted {
            name: name.to_string(),
        });
        Ok(Removal::Removed(location))
    }

    /// Enforces "one file, one place" over the whole registry.
    ///
    /// Remote entries lose any local copy. Local entries get a remote delete
    /// when `purge_remote_duplicates` is set. Local files without an entry are
    /// removed when `purge_untracked_local` is set.
    pub async fn reconcile(&mut self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for file in self.registry.snapshot() {
            match file.location {
                StorageLocation::Remote => {
                    let removed = self
                        .local
                        .delete(&file.name)
                        .await
                        .map_err(|e| TrackerError::local_io(&file.name, e))?;
                    if removed {
                        report.local_removed.push(file.name);
                    }
                }
                StorageLocation::Local => {
                    if self.settings.purge_remote_duplicates {
                        self.spawn_delete(&file.name);
                        report.remote_deletes.push(file.name);
                    }
                }
            }
        }

        if self.settings.purge_untracked_local {
            let local_names = self
                .local
                .list()
                .await
                .map_err(|e| TrackerError::local_io("<listing>", e))?;
            for name in local_names {
                if self.registry.contains(&name) || validate_file_name(&name).is_err() {
                    continue;
                }
                self.local
                    .delete(&name)
                    .await
                    .map_err(|e| TrackerError::local_io(&name, e))?;
                report.untracked_removed.push(name);
            }
        }

        tracing::debug!(
            "Reconciled: {} local removed, {} remote deletes, {} untracked removed",
            report.local_removed.len(),
            report.remote_deletes.len(),
            report.untracked_removed.len()
        );

        Ok(report)
    }

    /// Known filenames in insertion order, for the selection list
    pub fn list_names(&self) -> Names<'_> {
        self.registry.names()
    }

    pub fn location(&self, name: &str) -> Option<StorageLocation> {
        self.registry.location(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn remote(&self) -> &Arc<dyn StorageBackend> {
        &self.remote
    }

    /// Waits for in-flight remote requests, then drops the registry
    pub async fn close(mut self) -> Vec<Completion> {
        let drained = self.settle().await;
        self.registry.clear();
        self.events.emit(AppEvent::RegistryDiscarded);
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use snapvault_storage::{DirectoryBackend, StorageError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Directory backend whose requests can be made to fail, stall or panic
    struct FlakyBackend {
        inner: DirectoryBackend,
        fail_deletes: AtomicBool,
        fail_list: AtomicBool,
        slow_uploads: AtomicBool,
        slow_deletes: AtomicBool,
        panic_downloads: AtomicBool,
    }

    const STALL: Duration = Duration::from_millis(50);

    #[async_trait::async_trait]
    impl StorageBackend for FlakyBackend {
        async fn upload(&self, name: &str, data: Bytes) -> std::result::Result<(), StorageError> {
            if self.slow_uploads.load(Ordering::SeqCst) {
                tokio::time::sleep(STALL).await;
            }
            self.inner.upload(name, data).await
        }

        async fn download(&self, name: &str) -> std::result::Result<Bytes, StorageError> {
            if self.panic_downloads.load(Ordering::SeqCst) {
                panic!("backend blew up");
            }
            self.inner.download(name).await
        }

        async fn delete(&self, name: &str) -> std::result::Result<(), StorageError> {
            if self.slow_deletes.load(Ordering::SeqCst) {
                tokio::time::sleep(STALL).await;
            }
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(StorageError::DeleteError(name.to_string(), "network unreachable".to_string()));
            }
            self.inner.delete(name).await
        }

        async fn list(&self, prefix: &str) -> std::result::Result<Vec<String>, StorageError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(StorageError::ListError(prefix.to_string(), "access denied".to_string()));
            }
            self.inner.list(prefix).await
        }

        fn namespace(&self) -> &str {
            self.inner.namespace()
        }
    }

    struct Fixture {
        _dir: TempDir,
        tracker: LocationTracker,
        local: LocalStore,
        remote: Arc<FlakyBackend>,
        events: Arc<EventBus>,
    }

    fn default_settings() -> TrackerSettings {
        TrackerSettings {
            purge_remote_duplicates: true,
            purge_untracked_local: true,
        }
    }

    async fn fixture_with(settings: TrackerSettings) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path().join("files")).await.unwrap();
        let inner = DirectoryBackend::new(dir.path().join("cloud"), "test-region:user")
            .await
            .unwrap();
        let remote = Arc::new(FlakyBackend {
            inner,
            fail_deletes: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            slow_uploads: AtomicBool::new(false),
            slow_deletes: AtomicBool::new(false),
            panic_downloads: AtomicBool::new(false),
        });
        let events = EventBus::recording();
        let tracker = LocationTracker::new(
            local.clone(),
            remote.clone(),
            Arc::clone(&events),
            settings,
        );

        Fixture {
            _dir: dir,
            tracker,
            local,
            remote,
            events,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(default_settings()).await
    }

    fn names(tracker: &LocationTracker) -> Vec<String> {
        tracker.list_names().map(str::to_string).collect()
    }

    async fn remote_names(fx: &Fixture) -> Vec<String> {
        fx.remote.list("").await.unwrap()
    }

    #[tokio::test]
    async fn test_save_then_upload_moves_file_to_remote() {
        let mut fx = fixture().await;

        fx.local.write("cat.png", b"png").await.unwrap();
        assert_eq!(fx.tracker.record_local_save("cat.png").unwrap(), None);
        assert_eq!(fx.tracker.location("cat.png"), Some(StorageLocation::Local));

        fx.tracker.spawn_upload("cat.png", Bytes::from_static(b"png"));
        let previous = fx.tracker.record_remote_upload("cat.png").await.unwrap();

        assert_eq!(previous, Some(StorageLocation::Local));
        assert_eq!(fx.tracker.location("cat.png"), Some(StorageLocation::Remote));
        assert!(!fx.local.exists("cat.png").await.unwrap());
        assert_eq!(names(&fx.tracker), vec!["cat.png"]);

        let done = fx.tracker.settle().await;
        assert_eq!(done.len(), 1);
        assert!(done[0].is_success());
        assert_eq!(remote_names(&fx).await, vec!["cat.png"]);
        assert!(fx
            .events
            .take_recorded()
            .contains(&AppEvent::UploadComplete { name: "cat.png".to_string() }));
    }

    #[tokio::test]
    async fn test_local_save_over_remote_deletes_remote_copy() {
        let mut fx = fixture().await;

        fx.remote.upload("dog.png", Bytes::from_static(b"old")).await.unwrap();
        fx.tracker.record_remote_upload("dog.png").await.unwrap();

        fx.local.write("dog.png", b"new").await.unwrap();
        let previous = fx.tracker.record_local_save("dog.png").unwrap();

        // Registry flips before the remote delete finishes
        assert_eq!(previous, Some(StorageLocation::Remote));
        assert_eq!(fx.tracker.location("dog.png"), Some(StorageLocation::Local));
        assert_eq!(fx.tracker.pending(), 1);

        fx.tracker.settle().await;
        assert!(remote_names(&fx).await.is_empty());
        assert!(fx.local.exists("dog.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_resave_same_location_schedules_nothing() {
        let mut fx = fixture().await;

        fx.tracker.record_local_save("a.png").unwrap();
        fx.tracker.record_local_save("a.png").unwrap();

        assert_eq!(fx.tracker.pending(), 0);
        assert_eq!(fx.tracker.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_then_delete_forgets_name() {
        let mut fx = fixture().await;

        fx.tracker.spawn_upload("cat.png", Bytes::from_static(b"png"));
        fx.tracker.record_remote_upload("cat.png").await.unwrap();
        fx.tracker.settle().await;

        let removal = fx.tracker.record_delete("cat.png").await.unwrap();
        assert_eq!(removal, Removal::Removed(StorageLocation::Remote));
        assert!(!names(&fx.tracker).contains(&"cat.png".to_string()));

        fx.tracker.settle().await;
        assert!(remote_names(&fx).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_twice_is_noop() {
        let mut fx = fixture().await;

        fx.local.write("a.png", b"a").await.unwrap();
        fx.tracker.record_local_save("a.png").unwrap();

        assert_eq!(
            fx.tracker.record_delete("a.png").await.unwrap(),
            Removal::Removed(StorageLocation::Local)
        );
        assert_eq!(fx.tracker.record_delete("a.png").await.unwrap(), Removal::Untracked);
        assert_eq!(fx.tracker.pending(), 0);
        assert!(fx.tracker.is_empty());
    }

    #[tokio::test]
    async fn test_delete_local_keeps_other_entries() {
        let mut fx = fixture().await;

        fx.local.write("a.png", b"a").await.unwrap();
        fx.tracker.record_local_save("a.png").unwrap();
        fx.remote.upload("b.png", Bytes::from_static(b"b")).await.unwrap();
        fx.tracker.record_remote_upload("b.png").await.unwrap();

        fx.tracker.record_delete("a.png").await.unwrap();
        fx.tracker.settle().await;

        assert_eq!(names(&fx.tracker), vec!["b.png"]);
        assert_eq!(fx.tracker.location("b.png"), Some(StorageLocation::Remote));
        assert!(fx.local.list().await.unwrap().is_empty());
        assert_eq!(remote_names(&fx).await, vec!["b.png"]);
    }

    #[tokio::test]
    async fn test_reconcile_leaves_each_file_in_one_place() {
        let mut fx = fixture().await;

        // Both files start out duplicated in both stores
        for name in ["a.png", "b.png"] {
            fx.local.write(name, b"x").await.unwrap();
            fx.remote.upload(name, Bytes::from_static(b"x")).await.unwrap();
        }
        fx.tracker.record_local_save("a.png").unwrap();
        fx.tracker.registry.mark("b.png", StorageLocation::Remote);

        let report = fx.tracker.reconcile().await.unwrap();
        fx.tracker.settle().await;

        assert_eq!(report.local_removed, vec!["b.png"]);
        assert_eq!(report.remote_deletes, vec!["a.png"]);
        assert_eq!(fx.local.list().await.unwrap(), vec!["a.png"]);
        assert_eq!(remote_names(&fx).await, vec!["b.png"]);
    }

    #[tokio::test]
    async fn test_reconcile_purges_untracked_local_files() {
        let mut fx = fixture().await;

        fx.local.write("kept.png", b"k").await.unwrap();
        fx.local.write("stray.png", b"s").await.unwrap();
        fx.tracker.record_local_save("kept.png").unwrap();

        let report = fx.tracker.reconcile().await.unwrap();
        fx.tracker.settle().await;

        assert_eq!(report.untracked_removed, vec!["stray.png"]);
        assert_eq!(fx.local.list().await.unwrap(), vec!["kept.png"]);
    }

    #[tokio::test]
    async fn test_reconcile_respects_disabled_purges() {
        let mut fx = fixture_with(TrackerSettings {
            purge_remote_duplicates: false,
            purge_untracked_local: false,
        })
        .await;

        fx.local.write("a.png", b"a").await.unwrap();
        fx.local.write("stray.png", b"s").await.unwrap();
        fx.remote.upload("a.png", Bytes::from_static(b"a")).await.unwrap();
        fx.tracker.record_local_save("a.png").unwrap();

        let report = fx.tracker.reconcile().await.unwrap();

        assert_eq!(report, ReconcileReport::default());
        assert_eq!(fx.tracker.pending(), 0);
        assert_eq!(fx.local.list().await.unwrap(), vec!["a.png", "stray.png"]);
        assert_eq!(remote_names(&fx).await, vec!["a.png"]);
    }

    #[tokio::test]
    async fn test_remote_delete_failure_is_reported_not_rolled_back() {
        let mut fx = fixture().await;

        fx.remote.upload("cat.png", Bytes::from_static(b"x")).await.unwrap();
        fx.tracker.record_remote_upload("cat.png").await.unwrap();
        fx.remote.fail_deletes.store(true, Ordering::SeqCst);

        fx.tracker.record_delete("cat.png").await.unwrap();
        let done = fx.tracker.settle().await;

        assert!(!done[0].is_success());
        assert!(!fx.tracker.contains("cat.png"));
        // The remote copy survives; no retry is attempted
        assert_eq!(remote_names(&fx).await, vec!["cat.png"]);
        assert!(fx.events.take_recorded().iter().any(|e| matches!(
            e,
            AppEvent::RemoteDeleteFailed { name, .. } if name == "cat.png"
        )));
    }

    #[tokio::test]
    async fn test_rebuild_prefers_remote_listing() {
        let mut fx = fixture().await;

        fx.local.write("a.png", b"a").await.unwrap();
        fx.local.write("shared.png", b"s").await.unwrap();
        fx.remote.upload("shared.png", Bytes::from_static(b"s")).await.unwrap();
        fx.remote.upload("z.png", Bytes::from_static(b"z")).await.unwrap();

        fx.tracker.rebuild().await.unwrap();

        assert_eq!(names(&fx.tracker), vec!["a.png", "shared.png", "z.png"]);
        assert_eq!(fx.tracker.location("a.png"), Some(StorageLocation::Local));
        assert_eq!(fx.tracker.location("shared.png"), Some(StorageLocation::Remote));
        assert_eq!(fx.tracker.location("z.png"), Some(StorageLocation::Remote));
        assert!(fx
            .events
            .take_recorded()
            .contains(&AppEvent::RegistryLoaded { local: 1, remote: 2 }));
    }

    #[tokio::test]
    async fn test_rebuild_keeps_local_names_when_listing_fails() {
        let mut fx = fixture().await;

        fx.local.write("a.png", b"a").await.unwrap();
        fx.remote.upload("z.png", Bytes::from_static(b"z")).await.unwrap();
        fx.remote.fail_list.store(true, Ordering::SeqCst);

        fx.tracker.rebuild().await.unwrap();

        assert_eq!(names(&fx.tracker), vec!["a.png"]);
        let events = fx.events.take_recorded();
        assert!(events.iter().any(|e| matches!(e, AppEvent::RemoteListFailed { .. })));
    }

    #[tokio::test]
    async fn test_rejects_invalid_names() {
        let mut fx = fixture().await;

        assert!(matches!(
            fx.tracker.record_local_save("../a.png"),
            Err(TrackerError::InvalidName(_))
        ));
        assert!(matches!(
            fx.tracker.record_delete("").await,
            Err(TrackerError::InvalidName(_))
        ));
        assert!(fx.tracker.is_empty());
    }

    #[tokio::test]
    async fn test_next_completion_without_pending_returns_none() {
        let mut fx = fixture().await;

        assert!(fx.tracker.next_completion().await.is_none());
        assert!(fx.tracker.try_next_completion().is_none());
    }

    #[tokio::test]
    async fn test_download_delivers_bytes() {
        let mut fx = fixture().await;

        fx.remote.upload("cat.png", Bytes::from_static(b"meow")).await.unwrap();
        fx.tracker.spawn_download("cat.png");

        match fx.tracker.next_completion().await {
            Some(Completion::Downloaded { name, result: Ok(data) }) => {
                assert_eq!(name, "cat.png");
                assert_eq!(data.as_ref(), b"meow");
            }
            other => panic!("unexpected completion: {:?}", other),
        }
        assert_eq!(fx.tracker.pending(), 0);
    }

    #[tokio::test]
    async fn test_close_drains_and_discards() {
        let mut fx = fixture().await;

        fx.tracker.spawn_upload("cat.png", Bytes::from_static(b"png"));
        fx.tracker.record_remote_upload("cat.png").await.unwrap();

        let drained = fx.tracker.close().await;
        assert_eq!(drained.len(), 1);
        assert!(fx
            .events
            .take_recorded()
            .contains(&AppEvent::RegistryDiscarded));
    }

    #[tokio::test]
    async fn test_upload_waits_for_earlier_delete_of_same_name() {
        let mut fx = fixture().await;
        fx.remote.slow_deletes.store(true, Ordering::SeqCst);

        fx.local.write("cat.png", b"png").await.unwrap();
        fx.tracker.record_local_save("cat.png").unwrap();
        // Issues a remote delete that stalls
        fx.tracker.reconcile().await.unwrap();

        fx.tracker.spawn_upload("cat.png", Bytes::from_static(b"png"));
        fx.tracker.record_remote_upload("cat.png").await.unwrap();
        fx.tracker.reconcile().await.unwrap();
        let done = fx.tracker.settle().await;

        assert!(done.iter().all(Completion::is_success));
        assert_eq!(fx.tracker.location("cat.png"), Some(StorageLocation::Remote));
        assert!(!fx.local.exists("cat.png").await.unwrap());
        assert_eq!(remote_names(&fx).await, vec!["cat.png"]);
    }

    #[tokio::test]
    async fn test_delete_waits_for_earlier_upload_of_same_name() {
        let mut fx = fixture().await;
        fx.remote.slow_uploads.store(true, Ordering::SeqCst);

        fx.tracker.spawn_upload("cat.png", Bytes::from_static(b"png"));
        fx.tracker.record_remote_upload("cat.png").await.unwrap();

        // Saved locally again before the upload lands
        fx.local.write("cat.png", b"png").await.unwrap();
        fx.tracker.record_local_save("cat.png").unwrap();
        fx.tracker.reconcile().await.unwrap();
        fx.tracker.settle().await;

        assert_eq!(fx.tracker.location("cat.png"), Some(StorageLocation::Local));
        assert!(fx.local.exists("cat.png").await.unwrap());
        assert!(remote_names(&fx).await.is_empty());
    }

    #[tokio::test]
    async fn test_requests_on_other_names_do_not_wait() {
        let mut fx = fixture().await;
        fx.remote.slow_deletes.store(true, Ordering::SeqCst);

        fx.tracker.record_local_save("slow.png").unwrap();
        fx.tracker.reconcile().await.unwrap();
        fx.tracker.spawn_upload("fast.png", Bytes::from_static(b"f"));

        let first = fx.tracker.next_completion().await.unwrap();
        assert_eq!(first.name(), "fast.png");
        fx.tracker.settle().await;
    }

    #[tokio::test]
    async fn test_panicking_request_still_completes() {
        let mut fx = fixture().await;
        fx.remote.panic_downloads.store(true, Ordering::SeqCst);

        fx.tracker.spawn_download("cat.png");
        let done = fx.tracker.settle().await;

        assert_eq!(done.len(), 1);
        assert!(matches!(
            &done[0],
            Completion::Downloaded { name, result: Err(StorageError::DownloadError(..)) } if name == "cat.png"
        ));
        assert_eq!(fx.tracker.pending(), 0);
        assert!(fx
            .events
            .take_recorded()
            .iter()
            .any(|e| matches!(e, AppEvent::DownloadFailed { name, .. } if name == "cat.png")));
    }
}
