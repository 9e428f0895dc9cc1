use crate::models::{Completion, LocationTracker, RemoteOp};
use bytes::Bytes;
use snapvault_events::AppEvent;
use std::future::Future;
use std::sync::Arc;

impl LocationTracker {
    /// Starts an upload; the outcome arrives as `Completion::Uploaded`
    pub fn spawn_upload(&mut self, name: &str, data: Bytes) {
        let remote = Arc::clone(&self.remote);
        let owned = name.to_string();
        self.dispatch(RemoteOp::Upload, name, async move {
            let result = remote.upload(&owned, data).await;
            Completion::Uploaded { name: owned, result }
        });
    }

    /// Starts a download; the bytes arrive as `Completion::Downloaded`
    pub fn spawn_download(&mut self, name: &str) {
        let remote = Arc::clone(&self.remote);
        let owned = name.to_string();
        self.dispatch(RemoteOp::Download, name, async move {
            let result = remote.download(&owned).await;
            Completion::Downloaded { name: owned, result }
        });
    }

    /// Fire-and-forget remote delete
    pub(crate) fn spawn_delete(&mut self, name: &str) {
        let remote = Arc::clone(&self.remote);
        let owned = name.to_string();
        tracing::debug!("Scheduling remote delete of {}", name);
        self.dispatch(RemoteOp::Delete, name, async move {
            let result = remote.delete(&owned).await;
            Completion::Deleted { name: owned, result }
        });
    }

    /// Runs `task` after every earlier request for `name` has finished, so
    /// requests on one object land in the order they were issued.
    fn dispatch<F>(&mut self, op: RemoteOp, name: &str, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.pending += 1;
        self.in_flight.retain(|_, handle| !handle.is_finished());

        let previous = self.in_flight.remove(name);
        let tx = self.completions_tx.clone();
        let owned = name.to_string();

        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }

            // A panicked request still reports, keeping `pending` exact
            let completion = match tokio::spawn(task).await {
                Ok(completion) => completion,
                Err(e) => {
                    tracing::error!("Remote {:?} of {} died: {}", op, owned, e);
                    op.failed(owned, e.to_string())
                }
            };

            // The receiver lives in the tracker; if it is gone nobody is listening
            let _ = tx.send(completion);
        });

        self.in_flight.insert(name.to_string(), handle);
    }

    /// Remote requests issued but not yet drained
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Waits for the next remote outcome and reports it to the user.
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        Some(self.accept(completion))
    }

    /// Non-blocking variant of [`LocationTracker::next_completion`]
    pub fn try_next_completion(&mut self) -> Option<Completion> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.completions_rx.try_recv().ok()?;
        Some(self.accept(completion))
    }

    /// Drains every in-flight remote request
    pub async fn settle(&mut self) -> Vec<Completion> {
        let mut drained = Vec::with_capacity(self.pending);
        while let Some(completion) = self.next_completion().await {
            drained.push(completion);
        }
        drained
    }

    fn accept(&mut self, completion: Completion) -> Completion {
        self.pending -= 1;
        self.report(&completion);
        completion
    }

    fn report(&self, completion: &Completion) {
        match completion {
            Completion::Uploaded { name, result: Ok(()) } => {
                self.events.emit(AppEvent::UploadComplete { name: name.clone() });
            }
            Completion::Uploaded { name, result: Err(e) } => {
                tracing::warn!("Upload of {} failed: {}", name, e);
                self.events.emit(AppEvent::UploadFailed {
                    name: name.clone(),
                    error: e.to_string(),
                });
            }
            Completion::Downloaded { name, result: Ok(_) } => {
                self.events.emit(AppEvent::DownloadComplete { name: name.clone() });
            }
            Completion::Downloaded { name, result: Err(e) } => {
                tracing::warn!("Download of {} failed: {}", name, e);
                self.events.emit(AppEvent::DownloadFailed {
                    name: name.clone(),
                    error: e.to_string(),
                });
            }
            Completion::Deleted { name, result: Ok(()) } => {
                tracing::debug!("Remote copy of {} removed", name);
            }
            Completion::Deleted { name, result: Err(e) } => {
                tracing::warn!("Remote delete of {} failed: {}", name, e);
                self.events.emit(AppEvent::RemoteDeleteFailed {
                    name: name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
}
