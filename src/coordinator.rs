//! Wires the change detector into history and writes clips back
//!
//! All state sits behind one mutex: the poll thread, host calls and
//! `copy_back` take turns, so a tick can never observe a half-finished
//! write-back. Listeners run while that lock is held and must not call back
//! into the coordinator.

use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::clipboard::{ChangeDetector, ClipboardBackend, Poller};
use crate::config::GeneralConfig;
use crate::error::HistoryError;
use crate::models::{ClipEntry, ClipboardHistory, HistoryListener, ListenerId};

/// Callback invoked with the search-filtered history
pub type FilteredListener = Box<dyn FnMut(&[ClipEntry]) + Send>;

struct Shared {
    backend: Box<dyn ClipboardBackend>,
    detector: ChangeDetector,
    history: ClipboardHistory,
    query: String,
    filtered_listeners: Vec<FilteredListener>,
}

impl Shared {
    /// One detection tick; returns the id of the accepted capture
    fn tick(&mut self) -> Option<u64> {
        let capture = self.detector.poll(self.backend.as_ref())?;
        let kind = capture.content.kind();
        let id = self.history.add(capture);
        log::info!("Captured clip {} ({})", id, kind.label());
        self.publish_filtered();
        Some(id)
    }

    fn filtered(&self) -> Vec<ClipEntry> {
        self.history.search(&self.query)
    }

    fn publish_filtered(&mut self) {
        if self.filtered_listeners.is_empty() {
            return;
        }
        let filtered = self.filtered();
        for listener in self.filtered_listeners.iter_mut() {
            listener(&filtered);
        }
    }
}

/// Clipboard history service
///
/// Owns the detector, the history store and the platform backend. Hosts
/// call its methods from any thread.
pub struct Coordinator {
    shared: Arc<Mutex<Shared>>,
    poller: Mutex<Option<Poller>>,
    poll_interval: Duration,
}

impl Coordinator {
    /// Create a stopped coordinator over the given backend
    pub fn new(backend: Box<dyn ClipboardBackend>, config: &GeneralConfig) -> Self {
        log::debug!(
            "Creating coordinator: backend={}, max_items={}, poll_interval={}ms, max_image_size={}B",
            backend.name(),
            config.max_items,
            config.poll_interval_ms,
            config.max_image_size_bytes
        );
        let shared = Shared {
            backend,
            detector: ChangeDetector::new(config.max_image_size_bytes),
            history: ClipboardHistory::new(config.max_items),
            query: String::new(),
            filtered_listeners: Vec::new(),
        };
        Coordinator {
            shared: Arc::new(Mutex::new(shared)),
            poller: Mutex::new(None),
            poll_interval: config.poll_interval(),
        }
    }

    /// Start polling
    ///
    /// Checks the clipboard once right away so content copied before start
    /// is captured. Calling start while running does nothing.
    pub fn start(&self) -> Result<()> {
        let mut poller = lock(&self.poller);
        if poller.is_some() {
            log::debug!("Clipboard polling already running");
            return Ok(());
        }

        lock(&self.shared).tick();

        let shared = Arc::clone(&self.shared);
        *poller = Some(Poller::start(self.poll_interval, move || {
            lock(&shared).tick();
        })?);

        log::info!("Clipboard polling started");
        Ok(())
    }

    /// Stop polling; safe to call when already stopped
    pub fn stop(&self) {
        let poller = lock(&self.poller).take();
        if let Some(poller) = poller {
            poller.stop();
            log::info!("Clipboard polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.poller).is_some()
    }

    /// Run one detection tick now, outside the timer
    pub fn poll_now(&self) -> Option<u64> {
        lock(&self.shared).tick()
    }

    /// Write a stored clip back to the clipboard without re-capturing it
    ///
    /// The backend reports the change token of its own write; the detector
    /// records it as seen, so the next tick finds nothing new while any later
    /// external copy still moves the token and is captured.
    pub fn copy_back(&self, id: u64) -> Result<(), HistoryError> {
        let mut shared = lock(&self.shared);
        let shared = &mut *shared;

        let payload = shared.history.materialize(id)?;
        let token = shared.backend.write(&payload).map_err(|e| {
            log::warn!("Failed to copy clip {} to {}: {:#}", id, shared.backend.name(), e);
            HistoryError::WriteFailed {
                id,
                reason: format!("{:#}", e),
            }
        })?;
        shared.detector.suppress(token);

        log::info!("Copied clip {} back to clipboard", id);
        Ok(())
    }

    /// Remove a clip; unknown ids are ignored
    pub fn remove(&self, id: u64) -> bool {
        let mut shared = lock(&self.shared);
        let removed = shared.history.remove(id);
        if removed {
            shared.publish_filtered();
        }
        removed
    }

    /// Pin or unpin a clip; unknown ids are ignored
    pub fn toggle_pin(&self, id: u64) -> bool {
        let mut shared = lock(&self.shared);
        let toggled = shared.history.toggle_pin(id);
        if toggled {
            shared.publish_filtered();
        }
        toggled
    }

    /// Drop every unpinned clip
    /// Returns false when there was nothing to drop
    pub fn clear_unpinned(&self) -> bool {
        let mut shared = lock(&self.shared);
        let cleared = shared.history.clear_unpinned();
        if cleared {
            shared.publish_filtered();
        }
        cleared
    }

    /// One-off search, independent of the live query
    pub fn search(&self, query: &str) -> Vec<ClipEntry> {
        lock(&self.shared).history.search(query)
    }

    /// Change the live query behind [`Coordinator::filtered`]
    pub fn set_search_query(&self, query: &str) {
        let mut shared = lock(&self.shared);
        if shared.query != query {
            shared.query = query.to_string();
            shared.publish_filtered();
        }
    }

    /// Snapshot of the whole history, in display order
    pub fn items(&self) -> Vec<ClipEntry> {
        lock(&self.shared).history.entries().to_vec()
    }

    /// Snapshot of the history filtered by the live query
    pub fn filtered(&self) -> Vec<ClipEntry> {
        lock(&self.shared).filtered()
    }

    /// Look up one clip
    pub fn get(&self, id: u64) -> Option<ClipEntry> {
        lock(&self.shared).history.get_entry(id).cloned()
    }

    /// Listen to the full history after each change
    pub fn subscribe(&self, listener: HistoryListener) -> ListenerId {
        lock(&self.shared).history.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        lock(&self.shared).history.unsubscribe(id)
    }

    /// Listen to the filtered history after each change or query update
    pub fn subscribe_filtered(&self, listener: FilteredListener) {
        lock(&self.shared).filtered_listeners.push(listener);
    }

    /// Whether the last write-back is still being ignored
    pub fn is_suppressing(&self) -> bool {
        lock(&self.shared).detector.is_suppressing()
    }

    pub fn backend_name(&self) -> &'static str {
        lock(&self.shared).backend.name()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
