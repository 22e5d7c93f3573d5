use crate::clipboard::ClipboardPayload;
use crate::error::HistoryError;

use super::clip::{Capture, ClipContent, ClipEntry};
use super::search_index;

/// Default number of entries kept in history
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Handle returned by [`ClipboardHistory::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked with the full ordered history after each mutation
pub type HistoryListener = Box<dyn FnMut(&[ClipEntry]) + Send>;

/// Clipboard history store
///
/// Entries are kept pinned-first, then most recent first. The store never
/// holds more than `max_entries` entries, and capacity eviction only ever
/// removes unpinned entries.
pub struct ClipboardHistory {
    entries: Vec<ClipEntry>,
    max_entries: usize,
    /// Next ID to assign (monotonic counter)
    next_id: u64,
    listeners: Vec<(ListenerId, HistoryListener)>,
    next_listener_id: u64,
}

impl ClipboardHistory {
    /// Create a new clipboard history with specified max entries
    pub fn new(max_entries: usize) -> Self {
        ClipboardHistory {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
            next_id: 1,
            listeners: Vec::new(),
            next_listener_id: 1,
        }
    }

    /// Add a capture to the history
    ///
    /// A text, URL or file capture equal to an existing entry replaces it,
    /// taking over its pinned flag. Returns the ID assigned to the capture.
    pub fn add(&mut self, capture: Capture) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let mut entry = ClipEntry::from_capture(id, capture);

        if let Some(pos) = self.find_duplicate(entry.content()) {
            let old = self.entries.remove(pos);
            log::debug!("Duplicate of clip {} captured, replacing with clip {}", old.id(), id);
            // Re-copying a pinned clip must not unpin it, and add must never
            // change the pinned count that eviction works around
            entry.pinned = old.pinned;
        }

        self.entries.insert(0, entry);
        self.sort_entries();
        self.evict_overflow();

        self.notify();
        id
    }

    /// Remove an entry by ID
    pub fn remove(&mut self, id: u64) -> bool {
        match self.entries.iter().position(|e| e.id() == id) {
            Some(pos) => {
                self.entries.remove(pos);
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Flip the pinned flag of an entry and re-sort
    pub fn toggle_pin(&mut self, id: u64) -> bool {
        match self.entries.iter_mut().find(|e| e.id() == id) {
            Some(entry) => {
                entry.toggle_pin();
                log::debug!("Clip {} pinned: {}", id, entry.is_pinned());
                self.sort_entries();
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Clear all non-pinned entries
    /// Returns false (and notifies nobody) when every entry is pinned
    pub fn clear_unpinned(&mut self) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.is_pinned());
        let cleared = self.entries.len() != before;
        if cleared {
            self.notify();
        }
        cleared
    }

    /// Case-insensitive substring search, in history order
    pub fn search(&self, query: &str) -> Vec<ClipEntry> {
        search_index::search(&self.entries, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Build the clipboard write for an entry without touching history
    pub fn materialize(&self, id: u64) -> Result<ClipboardPayload, HistoryError> {
        let entry = self.get_entry(id).ok_or(HistoryError::NotFound(id))?;

        let payload = match entry.content() {
            ClipContent::Text(text) => ClipboardPayload::Text(text.clone()),
            ClipContent::Url(url) => ClipboardPayload::Text(url.as_str().to_string()),
            ClipContent::FilePath(url) => ClipboardPayload::FileUrl(url.clone()),
            // Prefer the original file so pasting into a file manager yields a real file
            ClipContent::Image {
                source_url: Some(url),
                ..
            } => ClipboardPayload::FileUrl(url.clone()),
            ClipContent::Image {
                data, mime_type, ..
            } => ClipboardPayload::Image {
                data: data.clone(),
                mime_type: mime_type.clone(),
            },
        };
        Ok(payload)
    }

    /// Register a listener called after every successful mutation
    pub fn subscribe(&mut self, listener: HistoryListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Drop a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Get entry by ID
    pub fn get_entry(&self, id: u64) -> Option<&ClipEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Get the number of entries in the history
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Get a reference to all entries, in display order
    pub fn entries(&self) -> &[ClipEntry] {
        &self.entries
    }

    fn find_duplicate(&self, content: &ClipContent) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.content().is_duplicate_of(content))
    }

    /// Pinned first, then newest first. Stable, so equal timestamps keep insertion order.
    fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| {
            b.is_pinned()
                .cmp(&a.is_pinned())
                .then_with(|| b.captured_at().cmp(&a.captured_at()))
        });
    }

    /// Evict the oldest unpinned entries until within capacity.
    /// New captures are unpinned, so there is always an unpinned entry to evict
    /// whenever an add pushes history over capacity.
    fn evict_overflow(&mut self) {
        while self.entries.len() > self.max_entries {
            match self.entries.iter().rposition(|e| !e.is_pinned()) {
                Some(pos) => {
                    let evicted = self.entries.remove(pos);
                    log::debug!("Evicted clip {} (history full)", evicted.id());
                }
                None => {
                    log::warn!(
                        "History holds {} pinned clips, above the limit of {}",
                        self.entries.len(),
                        self.max_entries
                    );
                    break;
                }
            }
        }
    }

    fn notify(&mut self) {
        let entries = &self.entries;
        for (_, listener) in self.listeners.iter_mut() {
            listener(entries);
        }
    }
}

impl Default for ClipboardHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl std::fmt::Debug for ClipboardHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardHistory")
            .field("entries", &self.entries)
            .field("max_entries", &self.max_entries)
            .field("next_id", &self.next_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
