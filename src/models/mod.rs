pub mod clip;
pub mod history;
pub mod search_index;

pub use clip::{Capture, ClipContent, ClipEntry, ContentKind};
pub use history::{ClipboardHistory, DEFAULT_MAX_ENTRIES, HistoryListener, ListenerId};
