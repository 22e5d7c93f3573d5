use anyhow::Result;
use std::sync::Arc;
use url::Url;

/// Opaque value that changes whenever the clipboard content is replaced.
/// Only equality is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeToken(pub u64);

/// Raw image bytes as read from the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Exactly what gets written to the clipboard for a stored clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardPayload {
    /// Plain text (also used for web URLs)
    Text(String),
    /// File reference, so file managers paste a real file
    FileUrl(Url),
    /// Encoded image
    Image { data: Vec<u8>, mime_type: String },
}

/// Trait for clipboard backend abstraction
/// Supports different clipboard systems (Wayland, in-process)
///
/// Readers return `None`/empty when a representation is absent or cannot be
/// read; they never fail. Writes replace the whole clipboard content.
pub trait ClipboardBackend: Send + Sync {
    /// Cheap read of the current change token
    fn change_token(&self) -> Result<ChangeToken>;

    /// Plain text representation, if any
    fn read_text(&self) -> Option<String>;

    /// File URLs offered by the clipboard, in order
    fn read_file_urls(&self) -> Vec<Url>;

    /// Image bitmap representation, if any
    fn read_image(&self) -> Option<Bitmap>;

    /// Replace the clipboard content
    /// Returns the change token produced by this write
    fn write(&self, payload: &ClipboardPayload) -> Result<ChangeToken>;

    /// Get the backend name (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Lets a host keep a handle on the same clipboard it hands to the coordinator
impl<T: ClipboardBackend + ?Sized> ClipboardBackend for Arc<T> {
    fn change_token(&self) -> Result<ChangeToken> {
        (**self).change_token()
    }

    fn read_text(&self) -> Option<String> {
        (**self).read_text()
    }

    fn read_file_urls(&self) -> Vec<Url> {
        (**self).read_file_urls()
    }

    fn read_image(&self) -> Option<Bitmap> {
        (**self).read_image()
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<ChangeToken> {
        (**self).write(payload)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
