use anyhow::{Result, anyhow};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

use super::backend::{Bitmap, ChangeToken, ClipboardBackend, ClipboardPayload};

#[derive(Debug, Default)]
struct Contents {
    text: Option<String>,
    file_urls: Vec<Url>,
    image: Option<Bitmap>,
    change_count: u64,
    read_only: bool,
}

/// In-process clipboard
///
/// Behaves like a system pasteboard with a change counter: every write
/// replaces all representations and bumps the counter. Used by hosts that
/// have no system clipboard and for driving the detector in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: Mutex<Contents>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate another application copying several representations at once
    pub fn set_contents(&self, text: Option<String>, file_urls: Vec<Url>, image: Option<Bitmap>) {
        let mut contents = self.lock();
        contents.text = text;
        contents.file_urls = file_urls;
        contents.image = image;
        contents.change_count += 1;
    }

    /// Simulate another application copying text
    pub fn set_text(&self, text: &str) {
        self.set_contents(Some(text.to_string()), Vec::new(), None);
    }

    /// Simulate clearing the clipboard
    pub fn clear(&self) {
        self.set_contents(None, Vec::new(), None);
    }

    /// Make subsequent writes fail, like a pasteboard owned by another process
    pub fn set_read_only(&self, read_only: bool) {
        self.lock().read_only = read_only;
    }

    fn lock(&self) -> MutexGuard<'_, Contents> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClipboardBackend for MemoryBackend {
    fn change_token(&self) -> Result<ChangeToken> {
        Ok(ChangeToken(self.lock().change_count))
    }

    fn read_text(&self) -> Option<String> {
        self.lock().text.clone()
    }

    fn read_file_urls(&self) -> Vec<Url> {
        self.lock().file_urls.clone()
    }

    fn read_image(&self) -> Option<Bitmap> {
        self.lock().image.clone()
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<ChangeToken> {
        let mut contents = self.lock();
        if contents.read_only {
            return Err(anyhow!("Clipboard is read-only"));
        }

        contents.text = None;
        contents.file_urls.clear();
        contents.image = None;
        match payload {
            ClipboardPayload::Text(text) => contents.text = Some(text.clone()),
            ClipboardPayload::FileUrl(url) => contents.file_urls.push(url.clone()),
            ClipboardPayload::Image { data, mime_type } => {
                contents.image = Some(Bitmap {
                    data: data.clone(),
                    mime_type: mime_type.clone(),
                })
            }
        }
        contents.change_count += 1;

        log::debug!("Wrote payload to memory clipboard (change {})", contents.change_count);
        Ok(ChangeToken(contents.change_count))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_write_advances_token() {
        let backend = MemoryBackend::new();
        let start = backend.change_token().unwrap();

        backend.set_text("a");
        let after_external = backend.change_token().unwrap();
        assert_ne!(start, after_external);

        let written = backend
            .write(&ClipboardPayload::Text("a".to_string()))
            .unwrap();
        assert_ne!(written, after_external);
        assert_eq!(backend.change_token().unwrap(), written);
    }

    #[test]
    fn test_write_replaces_all_representations() {
        let backend = MemoryBackend::new();
        backend.set_contents(
            Some("text".to_string()),
            vec![Url::parse("file:///tmp/a").unwrap()],
            None,
        );

        backend
            .write(&ClipboardPayload::Image {
                data: vec![1],
                mime_type: "image/png".to_string(),
            })
            .unwrap();

        assert!(backend.read_text().is_none());
        assert!(backend.read_file_urls().is_empty());
        assert!(backend.read_image().is_some());
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let backend = MemoryBackend::new();
        backend.set_read_only(true);
        let token = backend.change_token().unwrap();

        assert!(backend.write(&ClipboardPayload::Text("x".to_string())).is_err());
        assert_eq!(backend.change_token().unwrap(), token);
    }
}
