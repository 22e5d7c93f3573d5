//! Turn whatever the clipboard currently offers into a single clip
//!
//! A clipboard often carries several representations of one copy (a file
//! copied in a file manager also offers its path as text, a browser image
//! copy also offers a bitmap). Priority resolves them:
//!
//! 1. file URL (image files are re-read as bitmaps, keeping name and URL)
//! 2. text that is a web URL (http, https, ftp)
//! 3. image bitmap
//! 4. plain text
//!
//! Images larger than the configured limit are never taken into history:
//! an oversized image file stays a file reference and an oversized bitmap
//! is skipped in favour of the next representation.

use url::Url;

use super::backend::ClipboardBackend;
use crate::models::ClipContent;
use crate::models::clip::file_url_name;

/// URL schemes that make copied text a link rather than plain text
pub const RECOGNIZED_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Classify the current clipboard content
/// Returns None if nothing usable is on the clipboard
pub fn classify(backend: &dyn ClipboardBackend, max_image_bytes: u64) -> Option<ClipContent> {
    if let Some(url) = backend.read_file_urls().into_iter().next() {
        return Some(classify_file(url, max_image_bytes));
    }

    let text = backend.read_text().filter(|t| !t.is_empty());

    if let Some(url) = text.as_deref().and_then(parse_web_url) {
        return Some(ClipContent::Url(url));
    }

    let bitmap = backend.read_image().filter(|b| !b.data.is_empty());
    let bitmap = bitmap.filter(|b| {
        let fits = b.data.len() as u64 <= max_image_bytes;
        if !fits {
            log::debug!(
                "Skipping {} byte {} bitmap, over the {} byte limit",
                b.data.len(),
                b.mime_type,
                max_image_bytes
            );
        }
        fits
    });

    if let Some(bitmap) = bitmap {
        return Some(ClipContent::Image {
            data: bitmap.data,
            mime_type: bitmap.mime_type,
            file_name: None,
            source_url: None,
        });
    }

    text.map(ClipContent::Text)
}

/// Parse copied text as a web link
/// The whole text must be the URL: no surrounding or embedded whitespace.
pub fn parse_web_url(text: &str) -> Option<Url> {
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        return None;
    }
    Url::parse(text)
        .ok()
        .filter(|url| RECOGNIZED_SCHEMES.contains(&url.scheme()))
}

fn classify_file(url: Url, max_image_bytes: u64) -> ClipContent {
    let Ok(path) = url.to_file_path() else {
        return ClipContent::FilePath(url);
    };

    if !crate::image::is_image_path(&path) {
        return ClipContent::FilePath(url);
    }

    match crate::image::read_image_file(&path, max_image_bytes) {
        Ok((data, mime_type)) => {
            let file_name = file_url_name(&url).map(|name| name.into_owned());
            ClipContent::Image {
                data,
                mime_type,
                file_name,
                source_url: Some(url),
            }
        }
        Err(e) => {
            log::debug!("Keeping {} as a file reference: {:#}", url, e);
            ClipContent::FilePath(url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{Bitmap, ClipboardPayload, MemoryBackend};
    use crate::image::DEFAULT_MAX_IMAGE_SIZE_BYTES;
    use std::fs;
    use std::path::PathBuf;

    fn classify(backend: &dyn ClipboardBackend) -> Option<ClipContent> {
        super::classify(backend, DEFAULT_MAX_IMAGE_SIZE_BYTES)
    }

    fn bitmap() -> Bitmap {
        Bitmap {
            data: crate::image::sample_png(2, 2),
            mime_type: "image/png".to_string(),
        }
    }

    fn temp_file(name: &str, data: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clipstack-classify-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_empty_clipboard_yields_nothing() {
        let backend = MemoryBackend::new();
        assert_eq!(classify(&backend), None);

        backend.set_text("");
        assert_eq!(classify(&backend), None);
    }

    #[test]
    fn test_plain_text() {
        let backend = MemoryBackend::new();
        backend.set_text("just some words");
        assert_eq!(
            classify(&backend),
            Some(ClipContent::Text("just some words".to_string()))
        );
    }

    #[test]
    fn test_web_url_recognized() {
        let backend = MemoryBackend::new();
        backend.set_text("https://github.com/rust-lang");
        assert_eq!(
            classify(&backend),
            Some(ClipContent::Url(Url::parse("https://github.com/rust-lang").unwrap()))
        );

        backend.set_text("ftp://files.example.org/pub");
        assert!(matches!(classify(&backend), Some(ClipContent::Url(_))));
    }

    #[test]
    fn test_other_schemes_and_sentences_stay_text() {
        let backend = MemoryBackend::new();

        for text in ["mailto:dave@example.com", "see https://example.com", "https://example.com\n"] {
            backend.set_text(text);
            assert_eq!(classify(&backend), Some(ClipContent::Text(text.to_string())));
        }
    }

    #[test]
    fn test_file_beats_text_and_image() {
        let backend = MemoryBackend::new();
        let url = Url::parse("file:///tmp/clipstack-does-not-matter.txt").unwrap();
        backend.set_contents(
            Some("/tmp/clipstack-does-not-matter.txt".to_string()),
            vec![url.clone()],
            Some(bitmap()),
        );

        assert_eq!(classify(&backend), Some(ClipContent::FilePath(url)));
    }

    #[test]
    fn test_url_beats_image() {
        let backend = MemoryBackend::new();
        backend.set_contents(Some("https://example.com/cat.png".to_string()), Vec::new(), Some(bitmap()));

        assert!(matches!(classify(&backend), Some(ClipContent::Url(_))));
    }

    #[test]
    fn test_image_beats_plain_text() {
        let backend = MemoryBackend::new();
        let bmp = bitmap();
        backend.set_contents(Some("cat".to_string()), Vec::new(), Some(bmp.clone()));

        assert_eq!(
            classify(&backend),
            Some(ClipContent::Image {
                data: bmp.data,
                mime_type: bmp.mime_type,
                file_name: None,
                source_url: None,
            })
        );
    }

    #[test]
    fn test_image_file_read_as_bitmap() {
        let png = crate::image::sample_png(4, 4);
        let path = temp_file("holiday.png", &png);
        let url = Url::from_file_path(&path).unwrap();

        let backend = MemoryBackend::new();
        backend.write(&ClipboardPayload::FileUrl(url.clone())).unwrap();

        assert_eq!(
            classify(&backend),
            Some(ClipContent::Image {
                data: png,
                mime_type: "image/png".to_string(),
                file_name: Some("holiday.png".to_string()),
                source_url: Some(url),
            })
        );
    }

    #[test]
    fn test_missing_image_file_stays_file_path() {
        let url = Url::parse("file:///nonexistent/clipstack/ghost.png").unwrap();
        let backend = MemoryBackend::new();
        backend.write(&ClipboardPayload::FileUrl(url.clone())).unwrap();

        assert_eq!(classify(&backend), Some(ClipContent::FilePath(url)));
    }

    #[test]
    fn test_oversized_image_file_stays_file_path() {
        let png = crate::image::sample_png(8, 8);
        let path = temp_file("poster.png", &png);
        let url = Url::from_file_path(&path).unwrap();

        let backend = MemoryBackend::new();
        backend.write(&ClipboardPayload::FileUrl(url.clone())).unwrap();

        assert_eq!(
            super::classify(&backend, png.len() as u64 - 1),
            Some(ClipContent::FilePath(url))
        );
    }

    #[test]
    fn test_non_image_bytes_with_image_extension_stay_file_path() {
        let path = temp_file("not-really.png", b"plain text pretending to be a picture");
        let url = Url::from_file_path(&path).unwrap();

        let backend = MemoryBackend::new();
        backend.write(&ClipboardPayload::FileUrl(url.clone())).unwrap();

        assert_eq!(classify(&backend), Some(ClipContent::FilePath(url)));
    }

    #[test]
    fn test_oversized_bitmap_falls_back_to_text() {
        let backend = MemoryBackend::new();
        let bmp = bitmap();
        let limit = bmp.data.len() as u64 - 1;
        backend.set_contents(Some("cat".to_string()), Vec::new(), Some(bmp));

        assert_eq!(
            super::classify(&backend, limit),
            Some(ClipContent::Text("cat".to_string()))
        );

        backend.set_contents(None, Vec::new(), Some(bitmap()));
        assert_eq!(super::classify(&backend, limit), None);
    }
}
