use chrono::{DateTime, Utc};
use std::borrow::Cow;
use url::Url;

/// Content type for clipboard entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipContent {
    /// Plain UTF-8 text
    Text(String),
    /// Raw bitmap, optionally read from a file on disk
    Image {
        data: Vec<u8>,
        mime_type: String,
        /// File name of the source image, if it was copied as a file
        file_name: Option<String>,
        /// `file:` URL of the source image, if it was copied as a file
        source_url: Option<Url>,
    },
    /// Reference to a file (always a `file:` URL)
    FilePath(Url),
    /// Web link with a recognized scheme (http, https, ftp)
    Url(Url),
}

/// Kind tag mirrored from [`ClipContent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Image,
    FilePath,
    Url,
}

impl ContentKind {
    /// Short uppercase label for listings
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Text => "TEXT",
            ContentKind::Image => "IMAGE",
            ContentKind::FilePath => "FILE",
            ContentKind::Url => "URL",
        }
    }
}

impl ClipContent {
    /// Kind tag for this content
    pub fn kind(&self) -> ContentKind {
        match self {
            ClipContent::Text(_) => ContentKind::Text,
            ClipContent::Image { .. } => ContentKind::Image,
            ClipContent::FilePath(_) => ContentKind::FilePath,
            ClipContent::Url(_) => ContentKind::Url,
        }
    }

    /// Get a preview string (truncated for display)
    pub fn preview(&self, max_len: usize) -> String {
        match self {
            ClipContent::Text(text) => {
                let first_line = text.lines().next().unwrap_or("");
                if first_line.chars().count() > max_len {
                    let cut: String = first_line.chars().take(max_len).collect();
                    format!("{}...", cut)
                } else {
                    first_line.to_string()
                }
            }
            ClipContent::Image {
                data,
                mime_type,
                file_name,
                ..
            } => {
                let size = match crate::image::dimensions(data) {
                    Some((w, h)) => format!("{}x{}", w, h),
                    None => format!("{} bytes", data.len()),
                };
                match file_name {
                    Some(name) => format!("[Image: {} ({}, {})]", name, mime_type, size),
                    None => format!("[Image: {} ({})]", mime_type, size),
                }
            }
            ClipContent::FilePath(url) => {
                format!("[File: {}]", file_url_name(url).unwrap_or(Cow::Borrowed("unknown")))
            }
            ClipContent::Url(url) => url.as_str().to_string(),
        }
    }

    /// Check whether `other` should replace this content in history.
    /// Images are never duplicates of each other: every capture is kept.
    pub fn is_duplicate_of(&self, other: &ClipContent) -> bool {
        match (self, other) {
            (ClipContent::Text(a), ClipContent::Text(b)) => a == b,
            (ClipContent::Url(a), ClipContent::Url(b)) => a == b,
            (ClipContent::FilePath(a), ClipContent::FilePath(b)) => a == b,
            _ => false,
        }
    }
}

/// Last path component of a `file:` URL, percent-decoded when possible
pub fn file_url_name(url: &Url) -> Option<Cow<'_, str>> {
    if let Ok(path) = url.to_file_path() {
        if let Some(name) = path.file_name() {
            return Some(Cow::Owned(name.to_string_lossy().into_owned()));
        }
    }
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(Cow::Borrowed)
}

/// Freshly classified clipboard content, not yet part of any history.
/// Emitted by the change detector once per genuine clipboard change.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub content: ClipContent,
    pub captured_at: DateTime<Utc>,
}

impl Capture {
    /// Capture content observed right now
    pub fn now(content: ClipContent) -> Self {
        Capture {
            content,
            captured_at: Utc::now(),
        }
    }

    /// Capture content with an explicit timestamp
    pub fn at(content: ClipContent, captured_at: DateTime<Utc>) -> Self {
        Capture {
            content,
            captured_at,
        }
    }
}

/// A single clipboard entry with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ClipEntry {
    id: u64,
    content: ClipContent,
    kind: ContentKind,
    captured_at: DateTime<Utc>,
    pub(crate) pinned: bool,
}

impl ClipEntry {
    /// Create an entry from an accepted capture
    pub(crate) fn from_capture(id: u64, capture: Capture) -> Self {
        let kind = capture.content.kind();
        ClipEntry {
            id,
            content: capture.content,
            kind,
            captured_at: capture.captured_at,
            pinned: false,
        }
    }

    /// Unique identifier (monotonic counter)
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn content(&self) -> &ClipContent {
        &self.content
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// When this entry was captured
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Whether this entry is pinned (kept ahead of unpinned entries and never evicted)
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Get a preview string for this entry
    pub fn preview(&self, max_len: usize) -> String {
        self.content.preview(max_len)
    }

    /// Toggle pinned status
    pub(crate) fn toggle_pin(&mut self) {
        self.pinned = !self.pinned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_kind_matches_content() {
        let cases = vec![
            (ClipContent::Text("hi".to_string()), ContentKind::Text),
            (ClipContent::Url(url("https://example.com")), ContentKind::Url),
            (ClipContent::FilePath(url("file:///tmp/a.txt")), ContentKind::FilePath),
            (
                ClipContent::Image {
                    data: vec![1, 2, 3],
                    mime_type: "image/png".to_string(),
                    file_name: None,
                    source_url: None,
                },
                ContentKind::Image,
            ),
        ];

        for (id, (content, kind)) in cases.into_iter().enumerate() {
            let entry = ClipEntry::from_capture(id as u64, Capture::now(content));
            assert_eq!(entry.kind(), kind);
            assert_eq!(entry.content().kind(), kind);
            assert!(!entry.is_pinned());
        }
    }

    #[test]
    fn test_clip_content_preview() {
        let text = ClipContent::Text("Hello, world!\nsecond line".to_string());
        assert_eq!(text.preview(5), "Hello...");
        assert_eq!(text.preview(50), "Hello, world!");

        let image = ClipContent::Image {
            data: vec![0; 100],
            mime_type: "image/png".to_string(),
            file_name: None,
            source_url: None,
        };
        assert_eq!(image.preview(50), "[Image: image/png (100 bytes)]");

        let file = ClipContent::FilePath(url("file:///tmp/report%20final.pdf"));
        assert_eq!(file.preview(50), "[File: report final.pdf]");
    }

    #[test]
    fn test_duplicate_rules() {
        let a = ClipContent::Text("a".to_string());
        assert!(a.is_duplicate_of(&ClipContent::Text("a".to_string())));
        assert!(!a.is_duplicate_of(&ClipContent::Text("A".to_string())));

        let link = ClipContent::Url(url("https://example.com/x"));
        assert!(link.is_duplicate_of(&ClipContent::Url(url("https://example.com/x"))));
        // Same characters, different kind
        assert!(!ClipContent::Text("https://example.com/x".to_string()).is_duplicate_of(&link));

        let file = ClipContent::FilePath(url("file:///tmp/a.txt"));
        assert!(file.is_duplicate_of(&ClipContent::FilePath(url("file:///tmp/a.txt"))));
        assert!(!file.is_duplicate_of(&ClipContent::FilePath(url("file:///tmp/b.txt"))));

        let image = ClipContent::Image {
            data: vec![7; 16],
            mime_type: "image/png".to_string(),
            file_name: Some("shot.png".to_string()),
            source_url: None,
        };
        assert!(!image.is_duplicate_of(&image.clone()));
    }
}
