use std::borrow::Cow;

use super::clip::{ClipContent, ClipEntry, file_url_name};

/// Case-insensitive substring search over clipboard entries
///
/// An empty query returns every entry. Matching never reorders: results
/// keep the order of `clips`.
pub fn search<'a>(clips: &'a [ClipEntry], query: &str) -> Vec<&'a ClipEntry> {
    if query.is_empty() {
        return clips.iter().collect();
    }

    let needle = query.to_lowercase();
    clips
        .iter()
        .filter(|clip| {
            clip.searchable_text()
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}

impl ClipEntry {
    /// Text matched by search for this clip
    /// Images without a source file name have nothing to match against
    fn searchable_text(&self) -> Option<Cow<'_, str>> {
        match self.content() {
            ClipContent::Text(text) => Some(Cow::Borrowed(text.as_str())),
            ClipContent::Url(url) => Some(Cow::Borrowed(url.as_str())),
            ClipContent::FilePath(url) => file_url_name(url),
            ClipContent::Image { file_name, .. } => file_name.as_deref().map(Cow::Borrowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::clip::Capture;
    use url::Url;

    fn entry(id: u64, content: ClipContent) -> ClipEntry {
        ClipEntry::from_capture(id, Capture::now(content))
    }

    fn ids(results: &[&ClipEntry]) -> Vec<u64> {
        results.iter().map(|c| c.id()).collect()
    }

    #[test]
    fn test_search_empty_query() {
        let clips = vec![
            entry(1, ClipContent::Text("hello world".to_string())),
            entry(2, ClipContent::Text("goodbye world".to_string())),
        ];

        let results = search(&clips, "");
        assert_eq!(ids(&results), vec![1, 2]);
    }

    #[test]
    fn test_search_case_insensitive_substring() {
        let clips = vec![
            entry(1, ClipContent::Text("Forgit".to_string())),
            entry(2, ClipContent::Url(Url::parse("https://github.com").unwrap())),
            entry(3, ClipContent::Text("forget".to_string())),
        ];

        assert_eq!(ids(&search(&clips, "git")), vec![1, 2]);
        assert_eq!(ids(&search(&clips, "GIT")), vec![1, 2]);
        assert_eq!(ids(&search(&clips, "Hub.Com")), vec![2]);
    }

    #[test]
    fn test_search_file_uses_last_component() {
        let clips = vec![entry(
            1,
            ClipContent::FilePath(Url::parse("file:///home/dave/projects/Budget.xlsx").unwrap()),
        )];

        assert_eq!(ids(&search(&clips, "budget")), vec![1]);
        // Parent directories are not part of the match
        assert!(search(&clips, "projects").is_empty());
    }

    #[test]
    fn test_search_images_by_file_name_only() {
        let named = ClipContent::Image {
            data: vec![1; 8],
            mime_type: "image/png".to_string(),
            file_name: Some("Screenshot 2024.png".to_string()),
            source_url: None,
        };
        let anonymous = ClipContent::Image {
            data: vec![1; 8],
            mime_type: "image/png".to_string(),
            file_name: None,
            source_url: None,
        };
        let clips = vec![entry(1, named), entry(2, anonymous)];

        assert_eq!(ids(&search(&clips, "screenshot")), vec![1]);
        assert!(search(&clips, "image").is_empty());
    }
}
