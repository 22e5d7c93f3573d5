use anyhow::{Context, Result, anyhow};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use url::Url;

use super::backend::{Bitmap, ChangeToken, ClipboardBackend, ClipboardPayload};

/// Wayland clipboard backend using wl-clipboard tools
/// Requires wl-paste and wl-copy to be installed
///
/// Wayland has no change counter, so the change token is a hash of the
/// offered MIME types and the default representation.
pub struct WaylandBackend {
    max_image_bytes: u64,
}

impl WaylandBackend {
    /// Create a new Wayland clipboard backend
    /// Bitmaps larger than `max_image_bytes` are not read
    pub fn new(max_image_bytes: u64) -> Result<Self> {
        // Verify wl-clipboard is available
        for tool in ["wl-copy", "wl-paste"] {
            Command::new(tool)
                .arg("--version")
                .output()
                .with_context(|| format!("{} not found. Install wl-clipboard package", tool))?;
        }

        log::debug!("WaylandBackend initialized successfully");
        Ok(WaylandBackend { max_image_bytes })
    }

    /// Run wl-paste with the given args, returning stdout on success
    fn paste(&self, args: &[&str]) -> Option<Vec<u8>> {
        let output = Command::new("wl-paste")
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        match output {
            Ok(output) if output.status.success() => Some(output.stdout),
            Ok(output) => {
                log::trace!("wl-paste {:?} exited with {}", args, output.status);
                None
            }
            Err(e) => {
                log::debug!("Failed to run wl-paste {:?}: {}", args, e);
                None
            }
        }
    }

    /// Like `paste`, but stops reading once more than `limit` bytes arrive
    fn paste_capped(&self, args: &[&str], limit: u64) -> Option<Vec<u8>> {
        let mut child = match Command::new("wl-paste")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                log::debug!("Failed to run wl-paste {:?}: {}", args, e);
                return None;
            }
        };

        let read = child
            .stdout
            .take()
            .map(|stdout| read_capped(stdout, limit))
            .unwrap_or_else(|| Ok(None));

        let data = match read {
            Ok(Some(data)) => data,
            Ok(None) => {
                log::debug!("wl-paste {:?} offered more than {} bytes, skipping", args, limit);
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Err(e) => {
                log::debug!("Failed to read wl-paste {:?} output: {}", args, e);
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        };

        match child.wait() {
            Ok(status) if status.success() => Some(data),
            Ok(status) => {
                log::trace!("wl-paste {:?} exited with {}", args, status);
                None
            }
            Err(e) => {
                log::debug!("Failed to wait for wl-paste {:?}: {}", args, e);
                None
            }
        }
    }

    fn offered_types(&self) -> Vec<String> {
        self.paste(&["--list-types"])
            .map(|out| {
                String::from_utf8_lossy(&out)
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pipe bytes into wl-copy under the given MIME type
    fn copy(&self, mime_type: &str, data: &[u8]) -> Result<()> {
        let mut child = Command::new("wl-copy")
            .arg("--type")
            .arg(mime_type)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn wl-copy")?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(data)
                .context("Failed to write to wl-copy stdin")?;
        }

        let status = child.wait().context("Failed to wait for wl-copy")?;

        if !status.success() {
            return Err(anyhow!("wl-copy failed with status: {}", status));
        }

        log::debug!("Wrote {} bytes ({}) to clipboard", data.len(), mime_type);
        Ok(())
    }
}

impl ClipboardBackend for WaylandBackend {
    fn change_token(&self) -> Result<ChangeToken> {
        let mut hasher = DefaultHasher::new();
        // An empty clipboard hashes to a stable token of its own
        let types = self.offered_types();
        types.hash(&mut hasher);
        if !types.is_empty() {
            self.paste(&["--no-newline"]).hash(&mut hasher);
        }
        Ok(ChangeToken(hasher.finish()))
    }

    fn read_text(&self) -> Option<String> {
        let bytes = self.paste(&["--no-newline", "--type", "text"])?;
        String::from_utf8(bytes).ok()
    }

    fn read_file_urls(&self) -> Vec<Url> {
        if !self.offered_types().iter().any(|t| t == "text/uri-list") {
            return Vec::new();
        }
        let Some(bytes) = self.paste(&["--no-newline", "--type", "text/uri-list"]) else {
            return Vec::new();
        };

        // RFC 2483: CRLF separated, '#' lines are comments
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| Url::parse(l).ok())
            .filter(|u| u.scheme() == "file")
            .collect()
    }

    fn read_image(&self) -> Option<Bitmap> {
        let mime_type = self
            .offered_types()
            .into_iter()
            .find(|t| t.starts_with("image/"))?;
        let data = self.paste_capped(&["--type", mime_type.as_str()], self.max_image_bytes)?;
        if data.is_empty() {
            return None;
        }
        Some(Bitmap { data, mime_type })
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<ChangeToken> {
        match payload {
            ClipboardPayload::Text(text) => self.copy("text/plain", text.as_bytes())?,
            ClipboardPayload::FileUrl(url) => {
                self.copy("text/uri-list", format!("{}\r\n", url).as_bytes())?
            }
            ClipboardPayload::Image { data, mime_type } => self.copy(mime_type, data)?,
        }
        self.change_token()
    }

    fn name(&self) -> &'static str {
        "Wayland"
    }
}

/// Read at most `limit` bytes
/// Returns None when the reader has more than that to give.
fn read_capped(reader: impl Read, limit: u64) -> io::Result<Option<Vec<u8>>> {
    let mut data = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut data)?;
    if data.len() as u64 > limit {
        return Ok(None);
    }
    Ok(Some(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_capped() {
        let bytes = vec![7u8; 64];

        assert_eq!(read_capped(Cursor::new(&bytes), 64).unwrap(), Some(bytes.clone()));
        assert_eq!(read_capped(Cursor::new(&bytes), 1000).unwrap(), Some(bytes.clone()));
        assert_eq!(read_capped(Cursor::new(&bytes), 63).unwrap(), None);
        assert_eq!(read_capped(Cursor::new(Vec::new()), 0).unwrap(), Some(Vec::new()));
    }
}
