pub mod backend;
pub mod classify;
pub mod detector;
pub mod memory;
pub mod watch;
pub mod wayland;

use anyhow::{Result, anyhow};
use std::env;

pub use backend::{Bitmap, ChangeToken, ClipboardBackend, ClipboardPayload};
pub use detector::ChangeDetector;
pub use memory::MemoryBackend;
pub use watch::Poller;
pub use wayland::WaylandBackend;

/// Create a clipboard backend based on the current display server
/// Detects Wayland via WAYLAND_DISPLAY environment variable
/// Returns error if no supported display server is detected
///
/// `max_image_bytes` caps how much bitmap data the backend will read.
pub fn create_backend(max_image_bytes: u64) -> Result<Box<dyn ClipboardBackend>> {
    // Check for Wayland
    if env::var("WAYLAND_DISPLAY").is_ok() {
        log::info!("Detected Wayland display server");
        let backend = WaylandBackend::new(max_image_bytes)?;
        return Ok(Box::new(backend));
    }

    if env::var("DISPLAY").is_ok() {
        return Err(anyhow!(
            "X11 detected but not yet supported. Wayland support only (set WAYLAND_DISPLAY)"
        ));
    }

    Err(anyhow!(
        "No supported display server detected. Set WAYLAND_DISPLAY for Wayland"
    ))
}
