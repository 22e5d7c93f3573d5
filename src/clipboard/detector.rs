use super::backend::{ChangeToken, ClipboardBackend};
use super::classify::classify;
use crate::models::Capture;

/// Whether the detector is currently ignoring its own write-back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Suppression {
    #[default]
    Idle,
    /// The clipboard holds our own write
    Suppressing,
}

/// Detects external clipboard changes by comparing change tokens
///
/// The detector only reads and classifies; it never decides whether a
/// capture duplicates history.
#[derive(Debug)]
pub struct ChangeDetector {
    last_seen: Option<ChangeToken>,
    suppression: Suppression,
    max_image_bytes: u64,
}

impl ChangeDetector {
    /// Create a detector that ignores images larger than `max_image_bytes`
    pub fn new(max_image_bytes: u64) -> Self {
        ChangeDetector {
            last_seen: None,
            suppression: Suppression::Idle,
            max_image_bytes,
        }
    }

    /// Check the clipboard once
    ///
    /// Returns a capture only when the token moved since the last poll and
    /// the new content is not our own write-back.
    pub fn poll(&mut self, backend: &dyn ClipboardBackend) -> Option<Capture> {
        let token = match backend.change_token() {
            Ok(token) => token,
            Err(e) => {
                log::debug!("Failed to read {} change token: {:#}", backend.name(), e);
                return None;
            }
        };

        if self.last_seen == Some(token) {
            // The window closes at the first tick that sees our write unchanged
            if self.is_suppressing() {
                log::trace!("Suppression window closed at {:?}", token);
                self.suppression = Suppression::Idle;
            }
            return None;
        }

        self.last_seen = Some(token);

        // A token other than our write's means someone else copied since
        self.suppression = Suppression::Idle;

        let content = classify(backend, self.max_image_bytes)?;
        log::debug!("Detected clipboard change: {:?}", content.kind());
        Some(Capture::now(content))
    }

    /// Treat `token` (produced by our own write) as already seen
    pub fn suppress(&mut self, token: ChangeToken) {
        log::debug!("Suppressing capture of own write-back ({:?})", token);
        self.last_seen = Some(token);
        self.suppression = Suppression::Suppressing;
    }

    pub fn is_suppressing(&self) -> bool {
        self.suppression == Suppression::Suppressing
    }
}
