/// Errors surfaced to callers of history operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// The id is no longer in history (removed or evicted)
    #[error("Clip {0} not found in history")]
    NotFound(u64),

    /// The platform clipboard refused the write
    #[error("Failed to write clip {id} to clipboard: {reason}")]
    WriteFailed { id: u64, reason: String },
}
