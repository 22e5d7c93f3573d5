//! Clipstack - clipboard history that never records its own write-backs
//!
//! Polls the system clipboard, keeps a bounded, deduplicated and searchable
//! history of what was copied, and writes chosen clips back without them
//! being captured again.

pub mod clipboard;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod image;
pub mod logging;
pub mod models;

pub use coordinator::Coordinator;
pub use error::HistoryError;
