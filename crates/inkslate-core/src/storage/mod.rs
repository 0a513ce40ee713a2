//! Storage abstraction for persistence.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::document::Whiteboard;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Whiteboard not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Persistence collaborator for whiteboards.
///
/// The editor only loads and saves; listing, deleting and duplicating
/// boards is the host's business.
pub trait Storage: Send + Sync {
    /// Save a whiteboard under `id`, replacing any previous version.
    fn save(&self, id: &str, board: &Whiteboard) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the whiteboard stored under `id`.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Whiteboard>>;

    /// Check if a whiteboard exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Strip ephemeral elements before a board leaves the editor.
pub(crate) fn persistable(board: &Whiteboard) -> Whiteboard {
    Whiteboard {
        content: board.content.without_ephemeral(),
        ..board.clone()
    }
}
