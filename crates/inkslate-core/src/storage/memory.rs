//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult, persistable};
use crate::document::Whiteboard;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<HashMap<String, Whiteboard>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with `boards`, keyed by their ids.
    pub fn with_boards(boards: impl IntoIterator<Item = Whiteboard>) -> Self {
        Self {
            boards: RwLock::new(boards.into_iter().map(|b| (b.id.clone(), b)).collect()),
        }
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, board: &Whiteboard) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let board = persistable(board);
        Box::pin(async move {
            let mut boards = self
                .boards
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            boards.insert(id, board);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Whiteboard>> {
        let id = id.to_string();
        Box::pin(async move {
            let boards = self
                .boards
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            boards.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let boards = self
                .boards
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(boards.contains_key(&id))
        })
    }
}
