//! Attachment storage seam.
//!
//! Devices and markers reference photos by `data.images[].localId`; the bytes
//! live behind [`AttachmentStore`]. The engine never awaits: deleting edits
//! yields an [`crate::engine::Action::PurgeAttachments`] that the host feeds
//! to [`purge_attachments`] on its own runtime.

#[cfg(test)]
#[path = "attachments_test.rs"]
mod attachments_test;

use std::collections::HashMap;

use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AttachmentError {
    #[error("attachment not found: {0}")]
    NotFound(String),
    #[error("attachment id must not be empty")]
    EmptyId,
}

/// One stored attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub local_id: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Async key/value store for attachment blobs.
#[async_trait::async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store (or replace) an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::EmptyId`] for an empty local id.
    async fn save(&self, attachment: Attachment) -> Result<(), AttachmentError>;

    /// Fetch an attachment by local id.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::NotFound`] when absent.
    async fn get(&self, local_id: &str) -> Result<Attachment, AttachmentError>;

    /// Remove an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::NotFound`] when absent.
    async fn delete(&self, local_id: &str) -> Result<(), AttachmentError>;
}

/// In-process store backed by a `RwLock<HashMap>`.
#[derive(Default)]
pub struct MemoryAttachmentStore {
    items: RwLock<HashMap<String, Attachment>>,
}

impl MemoryAttachmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn save(&self, attachment: Attachment) -> Result<(), AttachmentError> {
        if attachment.local_id.is_empty() {
            return Err(AttachmentError::EmptyId);
        }
        self.items.write().await.insert(attachment.local_id.clone(), attachment);
        Ok(())
    }

    async fn get(&self, local_id: &str) -> Result<Attachment, AttachmentError> {
        self.items
            .read()
            .await
            .get(local_id)
            .cloned()
            .ok_or_else(|| AttachmentError::NotFound(local_id.to_string()))
    }

    async fn delete(&self, local_id: &str) -> Result<(), AttachmentError> {
        match self.items.write().await.remove(local_id) {
            Some(_) => Ok(()),
            None => Err(AttachmentError::NotFound(local_id.to_string())),
        }
    }
}

/// Delete every id in `local_ids`, logging failures instead of stopping.
/// Returns how many were removed.
pub async fn purge_attachments(store: &dyn AttachmentStore, local_ids: &[String]) -> usize {
    let mut purged = 0;
    for id in local_ids {
        match store.delete(id).await {
            Ok(()) => purged += 1,
            Err(e) => tracing::warn!(error = %e, local_id = %id, "attachment purge skipped"),
        }
    }
    tracing::info!(purged, requested = local_ids.len(), "attachments purged");
    purged
}
