//! Database models for file records.

use crate::types::{FileId, FolderId, UserId};
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A binary file part received from a client, before it is stored.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

/// Database request for creating a file record
#[derive(Debug, Clone)]
pub struct FileCreateDBRequest {
    pub folder_id: FolderId,
    pub user_id: UserId,
    pub filename: String,
    /// Relative to the storage root, as returned by the storage backend
    pub path: String,
    pub file_mime: String,
    pub size_bytes: i64,
}

/// Database response for a file record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileDBResponse {
    pub id: FileId,
    pub folder_id: FolderId,
    pub user_id: UserId,
    pub filename: String,
    pub path: String,
    pub file_mime: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Filter for listing file records
#[derive(Debug, Clone)]
pub struct FileFilter {
    pub folder_id: Option<FolderId>,
    pub skip: i64,
    pub limit: i64,
}

impl FileFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            folder_id: None,
            skip,
            limit,
        }
    }

    pub fn with_folder(mut self, folder_id: FolderId) -> Self {
        self.folder_id = Some(folder_id);
        self
    }
}

/// Result of an upload attempt that did not hit an unexpected error.
#[derive(Debug, Clone)]
pub enum StoreOutcome {
    /// The blob was written and its record created.
    Stored(FileDBResponse),
    /// The upload was refused; the message, if any, is safe to show to the caller.
    Rejected(Option<String>),
}
