//! Database models for folders.

use crate::types::{FolderId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new folder
#[derive(Debug, Clone)]
pub struct FolderCreateDBRequest {
    pub name: String,
    pub created_by: Option<UserId>,
}

/// Database response for a folder
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FolderDBResponse {
    pub id: FolderId,
    pub name: String,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Filter for listing folders
#[derive(Debug, Clone)]
pub struct FolderFilter {
    pub skip: i64,
    pub limit: i64,
    pub created_by: Option<UserId>,
}

impl FolderFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            created_by: None,
        }
    }

    pub fn with_created_by(mut self, user_id: UserId) -> Self {
        self.created_by = Some(user_id);
        self
    }
}
