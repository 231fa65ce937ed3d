//! API request/response models for folders.

use super::pagination::Pagination;
use crate::db::models::folders::FolderDBResponse;
use crate::types::{FolderId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FolderCreate {
    #[schema(example = "Godown 12 inspection photos")]
    pub name: String,
    /// User the folder belongs to, if any
    #[serde(default)]
    pub created_by: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FolderResponse {
    pub id: FolderId,
    pub name: String,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl From<FolderDBResponse> for FolderResponse {
    fn from(db: FolderDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing folders
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFoldersQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Only folders created by this user
    pub created_by: Option<UserId>,
}
