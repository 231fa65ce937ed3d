//! API request/response models for files.

use crate::db::models::files::FileDBResponse;
use crate::types::{FileId, FolderId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Message returned alongside a stored upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Images uploaded successfully";

/// Fallback message when the repository refuses an upload without saying why.
pub const UPLOAD_FAILED_MESSAGE: &str = "Image upload failed";

/// File metadata as stored in the record store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponse {
    pub id: FileId,
    pub folder_id: FolderId,
    pub user_id: UserId,
    /// Name the client uploaded the file under
    pub filename: String,
    /// Storage path relative to the storage root
    pub path: String,
    /// MIME type served back on download
    pub file_mime: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FileDBResponse> for FileResponse {
    fn from(db: FileDBResponse) -> Self {
        Self {
            id: db.id,
            folder_id: db.folder_id,
            user_id: db.user_id,
            filename: db.filename,
            path: db.path,
            file_mime: db.file_mime,
            size_bytes: db.size_bytes,
            created_at: db.created_at,
        }
    }
}

/// Payload of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub uploaded: FileResponse,
    #[schema(example = "Images uploaded successfully")]
    pub message: String,
}

/// Payload of a file deletion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileDeleteResponse {
    pub id: FileId,
    pub deleted: bool,
}
