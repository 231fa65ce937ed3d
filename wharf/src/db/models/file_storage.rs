use crate::types::FolderId;
use bytes::Bytes;

/// Request to store file content
#[derive(Debug, Clone)]
pub struct FileStorageRequest {
    pub folder_id: FolderId,
    /// Original client-side file name, used to pick the stored extension
    pub filename: String,
    pub content: Bytes,
}

/// Response from storing file content
#[derive(Debug, Clone)]
pub struct FileStorageResponse {
    /// Path relative to the storage root, e.g. "12/6f1c....png"
    pub storage_key: String,
}
