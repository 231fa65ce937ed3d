//! Database repository for file records.
//!
//! File content lives in a [`FileStorage`] backend, metadata (storage path and MIME type)
//! lives in the `files` table. The repository keeps the two in step: blobs are written
//! before their record is inserted and removed again when the insert fails.

use crate::db::{
    errors::Result,
    handlers::{Folders, Users, file_storage::FileStorage, repository::Repository},
    models::file_storage::FileStorageRequest,
    models::files::{FileCreateDBRequest, FileDBResponse, FileFilter, FileUpload, StoreOutcome},
};
use crate::types::{FileId, FolderId, OwnerScope};
use chrono::Utc;
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::instrument;

const FILE_COLUMNS: &str = "id, folder_id, user_id, filename, path, file_mime, size_bytes, created_at";

pub struct Files<'c> {
    db: &'c mut SqliteConnection,
    storage: Arc<dyn FileStorage>,
    scope: OwnerScope,
}

impl<'c> Files<'c> {
    pub fn new(db: &'c mut SqliteConnection, storage: Arc<dyn FileStorage>, scope: OwnerScope) -> Self {
        Self { db, storage, scope }
    }

    /// Store an uploaded file in a folder on behalf of the scope's user.
    ///
    /// Refusals the caller can act on (unknown owner or folder, failed disk write) are
    /// returned as [`StoreOutcome::Rejected`]; database failures are errors.
    #[instrument(skip(self, upload), fields(scope = %self.scope, filename = %upload.filename, bytes = upload.content.len()), err)]
    pub async fn upload(&mut self, folder_id: FolderId, upload: FileUpload) -> Result<StoreOutcome> {
        let Some(user_id) = self.scope.user_id().map(str::to_owned) else {
            return Ok(StoreOutcome::Rejected(Some("Uploads require an owning user.".to_string())));
        };

        if !Users::new(&mut *self.db).exists(&user_id).await? {
            return Ok(StoreOutcome::Rejected(Some("User not found.".to_string())));
        }

        if !Folders::new(&mut *self.db).exists(folder_id).await? {
            return Ok(StoreOutcome::Rejected(Some("Folder not found.".to_string())));
        }

        let size_bytes = upload.content.len() as i64;

        // Store content first, the backend picks the storage key
        let storage_request = FileStorageRequest {
            folder_id,
            filename: upload.filename.clone(),
            content: upload.content,
        };

        let storage_response = match self.storage.store(storage_request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, folder_id, "Failed to write file content");
                return Ok(StoreOutcome::Rejected(Some("Failed to write file to disk.".to_string())));
            }
        };

        let request = FileCreateDBRequest {
            folder_id,
            user_id,
            filename: upload.filename,
            path: storage_response.storage_key,
            file_mime: upload.content_type,
            size_bytes,
        };

        match self.create(&request).await {
            Ok(file) => Ok(StoreOutcome::Stored(file)),
            Err(e) => {
                // If metadata storage fails, clean up the file content
                let _ = self.storage.delete(&request.path).await;
                Err(e)
            }
        }
    }

    /// Delete a file record and return it. Content stays on disk until
    /// [`remove_content`] is called, which must happen after the surrounding
    /// transaction commits.
    #[instrument(skip(self), fields(scope = %self.scope), err)]
    pub async fn remove(&mut self, id: FileId) -> Result<Option<FileDBResponse>> {
        let Some(file) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        if !self.delete(id).await? {
            return Ok(None);
        }

        Ok(Some(file))
    }
}

/// Best-effort removal of a deleted record's content.
pub async fn remove_content(storage: &dyn FileStorage, file: &FileDBResponse) {
    if let Err(e) = storage.delete(&file.path).await {
        tracing::warn!(file_id = file.id, error = %e, "Failed to remove file content, leaving orphaned blob");
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Files<'c> {
    type CreateRequest = FileCreateDBRequest;
    type Response = FileDBResponse;
    type Id = FileId;
    type Filter = FileFilter;

    #[instrument(skip(self, request), fields(folder_id = request.folder_id, path = %request.path), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let query = format!(
            r#"
            INSERT INTO files (folder_id, user_id, filename, path, file_mime, size_bytes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {FILE_COLUMNS}
            "#
        );

        let file = sqlx::query_as::<_, FileDBResponse>(&query)
            .bind(request.folder_id)
            .bind(&request.user_id)
            .bind(&request.filename)
            .bind(&request.path)
            .bind(&request.file_mime)
            .bind(request.size_bytes)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(file)
    }

    #[instrument(skip(self), fields(scope = %self.scope), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let file = match self.scope.user_id() {
            None => {
                sqlx::query_as::<_, FileDBResponse>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?"))
                    .bind(id)
                    .fetch_optional(&mut *self.db)
                    .await?
            }
            Some(user_id) => {
                sqlx::query_as::<_, FileDBResponse>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ? AND user_id = ?"))
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(&mut *self.db)
                    .await?
            }
        };

        Ok(file)
    }

    #[instrument(skip(self, filter), fields(scope = %self.scope, limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = format!("SELECT {FILE_COLUMNS} FROM files");
        let mut conditions = Vec::new();

        if filter.folder_id.is_some() {
            conditions.push("folder_id = ?");
        }
        if self.scope.user_id().is_some() {
            conditions.push("user_id = ?");
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");

        let mut sql_query = sqlx::query_as::<_, FileDBResponse>(&query);

        if let Some(folder_id) = filter.folder_id {
            sql_query = sql_query.bind(folder_id);
        }
        if let Some(user_id) = self.scope.user_id() {
            sql_query = sql_query.bind(user_id);
        }

        let files = sql_query.bind(filter.limit).bind(filter.skip).fetch_all(&mut *self.db).await?;
        Ok(files)
    }

    #[instrument(skip(self), fields(scope = %self.scope), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = match self.scope.user_id() {
            None => sqlx::query("DELETE FROM files WHERE id = ?").bind(id).execute(&mut *self.db).await?,
            Some(user_id) => {
                sqlx::query("DELETE FROM files WHERE id = ? AND user_id = ?")
                    .bind(id)
                    .bind(user_id)
                    .execute(&mut *self.db)
                    .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }
}
