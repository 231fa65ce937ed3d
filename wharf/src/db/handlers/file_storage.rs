use crate::config::FilesConfig;
use crate::db::{
    errors::{DbError, Result},
    models::file_storage::{FileStorageRequest, FileStorageResponse},
};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Trait for file storage backends
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store file content and return storage key
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse>;

    /// Resolve a storage key to an existing file on disk.
    ///
    /// Returns `None` when the key does not name a regular file inside the storage root,
    /// including keys that try to escape it.
    async fn resolve(&self, storage_key: &str) -> Result<Option<PathBuf>>;

    /// Delete file content using storage key
    async fn delete(&self, storage_key: &str) -> Result<()>;

    /// Check if file exists using storage key
    async fn exists(&self, storage_key: &str) -> Result<bool>;
}

// ============================================================================
// Local Filesystem Storage Implementation
// ============================================================================

/// Local filesystem storage backend - stores blobs below a root directory,
/// one subdirectory per folder.
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

/// Extension used for the stored blob: the client's extension when it is short and
/// alphanumeric, `dat` otherwise.
fn stored_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "dat".to_string())
}

/// Only plain relative paths are accepted as storage keys: no root, no prefix, no `.` or `..`.
fn is_plain_relative(storage_key: &str) -> bool {
    let path = Path::new(storage_key);
    !storage_key.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

async fn canonicalize_existing(path: &Path) -> Result<Option<PathBuf>> {
    match fs::canonicalize(path).await {
        Ok(p) => Ok(Some(p)),
        Err(e) if e.kind() == ErrorKind::NotFound || e.kind() == ErrorKind::NotADirectory => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, request: FileStorageRequest) -> Result<FileStorageResponse> {
        let file_uuid = uuid::Uuid::new_v4();
        let relative_path = format!("{}/{}.{}", request.folder_id, file_uuid, stored_extension(&request.filename));

        let full_path = self.base_path.join(&relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let write = async {
            let mut file = fs::File::create(&full_path).await?;
            file.write_all(&request.content).await?;
            file.sync_all().await
        };

        if let Err(e) = write.await {
            // Don't leave a truncated blob behind
            let _ = fs::remove_file(&full_path).await;
            return Err(e.into());
        }

        tracing::debug!(storage_key = %relative_path, bytes = request.content.len(), "Stored file content");

        Ok(FileStorageResponse {
            storage_key: relative_path,
        })
    }

    async fn resolve(&self, storage_key: &str) -> Result<Option<PathBuf>> {
        if !is_plain_relative(storage_key) {
            tracing::warn!(storage_key, "Rejected storage key that is not a plain relative path");
            return Ok(None);
        }

        let Some(root) = canonicalize_existing(&self.base_path).await? else {
            return Ok(None);
        };
        let Some(resolved) = canonicalize_existing(&self.base_path.join(storage_key)).await? else {
            return Ok(None);
        };

        // Symlinks inside the root may still point elsewhere
        if !resolved.starts_with(&root) {
            tracing::warn!(storage_key, "Rejected storage key resolving outside the storage root");
            return Ok(None);
        }

        let metadata = fs::metadata(&resolved).await?;
        Ok(metadata.is_file().then_some(resolved))
    }

    async fn delete(&self, storage_key: &str) -> Result<()> {
        if let Some(full_path) = self.resolve(storage_key).await? {
            fs::remove_file(&full_path).await?;
        }

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> Result<bool> {
        Ok(self.resolve(storage_key).await?.is_some())
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Create the file storage backend from configuration, making sure the root exists
pub async fn create_file_storage(config: &FilesConfig) -> Result<Arc<dyn FileStorage>> {
    tracing::info!("Creating local file storage backend (path: {:?})", config.root);

    if let Err(e) = fs::create_dir_all(&config.root).await {
        return Err(DbError::Other(anyhow::anyhow!(
            "Failed to create local storage directory {:?}: {}",
            config.root,
            e
        )));
    }

    Ok(Arc::new(LocalFileStorage::new(config.root.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn request(folder_id: i64, filename: &str, content: &'static [u8]) -> FileStorageRequest {
        FileStorageRequest {
            folder_id,
            filename: filename.to_string(),
            content: Bytes::from_static(content),
        }
    }

    #[tokio::test]
    async fn test_local_storage_lifecycle() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(temp_dir.path().to_path_buf());

        let response = storage.store(request(7, "dock-photo.PNG", b"png bytes")).await.unwrap();
        assert!(response.storage_key.starts_with("7/"));
        assert!(response.storage_key.ends_with(".png"));

        let resolved = storage.resolve(&response.storage_key).await.unwrap().unwrap();
        assert_eq!(tokio::fs::read(&resolved).await.unwrap(), b"png bytes");
        assert!(storage.exists(&response.storage_key).await.unwrap());

        storage.delete(&response.storage_key).await.unwrap();
        assert!(!storage.exists(&response.storage_key).await.unwrap());
        assert!(storage.resolve(&response.storage_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_nonexistent_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(temp_dir.path().to_path_buf());

        assert!(storage.resolve("3/missing.dat").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        tokio::fs::create_dir_all(&root).await.unwrap();
        tokio::fs::write(outer.path().join("secret.txt"), b"secret").await.unwrap();
        tokio::fs::create_dir_all(root.join("1")).await.unwrap();

        let storage = LocalFileStorage::new(root);

        assert!(storage.resolve("../secret.txt").await.unwrap().is_none());
        assert!(storage.resolve("1/../../secret.txt").await.unwrap().is_none());
        assert!(storage.resolve("./1").await.unwrap().is_none());
        assert!(storage.resolve("").await.unwrap().is_none());

        let absolute = outer.path().join("secret.txt");
        assert!(storage.resolve(absolute.to_str().unwrap()).await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_rejects_symlink_escape() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        tokio::fs::create_dir_all(root.join("1")).await.unwrap();
        tokio::fs::write(outer.path().join("secret.txt"), b"secret").await.unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("1/link.txt")).unwrap();

        let storage = LocalFileStorage::new(root);
        assert!(storage.resolve("1/link.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_rejects_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(temp_dir.path().join("4")).await.unwrap();
        let storage = LocalFileStorage::new(temp_dir.path().to_path_buf());

        assert!(storage.resolve("4").await.unwrap().is_none());
    }

    #[test]
    fn test_stored_extension() {
        assert_eq!(stored_extension("invoice.PDF"), "pdf");
        assert_eq!(stored_extension("archive.tar.gz"), "gz");
        assert_eq!(stored_extension("no_extension"), "dat");
        assert_eq!(stored_extension("weird.ex t"), "dat");
        assert_eq!(stored_extension("long.abcdefghijkl"), "dat");
    }

    #[tokio::test]
    async fn test_create_file_storage_creates_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = FilesConfig {
            root: temp_dir.path().join("nested/uploads"),
            ..Default::default()
        };

        let storage = create_file_storage(&config).await.unwrap();
        assert!(config.root.is_dir());

        let response = storage.store(request(1, "a.txt", b"hello")).await.unwrap();
        assert!(storage.exists(&response.storage_key).await.unwrap());
    }
}
