//! Test utilities for integration testing.

use crate::config::{Config, FilesConfig, PoolSettings};
use crate::db::handlers::{Folders, Repository, Users};
use crate::db::handlers::{Files, file_storage::LocalFileStorage};
use crate::db::models::{
    files::{FileCreateDBRequest, FileDBResponse},
    folders::{FolderCreateDBRequest, FolderDBResponse},
    users::{UserCreateDBRequest, UserDBResponse},
};
use crate::types::{FolderId, OwnerScope};
use axum_test::TestServer;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A running test server with its own storage root.
///
/// The storage root is `dir/uploads`; `dir` itself is available for placing files
/// outside the root. Everything is removed when the app is dropped.
pub struct TestApp {
    pub server: TestServer,
    pub storage_root: PathBuf,
    pub dir: TempDir,
}

pub async fn create_test_app(pool: SqlitePool) -> TestApp {
    create_test_app_with_config(pool, create_test_config()).await
}

/// Build a test app from `config`. `files.root` is replaced with a fresh temporary directory.
pub async fn create_test_app_with_config(pool: SqlitePool, mut config: Config) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage_root = dir.path().join("uploads");
    config.files.root = storage_root.clone();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    TestApp {
        server: app.into_test_server(),
        storage_root,
        dir,
    }
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: crate::config::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool: PoolSettings {
                max_connections: 1,
                min_connections: 0,
                ..Default::default()
            },
        },
        files: FilesConfig {
            // Replaced per app by create_test_app_with_config
            root: std::env::temp_dir().join("wharf-test-uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
        },
        ..Default::default()
    }
}

pub async fn create_test_user(pool: &SqlitePool, id: &str) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            id: id.to_string(),
            name: format!("Test user {id}"),
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_folder(pool: &SqlitePool, name: &str) -> FolderDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Folders::new(&mut conn)
        .create(&FolderCreateDBRequest {
            name: name.to_string(),
            created_by: None,
        })
        .await
        .expect("Failed to create test folder")
}

/// Insert a file record directly, without writing any content.
pub async fn insert_file_record(pool: &SqlitePool, folder_id: FolderId, user_id: &str, path: &str, file_mime: &str) -> FileDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    // Storage is never touched by `create`
    let storage = Arc::new(LocalFileStorage::new(std::env::temp_dir()));
    Files::new(&mut conn, storage, OwnerScope::System)
        .create(&FileCreateDBRequest {
            folder_id,
            user_id: user_id.to_string(),
            filename: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            file_mime: file_mime.to_string(),
            size_bytes: 0,
        })
        .await
        .expect("Failed to insert file record")
}

/// Number of regular files below the app's storage root.
pub async fn stored_blob_count(app: &TestApp) -> usize {
    let mut count = 0;
    let mut pending = vec![app.storage_root.clone()];

    while let Some(dir) = pending.pop() {
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
            continue;
        };
        while let Some(entry) = entries.next_entry().await.expect("Failed to read storage dir") {
            let file_type = entry.file_type().await.expect("Failed to stat storage entry");
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                count += 1;
            }
        }
    }

    count
}
