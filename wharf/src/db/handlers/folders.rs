//! Database repository for folders.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::folders::{FolderCreateDBRequest, FolderDBResponse, FolderFilter},
    },
    types::FolderId,
};

pub struct Folders<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Folders<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn exists(&mut self, id: FolderId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(exists)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Folders<'c> {
    type CreateRequest = FolderCreateDBRequest;
    type Response = FolderDBResponse;
    type Id = FolderId;
    type Filter = FolderFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let folder = sqlx::query_as::<_, FolderDBResponse>(
            r#"
            INSERT INTO folders (name, created_by, created_at)
            VALUES (?, ?, ?)
            RETURNING id, name, created_by, created_at
            "#,
        )
        .bind(&request.name)
        .bind(&request.created_by)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(folder)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let folder = sqlx::query_as::<_, FolderDBResponse>("SELECT id, name, created_by, created_at FROM folders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(folder)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = String::from("SELECT id, name, created_by, created_at FROM folders");

        if filter.created_by.is_some() {
            query.push_str(" WHERE created_by = ?");
        }

        query.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");

        let mut sql_query = sqlx::query_as::<_, FolderDBResponse>(&query);

        if let Some(created_by) = &filter.created_by {
            sql_query = sql_query.bind(created_by);
        }

        let folders = sql_query.bind(filter.limit).bind(filter.skip).fetch_all(&mut *self.db).await?;
        Ok(folders)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}
