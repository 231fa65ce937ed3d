//! Database repository for users.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserFilter},
    },
    types::UserId,
};

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Cheap existence check used before accepting uploads on a user's behalf
    #[instrument(skip(self), err)]
    pub async fn exists(&mut self, id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(exists)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(user_id = %request.id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (id, name, created_at)
            VALUES (?, ?, ?)
            RETURNING id, name, created_at
            "#,
        )
        .bind(&request.id)
        .bind(&request.name)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT id, name, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>("SELECT id, name, created_at FROM users ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use sqlx::SqlitePool;

    fn user(id: &str, name: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_user(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&user("clerk-1", "Godown Clerk")).await.unwrap();
        assert_eq!(created.id, "clerk-1");
        assert_eq!(created.name, "Godown Clerk");

        let found = repo.get_by_id("clerk-1".to_string()).await.unwrap().unwrap();
        assert_eq!(found.name, "Godown Clerk");
        assert!(repo.exists("clerk-1").await.unwrap());
        assert!(!repo.exists("nobody").await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_user_is_unique_violation(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&user("clerk-1", "First")).await.unwrap();
        let err = repo.create(&user("clerk-1", "Second")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_and_delete_users(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        for i in 0..3 {
            repo.create(&user(&format!("user-{i}"), "Someone")).await.unwrap();
        }

        assert_eq!(repo.list(&UserFilter::new(0, 10)).await.unwrap().len(), 3);
        assert_eq!(repo.list(&UserFilter::new(1, 1)).await.unwrap().len(), 1);

        assert!(repo.delete("user-0".to_string()).await.unwrap());
        assert!(!repo.delete("user-0".to_string()).await.unwrap());
        assert_eq!(repo.list(&UserFilter::new(0, 10)).await.unwrap().len(), 2);
    }
}
