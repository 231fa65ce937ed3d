use crate::AppState;
use crate::api::envelope::{FailureEnvelope, SuccessEnvelope, api_created, api_success};
use crate::api::models::pagination::Pagination;
use crate::api::models::users::{UserCreate, UserResponse};
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::{UserCreateDBRequest, UserFilter};
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{Query, State},
    response::Response,
};

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    params(Pagination),
    responses(
        (status = 200, description = "List of users", body = SuccessEnvelope<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, Query(pagination): Query<Pagination>) -> Result<Response> {
    let (skip, limit) = pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let users = Users::new(&mut conn).list(&UserFilter::new(skip, limit)).await?;

    Ok(api_success(users.into_iter().map(UserResponse::from).collect::<Vec<_>>()))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Register user",
    description = "Register a file owner under the identifier the dashboard uses for it.",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User registered", body = SuccessEnvelope<UserResponse>),
        (status = 400, description = "Invalid request or user already exists", body = FailureEnvelope),
        (status = 401, description = "Missing or invalid API token", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(State(state): State<AppState>, Json(create): Json<UserCreate>) -> Result<Response> {
    let mut messages = Vec::new();
    let id = create.id.trim();
    let name = create.name.trim();

    if id.is_empty() {
        messages.push(crate::api::handlers::files::USER_ID_REQUIRED.to_string());
    }
    if name.is_empty() {
        messages.push("User name is required.".to_string());
    }
    if !messages.is_empty() {
        return Err(Error::Validation { messages });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            id: id.to_string(),
            name: name.to_string(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(api_created(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_and_list_users(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app
            .server
            .post("/api/users")
            .json(&serde_json::json!({"id": "clerk-7", "name": "Warehouse clerk"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: SuccessEnvelope<UserResponse> = response.json();
        assert!(created.success);
        assert_eq!(created.data.id, "clerk-7");

        let listed: SuccessEnvelope<Vec<UserResponse>> = app.server.get("/api/users").await.json();
        assert_eq!(listed.data.len(), 1);
        assert_eq!(listed.data[0].name, "Warehouse clerk");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_user_is_rejected(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        create_test_user(&pool, "clerk-7").await;

        let response = app
            .server
            .post("/api/users")
            .json(&serde_json::json!({"id": "clerk-7", "name": "Again"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: FailureEnvelope = response.json();
        assert_eq!(body.message, vec!["Resource already exists"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_blank_fields_are_reported_together(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.server.post("/api/users").json(&serde_json::json!({"id": " ", "name": ""})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: FailureEnvelope = response.json();
        assert_eq!(body.message, vec!["User id is required.", "User name is required."]);
    }
}
