use crate::AppState;
use crate::api::envelope::{FailureEnvelope, SuccessEnvelope, api_created, api_success};
use crate::api::models::files::FileResponse;
use crate::api::models::folders::{FolderCreate, FolderResponse, ListFoldersQuery};
use crate::api::models::pagination::Pagination;
use crate::db::handlers::{Files, Folders, Repository, Users};
use crate::db::models::files::FileFilter;
use crate::db::models::folders::{FolderCreateDBRequest, FolderFilter};
use crate::errors::{Error, Result};
use crate::types::{FolderId, OwnerScope};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use sqlx::Acquire;

fn folder_not_found(id: &str) -> Error {
    Error::NotFound {
        resource: "Folder".to_string(),
        id: id.to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/folders",
    tag = "folders",
    summary = "List folders",
    params(ListFoldersQuery),
    responses(
        (status = 200, description = "List of folders", body = SuccessEnvelope<Vec<FolderResponse>>),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_folders(State(state): State<AppState>, Query(query): Query<ListFoldersQuery>) -> Result<Response> {
    let (skip, limit) = query.pagination.params();
    let mut filter = FolderFilter::new(skip, limit);
    if let Some(created_by) = query.created_by {
        filter = filter.with_created_by(created_by);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let folders = Folders::new(&mut conn).list(&filter).await?;

    Ok(api_success(folders.into_iter().map(FolderResponse::from).collect::<Vec<_>>()))
}

#[utoipa::path(
    post,
    path = "/folders",
    tag = "folders",
    summary = "Create folder",
    request_body = FolderCreate,
    responses(
        (status = 201, description = "Folder created", body = SuccessEnvelope<FolderResponse>),
        (status = 400, description = "Invalid request", body = FailureEnvelope),
        (status = 401, description = "Missing or invalid API token", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_folder(State(state): State<AppState>, Json(create): Json<FolderCreate>) -> Result<Response> {
    let name = create.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Folder name is required."));
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(created_by) = create.created_by.as_deref() {
        let mut users = Users::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        if !users.exists(created_by).await? {
            return Err(Error::validation("User not found."));
        }
    }

    let folder = {
        let mut repo = Folders::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.create(&FolderCreateDBRequest {
            name: name.to_string(),
            created_by: create.created_by,
        })
        .await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(folder_id = folder.id, "Folder created");
    Ok(api_created(FolderResponse::from(folder)))
}

#[utoipa::path(
    get,
    path = "/folders/{id}",
    tag = "folders",
    summary = "Get folder",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder", body = SuccessEnvelope<FolderResponse>),
        (status = 404, description = "Folder not found", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_folder(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let folder_id = id.trim().parse::<FolderId>().map_err(|_| folder_not_found(&id))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let folder = Folders::new(&mut conn)
        .get_by_id(folder_id)
        .await?
        .ok_or_else(|| folder_not_found(&id))?;

    Ok(api_success(FolderResponse::from(folder)))
}

#[utoipa::path(
    get,
    path = "/folders/{id}/files",
    tag = "folders",
    summary = "List files in folder",
    params(
        ("id" = i64, Path, description = "Folder ID"),
        Pagination
    ),
    responses(
        (status = 200, description = "Files stored in the folder", body = SuccessEnvelope<Vec<FileResponse>>),
        (status = 404, description = "Folder not found", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    )
)]
#[tracing::instrument(skip(state, pagination))]
pub async fn list_folder_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pagination): Query<Pagination>,
) -> Result<Response> {
    let folder_id = id.trim().parse::<FolderId>().map_err(|_| folder_not_found(&id))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Folders::new(&mut conn).exists(folder_id).await? {
        return Err(folder_not_found(&id));
    }

    let (skip, limit) = pagination.params();
    let files = Files::new(&mut conn, state.storage.clone(), OwnerScope::System)
        .list(&FileFilter::new(skip, limit).with_folder(folder_id))
        .await?;

    Ok(api_success(files.into_iter().map(FileResponse::from).collect::<Vec<_>>()))
}
