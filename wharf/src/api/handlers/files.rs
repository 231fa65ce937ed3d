//! Upload and download of file content, plus metadata lookup and deletion.
//!
//! Uploads go through [`Files::upload`] scoped to the submitting user; downloads
//! look records up with the system scope and stream the blob back from the
//! storage root.

use crate::AppState;
use crate::api::envelope::{FailureEnvelope, SuccessEnvelope, api_failure, api_success};
use crate::api::models::files::{FileDeleteResponse, FileResponse, UPLOAD_FAILED_MESSAGE, UPLOAD_SUCCESS_MESSAGE, UploadResponse};
use crate::db::handlers::{Files, Repository, files::remove_content};
use crate::db::models::files::{FileUpload, StoreOutcome};
use crate::errors::{Error, Result};
use crate::types::{FileId, FolderId, OwnerScope, UserId};
use axum::{
    body::Body,
    extract::{Multipart, OriginalUri, Path, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument, trace, warn};

pub const USER_ID_REQUIRED: &str = "User id is required.";
pub const FOLDER_ID_REQUIRED: &str = "Folder id is required.";
pub const FOLDER_ID_INVALID: &str = "Folder id must be a non-negative integer.";
pub const FILES_REQUIRED: &str = "At least one file is required.";
pub const INVALID_FILE_FORMAT: &str = "Invalid file format";
pub const MISSING_FILE_ID: &str = "Invalid request: missing file id.";
pub const FILE_NOT_FOUND: &str = "File not found.";
pub const FILE_NOT_ON_DISK: &str = "File not found on disk.";

/// One entry submitted under the `files` form field.
#[derive(Debug, Clone)]
pub enum FilePart {
    /// A part that carried a file name: the client sent a file
    Binary(FileUpload),
    /// A plain text value
    Text(String),
}

/// The upload form as received, before any validation.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub user_id: Option<String>,
    pub folder_id: Option<String>,
    pub files: Vec<FilePart>,
}

/// An upload that passed validation. Only the first file is kept.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub user_id: UserId,
    pub folder_id: FolderId,
    pub file: FileUpload,
    /// Number of additional files that were submitted and will not be stored
    pub ignored_files: usize,
}

/// Check an upload form.
///
/// Presence problems are collected in the order user, folder, files and reported
/// together. Only once those pass are the `files` entries checked, stopping at the
/// first one that is not a file.
pub fn validate_upload(form: UploadForm) -> Result<ValidatedUpload> {
    let mut messages = Vec::new();

    let user_id = form.user_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    if user_id.is_none() {
        messages.push(USER_ID_REQUIRED.to_string());
    }

    let folder_id = match form.folder_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            messages.push(FOLDER_ID_REQUIRED.to_string());
            None
        }
        Some(raw) => match raw.parse::<FolderId>() {
            Ok(id) if id >= 0 => Some(id),
            _ => {
                messages.push(FOLDER_ID_INVALID.to_string());
                None
            }
        },
    };

    if form.files.is_empty() {
        messages.push(FILES_REQUIRED.to_string());
    }

    let (Some(user_id), Some(folder_id)) = (user_id, folder_id) else {
        return Err(Error::Validation { messages });
    };
    if !messages.is_empty() {
        return Err(Error::Validation { messages });
    }

    let mut uploads = Vec::with_capacity(form.files.len());
    for part in form.files {
        match part {
            FilePart::Binary(upload) => uploads.push(upload),
            FilePart::Text(_) => return Err(Error::validation(INVALID_FILE_FORMAT)),
        }
    }

    let ignored_files = uploads.len().saturating_sub(1);
    let file = uploads.into_iter().next().ok_or_else(|| Error::validation(FILES_REQUIRED))?;

    Ok(ValidatedUpload {
        user_id,
        folder_id,
        file,
        ignored_files,
    })
}

/// Drain the multipart body into an [`UploadForm`]. Unknown fields are skipped.
async fn read_upload_form(mut multipart: Multipart, limit: usize) -> Result<UploadForm> {
    let too_large = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge { limit }
        } else {
            Error::Multipart(e)
        }
    };

    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(too_large)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "user_id" => form.user_id = Some(field.text().await.map_err(too_large)?),
            "folder_id" => form.folder_id = Some(field.text().await.map_err(too_large)?),
            "files" | "files[]" => match field.file_name().map(str::to_owned) {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .map(str::to_owned)
                        .unwrap_or_else(|| mime_guess::from_path(&filename).first_or_octet_stream().to_string());
                    let content = field.bytes().await.map_err(too_large)?;

                    // Browsers send an empty, nameless part when no file was picked
                    if filename.is_empty() && content.is_empty() {
                        trace!("Skipping empty file part");
                        continue;
                    }

                    form.files.push(FilePart::Binary(FileUpload {
                        filename,
                        content_type,
                        content,
                    }));
                }
                None => form.files.push(FilePart::Text(field.text().await.map_err(too_large)?)),
            },
            other => trace!(field = other, "Ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

async fn store_upload(state: &AppState, multipart: Multipart) -> Result<Response> {
    let form = read_upload_form(multipart, state.config.files.max_upload_bytes).await?;
    let upload = validate_upload(form)?;

    if upload.ignored_files > 0 {
        debug!(
            ignored = upload.ignored_files,
            "Upload carried more than one file, only the first is stored"
        );
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Files::new(&mut conn, state.storage.clone(), OwnerScope::User(upload.user_id));

    match repo.upload(upload.folder_id, upload.file).await? {
        StoreOutcome::Stored(file) => {
            info!(file_id = file.id, folder_id = file.folder_id, bytes = file.size_bytes, "File uploaded");
            Ok(api_success(UploadResponse {
                uploaded: FileResponse::from(file),
                message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            }))
        }
        StoreOutcome::Rejected(message) => {
            let message = message.unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string());
            debug!(%message, "Upload rejected");
            Ok(api_failure(vec![message], StatusCode::BAD_REQUEST))
        }
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    summary = "Upload file",
    description = "Upload a file into a folder on behalf of a user. The form carries `user_id`, `folder_id` \
                   and one or more `files` parts; only the first file is stored.",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields `user_id`, `folder_id` and `files`"
    ),
    responses(
        (status = 200, description = "File stored", body = SuccessEnvelope<UploadResponse>),
        (status = 400, description = "Invalid input or upload refused", body = FailureEnvelope),
        (status = 401, description = "Missing or invalid API token", body = FailureEnvelope),
        (status = 413, description = "Payload too large", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    ),
    security(("BearerAuth" = []))
)]
#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn upload_files(State(state): State<AppState>, OriginalUri(uri): OriginalUri, multipart: Multipart) -> Response {
    match store_upload(&state, multipart).await {
        Ok(response) => response,
        Err(e) => e.into_api_response(uri.path()),
    }
}

fn parse_file_id(raw: &str) -> Option<FileId> {
    raw.trim().parse::<FileId>().ok()
}

async fn open_download(state: &AppState, raw_id: Option<String>) -> Result<Response> {
    let Some(raw_id) = raw_id.filter(|id| !id.trim().is_empty()) else {
        return Err(Error::validation(MISSING_FILE_ID));
    };

    let Some(file_id) = parse_file_id(&raw_id) else {
        return Err(Error::resolution(FILE_NOT_FOUND));
    };

    let file = {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut repo = Files::new(&mut conn, state.storage.clone(), OwnerScope::System);
        repo.get_by_id(file_id).await?
    };

    let Some(file) = file else {
        return Err(Error::resolution(FILE_NOT_FOUND));
    };

    let Some(disk_path) = state.storage.resolve(&file.path).await? else {
        warn!(file_id, path = %file.path, "File record points at missing or unreachable content");
        return Err(Error::resolution(FILE_NOT_ON_DISK));
    };

    let content_type = HeaderValue::from_str(&file.file_mime).map_err(|e| Error::Internal {
        operation: format!("build content type for file {file_id}: {e}"),
    })?;

    let handle = tokio::fs::File::open(&disk_path).await?;

    debug!(file_id, mime = %file.file_mime, "Streaming file content");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from_stream(ReaderStream::new(handle)))
        .map_err(|e| Error::Internal {
            operation: format!("build download response for file {file_id}: {e}"),
        })
}

#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    summary = "Download file",
    description = "Stream the stored content of a file. `Content-Type` is the MIME type recorded at upload.",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Missing id, unknown file or content missing on disk", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    )
)]
#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn download_file(State(state): State<AppState>, OriginalUri(uri): OriginalUri, Path(id): Path<String>) -> Response {
    match open_download(&state, Some(id)).await {
        Ok(response) => response,
        Err(e) => e.into_api_response(uri.path()),
    }
}

/// `GET /files` and `GET /files/`: a download request without an id.
#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn download_missing_id(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> Response {
    match open_download(&state, None).await {
        Ok(response) => response,
        Err(e) => e.into_api_response(uri.path()),
    }
}

#[utoipa::path(
    get,
    path = "/files/{id}/metadata",
    tag = "files",
    summary = "Get file metadata",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata", body = SuccessEnvelope<FileResponse>),
        (status = 404, description = "File not found", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    )
)]
#[instrument(skip(state), err)]
pub async fn get_file_metadata(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let not_found = || Error::NotFound {
        resource: "File".to_string(),
        id: id.clone(),
    };

    let file_id = parse_file_id(&id).ok_or_else(not_found)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Files::new(&mut conn, state.storage.clone(), OwnerScope::System);
    let file = repo.get_by_id(file_id).await?.ok_or_else(not_found)?;

    Ok(api_success(FileResponse::from(file)))
}

#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    summary = "Delete file",
    description = "Delete a file record and remove its content from disk.",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = SuccessEnvelope<FileDeleteResponse>),
        (status = 401, description = "Missing or invalid API token", body = FailureEnvelope),
        (status = 404, description = "File not found", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    ),
    security(("BearerAuth" = []))
)]
#[instrument(skip(state), err)]
pub async fn delete_file(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let not_found = || Error::NotFound {
        resource: "File".to_string(),
        id: id.clone(),
    };

    let file_id = parse_file_id(&id).ok_or_else(not_found)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let removed = Files::new(&mut tx, state.storage.clone(), OwnerScope::System).remove(file_id).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let Some(file) = removed else {
        return Err(not_found());
    };
    remove_content(state.storage.as_ref(), &file).await;

    info!(file_id, "File deleted");
    Ok(api_success(FileDeleteResponse { id: file_id, deleted: true }))
}
