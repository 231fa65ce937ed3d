//! API layer for HTTP request handling and data models.
//!
//! - **[`envelope`]**: the `{ success, data | message, path? }` response shape
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! All routes live under `/api`:
//!
//! - **Files** (`/api/upload`, `/api/files/*`): upload, download, metadata, deletion
//! - **Folders** (`/api/folders/*`): upload targets and their files
//! - **Users** (`/api/users`): file owners
//!
//! Routes that change state sit behind the token gate in [`crate::auth`].
//!
//! # OpenAPI Documentation
//!
//! Endpoints are annotated with `utoipa`. The document is served at `/api/openapi.json`
//! and rendered at `/api/docs`.

pub mod envelope;
pub mod handlers;
pub mod models;
