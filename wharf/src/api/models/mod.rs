//! API request and response data models.
//!
//! API models are kept apart from the database models in [`crate::db::models`] so the
//! wire format can evolve independently of the schema. Every model derives `utoipa`
//! schemas for the OpenAPI document.
//!
//! - [`files`]: file metadata and upload results
//! - [`folders`]: upload targets
//! - [`users`]: file owners
//! - [`pagination`]: `skip` / `limit` query parameters

pub mod files;
pub mod folders;
pub mod pagination;
pub mod users;
