//! Database record models matching table schemas.
//!
//! These structs correspond to rows of the SQLite tables created by the
//! migrations in `migrations/`. Repositories return them from queries and
//! accept the `*CreateDBRequest` types for insertion. They are kept separate
//! from the API models in [`crate::api::models`] so the wire format and the
//! storage format can change independently.
//!
//! - [`users`]: owners of uploaded files
//! - [`folders`]: logical groupings that uploads target
//! - [`files`]: file metadata (storage path and MIME type)
//! - [`file_storage`]: requests/responses of the blob storage backend

pub mod file_storage;
pub mod files;
pub mod folders;
pub mod users;
