//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed SQLx connection (or transaction), provides
//! strongly-typed operations for one table and returns the models from
//! [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Users`]: owners of uploaded files
//! - [`Folders`]: upload targets
//! - [`Files`]: file metadata, backed by a [`file_storage::FileStorage`] for content
//!
//! # Common Pattern
//!
//! ```ignore
//! use wharf::db::handlers::{Folders, Repository};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Folders::new(&mut tx);
//!     let folder = repo.create(&request).await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod file_storage;
pub mod files;
pub mod folders;
pub mod repository;
pub mod users;

pub use files::Files;
pub use folders::Folders;
pub use repository::Repository;
pub use users::Users;
