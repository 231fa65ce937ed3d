//! Common type definitions shared by the API and database layers.
//!
//! # ID Types
//!
//! - [`UserId`]: opaque user identifier issued by the admin platform
//! - [`FolderId`]: folder identifier (database generated)
//! - [`FileId`]: file record identifier (database generated)
//!
//! # Scopes
//!
//! Repositories that expose owned records are constructed with an [`OwnerScope`].
//! Uploads run in the scope of the uploading user, downloads in the fixed
//! [`OwnerScope::System`] scope.

use std::fmt;

// Type aliases for IDs
pub type UserId = String;
pub type FolderId = i64;
pub type FileId = i64;

/// Visibility of owned records for a repository instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    /// Every record is visible.
    System,
    /// Only records owned by this user are visible.
    User(UserId),
}

impl OwnerScope {
    /// The owning user, if the scope is restricted to one.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            OwnerScope::System => None,
            OwnerScope::User(id) => Some(id.as_str()),
        }
    }
}

impl fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerScope::System => write!(f, "system"),
            OwnerScope::User(id) => write!(f, "user:{id}"),
        }
    }
}
