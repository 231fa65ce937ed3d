//! HTTP request handlers.
//!
//! - [`files`]: upload, download, metadata and deletion of files
//! - [`folders`]: folder creation and lookup, files of a folder
//! - [`users`]: registration of file owners
//!
//! Every handler except the download stream answers with the envelope from
//! [`crate::api::envelope`]. Upload and download errors are converted with
//! [`crate::errors::Error::into_api_response`] so unexpected failures carry the
//! request path; the other handlers return [`crate::errors::Result`].

pub mod files;
pub mod folders;
pub mod users;
