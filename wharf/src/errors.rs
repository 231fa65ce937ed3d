use crate::api::envelope::{api_error, api_failure};
use crate::db::errors::DbError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Rejected by the write-route gate
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Missing or malformed input; every problem found is reported
    #[error("Invalid request: {}", messages.join(" "))]
    Validation { messages: Vec<String> },

    /// A lookup failed, or the metadata points at content that is gone
    #[error("{message}")]
    Resolution { message: String },

    /// Upload body larger than `files.max_upload_bytes`
    #[error("Payload too large: limit is {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// The request body could not be read as a multipart form
    #[error("Failed to parse multipart form: {0}")]
    Multipart(#[from] MultipartError),

    /// Filesystem error outside the storage backend
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            messages: vec![message.into()],
        }
    }

    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Error::Resolution { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Validation { .. } | Error::Resolution { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Internal { .. } | Error::Multipart(_) | Error::Io(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Errors the caller cannot fix by correcting the request
    pub fn is_unexpected(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns user-safe error messages, without leaking internal implementation details
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Error::Unauthenticated { message } => vec![message.clone().unwrap_or_else(|| "Authentication required".to_string())],
            Error::Validation { messages } => messages.clone(),
            Error::Resolution { message } => vec![message.clone()],
            Error::NotFound { resource, id } => vec![format!("{resource} with ID {id} not found")],
            Error::PayloadTooLarge { limit } => vec![format!("Upload exceeds the maximum allowed size of {limit} bytes.")],
            Error::Internal { .. } | Error::Io(_) | Error::Other(_) => vec!["Internal server error".to_string()],
            Error::Multipart(_) => vec!["Failed to parse multipart form".to_string()],
            Error::Database(db_err) => vec![
                match db_err {
                    DbError::NotFound => "Resource not found",
                    DbError::UniqueViolation { .. } => "Resource already exists",
                    DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource",
                    DbError::Other(_) => "Database error occurred",
                }
                .to_string(),
            ],
        }
    }

    fn log(&self) {
        match self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Io(_) | Error::Other(_) | Error::Multipart(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation { .. } | Error::Resolution { .. } | Error::NotFound { .. } | Error::PayloadTooLarge { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }
    }

    /// Convert into an envelope response. Unexpected errors are tagged with the
    /// request path so they can be traced back to the route that failed.
    pub fn into_api_response(self, path: &str) -> Response {
        self.log();

        if self.is_unexpected() {
            let message = self.user_messages().join(" ");
            api_error(message, Some(path))
        } else {
            api_failure(self.user_messages(), self.status_code())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();

        if self.is_unexpected() {
            api_error(self.user_messages().join(" "), None)
        } else {
            api_failure(self.user_messages(), self.status_code())
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::resolution("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Unauthenticated { message: None }.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::NotFound {
                resource: "Folder".to_string(),
                id: "1".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Database(DbError::UniqueViolation {
                constraint: None,
                message: "dup".to_string()
            })
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert!(Error::Other(anyhow::anyhow!("boom")).is_unexpected());
        assert!(Error::Io(std::io::Error::other("disk")).is_unexpected());
    }

    #[test]
    fn test_user_messages_do_not_leak_internals() {
        let err = Error::Other(anyhow::anyhow!("connection string sqlite:///secret/path"));
        assert_eq!(err.user_messages(), vec!["Internal server error".to_string()]);

        let err = Error::Database(DbError::Other(anyhow::anyhow!("near \"SELEC\": syntax error")));
        assert_eq!(err.user_messages(), vec!["Database error occurred".to_string()]);
    }

    #[test]
    fn test_validation_keeps_all_messages_in_order() {
        let err = Error::Validation {
            messages: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.user_messages(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(err.to_string(), "Invalid request: first second");
    }
}
