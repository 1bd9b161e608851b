use thiserror::Error;

/// Application-wide error types.
///
/// Each variant maps to exactly one HTTP status (see `api::errors`).
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, malformed, expired or otherwise invalid credential.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Valid credential for an identity that is not the admin.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Server-side auth configuration is missing.
    #[error("Misconfigured: {0}")]
    Misconfigured(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body is well-formed JSON but does not match the expected schema.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The third-party stats endpoint failed or returned garbage.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {err}"))
    }
}
