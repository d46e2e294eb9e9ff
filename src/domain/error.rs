use thiserror::Error;

/// Failure cases surfaced by storage and domain operations.
///
/// Handlers translate each variant to an HTTP status; callers match on the
/// variant itself rather than inspecting message text.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Progress already submitted for this date")]
    DuplicateSubmission,

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    CapacityExceeded(String),

    #[error("Late submissions are not allowed in this room")]
    LateSubmissionRejected,

    #[error("Failed to generate a unique room code")]
    CodeGenerationExhausted,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
