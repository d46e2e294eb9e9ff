use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::DomainError;

/// Uniform success envelope for API responses.
///
/// Every endpoint answers with `success` plus an optional payload and an
/// optional human-readable message; absent parts are omitted from the JSON.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    // ---
    pub fn data(data: T) -> Self {
        // ---
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: &str) -> Self {
        // ---
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }
}

impl ApiResponse<()> {
    // ---
    pub fn message_only(message: &str) -> Self {
        // ---
        Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}

/// Failure envelope mirroring [`ApiResponse`] with `success: false`.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

/// Error wrapper translating domain failures into HTTP responses.
///
/// Handlers return `Result<_, ApiError>` and use `?` on storage and
/// domain calls; the status code falls out of the error variant here.
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    // ---
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    // ---
    fn into_response(self) -> Response {
        // ---
        let status = match &self.0 {
            DomainError::Validation(_) | DomainError::LateSubmissionRejected => {
                StatusCode::BAD_REQUEST
            }
            DomainError::AuthenticationRequired | DomainError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_)
            | DomainError::DuplicateSubmission
            | DomainError::InvalidState(_)
            | DomainError::CapacityExceeded(_) => StatusCode::CONFLICT,
            DomainError::CodeGenerationExhausted
            | DomainError::Serialization(_)
            | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details are logged, never leaked to the client.
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            axum::Json(ErrorBody {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}
