use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::domain::{AiErrorKind, AppError, ErrorKind};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    InternalError(String),

    /// Error raised by a service, mapped by its kind.
    Domain(AppError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ApiResponse::<()>::error(msg).with_code(ErrorKind::NotFound.code()),
            ),
            ApiError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::error(msg).with_code(ErrorKind::InvalidArgument.code()),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error("An internal error occurred")
                        .with_code(ErrorKind::Internal.code()),
                )
            }
            ApiError::Domain(err) => domain_response(&err),
        };

        (status, Json(body)).into_response()
    }
}

fn domain_response(err: &AppError) -> (StatusCode, ApiResponse<()>) {
    let kind = err.kind();
    let status = status_for(err);

    let message = match kind {
        ErrorKind::Database => {
            tracing::error!(error = %err, "Database error");
            "A database error occurred".to_string()
        }
        ErrorKind::Internal => {
            tracing::error!(error = %err, "Internal error");
            "An internal error occurred".to_string()
        }
        ErrorKind::ExternalService | ErrorKind::Timeout => {
            tracing::warn!(error = %err, "External service error");
            err.to_string()
        }
        _ => err.to_string(),
    };

    let body = ApiResponse::error(message)
        .with_code(kind.code())
        .with_details(err.context());
    (status, body)
}

/// HTTP status for a service error. AI failures map on their finer kind.
#[must_use]
pub fn status_for(err: &AppError) -> StatusCode {
    if let AppError::Ai(ai) = err {
        return match ai.kind {
            AiErrorKind::ApiLimit => StatusCode::TOO_MANY_REQUESTS,
            AiErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            AiErrorKind::ContentBlocked => StatusCode::FORBIDDEN,
            AiErrorKind::InvalidUrl => StatusCode::BAD_REQUEST,
            AiErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AiErrorKind::InvalidResponse | AiErrorKind::NetworkError => StatusCode::BAD_GATEWAY,
        };
    }

    match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Validation | ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Database | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
