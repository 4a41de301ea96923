//! Error taxonomy shared by stores, services and the HTTP layer.
//!
//! Errors are classified by [`ErrorKind`] and matched structurally; no caller
//! ever inspects message text to decide what happened.

use std::fmt;

use sea_orm::{DbErr, SqlErr};

/// Stable classification of every surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Validation,
    InvalidArgument,
    Database,
    ExternalService,
    Timeout,
    Conflict,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::Validation => "VALIDATION",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Database => "DATABASE",
            Self::ExternalService => "EXTERNAL_SERVICE",
            Self::Timeout => "TIMEOUT",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure categories reported by the AI metadata generator and recommender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiErrorKind {
    InvalidUrl,
    ApiLimit,
    Timeout,
    ContentBlocked,
    InvalidResponse,
    NetworkError,
    Unauthorized,
}

impl AiErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidUrl => "INVALID_URL",
            Self::ApiLimit => "API_LIMIT",
            Self::Timeout => "TIMEOUT",
            Self::ContentBlocked => "CONTENT_BLOCKED",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::NetworkError => "NETWORK_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("AI error [{}]: {message}", kind.code())]
pub struct AiError {
    pub kind: AiErrorKind,
    pub message: String,
}

impl AiError {
    pub fn new(kind: AiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Transient failures the client is allowed to retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            AiErrorKind::NetworkError | AiErrorKind::ApiLimit | AiErrorKind::Timeout
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationErrorKind {
    NoArticles,
    AiError,
    BooksApiError,
}

impl RecommendationErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoArticles => "NO_ARTICLES",
            Self::AiError => "AI_ERROR",
            Self::BooksApiError => "BOOKS_API_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("recommendation error [{}]: {message}", kind.code())]
pub struct RecommendationError {
    pub kind: RecommendationErrorKind,
    pub message: String,
}

impl RecommendationError {
    pub fn new(kind: RecommendationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn books_api(message: impl Into<String>) -> Self {
        Self::new(RecommendationErrorKind::BooksApiError, message)
    }
}

impl From<AiError> for RecommendationError {
    fn from(err: AiError) -> Self {
        Self::new(RecommendationErrorKind::AiError, err.to_string())
    }
}

/// Application-wide error returned by stores and services.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{resource} not found: {identifier}")]
    NotFound {
        resource: &'static str,
        identifier: String,
    },

    #[error("{resource} already exists: {identifier}")]
    AlreadyExists {
        resource: &'static str,
        identifier: String,
    },

    #[error("validation failed for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("invalid argument {argument}: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("database error during {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    #[error("{service} failed: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
    },

    #[error("operation timed out: {operation}")]
    Timeout { operation: &'static str },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Recommendation(#[from] RecommendationError),

    #[error("no valid recommendations among {candidates} candidates")]
    NoValidRecommendations { candidates: usize },
}

impl AppError {
    pub fn not_found(resource: &'static str, identifier: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            identifier: identifier.to_string(),
        }
    }

    pub fn already_exists(resource: &'static str, identifier: impl fmt::Display) -> Self {
        Self::AlreadyExists {
            resource,
            identifier: identifier.to_string(),
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    pub fn database(operation: &'static str, err: impl fmt::Display) -> Self {
        Self::Database {
            operation,
            message: err.to_string(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Validation { .. } | Self::NoValidRecommendations { .. } => ErrorKind::Validation,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Database { .. } => ErrorKind::Database,
            Self::ExternalService { .. } | Self::Recommendation(_) => ErrorKind::ExternalService,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Ai(err) => match err.kind {
                AiErrorKind::Timeout => ErrorKind::Timeout,
                AiErrorKind::InvalidUrl => ErrorKind::InvalidArgument,
                _ => ErrorKind::ExternalService,
            },
        }
    }

    /// Structured key/value pairs describing what the error was about.
    #[must_use]
    pub fn context(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::NotFound {
                resource,
                identifier,
            }
            | Self::AlreadyExists {
                resource,
                identifier,
            } => vec![
                ("resource", (*resource).to_string()),
                ("identifier", identifier.clone()),
            ],
            Self::Validation { field, .. } => vec![("field", (*field).to_string())],
            Self::InvalidArgument { argument, .. } => vec![("argument", (*argument).to_string())],
            Self::Database { operation, .. } | Self::Timeout { operation } => {
                vec![("operation", (*operation).to_string())]
            }
            Self::ExternalService { service, .. } => vec![("service", (*service).to_string())],
            Self::Ai(err) => vec![
                ("service", "ai".to_string()),
                ("ai_kind", err.kind.code().to_string()),
            ],
            Self::Recommendation(err) => vec![
                ("service", "book_recommender".to_string()),
                ("recommendation_kind", err.kind.code().to_string()),
            ],
            Self::NoValidRecommendations { candidates } => {
                vec![("candidates", candidates.to_string())]
            }
            Self::Conflict(_) | Self::Internal(_) => Vec::new(),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::AlreadyExists {
                resource: "record",
                identifier: detail,
            };
        }
        Self::database("query", err)
    }
}

pub type AppResult<T> = Result<T, AppError>;
