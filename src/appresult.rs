use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Every way a request can fail.
///
/// Client mistakes carry their own message back; storage failures are
/// logged and answered with a generic body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::Validation(vec![detail.into()])
    }

    pub fn status_code(&self) -> StatusCode {
        use AppError::*;
        match self {
            Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Conflict(_) => StatusCode::CONFLICT,
            NotFound(_) => StatusCode::NOT_FOUND,
            Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message, details) = match self {
            AppError::Validation(details) => (
                "VALIDATION_FAILED",
                "Request failed validation".to_owned(),
                details,
            ),
            AppError::Conflict(reason) => ("CONFLICT", reason, vec![]),
            AppError::NotFound(reason) => ("NOT_FOUND", reason, vec![]),
            AppError::Unauthorized(reason) => ("UNAUTHORIZED", reason, vec![]),
            AppError::Database(err) => {
                tracing::error!(target: "chat.database", error = %err, "Database operation failed");
                ("DATABASE_ERROR", "An internal database error occurred".to_owned(), vec![])
            }
        };

        (status, Json(ErrorBody { error: ErrorDetail { code, message, details } })).into_response()
    }
}
