//! API error type and its mapping to HTTP responses carrying the
//! `{success: false, message}` envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    calendar::CalendarError, checklist::ChecklistError, pdf::PdfError,
    provisioning::ProvisioningError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl From<ChecklistError> for ApiError {
    fn from(err: ChecklistError) -> Self {
        match err {
            ChecklistError::InvalidMonth(_) => Self::Validation(err.to_string()),
            ChecklistError::Database(e) => Self::Database(e),
        }
    }
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::InvalidPeriod { .. } => Self::Validation(err.to_string()),
            CalendarError::Database(e) => Self::Database(e),
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Database(e) => Self::Database(e),
            ProvisioningError::UnknownCaller | ProvisioningError::Forbidden { .. } => {
                Self::Forbidden(err.to_string())
            }
            ProvisioningError::EmailTaken(_) => Self::Conflict(err.to_string()),
            ProvisioningError::NotFound => Self::NotFound(err.to_string()),
            ProvisioningError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl From<PdfError> for ApiError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Database(e) => Self::Database(e),
            PdfError::NotFound => Self::NotFound("record not found".to_string()),
            PdfError::Render(e) => Self::Internal(format!("pdf rendering error: {}", e)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(e) => {
                // Constraint failures are caller mistakes, not 500s: unique
                // violations surface as conflicts, dangling references as
                // bad requests.
                match e.as_database_error() {
                    Some(db) if db.is_unique_violation() => StatusCode::CONFLICT,
                    Some(db) if db.is_foreign_key_violation() => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ApiResponse::<()>::error(self.to_string());
        (status, Json(body)).into_response()
    }
}
