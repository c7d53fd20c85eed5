use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::buyers::validator::ValidationIssue;

/// Error type returned by every handler.
///
/// Client-actionable failures keep their message; `Internal` is logged with its
/// full chain and answered with an opaque body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing fields")]
    MissingFields,
    #[error("User already exists")]
    UserExists,
    #[error("User is not registered")]
    UnknownUser,
    #[error("Incorrect password")]
    BadCredentials,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Validation failed")]
    ValidationFailed(Vec<ValidationIssue>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<ValidationIssue>>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields => StatusCode::BAD_REQUEST,
            AppError::UserExists => StatusCode::CONFLICT,
            AppError::UnknownUser => StatusCode::FORBIDDEN,
            AppError::BadCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::ValidationFailed(issues) => ErrorBody {
                error: "Validation failed".into(),
                issues: Some(issues),
            },
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                ErrorBody {
                    error: "Internal server error".into(),
                    issues: None,
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                issues: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
