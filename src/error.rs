use axum::{
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::session::extractors::CLEAR_SESSION_COOKIE;

/// Errors surfaced to the client. Everything except `Internal` is a
/// user-correctable condition rendered as an inline message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid username")]
    InvalidUsername,
    #[error("Already registered")]
    AlreadyRegistered,
    #[error("User banned")]
    UserBanned,
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("No active session")]
    NoActiveSession,
    #[error("Please enter a valid {field}")]
    InvalidProfileValue { field: &'static str },
    #[error("Profile incomplete")]
    ProfileIncomplete,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidUsername | AppError::UserBanned | AppError::ProfileIncomplete => {
                StatusCode::FORBIDDEN
            }
            AppError::AlreadyRegistered => StatusCode::CONFLICT,
            AppError::NotAuthenticated | AppError::NoActiveSession => StatusCode::UNAUTHORIZED,
            AppError::InvalidProfileValue { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut res = (status, Json(json!({ "error": message }))).into_response();
        if matches!(self, AppError::UserBanned) {
            res.headers_mut()
                .insert(SET_COOKIE, HeaderValue::from_static(CLEAR_SESSION_COOKIE));
        }
        res
    }
}
