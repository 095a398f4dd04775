use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::transition::TransitionError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = serde_json::json!({ "error": self.to_string() });
        if let AppError::InvalidTransition(e) = &self {
            body["validActions"] = serde_json::json!(e.legal_actions());
        }
        (status, axum::Json(body)).into_response()
    }
}
