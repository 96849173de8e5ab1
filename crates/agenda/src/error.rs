use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::types::CommitmentError;

/// Errors returned from request handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error(transparent)]
    Commitment(#[from] CommitmentError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJson(_) | AppError::Commitment(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::MissingToken | StoreError::InvalidToken(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Store(_) | AppError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
            return (status, "Internal server error").into_response();
        }
        (status, self.to_string()).into_response()
    }
}
