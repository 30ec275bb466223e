//! Mapping from subsystem errors to HTTP responses.
//!
//! Every error body carries an `error` string. Validation failures also list
//! the failing fields under `errors`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::blockchain::BlockchainError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Request timed out")]
    RequestTimeout,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => match e {
                AuthError::Validation(_)
                | AuthError::UsernameTaken
                | AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken => StatusCode::FORBIDDEN,
                AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Store(e) => match e {
                StoreError::UsernameTaken(_)
                | StoreError::InsufficientBalance { .. }
                | StoreError::InvalidTransfer(_) => StatusCode::BAD_REQUEST,
                StoreError::WalletOwned(_) => StatusCode::CONFLICT,
                StoreError::WalletNotFound(_) | StoreError::UserNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                StoreError::Io(_) | StoreError::Format(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Chain(e) => match e {
                e if e.is_client_error() => StatusCode::BAD_REQUEST,
                BlockchainError::Timeout(_) | BlockchainError::ConfirmationTimeout { .. } => {
                    StatusCode::GATEWAY_TIMEOUT
                }
                BlockchainError::NotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Auth(AuthError::Validation(errors)) => {
                json!({ "error": self.to_string(), "errors": errors })
            }
            ApiError::Auth(AuthError::Internal(_))
            | ApiError::Internal(_)
            | ApiError::Store(StoreError::Io(_) | StoreError::Format(_)) => {
                tracing::error!(error = %self, "Request failed");
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
