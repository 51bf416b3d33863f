use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    /// The requested amount exceeds what the document still owes. Not a hard
    /// failure: the caller may resubmit with the overage explicitly confirmed.
    #[error("Amount {requested} exceeds the pending balance {max_allowed}")]
    ConfirmationRequired {
        requested: Decimal,
        max_allowed: Decimal,
    },

    /// A deliberately unsupported operation, reported instead of attempted.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The settlement ledger refused the instruction. The message is the
    /// remote's own wording and the document state is assumed unchanged.
    #[error("Ledger rejected the request: {0}")]
    LedgerRejected(String),

    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
            #[serde(skip_serializing_if = "std::ops::Not::not")]
            confirmation_required: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            requested: Option<Decimal>,
            #[serde(skip_serializing_if = "Option::is_none")]
            max_allowed: Option<Decimal>,
        }

        impl ErrorResponse {
            fn plain(error: String, details: Option<String>) -> Self {
                Self {
                    error,
                    details,
                    confirmation_required: false,
                    requested: None,
                    max_allowed: None,
                }
            }
        }

        let (status, body) = match self {
            AppError::ValidationError(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::plain("Validation error".to_string(), Some(err.to_string())),
            ),
            AppError::BadRequest(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::plain(err.to_string(), None),
            ),
            AppError::NotFound(err) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::plain(err.to_string(), None),
            ),
            AppError::Unauthorized(err) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::plain(err.to_string(), None),
            ),
            AppError::Forbidden(err) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::plain(err.to_string(), None),
            ),
            AppError::Conflict(err) => (
                StatusCode::CONFLICT,
                ErrorResponse::plain(err.to_string(), None),
            ),
            AppError::ConfirmationRequired {
                requested,
                max_allowed,
            } => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: format!(
                        "Amount {} exceeds the pending balance {}",
                        requested, max_allowed
                    ),
                    details: None,
                    confirmation_required: true,
                    requested: Some(requested),
                    max_allowed: Some(max_allowed),
                },
            ),
            AppError::UnsupportedOperation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::plain(format!("Unsupported operation: {}", msg), None),
            ),
            AppError::LedgerRejected(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::plain(msg, None),
            ),
            AppError::LedgerUnavailable(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::plain("Ledger unavailable".to_string(), Some(msg)),
            ),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::plain(
                    "Internal server error".to_string(),
                    Some(format!("{:#?}", err)),
                ),
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::plain("Configuration error".to_string(), Some(err.to_string())),
            ),
        };

        (status, Json(body)).into_response()
    }
}
