//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::ledger::LedgerError;
use crate::store::StorageError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(i64),

    // Ledger errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::TransactionNotFound(id) => {
                (StatusCode::NOT_FOUND, "transaction_not_found", Some(id.to_string()))
            }

            // Ledger errors - map to appropriate HTTP status
            AppError::Ledger(ledger_err) => match ledger_err {
                LedgerError::Validation(e) => {
                    (StatusCode::BAD_REQUEST, e.code(), Some(e.to_string()))
                }
                LedgerError::UnknownCursor(id) => {
                    (StatusCode::BAD_REQUEST, "unknown_cursor", Some(id.to_string()))
                }
                LedgerError::Contention { .. } => {
                    tracing::warn!("Append contention: {}", ledger_err);
                    (StatusCode::CONFLICT, "append_contention", None)
                }
                LedgerError::Storage(e) if e.is_unavailable() => {
                    tracing::error!("Store unavailable: {:?}", e);
                    (StatusCode::BAD_GATEWAY, "storage_unavailable", None)
                }
                LedgerError::Storage(StorageError::Rejected(msg)) => {
                    tracing::error!("Store rejected write: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, "storage_rejected", None)
                }
                LedgerError::Storage(e) => {
                    tracing::error!("Storage error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
                }
                LedgerError::ConsistencyViolation(d) => {
                    tracing::error!("Consistency violation: {}", d);
                    (StatusCode::INTERNAL_SERVER_ERROR, "consistency_violation", None)
                }
            },
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
