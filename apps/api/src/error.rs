//! Error types for the HTTP layer.
//!
//! ## Status Mapping
//! ```text
//! ┌───────────────────────────────────────┬────────┬───────────────────────┐
//! │ Error                                 │ Status │ code                  │
//! ├───────────────────────────────────────┼────────┼───────────────────────┤
//! │ Validation, cart, totals              │ 200    │ VALIDATION_ERROR,     │
//! │                                       │        │ TOTALS_MISMATCH       │
//! │ Missing product / sale / row          │ 200    │ NOT_FOUND             │
//! │ Duplicate barcode / email             │ 200    │ DUPLICATE             │
//! │ Unknown category / customer / role    │ 200    │ INVALID_REFERENCE     │
//! │ Not enough stock                      │ 200    │ INSUFFICIENT_STOCK    │
//! │ Sale transaction failed               │ 200    │ TRANSACTION_FAILED    │
//! │ Wrong email or password               │ 200    │ INVALID_CREDENTIALS   │
//! │ Malformed JSON / query string         │ 400    │ BAD_REQUEST           │
//! │ Missing / invalid / expired token     │ 401    │ UNAUTHORIZED          │
//! │ Role not allowed                      │ 403    │ FORBIDDEN             │
//! │ Database unreachable                  │ 503    │ DATABASE_UNAVAILABLE  │
//! │ Anything else                         │ 500    │ INTERNAL_ERROR        │
//! └───────────────────────────────────────┴────────┴───────────────────────┘
//! ```
//!
//! Business failures keep HTTP 200 with `success: false`; the front end reads
//! the envelope, not the status line.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tienda_core::{CoreError, ValidationError};
use tienda_db::DbError;

use crate::response::Envelope;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Core(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn classify_core(err: &CoreError) -> (StatusCode, &'static str, String) {
    let code = match err {
        CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_) => "NOT_FOUND",
        CoreError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
        CoreError::TotalsMismatch { .. } => "TOTALS_MISMATCH",
        CoreError::EmptyCart | CoreError::CartTooLarge { .. } | CoreError::Validation(_) => {
            "VALIDATION_ERROR"
        }
    };
    let message = match err {
        // Drop the "Validation error: " prefix
        CoreError::Validation(inner) => inner.to_string(),
        other => other.to_string(),
    };
    (StatusCode::OK, code, message)
}

fn classify_db(err: &DbError) -> (StatusCode, &'static str, String) {
    match err {
        DbError::Domain(core) => classify_core(core),
        DbError::NotFound { .. } => (StatusCode::OK, "NOT_FOUND", err.to_string()),
        DbError::UniqueViolation { .. } => (StatusCode::OK, "DUPLICATE", err.to_string()),
        DbError::ForeignKeyViolation { message } => {
            tracing::debug!(%message, "Foreign key violation");
            (
                StatusCode::OK,
                "INVALID_REFERENCE",
                "Referenced record does not exist".to_string(),
            )
        }
        DbError::TransactionFailed(detail) => {
            tracing::error!(error = %detail, "Transaction failed");
            (
                StatusCode::OK,
                "TRANSACTION_FAILED",
                "The operation could not be completed".to_string(),
            )
        }
        DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
            tracing::error!(error = %err, "Database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "DATABASE_UNAVAILABLE",
                "Database unavailable".to_string(),
            )
        }
        DbError::MigrationFailed(_) | DbError::QueryFailed(_) | DbError::Internal(_) => {
            tracing::error!(error = %err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

impl ApiError {
    /// HTTP status, stable code and client-safe message.
    pub fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Db(err) => classify_db(err),
            ApiError::Core(err) => classify_core(err),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            ApiError::InvalidCredentials => {
                (StatusCode::OK, "INVALID_CREDENTIALS", self.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();
        (status, Json(Envelope::failure(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::Money;

    #[test]
    fn test_business_failures_keep_200() {
        let cases: Vec<(ApiError, &str)> = vec![
            (CoreError::ProductNotFound(3).into(), "NOT_FOUND"),
            (
                CoreError::InsufficientStock {
                    product: "Leche".into(),
                    available: 1,
                    requested: 2,
                }
                .into(),
                "INSUFFICIENT_STOCK",
            ),
            (
                CoreError::TotalsMismatch {
                    field: "total".into(),
                    stated: Money::from_cents(100),
                    expected: Money::from_cents(116),
                }
                .into(),
                "TOTALS_MISMATCH",
            ),
            (DbError::duplicate("codigoBarras", "123").into(), "DUPLICATE"),
            (DbError::not_found("Product", 4).into(), "NOT_FOUND"),
            (ApiError::InvalidCredentials, "INVALID_CREDENTIALS"),
        ];

        for (err, expected_code) in cases {
            let (status, code, _) = err.classify();
            assert_eq!(status, StatusCode::OK);
            assert_eq!(code, expected_code);
        }
    }

    #[test]
    fn test_validation_message_has_no_prefix() {
        let err: ApiError = ValidationError::Required {
            field: "nombreProducto".into(),
        }
        .into();
        let (_, code, message) = err.classify();
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "nombreProducto is required");
    }

    #[test]
    fn test_auth_and_availability_use_real_statuses() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).classify().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).classify().0,
            StatusCode::FORBIDDEN
        );
        let (status, code, _) = ApiError::Db(DbError::PoolExhausted).classify();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "DATABASE_UNAVAILABLE");
    }

    #[test]
    fn test_internal_details_are_not_echoed() {
        let (status, _, message) =
            ApiError::Db(DbError::QueryFailed("no such column: secret".into())).classify();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("secret"));
    }
}
