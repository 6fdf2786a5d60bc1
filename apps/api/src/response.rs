//! The JSON envelope every endpoint answers with.
//!
//! ```text
//! { "success": true,  "message": "producto creado exitosamente", "data": { "id": 7 } }
//! { "success": false, "message": "Product not found: 9", "code": "NOT_FOUND" }
//! ```

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;

/// Uniform `{success, message?, data?, code?}` wrapper.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Machine-readable failure code, only on failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T: Serialize> Envelope<T> {
    /// A successful payload without a message.
    pub fn data(data: T) -> Self {
        Envelope {
            success: true,
            message: None,
            data: Some(data),
            code: None,
        }
    }

    /// A successful payload with a human-readable message.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Envelope {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            code: None,
        }
    }
}

impl Envelope<()> {
    /// A success with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Envelope {
            success: true,
            message: Some(message.into()),
            data: None,
            code: None,
        }
    }

    /// A failure carrying a stable code.
    pub fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Envelope {
            success: false,
            message: Some(message.into()),
            data: None,
            code: Some(code),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{ "id": 7 }`, the payload of every create endpoint.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

/// Handler return type.
pub type ApiResult<T> = Result<Envelope<T>, ApiError>;
