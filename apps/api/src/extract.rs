//! Extractors whose rejections use the JSON envelope.
//!
//! axum's own `Json` and `Query` reject with plain-text bodies; these wrap
//! them so malformed input comes back as `{success:false, code:"BAD_REQUEST"}`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);
