//! Bearer-token extractors for axum handlers.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//!   AuthUser      ── missing / malformed / bad signature / expired → 401
//!        │
//!        ▼
//!   RequireAdmin  ── role ≠ admin → 403
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tienda_core::Role;

use crate::auth::TokenIssuer;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, taken from a verified token.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> ApiResult<()> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     ...
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Verifies the `Authorization` header of a request.
    pub fn from_headers(headers: &HeaderMap, tokens: &TokenIssuer) -> Result<Self, ApiError> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        let claims = tokens.verify(token.trim()).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        let role = Role::from_name(&claims.role)
            .ok_or_else(|| ApiError::Unauthorized("Unknown role in token".into()))?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.email,
            role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_headers(&parts.headers, &state.tokens)
    }
}

/// An authenticated admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(ApiError::Forbidden(format!(
                "Role '{}' cannot perform this action",
                user.role
            )));
        }

        Ok(RequireAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_bearer_token() {
        let tokens = TokenIssuer::new("secret", 60);
        let token = tokens.issue(5, "caja@tienda.local", "cajero").unwrap();

        let user = AuthUser::from_headers(&headers(&format!("Bearer {token}")), &tokens).unwrap();
        assert_eq!(user.user_id, 5);
        assert_eq!(user.role, Role::Cajero);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_rejections_are_unauthorized() {
        let tokens = TokenIssuer::new("secret", 60);
        let token = tokens.issue(5, "caja@tienda.local", "cajero").unwrap();

        for bad in [
            HeaderMap::new(),
            headers(&format!("Token {token}")),
            headers("Bearer not.a.jwt"),
        ] {
            assert!(matches!(
                AuthUser::from_headers(&bad, &tokens),
                Err(ApiError::Unauthorized(_))
            ));
        }
    }

    #[test]
    fn test_unknown_role_is_unauthorized() {
        let tokens = TokenIssuer::new("secret", 60);
        let token = tokens.issue(5, "x@tienda.local", "gerente").unwrap();

        assert!(matches!(
            AuthUser::from_headers(&headers(&format!("Bearer {token}")), &tokens),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
