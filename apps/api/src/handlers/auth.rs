//! Handlers for `/api/auth` (login and register).
//!
//! Both actions share one endpoint and are told apart by the `action` field:
//!
//! ```text
//! POST /api/auth {"action":"login",    "email":…, "password":…}
//! POST /api/auth {"action":"register", "nombre":…, "email":…, "password":…, "idRol"?:…}
//! ```

use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tienda_core::validation::{validate_email, validate_password, validate_person_name};
use tienda_core::{NewUser, CLERK_ROLE_ID};
use tienda_db::DbError;

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::response::{ApiResult, Envelope};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /api/auth`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AuthRequest {
    Login {
        email: String,
        password: String,
    },
    Register {
        #[serde(rename = "nombre")]
        name: String,
        email: String,
        password: String,
        #[serde(rename = "idRol", default)]
        role_id: Option<i64>,
    },
}

/// Public user info returned by login.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "rol")]
    pub role: String,
    #[serde(rename = "idRol")]
    pub role_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Either action's payload, so one handler can serve both.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AuthResponse {
    Login(LoginResponse),
    Register(RegisterResponse),
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(request): JsonBody<AuthRequest>,
) -> ApiResult<AuthResponse> {
    match request {
        AuthRequest::Login { email, password } => {
            let session = login(&state, &email, password).await?;
            Ok(Envelope::with_message(
                "login exitoso",
                AuthResponse::Login(session),
            ))
        }
        AuthRequest::Register {
            name,
            email,
            password,
            role_id,
        } => {
            let role_id = role_id.unwrap_or(CLERK_ROLE_ID);
            if role_id != CLERK_ROLE_ID {
                let caller = AuthUser::from_headers(&headers, &state.tokens)?;
                if !caller.is_admin() {
                    return Err(ApiError::Forbidden(
                        "Only an admin can create this role".into(),
                    ));
                }
            }

            let user_id = register(&state, name, email, password, role_id).await?;
            Ok(Envelope::with_message(
                "usuario registrado exitosamente",
                AuthResponse::Register(RegisterResponse { user_id }),
            ))
        }
    }
}

/// Checks credentials and issues a token.
///
/// Unknown email, inactive account and wrong password are indistinguishable
/// to the caller.
async fn login(state: &AppState, email: &str, password: String) -> Result<LoginResponse, ApiError> {
    let email = email.trim();

    let Some(credentials) = state
        .db
        .users()
        .find_active_credentials_by_email(email)
        .await?
    else {
        tracing::warn!(email, "Login for unknown or inactive account");
        return Err(ApiError::InvalidCredentials);
    };

    let hash = credentials.password_hash;
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password check task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("Stored password hash unreadable: {e}")))?;

    let user = credentials.user;
    if !valid {
        tracing::warn!(user_id = user.id, "Login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let now = state.clock.now();
    state.db.users().touch_last_access(user.id, now).await?;

    let token = state
        .tokens
        .issue_at(user.id, &user.email, &user.role_name, now)
        .map_err(|e| ApiError::Internal(format!("Token signing failed: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role_name, "User logged in");

    Ok(LoginResponse {
        token,
        user: SessionUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role_name,
            role_id: user.role_id,
        },
    })
}

async fn register(
    state: &AppState,
    name: String,
    email: String,
    password: String,
    role_id: i64,
) -> Result<i64, ApiError> {
    let name = name.trim().to_string();
    let email = email.trim().to_string();

    validate_person_name("nombre", &name)?;
    validate_email(&email)?;
    validate_password(&password)?;

    let users = state.db.users();
    if users.email_in_use(&email).await? {
        return Err(DbError::duplicate("email", email).into());
    }

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hash task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {e}")))?;

    let user_id = users
        .insert(&NewUser {
            name,
            email,
            password_hash,
            role_id,
        })
        .await?;

    tracing::info!(user_id, role_id, "User registered");
    Ok(user_id)
}
