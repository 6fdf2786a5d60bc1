//! Shared integration-test harness.
//!
//! Every test gets its own in-memory database (migrated, with one admin and
//! one cashier) behind the production router from [`build_app_router`].

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tienda_api::auth::hash_password;
use tienda_api::{build_app_router, AppState, ServerConfig};
use tienda_core::{NewUser, StoreClock, ADMIN_ROLE_ID, CLERK_ROLE_ID};
use tienda_db::{Database, DbConfig};

pub const ADMIN_EMAIL: &str = "admin@tienda.local";
pub const ADMIN_PASSWORD: &str = "admin12345";
pub const CASHIER_EMAIL: &str = "caja@tienda.local";
pub const CASHIER_PASSWORD: &str = "caja-segura-1";

/// A running application plus handles for asserting on its database.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub clock: StoreClock,
}

/// Test configuration: defaults with a fixed secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        jwt_secret: "integration-test-secret".to_string(),
        ..ServerConfig::default()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: ServerConfig) -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    for (name, email, password, role_id) in [
        ("Administrador", ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_ROLE_ID),
        ("Cajero Uno", CASHIER_EMAIL, CASHIER_PASSWORD, CLERK_ROLE_ID),
    ] {
        db.users()
            .insert(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password).unwrap(),
                role_id,
            })
            .await
            .unwrap();
    }

    let state = AppState::new(db.clone(), config);
    let clock = state.clock;
    TestApp {
        router: build_app_router(state),
        db,
        clock,
    }
}

impl TestApp {
    /// Sends a request and returns the status and parsed JSON body
    /// (`Value::Null` for an empty body).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(json_request(
            Method::POST,
            "/api/auth",
            None,
            json!({"action": "login", "email": email, "password": password}),
        ))
        .await
    }

    /// Logs in and returns the bearer token.
    pub async fn token(&self, email: &str, password: &str) -> String {
        let (_, body) = self.login(email, password).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn cashier_token(&self) -> String {
        self.token(CASHIER_EMAIL, CASHIER_PASSWORD).await
    }

    /// Creates a product as admin and returns its id.
    pub async fn create_product(&self, token: &str, body: Value) -> i64 {
        let (status, body) = self
            .send(json_request(Method::POST, "/api/productos", Some(token), body))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token)
}

/// A valid product body.
pub fn product_body(barcode: &str, name: &str, stock: i64, min_stock: i64) -> Value {
    json!({
        "codigoBarras": barcode,
        "nombreProducto": name,
        "descripcion": "Producto de prueba",
        "precioCompra": 8.0,
        "precioVenta": 12.5,
        "stock": stock,
        "stockMinimo": min_stock,
        "unidadMedida": "pieza"
    })
}
