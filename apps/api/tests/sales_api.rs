//! Integration tests for `/api/ventas`, including the checkout flow end to
//! end.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{get, json_request, product_body, spawn_app, spawn_app_with, test_config, TestApp};

/// A one-line sale of `quantity` units at $12.50 with 16% tax.
fn sale_body(product_id: i64, quantity: i64) -> Value {
    let subtotal = 12.5 * quantity as f64;
    let tax = (subtotal * 0.16 * 100.0).round() / 100.0;
    json!({
        "metodoPago": "efectivo",
        "subtotal": subtotal,
        "descuento": 0,
        "impuesto": tax,
        "total": subtotal + tax,
        "productos": [{
            "idProducto": product_id,
            "cantidad": quantity,
            "precioUnitario": 12.5,
            "subtotal": subtotal
        }]
    })
}

async fn stock_of(app: &TestApp, id: i64) -> i64 {
    app.db.products().get_by_id(id).await.unwrap().unwrap().stock
}

#[tokio::test]
async fn test_checkout_scenario() {
    let app = spawn_app().await;

    // Login as the seeded admin
    let (_, login) = app
        .login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await;
    assert_eq!(login["data"]["user"]["rol"], "admin");
    let token = login["data"]["token"].as_str().unwrap().to_string();

    // Create a product under its minimum stock
    let id = app
        .create_product(&token, product_body("7503000000018", "Pan de caja", 3, 5))
        .await;

    let (_, low) = app
        .send(get("/api/productos?lowStock", Some(&token)))
        .await;
    assert!(low["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["idProducto"] == id));

    // Sell one
    let (status, sale) = app
        .send(json_request(
            Method::POST,
            "/api/ventas",
            Some(&token),
            sale_body(id, 1),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sale["success"], true, "{sale}");
    assert_eq!(sale["message"], "venta registrada exitosamente");
    assert_eq!(sale["data"]["total"], 14.5);

    let folio = sale["data"]["folio"].as_str().unwrap();
    let today = app.clock.today().format("%Y%m%d").to_string();
    assert!(folio.starts_with(&format!("V{today}")), "{folio}");
    assert_eq!(folio.len(), 13);

    assert_eq!(stock_of(&app, id).await, 2);

    // The detail lists the line with the product name
    let sale_id = sale["data"]["idVenta"].as_i64().unwrap();
    let (_, detail) = app
        .send(get(&format!("/api/ventas?detalle={sale_id}"), Some(&token)))
        .await;
    let lines = detail["data"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["nombreProducto"], "Pan de caja");
    assert_eq!(lines[0]["cantidad"], 1);
}

#[tokio::test]
async fn test_seller_comes_from_the_token() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let cashier = app.cashier_token().await;
    let id = app
        .create_product(&admin, product_body("601", "Tortillas", 20, 2))
        .await;

    let mut body = sale_body(id, 2);
    body["idUsuario"] = json!(1);
    let (_, sale) = app
        .send(json_request(Method::POST, "/api/ventas", Some(&cashier), body))
        .await;
    assert_eq!(sale["success"], true, "{sale}");

    let (_, list) = app.send(get("/api/ventas", Some(&cashier))).await;
    assert_eq!(list["data"][0]["nombreUsuario"], "Cajero Uno");
}

#[tokio::test]
async fn test_oversell_is_rejected_and_nothing_is_written() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, product_body("701", "Huevo 12 pzas", 1, 0))
        .await;

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/ventas",
            Some(&token),
            sale_body(id, 3),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    assert_eq!(stock_of(&app, id).await, 1);
    let (_, list) = app.send(get("/api/ventas", Some(&token))).await;
    assert_eq!(list["data"], json!([]));
}

#[tokio::test]
async fn test_backorder_mode_allows_negative_stock() {
    let config = tienda_api::ServerConfig {
        allow_negative_stock: true,
        ..test_config()
    };
    let app = spawn_app_with(config).await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, product_body("702", "Azucar 1kg", 1, 0))
        .await;

    let (_, body) = app
        .send(json_request(
            Method::POST,
            "/api/ventas",
            Some(&token),
            sale_body(id, 3),
        ))
        .await;
    assert_eq!(body["success"], true, "{body}");
    assert_eq!(stock_of(&app, id).await, -2);
}

#[tokio::test]
async fn test_client_totals_are_checked() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, product_body("801", "Cafe soluble", 10, 0))
        .await;

    let mut body = sale_body(id, 2);
    body["total"] = json!(1.0);
    let (status, response) = app
        .send(json_request(Method::POST, "/api/ventas", Some(&token), body))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["code"], "TOTALS_MISMATCH");
    assert_eq!(stock_of(&app, id).await, 10);

    let mut extreme = sale_body(id, 2);
    extreme["subtotal"] = json!(-92233720368547758i64);
    let (status, response) = app
        .send(json_request(Method::POST, "/api/ventas", Some(&token), extreme))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["code"], "TOTALS_MISMATCH");
    assert_eq!(stock_of(&app, id).await, 10);

    let mut empty = sale_body(id, 1);
    empty["productos"] = json!([]);
    let (_, response) = app
        .send(json_request(Method::POST, "/api/ventas", Some(&token), empty))
        .await;
    assert_eq!(response["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_product_rolls_back() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, product_body("901", "Mantequilla", 10, 0))
        .await;

    let mut body = sale_body(id, 1);
    body["productos"]
        .as_array_mut()
        .unwrap()
        .push(json!({"idProducto": 99999, "cantidad": 1, "precioUnitario": 0}));

    let (_, response) = app
        .send(json_request(Method::POST, "/api/ventas", Some(&token), body))
        .await;
    assert_eq!(response["code"], "NOT_FOUND");
    assert_eq!(stock_of(&app, id).await, 10);
}

#[tokio::test]
async fn test_statistics_and_date_filters() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, product_body("1001", "Refresco", 50, 0))
        .await;

    for quantity in [1, 2] {
        let (_, sale) = app
            .send(json_request(
                Method::POST,
                "/api/ventas",
                Some(&token),
                sale_body(id, quantity),
            ))
            .await;
        assert_eq!(sale["success"], true, "{sale}");
    }

    let (_, stats) = app
        .send(get("/api/ventas?estadisticas=1", Some(&token)))
        .await;
    let stats = &stats["data"];
    assert_eq!(stats["hoy"]["total"], 2);
    assert_eq!(stats["hoy"]["monto"], 14.5 + 29.0);
    assert_eq!(stats["mes"]["total"], 2);
    assert_eq!(stats["topProductos"][0]["nombreProducto"], "Refresco");
    assert_eq!(stats["topProductos"][0]["totalVendido"], 3);

    let today = app.clock.today().format("%Y-%m-%d").to_string();
    let (_, in_range) = app
        .send(get(
            &format!("/api/ventas?fechaInicio={today}&fechaFin={today}"),
            Some(&token),
        ))
        .await;
    assert_eq!(in_range["data"].as_array().unwrap().len(), 2);

    let (_, past) = app
        .send(get(
            "/api/ventas?fechaInicio=2000-01-01&fechaFin=2000-01-31",
            Some(&token),
        ))
        .await;
    assert_eq!(past["data"], json!([]));

    let (_, half) = app
        .send(get("/api/ventas?fechaInicio=2000-01-01", Some(&token)))
        .await;
    assert_eq!(half["code"], "VALIDATION_ERROR");

    let (_, missing) = app
        .send(get("/api/ventas?detalle=424242", Some(&token)))
        .await;
    assert_eq!(missing["code"], "NOT_FOUND");
}
