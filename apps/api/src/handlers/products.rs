//! Handlers for `/api/productos`.
//!
//! Reads are open to any signed-in user; writes need an admin.

use axum::extract::State;
use serde::Deserialize;
use tienda_core::validation::{validate_product_input, validate_search_query};
use tienda_core::{CoreError, Product, ProductFilter, ProductInput, ValidationError};

use crate::extract::{JsonBody, QueryParams};
use crate::middleware::{AuthUser, RequireAdmin};
use crate::response::{ApiResult, Created, Envelope};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameters / bodies
// ---------------------------------------------------------------------------

/// `GET /api/productos` query. Values stay strings so bad numbers surface
/// as validation errors rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub id: Option<String>,
    #[serde(rename = "lowStock")]
    pub low_stock: Option<String>,
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    #[serde(rename = "busqueda")]
    pub search: Option<String>,
}

/// `DELETE /api/productos?id=` query.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// `PUT /api/productos` body: the full product plus its id.
#[derive(Debug, Deserialize)]
pub struct ProductUpdate {
    #[serde(rename = "idProducto")]
    pub id: i64,
    #[serde(flatten)]
    pub input: ProductInput,
}

/// Either shape `GET /api/productos` can answer with.
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum ProductPayload {
    One(Product),
    Many(Vec<Product>),
}

/// Parses a numeric id from a query value.
pub(crate) fn parse_id(field: &str, value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected a positive integer".to_string(),
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/productos
///
/// `?id=` fetches one product, `?lowStock` lists products at or under their
/// minimum, anything else lists the catalog filtered by `categoria` and
/// `busqueda`.
pub async fn get_products(
    State(state): State<AppState>,
    _user: AuthUser,
    QueryParams(query): QueryParams<ProductQuery>,
) -> ApiResult<ProductPayload> {
    let products = state.db.products();

    if let Some(raw) = non_blank(query.id.as_deref()) {
        let id = parse_id("id", raw)?;
        let product = products
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ProductNotFound(id))?;
        return Ok(Envelope::data(ProductPayload::One(product)));
    }

    if query.low_stock.is_some() {
        let low = products.list_low_stock().await?;
        return Ok(Envelope::data(ProductPayload::Many(low)));
    }

    let category_id = non_blank(query.category.as_deref())
        .map(|raw| parse_id("categoria", raw))
        .transpose()?;
    let search = match query.search.as_deref() {
        Some(term) => validate_search_query(term)?,
        None => None,
    };

    let list = products
        .list(&ProductFilter {
            category_id,
            search,
        })
        .await?;
    Ok(Envelope::data(ProductPayload::Many(list)))
}

/// POST /api/productos
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(input): JsonBody<ProductInput>,
) -> ApiResult<Created> {
    validate_product_input(&input)?;

    let id = state.db.products().insert(&input).await?;

    tracing::info!(product_id = id, user_id = admin.user_id, "Product created");
    Ok(Envelope::with_message(
        "producto creado exitosamente",
        Created { id },
    ))
}

/// PUT /api/productos
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(update): JsonBody<ProductUpdate>,
) -> ApiResult<()> {
    validate_product_input(&update.input)?;

    state
        .db
        .products()
        .update(update.id, &update.input, admin.user_id)
        .await?;

    tracing::info!(product_id = update.id, user_id = admin.user_id, "Product updated");
    Ok(Envelope::message("producto actualizado exitosamente"))
}

/// DELETE /api/productos?id=
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    QueryParams(query): QueryParams<IdQuery>,
) -> ApiResult<()> {
    let raw = non_blank(query.id.as_deref()).ok_or_else(|| ValidationError::Required {
        field: "id".to_string(),
    })?;
    let id = parse_id("id", raw)?;

    state.db.products().soft_delete(id).await?;

    tracing::info!(product_id = id, user_id = admin.user_id, "Product deactivated");
    Ok(Envelope::message("producto eliminado exitosamente"))
}
