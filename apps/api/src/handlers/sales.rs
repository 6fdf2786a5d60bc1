//! Handlers for `/api/ventas`.
//!
//! ```text
//! POST /api/ventas ── JsonBody<NewSale>
//!        │
//!        ▼
//!  NewSale::into_order   recompute lines, subtotal, tax, total;
//!        │               stamp seller (token) and business date (clock)
//!        ▼
//!  SaleRepository::create   one transaction: header, lines, stock, movements
//!        │
//!        ▼
//!  {idVenta, folio, total}
//! ```

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tienda_core::{DateRange, NewSale, Sale, SaleLine, SaleReceipt, SalesStatistics};

use super::products::parse_id;
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::AuthUser;
use crate::response::{ApiResult, Envelope};
use crate::state::AppState;

/// `GET /api/ventas` query.
#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    #[serde(rename = "detalle")]
    pub detail: Option<String>,
    #[serde(rename = "estadisticas")]
    pub statistics: Option<String>,
    #[serde(rename = "fechaInicio")]
    pub start_date: Option<String>,
    #[serde(rename = "fechaFin")]
    pub end_date: Option<String>,
}

/// Every shape `GET /api/ventas` can answer with.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SalesPayload {
    Detail(Vec<SaleLine>),
    Statistics(SalesStatistics),
    List(Vec<Sale>),
}

/// GET /api/ventas
///
/// `?detalle=<id>` returns a sale's lines, `?estadisticas=1` the dashboard
/// numbers, otherwise the newest sales, optionally within
/// `fechaInicio..=fechaFin`.
pub async fn get_sales(
    State(state): State<AppState>,
    _user: AuthUser,
    QueryParams(query): QueryParams<SalesQuery>,
) -> ApiResult<SalesPayload> {
    let sales = state.db.sales();

    if let Some(raw) = query.detail.as_deref().filter(|v| !v.trim().is_empty()) {
        let sale_id = parse_id("detalle", raw)?;
        let lines = sales.lines(sale_id).await?;
        return Ok(Envelope::data(SalesPayload::Detail(lines)));
    }

    if query.statistics.is_some() {
        let stats = sales.statistics(state.clock.today()).await?;
        return Ok(Envelope::data(SalesPayload::Statistics(stats)));
    }

    let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;
    let list = sales.list(range).await?;
    Ok(Envelope::data(SalesPayload::List(list)))
}

/// POST /api/ventas
///
/// The seller is always the token's user; an `idUsuario` in the body is
/// ignored.
pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(sale): JsonBody<NewSale>,
) -> ApiResult<SaleReceipt> {
    let order = sale.into_order(user.user_id, state.config.tax_rate(), &state.clock)?;

    let receipt = state
        .db
        .sales()
        .create(&order, state.config.stock_policy())
        .await?;

    Ok(Envelope::with_message("venta registrada exitosamente", receipt))
}
