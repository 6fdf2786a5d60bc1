//! Handlers for `/api/categorias`.

use axum::extract::State;
use tienda_core::Category;

use crate::middleware::AuthUser;
use crate::response::{ApiResult, Envelope};
use crate::state::AppState;

/// GET /api/categorias
pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Vec<Category>> {
    let categories = state.db.categories().list_active().await?;
    Ok(Envelope::data(categories))
}
