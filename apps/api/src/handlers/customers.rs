//! Handlers for `/api/clientes`.

use axum::extract::State;
use tienda_core::validation::validate_new_customer;
use tienda_core::{Customer, NewCustomer};

use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::response::{ApiResult, Created, Envelope};
use crate::state::AppState;

/// GET /api/clientes
pub async fn list_customers(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Vec<Customer>> {
    let customers = state.db.customers().list_active().await?;
    Ok(Envelope::data(customers))
}

/// POST /api/clientes
///
/// Any signed-in user may register a customer at the till.
pub async fn create_customer(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(customer): JsonBody<NewCustomer>,
) -> ApiResult<Created> {
    validate_new_customer(&customer)?;

    let id = state.db.customers().insert(&customer).await?;

    tracing::debug!(customer_id = id, user_id = user.user_id, "Customer created by user");
    Ok(Envelope::with_message(
        "cliente creado exitosamente",
        Created { id },
    ))
}
