//! # Customer Repository
//!
//! The customer directory: listing and registration.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::clean_optional;
use crate::error::DbResult;
use tienda_core::{Customer, NewCustomer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Active customers ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, tax_id, loyalty_points, is_active
            FROM customers
            WHERE is_active = 1
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Registers a customer with zero loyalty points.
    ///
    /// ## Returns
    /// The new customer id. Optional fields left blank are stored as NULL.
    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO customers (name, phone, email, address, tax_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(customer.name.trim())
        .bind(clean_optional(customer.phone.as_deref()))
        .bind(clean_optional(customer.email.as_deref()))
        .bind(clean_optional(customer.address.as_deref()))
        .bind(clean_optional(customer.tax_id.as_deref()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(customer_id = id, "Customer created");
        Ok(id)
    }
}
