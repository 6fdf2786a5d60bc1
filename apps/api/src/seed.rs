//! First-run data: an admin account and a small sample catalog.
//!
//! Safe to run repeatedly. The admin is created only when no active user has
//! its email, and the catalog only when no product was ever created, so a
//! catalog emptied by deactivation stays empty.

use tienda_core::validation::{validate_email, validate_password};
use tienda_core::{Money, NewUser, ProductInput, ValidationError, ADMIN_ROLE_ID};
use tienda_db::{Database, DbError};
use tracing::info;

use crate::auth::hash_password;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@tienda.local";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin12345";
const ADMIN_NAME: &str = "Administrador";

/// (name, description)
const SAMPLE_CATEGORIES: &[(&str, &str)] = &[
    ("Abarrotes", "Productos básicos de despensa"),
    ("Bebidas", "Refrescos, jugos y agua"),
    ("Lácteos", "Leche, quesos y derivados"),
];

/// (barcode, name, category index, purchase cents, sale cents, stock, min stock)
const SAMPLE_PRODUCTS: &[(&str, &str, usize, i64, i64, i64, i64)] = &[
    ("7501000000011", "Arroz 1kg", 0, 2_200, 3_150, 40, 10),
    ("7501000000028", "Frijol negro 1kg", 0, 2_800, 3_900, 25, 10),
    ("7501000000035", "Refresco cola 600ml", 1, 1_100, 1_800, 60, 24),
    ("7501000000042", "Agua natural 1L", 1, 600, 1_200, 8, 12),
    ("7501000000059", "Leche entera 1L", 2, 2_000, 2_750, 18, 12),
];

/// What a seed run changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub categories_created: usize,
    pub products_created: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Invalid seed admin credentials: {0}")]
    Validation(#[from] ValidationError),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Admin credentials from `TIENDA_SEED_ADMIN_EMAIL` and
/// `TIENDA_SEED_ADMIN_PASSWORD`, falling back to the development defaults.
pub fn admin_credentials_from_env() -> (String, String) {
    let email = std::env::var("TIENDA_SEED_ADMIN_EMAIL")
        .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let password = std::env::var("TIENDA_SEED_ADMIN_PASSWORD")
        .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    (email, password)
}

/// Seeds the admin account and, on an empty catalog, the sample data.
pub async fn run(
    db: &Database,
    admin_email: &str,
    admin_password: &str,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport {
        admin_created: ensure_admin(db, admin_email, admin_password).await?,
        ..SeedReport::default()
    };

    let products = db.products();
    if products.count_all().await? > 0 {
        info!("Catalog already has products, skipping sample data");
        return Ok(report);
    }

    let categories = db.categories();
    let mut category_ids = Vec::with_capacity(SAMPLE_CATEGORIES.len());
    for &(name, description) in SAMPLE_CATEGORIES {
        category_ids.push(categories.insert(name, Some(description)).await?);
        report.categories_created += 1;
    }

    for &(barcode, name, category, purchase, sale, stock, min_stock) in SAMPLE_PRODUCTS {
        products
            .insert(&ProductInput {
                barcode: barcode.to_string(),
                name: name.to_string(),
                description: None,
                category_id: category_ids.get(category).copied(),
                supplier_id: None,
                purchase_price: Money::from_cents(purchase),
                sale_price: Money::from_cents(sale),
                stock,
                min_stock,
                unit: "pieza".to_string(),
            })
            .await?;
        report.products_created += 1;
    }

    info!(
        categories = report.categories_created,
        products = report.products_created,
        "Sample catalog created"
    );
    Ok(report)
}

async fn ensure_admin(db: &Database, email: &str, password: &str) -> Result<bool, SeedError> {
    let email = email.trim();
    validate_email(email)?;
    validate_password(password)?;

    let users = db.users();
    if users.email_in_use(email).await? {
        info!(email, "Admin account already present");
        return Ok(false);
    }

    let password_hash = hash_password(password).map_err(|e| SeedError::Hash(e.to_string()))?;
    let id = users
        .insert(&NewUser {
            name: ADMIN_NAME.to_string(),
            email: email.to_string(),
            password_hash,
            role_id: ADMIN_ROLE_ID,
        })
        .await?;

    info!(user_id = id, email, "Admin account created");
    Ok(true)
}
