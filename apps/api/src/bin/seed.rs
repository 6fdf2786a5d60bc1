//! Provisions the admin account and sample catalog.
//!
//! Usage:
//! ```text
//! TIENDA_SEED_ADMIN_EMAIL=dueno@tienda.mx TIENDA_SEED_ADMIN_PASSWORD=... seed
//! ```

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tienda_api::seed;
use tienda_api::ServerConfig;
use tienda_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tienda_api=info,tienda_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load().context("Failed to load configuration")?;
    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let (email, password) = seed::admin_credentials_from_env();
    let report = seed::run(&db, &email, &password).await?;

    tracing::info!(
        admin_created = report.admin_created,
        categories = report.categories_created,
        products = report.products_created,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}
