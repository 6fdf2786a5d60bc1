//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Filtered listing (category, name/barcode substring)
//! - CRUD with soft delete
//! - Low-stock report
//! - Stock adjustments recorded as inventory movements
//!
//! ## Stock Adjustments
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    update(id, input, user_id)                           │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── INSERT movement 'ajuste' SELECT ... FROM products               │
//! │    │     (only when the stock actually changes; first statement,       │
//! │    │      so the write lock is held before stock is read)              │
//! │    │                                                                    │
//! │    └── UPDATE products SET every field (0 rows → NotFound)             │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::clean_optional;
use crate::error::{DbError, DbResult};
use tienda_core::{InventoryMovement, Product, ProductFilter, ProductInput};

/// Product columns joined with category and supplier names.
const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.barcode, p.name, p.description,
           p.category_id, c.name AS category_name,
           p.supplier_id, s.name AS supplier_name,
           p.purchase_price_cents AS purchase_price,
           p.sale_price_cents AS sale_price,
           p.stock, p.min_stock, p.unit, p.is_active,
           p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN suppliers s ON s.id = p.supplier_id
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let drinks = repo.list(&ProductFilter { category_id: Some(3), search: None }).await?;
/// let product = repo.get_by_id(42).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active products, ordered by name.
    ///
    /// ## Arguments
    /// * `filter` - Optional category and an already-validated search term,
    ///   matched as a substring of name or barcode
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let pattern = filter.search.as_deref().map(|term| format!("%{term}%"));
        debug!(category_id = ?filter.category_id, search = ?filter.search, "Listing products");

        let sql = format!(
            "{PRODUCT_SELECT}
             WHERE p.is_active = 1
               AND (?1 IS NULL OR p.category_id = ?1)
               AND (?2 IS NULL OR p.name LIKE ?2 OR p.barcode LIKE ?2)
             ORDER BY p.name ASC, p.id ASC"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter.category_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets an active product by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?1 AND p.is_active = 1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(id)` - The new product id
    /// * `Err(DbError::UniqueViolation)` - Barcode already in use (including
    ///   by a deactivated product)
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown category or supplier
    pub async fn insert(&self, input: &ProductInput) -> DbResult<i64> {
        let now = Utc::now();
        let barcode = input.barcode.trim();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                barcode, name, description, category_id, supplier_id,
                purchase_price_cents, sale_price_cents, stock, min_stock, unit,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?11)
            "#,
        )
        .bind(barcode)
        .bind(input.name.trim())
        .bind(clean_optional(input.description.as_deref()))
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(input.purchase_price)
        .bind(input.sale_price)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(input.unit.trim())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| barcode_conflict(e.into(), barcode))?;

        let id = result.last_insert_rowid();
        info!(product_id = id, barcode = %barcode, "Product created");
        Ok(id)
    }

    /// Replaces every editable field of an active product.
    ///
    /// A stock change is written to the inventory ledger as an `ajuste`
    /// movement attributed to `user_id`. Like sale movements its quantity is
    /// `stock_before - stock_after`, so a restock is negative.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No active product with that id
    /// * `Err(DbError::UniqueViolation)` - New barcode belongs to another product
    pub async fn update(&self, id: i64, input: &ProductInput, user_id: i64) -> DbResult<()> {
        let now = Utc::now();
        let barcode = input.barcode.trim();

        let mut tx = self.pool.begin().await?;

        let adjustment = sqlx::query(
            r#"
            INSERT INTO inventory_movements (
                product_id, movement_type, quantity, stock_before, stock_after,
                user_id, reference, created_at
            )
            SELECT id, 'ajuste', stock - ?1, stock, ?1, ?2, NULL, ?3
            FROM products
            WHERE id = ?4 AND is_active = 1 AND stock <> ?1
            "#,
        )
        .bind(input.stock)
        .bind(user_id)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE products SET
                barcode = ?1, name = ?2, description = ?3, category_id = ?4,
                supplier_id = ?5, purchase_price_cents = ?6, sale_price_cents = ?7,
                stock = ?8, min_stock = ?9, unit = ?10, updated_at = ?11
            WHERE id = ?12 AND is_active = 1
            "#,
        )
        .bind(barcode)
        .bind(input.name.trim())
        .bind(clean_optional(input.description.as_deref()))
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(input.purchase_price)
        .bind(input.sale_price)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(input.unit.trim())
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| barcode_conflict(e.into(), barcode))?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit().await?;

        info!(
            product_id = id,
            stock_adjusted = adjustment.rows_affected() > 0,
            "Product updated"
        );
        Ok(())
    }

    /// Deactivates a product. Sale history keeps referencing it.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No active product with that id
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?1 WHERE id = ?2 AND is_active = 1",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = id, "Product deactivated");
        Ok(())
    }

    /// Number of products ever created, deactivated ones included.
    pub async fn count_all(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Active products at or below their minimum stock, emptiest first.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_SELECT}
             WHERE p.is_active = 1 AND p.stock <= p.min_stock
             ORDER BY p.stock ASC, p.name ASC"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// The inventory ledger of one product, oldest first.
    pub async fn movements(&self, product_id: i64) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(
            r#"
            SELECT id, product_id, movement_type, quantity, stock_before,
                   stock_after, user_id, reference, created_at
            FROM inventory_movements
            WHERE product_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

/// Attaches the offending barcode to a barcode UNIQUE failure.
fn barcode_conflict(err: DbError, barcode: &str) -> DbError {
    if err.is_unique_violation_on("products.barcode") {
        DbError::duplicate("codigoBarras", barcode)
    } else {
        err
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{database, product, seller};
    use tienda_core::{Money, MovementType};

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = database().await;
        let category_id = db
            .categories()
            .insert("Bebidas", Some("Refrescos y aguas"))
            .await
            .unwrap();

        let mut input = product("7501055300075", "Coca-Cola 600ml", 24, 6);
        input.category_id = Some(category_id);
        input.description = Some("Botella PET".to_string());
        input.sale_price = Money::from_cents(1850);

        let id = db.products().insert(&input).await.unwrap();
        let stored = db.products().get_by_id(id).await.unwrap().unwrap();

        assert_eq!(stored.barcode, input.barcode);
        assert_eq!(stored.name, input.name);
        assert_eq!(stored.description.as_deref(), Some("Botella PET"));
        assert_eq!(stored.category_id, Some(category_id));
        assert_eq!(stored.category_name.as_deref(), Some("Bebidas"));
        assert_eq!(stored.purchase_price, input.purchase_price);
        assert_eq!(stored.sale_price, Money::from_cents(1850));
        assert_eq!(stored.stock, 24);
        assert_eq!(stored.min_stock, 6);
        assert_eq!(stored.unit, "pieza");
        assert!(stored.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_barcode_is_rejected() {
        let db = database().await;
        db.products()
            .insert(&product("123", "Primero", 1, 0))
            .await
            .unwrap();

        let err = db
            .products()
            .insert(&product("123", "Segundo", 1, 0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, ref value } if field == "codigoBarras" && value == "123"
        ));
    }

    #[tokio::test]
    async fn test_unknown_category_is_a_foreign_key_violation() {
        let db = database().await;
        let mut input = product("999", "Huérfano", 1, 0);
        input.category_id = Some(404);

        let err = db.products().insert(&input).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_search_and_category() {
        let db = database().await;
        let snacks = db.categories().insert("Botanas", None).await.unwrap();

        let mut chips = product("750100", "Papas Sabritas", 10, 2);
        chips.category_id = Some(snacks);
        db.products().insert(&chips).await.unwrap();
        db.products()
            .insert(&product("750200", "Agua Ciel", 10, 2))
            .await
            .unwrap();

        let by_name = db
            .products()
            .list(&ProductFilter {
                category_id: None,
                search: Some("papas".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Papas Sabritas");

        let by_barcode = db
            .products()
            .list(&ProductFilter {
                category_id: None,
                search: Some("7502".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_barcode.len(), 1);
        assert_eq!(by_barcode[0].name, "Agua Ciel");

        let by_category = db
            .products()
            .list(&ProductFilter {
                category_id: Some(snacks),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(by_category.len(), 1);

        let all = db.products().list(&ProductFilter::default()).await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Agua Ciel", "Papas Sabritas"]);
    }

    #[tokio::test]
    async fn test_low_stock_includes_empty_shelves_and_orders_by_stock() {
        let db = database().await;
        let repo = db.products();
        repo.insert(&product("A", "Arroz", 3, 5)).await.unwrap();
        repo.insert(&product("B", "Bolillo", 0, 0)).await.unwrap();
        repo.insert(&product("C", "Cafe", 5, 5)).await.unwrap();
        repo.insert(&product("D", "Detergente", 50, 5)).await.unwrap();

        let low = repo.list_low_stock().await.unwrap();
        let names: Vec<_> = low.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["Bolillo", "Arroz", "Cafe"]);
        assert!(low.iter().all(|p| p.is_low_stock()));
    }

    #[tokio::test]
    async fn test_update_records_stock_adjustment() {
        let db = database().await;
        let user_id = seller(&db).await;
        let repo = db.products();
        let id = repo.insert(&product("X1", "Leche", 10, 2)).await.unwrap();

        let mut edited = product("X1-NEW", "Leche Entera", 4, 2);
        edited.sale_price = Money::from_cents(2900);
        repo.update(id, &edited, user_id).await.unwrap();

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.barcode, "X1-NEW");
        assert_eq!(stored.name, "Leche Entera");
        assert_eq!(stored.stock, 4);
        assert_eq!(stored.sale_price, Money::from_cents(2900));

        let movements = repo.movements(id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Ajuste);
        assert_eq!(movements[0].quantity, 6);
        assert_eq!(movements[0].stock_before, 10);
        assert_eq!(movements[0].stock_after, 4);
        assert_eq!(movements[0].user_id, user_id);

        // Same stock: no new ledger entry
        repo.update(id, &edited, user_id).await.unwrap();
        assert_eq!(repo.movements(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let db = database().await;
        let user_id = seller(&db).await;

        let err = db
            .products()
            .update(77, &product("Z", "Nada", 1, 0), user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(db.products().movements(77).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_product() {
        let db = database().await;
        let repo = db.products();
        let id = repo.insert(&product("DEL", "Efimero", 1, 5)).await.unwrap();

        repo.soft_delete(id).await.unwrap();

        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(repo.list(&ProductFilter::default()).await.unwrap().is_empty());
        assert!(repo.list_low_stock().await.unwrap().is_empty());
        assert_eq!(repo.count_all().await.unwrap(), 1);
        assert!(matches!(
            repo.soft_delete(id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
