//! # Sale Repository
//!
//! The sale transaction, sale history and dashboard aggregates.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create(order, policy)                             │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── INSERT sales (folio V{YYYYMMDD}{NNNN})                          │
//! │    │     UNIQUE(folio) hit? → new suffix, retry (≤ 20)                 │
//! │    │                                                                    │
//! │    ├── for each line:                                                   │
//! │    │     ├── product active?            no → ProductNotFound            │
//! │    │     ├── UPDATE stock = stock - q                                   │
//! │    │     │     WHERE stock >= q         0 rows → InsufficientStock      │
//! │    │     │     RETURNING stock          (AllowNegative: no guard)       │
//! │    │     ├── INSERT sale_lines                                          │
//! │    │     └── INSERT inventory_movements ('venta', ref = folio)          │
//! │    │                                                                    │
//! │  COMMIT  (any error above: the transaction is dropped → ROLLBACK)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The header insert comes first so the connection holds SQLite's write
//! lock before any stock is read. Concurrent sales are serialised by the
//! store; the stock guard sits in the UPDATE itself.

use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use tienda_core::clock::{month_bounds, trailing_window};
use tienda_core::sale::PricedLine;
use tienda_core::{
    CoreError, DateRange, Folio, InventoryMovement, Money, PeriodTotals, Sale, SaleLine, SaleOrder,
    SaleReceipt, SalesStatistics, StockPolicy, TopProduct, RECENT_SALES_LIMIT, TOP_PRODUCTS_LIMIT,
    TOP_PRODUCTS_WINDOW_DAYS,
};

/// Folio suffixes tried before giving up on a date.
pub const MAX_FOLIO_ATTEMPTS: usize = 20;

const SALE_SELECT: &str = r#"
    SELECT s.id, s.folio, s.user_id, u.name AS user_name,
           s.customer_id, c.name AS customer_name,
           s.subtotal_cents AS subtotal, s.discount_cents AS discount,
           s.tax_cents AS tax, s.total_cents AS total,
           s.payment_method, s.sale_date, s.created_at
    FROM sales s
    LEFT JOIN users u ON u.id = s.user_id
    LEFT JOIN customers c ON c.id = s.customer_id
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a verified sale atomically.
    ///
    /// ## Arguments
    /// * `order` - Cart already priced and checked by tienda-core
    /// * `policy` - What to do when a line asks for more than is in stock
    ///
    /// ## Returns
    /// * `Ok(SaleReceipt)` - Sale id, folio and server-computed total
    /// * `Err(DbError::Domain(ProductNotFound | InsufficientStock))` - Nothing
    ///   was written
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown customer
    /// * `Err(DbError::TransactionFailed)` - No free folio after
    ///   [`MAX_FOLIO_ATTEMPTS`]
    pub async fn create(&self, order: &SaleOrder, policy: StockPolicy) -> DbResult<SaleReceipt> {
        let mut tx = self.pool.begin().await?;

        let (sale_id, folio) = insert_header(&mut tx, order).await?;
        debug!(sale_id, folio = %folio, lines = order.lines.len(), "Sale header inserted");

        for line in &order.lines {
            apply_line(&mut tx, order, line, sale_id, &folio, policy).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id,
            folio = %folio,
            user_id = order.user_id,
            total = %order.totals.total,
            "Sale recorded"
        );

        Ok(SaleReceipt {
            sale_id,
            folio: folio.into(),
            total: order.totals.total,
        })
    }

    /// Recent sales, newest first, at most [`RECENT_SALES_LIMIT`].
    ///
    /// ## Arguments
    /// * `range` - Inclusive business-date bounds, or `None` for all dates
    pub async fn list(&self, range: Option<DateRange>) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "{SALE_SELECT}
             WHERE (?1 IS NULL OR s.sale_date BETWEEN ?1 AND ?2)
             ORDER BY s.created_at DESC, s.id DESC
             LIMIT ?3"
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(range.map(|r| r.start))
            .bind(range.map(|r| r.end))
            .bind(RECENT_SALES_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Gets a sale header by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sql = format!("{SALE_SELECT} WHERE s.id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lines of a sale with product names, in insertion order.
    ///
    /// ## Returns
    /// * `Err(DbError::Domain(SaleNotFound))` - No such sale
    pub async fn lines(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM sales WHERE id = ?1")
            .bind(sale_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(CoreError::SaleNotFound(sale_id).into());
        }

        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT l.id, l.sale_id, l.product_id, p.name AS product_name,
                   l.quantity, l.unit_price_cents AS unit_price,
                   l.subtotal_cents AS subtotal
            FROM sale_lines l
            JOIN products p ON p.id = l.product_id
            WHERE l.sale_id = ?1
            ORDER BY l.id ASC
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Inventory movements written by one sale, keyed by its folio.
    pub async fn movements(&self, folio: &str) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(
            r#"
            SELECT id, product_id, movement_type, quantity, stock_before,
                   stock_after, user_id, reference, created_at
            FROM inventory_movements
            WHERE reference = ?1 AND movement_type = 'venta'
            ORDER BY id ASC
            "#,
        )
        .bind(folio)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Dashboard aggregates relative to the business date `today`.
    ///
    /// ## Returns
    /// - `today`: count and revenue of sales dated `today`
    /// - `month`: the same over `today`'s calendar month
    /// - `top_products`: best sellers by units over the trailing
    ///   [`TOP_PRODUCTS_WINDOW_DAYS`] days, ties broken by name
    pub async fn statistics(&self, today: NaiveDate) -> DbResult<SalesStatistics> {
        let (month_start, month_end) = month_bounds(today);
        let (window_start, window_end) = trailing_window(today, TOP_PRODUCTS_WINDOW_DAYS);

        let today_totals = self.period_totals(today, today).await?;
        let month_totals = self.period_totals(month_start, month_end).await?;

        let top_products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT p.name AS name, SUM(l.quantity) AS total_sold
            FROM sale_lines l
            JOIN sales s ON s.id = l.sale_id
            JOIN products p ON p.id = l.product_id
            WHERE s.sale_date BETWEEN ?1 AND ?2
            GROUP BY l.product_id, p.name
            ORDER BY total_sold DESC, p.name ASC
            LIMIT ?3
            "#,
        )
        .bind(window_start)
        .bind(window_end)
        .bind(TOP_PRODUCTS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(SalesStatistics {
            today: today_totals,
            month: month_totals,
            top_products,
        })
    }

    async fn period_totals(&self, start: NaiveDate, end: NaiveDate) -> DbResult<PeriodTotals> {
        let (count, amount): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE sale_date BETWEEN ?1 AND ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(PeriodTotals {
            count,
            amount: Money::from_cents(amount),
        })
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Inserts the sale header under a fresh folio, retrying on collisions.
async fn insert_header(
    tx: &mut Transaction<'static, Sqlite>,
    order: &SaleOrder,
) -> DbResult<(i64, Folio)> {
    for attempt in 1..=MAX_FOLIO_ATTEMPTS {
        let folio = Folio::generate(order.business_date, &mut rand::rng());

        let inserted = sqlx::query(
            r#"
            INSERT INTO sales (
                folio, user_id, customer_id, subtotal_cents, discount_cents,
                tax_cents, total_cents, payment_method, sale_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(folio.as_str())
        .bind(order.user_id)
        .bind(order.customer_id)
        .bind(order.totals.subtotal)
        .bind(order.totals.discount)
        .bind(order.totals.tax)
        .bind(order.totals.total)
        .bind(order.payment_method)
        .bind(order.business_date)
        .bind(order.sold_at)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from);

        match inserted {
            Ok(result) => return Ok((result.last_insert_rowid(), folio)),
            Err(err) if err.is_unique_violation_on("sales.folio") => {
                warn!(folio = %folio, attempt, "Folio collision, retrying");
            }
            Err(err) => return Err(err),
        }
    }

    Err(DbError::TransactionFailed(format!(
        "no free folio for {} after {MAX_FOLIO_ATTEMPTS} attempts",
        order.business_date
    )))
}

/// Takes stock for one line and writes its detail and ledger rows.
async fn apply_line(
    tx: &mut Transaction<'static, Sqlite>,
    order: &SaleOrder,
    line: &PricedLine,
    sale_id: i64,
    folio: &Folio,
    policy: StockPolicy,
) -> DbResult<()> {
    let product: Option<(String, i64)> =
        sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1 AND is_active = 1")
            .bind(line.product_id)
            .fetch_optional(&mut **tx)
            .await?;

    let (name, available) = product.ok_or(CoreError::ProductNotFound(line.product_id))?;

    let decrement = match policy {
        StockPolicy::Reject => {
            "UPDATE products SET stock = stock - ?1, updated_at = ?2
             WHERE id = ?3 AND stock >= ?1
             RETURNING stock"
        }
        StockPolicy::AllowNegative => {
            "UPDATE products SET stock = stock - ?1, updated_at = ?2
             WHERE id = ?3
             RETURNING stock"
        }
    };

    let stock_after: Option<i64> = sqlx::query_scalar(decrement)
        .bind(line.quantity)
        .bind(order.sold_at)
        .bind(line.product_id)
        .fetch_optional(&mut **tx)
        .await?;

    let stock_after = stock_after.ok_or_else(|| CoreError::InsufficientStock {
        product: name,
        available,
        requested: line.quantity,
    })?;
    let stock_before = stock_after + line.quantity;

    sqlx::query(
        r#"
        INSERT INTO sale_lines (sale_id, product_id, quantity, unit_price_cents, subtotal_cents)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(sale_id)
    .bind(line.product_id)
    .bind(line.quantity)
    .bind(line.unit_price)
    .bind(line.subtotal)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO inventory_movements (
            product_id, movement_type, quantity, stock_before, stock_after,
            user_id, reference, created_at
        ) VALUES (?1, 'venta', ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(line.product_id)
    .bind(line.quantity)
    .bind(stock_before)
    .bind(stock_after)
    .bind(order.user_id)
    .bind(folio.as_str())
    .bind(order.sold_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
