//! # Domain Types
//!
//! Core domain types for Tienda POS.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Domain Model                                     │
//! │                                                                         │
//! │  ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌───────────────────┐ │
//! │  │   User   │    │ Category │◄───│ Product  │◄───│     SaleLine      │ │
//! │  │  + Role  │    └──────────┘    │ barcode  │    │ qty, unit price   │ │
//! │  └────┬─────┘                    │ stock    │    └─────────┬─────────┘ │
//! │       │                          └────┬─────┘              │           │
//! │       │         ┌──────────┐          │                    │           │
//! │       └────────►│   Sale   │◄─────────┼────────────────────┘           │
//! │                 │  folio   │          │                                │
//! │  ┌──────────┐   │  totals  │    ┌─────┴─────────────┐                  │
//! │  │ Customer │──►└──────────┘    │ InventoryMovement │                  │
//! │  └──────────┘                   │ before → after    │                  │
//! │                                 └───────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! Field names on the JSON wire follow the SPA's Spanish camelCase contract
//! (`idProducto`, `precioVenta`, ...). Rust field names stay English and map
//! one-to-one onto the snake_case columns of the SQLite schema.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 1600 bps = 16% (IVA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

impl Default for TaxRate {
    /// Mexican IVA, the rate the checkout screen applies.
    fn default() -> Self {
        TaxRate(1600)
    }
}

// =============================================================================
// Roles & Users
// =============================================================================

/// Id of the seeded `admin` role.
pub const ADMIN_ROLE_ID: i64 = 1;

/// Id of the seeded `cajero` (clerk) role. Default for new registrations.
pub const CLERK_ROLE_ID: i64 = 2;

/// Fixed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including catalog writes.
    Admin,
    /// Checkout and read access.
    Cajero,
}

impl Role {
    /// Role name as stored in `roles.name` and carried in tokens.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cajero => "cajero",
        }
    }

    /// Looks a role up by its stored name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Role::Admin),
            "cajero" => Some(Role::Cajero),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account joined with its role name. Never carries the password hash.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "idRol")]
    pub role_id: i64,
    #[serde(rename = "rol")]
    pub role_name: String,
    #[serde(rename = "activo")]
    pub is_active: bool,
    #[serde(rename = "ultimoAcceso")]
    pub last_access_at: Option<DateTime<Utc>>,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
}

/// A user plus the stored password hash, used only by the login flow.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone)]
pub struct UserCredentials {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub user: User,
    pub password_hash: String,
}

/// Data needed to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i64,
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    #[serde(rename = "idCategoria")]
    pub id: i64,
    #[serde(rename = "nombreCategoria")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "activo")]
    pub is_active: bool,
}

// =============================================================================
// Product
// =============================================================================

/// Default unit of measure for new products.
pub const DEFAULT_UNIT: &str = "pieza";

/// A catalog product with its category and supplier names resolved.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    #[serde(rename = "idProducto")]
    pub id: i64,
    #[serde(rename = "codigoBarras")]
    pub barcode: String,
    #[serde(rename = "nombreProducto")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "idCategoria")]
    pub category_id: Option<i64>,
    #[serde(rename = "nombreCategoria")]
    pub category_name: Option<String>,
    #[serde(rename = "idProveedor")]
    pub supplier_id: Option<i64>,
    #[serde(rename = "nombreProveedor")]
    pub supplier_name: Option<String>,
    #[serde(rename = "precioCompra")]
    pub purchase_price: Money,
    #[serde(rename = "precioVenta")]
    pub sale_price: Money,
    pub stock: i64,
    #[serde(rename = "stockMinimo")]
    pub min_stock: i64,
    #[serde(rename = "unidadMedida")]
    pub unit: String,
    #[serde(rename = "activo")]
    pub is_active: bool,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fechaActualizacion")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when stock is at or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

/// The full set of writable product fields.
///
/// Used for both create and update: an update replaces every field, so
/// omitted optional fields are cleared rather than left untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductInput {
    #[serde(rename = "codigoBarras")]
    pub barcode: String,
    #[serde(rename = "nombreProducto")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "idCategoria", default)]
    pub category_id: Option<i64>,
    #[serde(rename = "idProveedor", default)]
    pub supplier_id: Option<i64>,
    #[serde(rename = "precioCompra", default)]
    pub purchase_price: Money,
    #[serde(rename = "precioVenta")]
    pub sale_price: Money,
    pub stock: i64,
    #[serde(rename = "stockMinimo", default)]
    pub min_stock: i64,
    #[serde(rename = "unidadMedida", default = "default_unit")]
    pub unit: String,
}

/// Catalog listing filters. Both are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    pub search: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A store customer.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    #[serde(rename = "idCliente")]
    pub id: i64,
    #[serde(rename = "nombreCliente")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    #[serde(rename = "rfc")]
    pub tax_id: Option<String>,
    #[serde(rename = "puntos")]
    pub loyalty_points: i64,
    #[serde(rename = "activo")]
    pub is_active: bool,
}

/// Fields accepted when registering a customer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewCustomer {
    #[serde(rename = "nombreCliente")]
    pub name: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "rfc", default)]
    pub tax_id: Option<String>,
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Tarjeta,
    Transferencia,
}

// =============================================================================
// Sales
// =============================================================================

/// A recorded sale joined with seller and customer names.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sale {
    #[serde(rename = "idVenta")]
    pub id: i64,
    pub folio: String,
    #[serde(rename = "idUsuario")]
    pub user_id: i64,
    #[serde(rename = "nombreUsuario")]
    pub user_name: Option<String>,
    #[serde(rename = "idCliente")]
    pub customer_id: Option<i64>,
    #[serde(rename = "nombreCliente")]
    pub customer_name: Option<String>,
    pub subtotal: Money,
    #[serde(rename = "descuento")]
    pub discount: Money,
    #[serde(rename = "impuesto")]
    pub tax: Money,
    pub total: Money,
    #[serde(rename = "metodoPago")]
    pub payment_method: PaymentMethod,
    /// Business-local calendar date of the sale.
    #[serde(rename = "fecha")]
    pub sale_date: NaiveDate,
    #[serde(rename = "fechaVenta")]
    pub created_at: DateTime<Utc>,
}

/// One line of a recorded sale with its product name.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleLine {
    #[serde(rename = "idDetalle")]
    pub id: i64,
    #[serde(rename = "idVenta")]
    pub sale_id: i64,
    #[serde(rename = "idProducto")]
    pub product_id: i64,
    #[serde(rename = "nombreProducto")]
    pub product_name: String,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Money,
    pub subtotal: Money,
}

/// What the client gets back after a sale commits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleReceipt {
    #[serde(rename = "idVenta")]
    pub sale_id: i64,
    pub folio: String,
    pub total: Money,
}

/// How a sale treats lines that ask for more than is on the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Roll the whole sale back with `InsufficientStock`.
    #[default]
    Reject,
    /// Sell anyway; stock may go negative (backorder).
    AllowNegative,
}

// =============================================================================
// Inventory Movements
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Stock leaving through a sale line.
    Venta,
    /// Stock set explicitly through a product update.
    Ajuste,
}

/// Audit row for every stock change.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryMovement {
    #[serde(rename = "idMovimiento")]
    pub id: i64,
    #[serde(rename = "idProducto")]
    pub product_id: i64,
    #[serde(rename = "tipoMovimiento")]
    pub movement_type: MovementType,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "stockAnterior")]
    pub stock_before: i64,
    #[serde(rename = "stockNuevo")]
    pub stock_after: i64,
    #[serde(rename = "idUsuario")]
    pub user_id: i64,
    #[serde(rename = "referencia")]
    pub reference: Option<String>,
    #[serde(rename = "fechaMovimiento")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Dashboard Statistics
// =============================================================================

/// Sale count and revenue over a period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodTotals {
    #[serde(rename = "total")]
    pub count: i64,
    #[serde(rename = "monto")]
    pub amount: Money,
}

/// A best-seller entry.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    #[serde(rename = "nombreProducto")]
    pub name: String,
    #[serde(rename = "totalVendido")]
    pub total_sold: i64,
}

/// Dashboard aggregates, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesStatistics {
    #[serde(rename = "hoy")]
    pub today: PeriodTotals,
    #[serde(rename = "mes")]
    pub month: PeriodTotals,
    #[serde(rename = "topProductos")]
    pub top_products: Vec<TopProduct>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        for role in [Role::Admin, Role::Cajero] {
            assert_eq!(Role::from_name(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_name("gerente"), None);
    }

    #[test]
    fn test_product_input_defaults() {
        let input: ProductInput = serde_json::from_value(serde_json::json!({
            "codigoBarras": "7501055300075",
            "nombreProducto": "Coca-Cola 600ml",
            "precioVenta": 18.5,
            "stock": 24
        }))
        .unwrap();

        assert_eq!(input.sale_price.cents(), 1850);
        assert_eq!(input.purchase_price, Money::zero());
        assert_eq!(input.min_stock, 0);
        assert_eq!(input.unit, "pieza");
        assert_eq!(input.category_id, None);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let method: PaymentMethod = serde_json::from_str("\"transferencia\"").unwrap();
        assert_eq!(method, PaymentMethod::Transferencia);
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Efectivo).unwrap(),
            "\"efectivo\""
        );
        assert!(serde_json::from_str::<PaymentMethod>("\"bitcoin\"").is_err());
    }

    #[test]
    fn test_statistics_wire_shape() {
        let stats = SalesStatistics {
            today: PeriodTotals {
                count: 2,
                amount: Money::from_cents(5000),
            },
            month: PeriodTotals::default(),
            top_products: vec![TopProduct {
                name: "Leche 1L".to_string(),
                total_sold: 7,
            }],
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hoy"]["total"], 2);
        assert_eq!(json["hoy"]["monto"], 50.0);
        assert_eq!(json["mes"]["total"], 0);
        assert_eq!(json["topProductos"][0]["nombreProducto"], "Leche 1L");
        assert_eq!(json["topProductos"][0]["totalVendido"], 7);
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        let now = Utc::now();
        let mut product = Product {
            id: 1,
            barcode: "123".into(),
            name: "Arroz 1kg".into(),
            description: None,
            category_id: None,
            category_name: None,
            supplier_id: None,
            supplier_name: None,
            purchase_price: Money::zero(),
            sale_price: Money::from_cents(3200),
            stock: 5,
            min_stock: 5,
            unit: DEFAULT_UNIT.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(product.is_low_stock());
        product.stock = 6;
        assert!(!product.is_low_stock());
    }
}
