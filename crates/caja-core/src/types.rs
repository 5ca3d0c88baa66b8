//! # Domain Types
//!
//! Core domain types used throughout the Caja engine.
//!
//! ## Type Map
//! ```text
//! Catalog side (read-only to the engine)     Transaction side
//! ─────────────────────────────────────      ─────────────────────────────
//! Location   id, active flag                 Sale        one committed ticket
//! Product    id, sku, catalog price          SaleLine    price snapshot
//!                                            Shift       cash-drawer session
//! Ledger side (mutated in-transaction)
//! ─────────────────────────────────────
//! StockEntry (product, location) quantity
//! Customer   store-credit balance
//! ```
//!
//! ## Snapshot Pattern
//! `SaleLine` freezes the product name and unit price at sale time. A later
//! catalog price change never rewrites history: totals are derived from the
//! snapshot, not the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash into the drawer.
    Cash,
    /// Fully settled from the customer's store-credit balance.
    Credit,
    /// Partly credit, remainder cash.
    Mixed,
}

impl PaymentMethod {
    /// Whether this method puts any cash into the drawer.
    #[inline]
    pub const fn touches_drawer(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::Mixed)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// There is no persisted draft/pending state: the coordinator creates sales
/// already committed, or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale committed in full.
    Completed,
    /// Sale cancelled after the fact (kept for history, excluded from
    /// reconciliation).
    Cancelled,
}

// =============================================================================
// Shift Status
// =============================================================================

/// The status of a cash-drawer shift. No suspended state exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Open,
    Closed,
}

// =============================================================================
// Stock Adjustment Mode
// =============================================================================

/// How a manual stock correction is applied.
///
/// SUBTRACT floors at zero instead of erroring; the strict non-negativity
/// failure path belongs to the sale decrement only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustMode {
    /// Add to the current quantity.
    Add,
    /// Subtract from the current quantity, floored at 0.
    Subtract,
    /// Replace the quantity outright, floored at 0.
    Set,
}

// =============================================================================
// Caller Role
// =============================================================================

/// Role of the caller submitting an engine operation.
///
/// Administrators may sell without a personal shift and may override line
/// prices; sellers may do neither. This is an input attribute resolved by the
/// host's auth layer, never persisted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    Seller,
    Admin,
}

// =============================================================================
// Location
// =============================================================================

/// A selling location (store / branch).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Location {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Whether the location is operating (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product. Owned by the catalog; the sale engine reads it and
/// never mutates it (the one exception, a price change, is an explicit
/// catalog operation that raises `PriceChanged`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown to the cashier and on tickets.
    pub name: String,

    /// Catalog price in cents.
    pub price_cents: i64,

    /// Whether the product can be sold (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the catalog price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Stock Entry
// =============================================================================

/// Available quantity of one product at one location.
///
/// Invariant: `quantity >= 0`, enforced at write time by the inventory
/// ledger's guarded updates - never by read-then-write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockEntry {
    pub product_id: String,
    pub location_id: String,

    /// On-hand quantity, never negative.
    pub quantity: i64,

    /// Reorder threshold: at or below this, the entry is low.
    pub minimum_threshold: i64,

    pub updated_at: DateTime<Utc>,
}

impl StockEntry {
    /// Whether this entry is at or below its reorder threshold.
    #[inline]
    pub fn is_low(&self) -> bool {
        self.quantity <= self.minimum_threshold
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with a store-credit account.
///
/// Invariant: `credit_balance_cents >= 0`. The balance is mutated only by
/// credit-account operations inside a sale transaction (debit) or a top-up
/// (credit) - never by direct assignment from request input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,

    /// Available store credit in cents, never negative.
    pub credit_balance_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the credit balance as Money.
    #[inline]
    pub fn credit_balance(&self) -> Money {
        Money::from_cents(self.credit_balance_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable once created: there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub location_id: String,
    pub seller_id: String,

    /// Customer on the ticket; required for CREDIT/MIXED, optional for CASH.
    pub customer_id: Option<String>,

    /// Shift the sale belongs to; NULL for admin-direct sales.
    pub shift_id: Option<String>,

    pub status: SaleStatus,
    pub payment_method: PaymentMethod,

    /// Portion settled from store credit, in cents (0 for CASH).
    pub credit_applied_cents: i64,

    /// Cash handed over by the customer, if recorded. Change-making is the
    /// caller's concern; the engine stores the figure as supplied.
    pub cash_tendered_cents: Option<i64>,

    /// Derived: sum of line subtotals, in cents.
    pub total_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the credit portion as Money.
    #[inline]
    pub fn credit_applied(&self) -> Money {
        Money::from_cents(self.credit_applied_cents)
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,

    /// Product name at sale time (frozen).
    pub name_snapshot: String,

    /// Quantity sold, always > 0.
    pub quantity: i64,

    /// Unit price in cents at sale time (frozen, never re-derived).
    pub unit_price_cents: i64,

    /// quantity × unit_price, in cents.
    pub subtotal_cents: i64,

    /// Position of the line within the sale (input order).
    pub line_no: i64,

    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Shift
// =============================================================================

/// A cash-drawer shift: one seller, one location, bracketed by an opening
/// float and a closing count.
///
/// Invariant: at most one OPEN shift per seller at any time. Lifecycle:
/// created OPEN, mutated exactly once by close (OPEN → CLOSED), immutable
/// thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shift {
    pub id: String,
    pub seller_id: String,
    pub location_id: String,
    pub status: ShiftStatus,

    /// Cash placed in the drawer at open, in cents.
    pub opening_float_cents: i64,

    /// Counted cash at close, in cents. NULL while open.
    pub closing_cash_cents: Option<i64>,

    /// opening float + cash collected, computed at close. NULL while open.
    pub expected_cash_cents: Option<i64>,

    /// closing − expected, signed (positive = overage). NULL while open.
    pub variance_cents: Option<i64>,

    /// Free-form note supplied at close.
    pub notes: Option<String>,

    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Shift {
    /// Returns the opening float as Money.
    #[inline]
    pub fn opening_float(&self) -> Money {
        Money::from_cents(self.opening_float_cents)
    }

    /// Whether the shift is still open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_touches_drawer() {
        assert!(PaymentMethod::Cash.touches_drawer());
        assert!(PaymentMethod::Mixed.touches_drawer());
        assert!(!PaymentMethod::Credit.touches_drawer());
    }

    #[test]
    fn test_stock_entry_is_low() {
        let mut entry = StockEntry {
            product_id: "p".to_string(),
            location_id: "l".to_string(),
            quantity: 5,
            minimum_threshold: 3,
            updated_at: Utc::now(),
        };
        assert!(!entry.is_low());

        entry.quantity = 3;
        assert!(entry.is_low());

        entry.quantity = 0;
        assert!(entry.is_low());
    }

    #[test]
    fn test_money_accessors() {
        let product = Product {
            id: "p".to_string(),
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            price_cents: 1250,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(product.price().cents(), 1250);
    }

    #[test]
    fn test_payment_method_serde_naming() {
        // The sink and the DB both see lowercase snake_case names.
        let json = serde_json::to_string(&PaymentMethod::Mixed).unwrap();
        assert_eq!(json, "\"mixed\"");
    }
}
