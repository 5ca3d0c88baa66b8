//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! caja-core errors (this file)
//! ├── CoreError        - Business-rule violations (insufficient stock, ...)
//! └── ValidationError  - Input validation failures (rejected before any I/O)
//!
//! caja-db errors (separate crate)
//! └── DbError          - Infrastructure failures
//!
//! caja-engine errors
//! └── EngineError      - Unified surface with machine-checkable kinds
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual Display impls
//! 2. Errors carry remediation detail (product name, available vs requested)
//! 3. Errors are enum variants, never bare strings
//! 4. A failed invariant check always aborts the enclosing transaction;
//!    nothing catches one of these and continues

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business-rule errors.
///
/// Concurrent-writer conflicts surface through these same variants: a lost
/// race on a guarded stock or credit update is reported exactly like a plain
/// shortage, and the caller retries the whole operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id missing from the catalog, or inactive.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough stock at this location to cover the requested quantity.
    ///
    /// Carries the product name and both quantities so the caller can render
    /// a corrective message without a second lookup.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Customer's store-credit balance cannot cover the requested debit.
    #[error(
        "Insufficient credit for customer {customer_id}: balance {balance_cents}, requested {requested_cents}"
    )]
    InsufficientCredit {
        customer_id: String,
        balance_cents: i64,
        requested_cents: i64,
    },

    /// Customer id is unknown.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A seller tried to sell without an open shift at the location.
    #[error("No open shift for seller {seller_id} at location {location_id}")]
    NoOpenShift {
        seller_id: String,
        location_id: String,
    },

    /// The seller already has an open shift.
    #[error("Seller {seller_id} already has open shift {shift_id}")]
    ShiftAlreadyOpen {
        seller_id: String,
        shift_id: String,
    },

    /// Shift id is unknown.
    #[error("Shift not found: {0}")]
    ShiftNotFound(String),

    /// Close was requested on a shift that is already closed.
    #[error("Shift already closed: {0}")]
    ShiftAlreadyClosed(String),

    /// Location id is unknown or the location is not operating.
    #[error("Location inactive or unknown: {0}")]
    LocationInactive(String),

    /// Payment-method rule violation (wrong credit amount, missing customer,
    /// nonzero credit on a cash sale, ...).
    #[error("Invalid payment: {reason}")]
    InvalidPayment { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any I/O happens; correcting the input always
/// resolves them.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A collection that must not be empty is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The caller's role does not permit this field.
    #[error("{field} not permitted: {reason}")]
    NotPermitted { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
