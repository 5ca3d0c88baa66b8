//! # caja-core: Pure Business Logic for the Caja Engine
//!
//! This crate is the heart of the Caja point-of-sale engine. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! host (HTTP layer, out of scope)
//!        │
//!        ▼
//! caja-engine ── sale coordinator, shift lifecycle, event notifier
//!        │
//!        ▼
//! caja-core (THIS CRATE) ── types, money, pricing, reconciliation, validation
//!        │
//!        ▼
//! caja-db ── SQLite queries, migrations, repositories
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockEntry, Sale, Shift, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain and validation error types
//! - [`validation`] - Input validation
//! - [`pricing`] - Unit-price resolution for sale lines
//! - [`reconcile`] - Shift cash-reconciliation arithmetic
//! - [`events`] - Domain events handed to the notification sink
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output - always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod money;
pub mod pricing;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use events::DomainEvent;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines allowed in a single sale.
///
/// Prevents runaway requests and keeps transactions reasonably sized.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
