//! # caja-db: Database Layer for Caja
//!
//! SQLite persistence for the Caja engine, built on sqlx.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, stock, ...)
//!
//! ## Transaction Convention
//!
//! Repository methods come in two flavors:
//!
//! - `&self` methods run standalone reads/writes on the pool.
//! - `*_tx` associated functions take `&mut SqliteConnection` and run on the
//!   caller's transaction. The engine opens ONE transaction per sale or shift
//!   operation and threads it through every stock, credit, and sale write, so
//!   all of them commit or roll back together.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caja_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("caja.db")).await?;
//! let mut tx = db.begin().await?;
//! caja_db::StockRepository::decrement_tx(&mut tx, "loc", "prod", 2).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::location::LocationRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::shift::ShiftRepository;
pub use repository::stock::StockRepository;
