//! # Stock Repository
//!
//! The inventory ledger: per (product, location) quantity and reorder
//! threshold.
//!
//! ## Write-Time Non-Negativity
//! The sale-path decrement is a single guarded statement:
//!
//! ```sql
//! UPDATE stock_entries SET quantity = quantity - ?
//! WHERE ... AND quantity >= ?
//! ```
//!
//! The invariant check happens inside the UPDATE itself, so two transactions
//! racing on the same row cannot jointly oversell: the second one simply
//! matches zero rows. There is no read-then-write window anywhere in the
//! decrement path.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caja_core::{AdjustMode, StockEntry};

/// Repository for inventory ledger operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Inserts or replaces a stock entry (provisioning / seed).
    pub async fn upsert(&self, entry: &StockEntry) -> DbResult<()> {
        debug!(
            product_id = %entry.product_id,
            location_id = %entry.location_id,
            quantity = %entry.quantity,
            "Upserting stock entry"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_entries (product_id, location_id, quantity, minimum_threshold, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (product_id, location_id) DO UPDATE SET
                quantity = excluded.quantity,
                minimum_threshold = excluded.minimum_threshold,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&entry.product_id)
        .bind(&entry.location_id)
        .bind(entry.quantity)
        .bind(entry.minimum_threshold)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets one stock entry.
    pub async fn get(&self, location_id: &str, product_id: &str) -> DbResult<Option<StockEntry>> {
        let entry = sqlx::query_as::<_, StockEntry>(
            r#"
            SELECT product_id, location_id, quantity, minimum_threshold, updated_at
            FROM stock_entries
            WHERE location_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(location_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Available quantity per product at a location.
    ///
    /// Products with no ledger row report 0: a row that was never provisioned
    /// is indistinguishable, to the cashier, from an empty one.
    pub async fn availability(
        &self,
        location_id: &str,
        product_ids: &[String],
    ) -> DbResult<HashMap<String, i64>> {
        let mut available = HashMap::with_capacity(product_ids.len());

        for product_id in product_ids {
            let quantity: Option<i64> = sqlx::query_scalar(
                r#"
                SELECT quantity FROM stock_entries
                WHERE location_id = ?1 AND product_id = ?2
                "#,
            )
            .bind(location_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

            available.insert(product_id.clone(), quantity.unwrap_or(0));
        }

        Ok(available)
    }

    /// Reads one quantity on the caller's transaction (0 if no row).
    pub async fn quantity_tx(
        conn: &mut SqliteConnection,
        location_id: &str,
        product_id: &str,
    ) -> DbResult<i64> {
        let quantity: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT quantity FROM stock_entries
            WHERE location_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(location_id)
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Strict sale-path decrement on the caller's transaction.
    ///
    /// Returns `Some((new_quantity, minimum_threshold))` when the guarded
    /// UPDATE applied, `None` when it matched no row - either the entry does
    /// not exist or the decrement would have driven quantity negative. The
    /// caller decides how to report that; this function never distinguishes
    /// the two.
    pub async fn decrement_tx(
        conn: &mut SqliteConnection,
        location_id: &str,
        product_id: &str,
        qty: i64,
        now: DateTime<Utc>,
    ) -> DbResult<Option<(i64, i64)>> {
        debug!(
            location_id = %location_id,
            product_id = %product_id,
            qty = %qty,
            "Decrementing stock"
        );

        let row = sqlx::query_as::<_, (i64, i64)>(
            r#"
            UPDATE stock_entries SET
                quantity = quantity - ?3,
                updated_at = ?4
            WHERE location_id = ?1 AND product_id = ?2 AND quantity >= ?3
            RETURNING quantity, minimum_threshold
            "#,
        )
        .bind(location_id)
        .bind(product_id)
        .bind(qty)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Manual stock correction (ADD / SUBTRACT / SET).
    ///
    /// SUBTRACT and SET floor at zero instead of erroring - corrections are
    /// lenient where the sale path is strict.
    pub async fn adjust(
        &self,
        location_id: &str,
        product_id: &str,
        qty: i64,
        mode: AdjustMode,
        now: DateTime<Utc>,
    ) -> DbResult<StockEntry> {
        debug!(
            location_id = %location_id,
            product_id = %product_id,
            qty = %qty,
            mode = ?mode,
            "Adjusting stock"
        );

        let sql = match mode {
            AdjustMode::Add => {
                r#"
                UPDATE stock_entries SET
                    quantity = quantity + ?3,
                    updated_at = ?4
                WHERE location_id = ?1 AND product_id = ?2
                RETURNING product_id, location_id, quantity, minimum_threshold, updated_at
                "#
            }
            AdjustMode::Subtract => {
                r#"
                UPDATE stock_entries SET
                    quantity = MAX(quantity - ?3, 0),
                    updated_at = ?4
                WHERE location_id = ?1 AND product_id = ?2
                RETURNING product_id, location_id, quantity, minimum_threshold, updated_at
                "#
            }
            AdjustMode::Set => {
                r#"
                UPDATE stock_entries SET
                    quantity = MAX(?3, 0),
                    updated_at = ?4
                WHERE location_id = ?1 AND product_id = ?2
                RETURNING product_id, location_id, quantity, minimum_threshold, updated_at
                "#
            }
        };

        let entry = sqlx::query_as::<_, StockEntry>(sql)
            .bind(location_id)
            .bind(product_id)
            .bind(qty)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        entry.ok_or_else(|| {
            DbError::not_found("StockEntry", format!("{product_id}@{location_id}"))
        })
    }
}
