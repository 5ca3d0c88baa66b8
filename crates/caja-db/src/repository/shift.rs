//! # Shift Repository
//!
//! Cash-drawer shift rows.
//!
//! ## Open-Shift Uniqueness
//! Two mechanisms, both required:
//! 1. The shift manager looks up the seller's open shift inside its insert
//!    transaction.
//! 2. The schema's partial unique index on (seller_id) WHERE status = 'open'
//!    makes the loser of a true race fail at insert with a unique violation.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use caja_core::Shift;

const SHIFT_COLUMNS: &str = r#"
    id, seller_id, location_id, status,
    opening_float_cents, closing_cash_cents, expected_cash_cents, variance_cents,
    notes, opened_at, closed_at
"#;

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Inserts a new shift on the caller's transaction.
    ///
    /// A unique violation here means the seller raced another open; the
    /// caller maps it to its business error.
    pub async fn insert_tx(conn: &mut SqliteConnection, shift: &Shift) -> DbResult<()> {
        debug!(id = %shift.id, seller_id = %shift.seller_id, "Inserting shift");

        sqlx::query(
            r#"
            INSERT INTO shifts (
                id, seller_id, location_id, status,
                opening_float_cents, closing_cash_cents, expected_cash_cents, variance_cents,
                notes, opened_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.seller_id)
        .bind(&shift.location_id)
        .bind(shift.status)
        .bind(shift.opening_float_cents)
        .bind(shift.closing_cash_cents)
        .bind(shift.expected_cash_cents)
        .bind(shift.variance_cents)
        .bind(&shift.notes)
        .bind(shift.opened_at)
        .bind(shift.closed_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a shift by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1");

        let shift = sqlx::query_as::<_, Shift>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(shift)
    }

    /// Gets a shift by id on the caller's transaction.
    pub async fn get_by_id_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Shift>> {
        let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1");

        let shift = sqlx::query_as::<_, Shift>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(shift)
    }

    /// Finds a seller's open shift, if any.
    pub async fn find_open_for_seller(&self, seller_id: &str) -> DbResult<Option<Shift>> {
        let sql =
            format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE seller_id = ?1 AND status = 'open'");

        let shift = sqlx::query_as::<_, Shift>(&sql)
            .bind(seller_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(shift)
    }

    /// Finds a seller's open shift on the caller's transaction.
    pub async fn find_open_for_seller_tx(
        conn: &mut SqliteConnection,
        seller_id: &str,
    ) -> DbResult<Option<Shift>> {
        let sql =
            format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE seller_id = ?1 AND status = 'open'");

        let shift = sqlx::query_as::<_, Shift>(&sql)
            .bind(seller_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(shift)
    }

    /// Closes a shift on the caller's transaction.
    ///
    /// Guarded by `status = 'open'`: of two racing closes, exactly one
    /// updates a row. Returns the number of rows affected (0 or 1); the
    /// caller turns 0 into its already-closed error. After this the row is
    /// immutable - no statement in the codebase touches a closed shift.
    #[allow(clippy::too_many_arguments)]
    pub async fn close_tx(
        conn: &mut SqliteConnection,
        shift_id: &str,
        closing_cash_cents: i64,
        expected_cash_cents: i64,
        variance_cents: i64,
        notes: Option<&str>,
        closed_at: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %shift_id, closing_cash_cents = %closing_cash_cents, "Closing shift");

        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                status = 'closed',
                closing_cash_cents = ?2,
                expected_cash_cents = ?3,
                variance_cents = ?4,
                notes = ?5,
                closed_at = ?6
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(shift_id)
        .bind(closing_cash_cents)
        .bind(expected_cash_cents)
        .bind(variance_cents)
        .bind(notes)
        .bind(closed_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}
