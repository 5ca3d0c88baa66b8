//! # Sale Repository
//!
//! Database operations for sales and sale lines.
//!
//! Sales are written exactly once, inside the coordinator's transaction, and
//! never updated afterwards. There is no draft state and no update statement
//! in this file.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use caja_core::{Sale, SaleLine};

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

    /// Inserts a sale header on the caller's transaction.
    pub async fn insert_sale_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total_cents = %sale.total_cents, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, location_id, seller_id, customer_id, shift_id,
                status, payment_method, credit_applied_cents, cash_tendered_cents,
                total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.location_id)
        .bind(&sale.seller_id)
        .bind(&sale.customer_id)
        .bind(&sale.shift_id)
        .bind(sale.status)
        .bind(sale.payment_method)
        .bind(sale.credit_applied_cents)
        .bind(sale.cash_tendered_cents)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts one sale line on the caller's transaction.
    ///
    /// The name and unit price were snapshotted by the coordinator; history
    /// survives later catalog changes.
    pub async fn insert_line_tx(conn: &mut SqliteConnection, line: &SaleLine) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                id, sale_id, product_id, name_snapshot,
                quantity, unit_price_cents, subtotal_cents, line_no, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.product_id)
        .bind(&line.name_snapshot)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.subtotal_cents)
        .bind(line.line_no)
        .bind(line.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a sale by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, location_id, seller_id, customer_id, shift_id,
                status, payment_method, credit_applied_cents, cash_tendered_cents,
                total_cents, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all lines of a sale in input order.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT
                id, sale_id, product_id, name_snapshot,
                quantity, unit_price_cents, subtotal_cents, line_no, created_at
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists sales linked to a shift.
    pub async fn list_by_shift(&self, shift_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, location_id, seller_id, customer_id, shift_id,
                status, payment_method, credit_applied_cents, cash_tendered_cents,
                total_cents, created_at
            FROM sales
            WHERE shift_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Cash collected by a shift, on the caller's transaction.
    ///
    /// The drawer keeps `total - credit_applied` of every COMPLETED CASH or
    /// MIXED sale; CREDIT and cancelled sales contribute nothing. Runs inside
    /// the close transaction so a sale committing concurrently with the close
    /// cannot fall between the sum and the status flip.
    pub async fn cash_collected_tx(conn: &mut SqliteConnection, shift_id: &str) -> DbResult<i64> {
        let collected: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cents - credit_applied_cents), 0)
            FROM sales
            WHERE shift_id = ?1
              AND status = 'completed'
              AND payment_method IN ('cash', 'mixed')
            "#,
        )
        .bind(shift_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(collected)
    }
}
