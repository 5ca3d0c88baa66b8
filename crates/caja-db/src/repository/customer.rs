//! # Customer Repository
//!
//! Store-credit accounts. The debit is a guarded write-time statement, same
//! shape as the stock decrement: `WHERE credit_balance_cents >= amount`.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use caja_core::Customer;

/// Repository for customer credit-account operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, credit_balance_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.credit_balance_cents)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, credit_balance_cents, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Reads a credit balance (None if the customer does not exist).
    pub async fn balance(&self, id: &str) -> DbResult<Option<i64>> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT credit_balance_cents FROM customers WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(balance)
    }

    /// Reads a credit balance on the caller's transaction.
    pub async fn balance_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<i64>> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT credit_balance_cents FROM customers WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(balance)
    }

    /// Guarded debit on the caller's transaction.
    ///
    /// Returns `true` when the debit applied, `false` when the balance could
    /// not cover it (or the customer row does not exist). The non-negativity
    /// check lives inside the UPDATE; a concurrent debit racing on the same
    /// account loses here, not in some earlier read.
    pub async fn debit_tx(
        conn: &mut SqliteConnection,
        id: &str,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        debug!(customer_id = %id, amount_cents = %amount_cents, "Debiting credit");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                credit_balance_cents = credit_balance_cents - ?2,
                updated_at = ?3
            WHERE id = ?1 AND credit_balance_cents >= ?2
            "#,
        )
        .bind(id)
        .bind(amount_cents)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Credits (tops up) an account.
    pub async fn credit(
        &self,
        id: &str,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> DbResult<Customer> {
        debug!(customer_id = %id, amount_cents = %amount_cents, "Crediting account");

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                credit_balance_cents = credit_balance_cents + ?2,
                updated_at = ?3
            WHERE id = ?1
            RETURNING id, name, credit_balance_cents, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(amount_cents)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        customer.ok_or_else(|| DbError::not_found("Customer", id))
    }
}
