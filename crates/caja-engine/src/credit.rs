//! # Credit Service
//!
//! Reads and top-ups for customer store-credit accounts. The debit side
//! lives inside the sale coordinator's transaction; it is not reachable
//! from here.

use chrono::Utc;
use tracing::info;

use caja_core::{CoreError, Customer, Money, ValidationError};
use caja_db::Database;

use crate::error::EngineResult;

/// Customer credit-account operations.
#[derive(Debug, Clone)]
pub struct CreditService {
    db: Database,
}

impl CreditService {
    /// Creates a new CreditService.
    pub fn new(db: Database) -> Self {
        CreditService { db }
    }

    /// The customer's available credit.
    pub async fn balance(&self, customer_id: &str) -> EngineResult<Money> {
        let balance = self
            .db
            .customers()
            .balance(customer_id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

        Ok(Money::from_cents(balance))
    }

    /// Adds credit to a customer's account.
    pub async fn top_up(&self, customer_id: &str, amount_cents: i64) -> EngineResult<Customer> {
        if amount_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "amount_cents".to_string(),
            }
            .into());
        }

        let customer = self
            .db
            .customers()
            .credit(customer_id, amount_cents, Utc::now())
            .await
            .map_err(|err| match err {
                caja_db::DbError::NotFound { .. } => {
                    CoreError::CustomerNotFound(customer_id.to_string()).into()
                }
                err => crate::error::EngineError::Storage(err),
            })?;

        info!(
            customer_id = %customer.id,
            amount_cents = %amount_cents,
            balance_cents = %customer.credit_balance_cents,
            "Credit topped up"
        );

        Ok(customer)
    }
}
