//! # Shift Lifecycle Manager
//!
//! Open/close state of the cash drawer, per (seller, location).
//!
//! ## Lifecycle
//! ```text
//! open_shift ──► OPEN ──(sales accumulate)──► close_shift ──► CLOSED
//! ```
//!
//! Invariants:
//! - at most one OPEN shift per seller (in-transaction lookup + partial
//!   unique index; a true race loses at insert)
//! - a shift closes exactly once (guarded `WHERE status = 'open'` update)
//! - expected cash and variance are computed from COMPLETED CASH/MIXED sales
//!   inside the close transaction, exact to the cent

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use caja_core::{reconcile, validation, CoreError, Money, Shift, ShiftStatus};
use caja_db::{Database, DbError, SaleRepository, ShiftRepository};

use crate::error::EngineResult;

// =============================================================================
// Request Types
// =============================================================================

/// Input for [`ShiftManager::open_shift`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftRequest {
    pub seller_id: String,
    pub location_id: String,

    /// Cash placed in the drawer at open, in cents.
    pub opening_float_cents: i64,
}

/// Input for [`ShiftManager::close_shift`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseShiftRequest {
    pub shift_id: String,

    /// Counted cash in the drawer, in cents.
    pub closing_cash_cents: i64,

    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Shift Manager
// =============================================================================

/// Manages the shift lifecycle.
#[derive(Debug, Clone)]
pub struct ShiftManager {
    db: Database,
}

impl ShiftManager {
    /// Creates a new ShiftManager.
    pub fn new(db: Database) -> Self {
        ShiftManager { db }
    }

    /// Opens a shift for a seller at a location.
    ///
    /// Check-then-insert runs inside one transaction; if another open slips
    /// between the check and the insert anyway, the partial unique index
    /// rejects it and the violation is reported as `ShiftAlreadyOpen`.
    pub async fn open_shift(&self, request: OpenShiftRequest) -> EngineResult<Shift> {
        debug!(
            seller_id = %request.seller_id,
            location_id = %request.location_id,
            "open_shift"
        );

        validation::validate_non_negative_cents(
            "opening_float_cents",
            request.opening_float_cents,
        )?;

        if self
            .db
            .locations()
            .get_active(&request.location_id)
            .await?
            .is_none()
        {
            return Err(CoreError::LocationInactive(request.location_id.clone()).into());
        }

        let mut tx = self.db.begin().await?;

        if let Some(existing) =
            ShiftRepository::find_open_for_seller_tx(&mut tx, &request.seller_id).await?
        {
            return Err(CoreError::ShiftAlreadyOpen {
                seller_id: request.seller_id.clone(),
                shift_id: existing.id,
            }
            .into());
        }

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            seller_id: request.seller_id.clone(),
            location_id: request.location_id.clone(),
            status: ShiftStatus::Open,
            opening_float_cents: request.opening_float_cents,
            closing_cash_cents: None,
            expected_cash_cents: None,
            variance_cents: None,
            notes: None,
            opened_at: Utc::now(),
            closed_at: None,
        };

        match ShiftRepository::insert_tx(&mut tx, &shift).await {
            Ok(()) => {}
            Err(err) if err.is_unique_violation() => {
                let winner = ShiftRepository::find_open_for_seller_tx(&mut tx, &request.seller_id)
                    .await
                    .ok()
                    .flatten();
                return Err(CoreError::ShiftAlreadyOpen {
                    seller_id: request.seller_id.clone(),
                    shift_id: winner.map(|s| s.id).unwrap_or_else(|| "unknown".to_string()),
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            shift_id = %shift.id,
            seller_id = %shift.seller_id,
            opening_float_cents = %shift.opening_float_cents,
            "Shift opened"
        );

        Ok(shift)
    }

    /// Closes a shift and reconciles the drawer.
    ///
    /// The cash aggregation and the status flip happen in one transaction, so
    /// a sale committing concurrently cannot fall between the sum and the
    /// close. The guarded update makes a double close lose deterministically.
    pub async fn close_shift(&self, request: CloseShiftRequest) -> EngineResult<Shift> {
        debug!(shift_id = %request.shift_id, "close_shift");

        validation::validate_non_negative_cents("closing_cash_cents", request.closing_cash_cents)?;

        let mut tx = self.db.begin().await?;

        let shift = ShiftRepository::get_by_id_tx(&mut tx, &request.shift_id)
            .await?
            .ok_or_else(|| CoreError::ShiftNotFound(request.shift_id.clone()))?;

        if shift.status == ShiftStatus::Closed {
            return Err(CoreError::ShiftAlreadyClosed(shift.id).into());
        }

        let cash_collected = SaleRepository::cash_collected_tx(&mut tx, &shift.id).await?;
        let outcome = reconcile::reconcile(
            shift.opening_float(),
            Money::from_cents(cash_collected),
            Money::from_cents(request.closing_cash_cents),
        );

        let closed_at = Utc::now();
        let rows = ShiftRepository::close_tx(
            &mut tx,
            &shift.id,
            request.closing_cash_cents,
            outcome.expected_cash.cents(),
            outcome.variance.cents(),
            request.notes.as_deref(),
            closed_at,
        )
        .await?;

        if rows == 0 {
            return Err(CoreError::ShiftAlreadyClosed(shift.id).into());
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            shift_id = %shift.id,
            expected_cash_cents = %outcome.expected_cash.cents(),
            variance_cents = %outcome.variance.cents(),
            "Shift closed"
        );

        self.db
            .shifts()
            .get_by_id(&shift.id)
            .await?
            .ok_or_else(|| DbError::not_found("Shift", shift.id.as_str()).into())
    }

    /// The seller's open shift, if any.
    pub async fn active_shift(&self, seller_id: &str) -> EngineResult<Option<Shift>> {
        Ok(self.db.shifts().find_open_for_seller(seller_id).await?)
    }

    /// Gets a shift by id.
    pub async fn get_shift(&self, shift_id: &str) -> EngineResult<Option<Shift>> {
        Ok(self.db.shifts().get_by_id(shift_id).await?)
    }
}
