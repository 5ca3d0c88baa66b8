//! # Inventory Service
//!
//! Read-side availability queries and manual stock corrections. The strict
//! sale-path decrement lives in the coordinator's transaction; corrections
//! here are standalone, lenient operations.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use caja_core::{AdjustMode, DomainEvent, StockEntry, ValidationError};
use caja_db::Database;

use crate::error::EngineResult;
use crate::notifier::Notifier;

// =============================================================================
// Request Types
// =============================================================================

/// Input for [`InventoryService::adjust`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub location_id: String,
    pub product_id: String,

    /// Units to add/subtract, or the new absolute quantity for SET.
    pub quantity: i64,

    pub mode: AdjustMode,
}

// =============================================================================
// Inventory Service
// =============================================================================

/// Availability queries and manual corrections over the inventory ledger.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
    notifier: Notifier,
}

impl InventoryService {
    /// Creates a new InventoryService.
    pub fn new(db: Database, notifier: Notifier) -> Self {
        InventoryService { db, notifier }
    }

    /// Available quantity per product at a location.
    ///
    /// Products without a ledger row report 0.
    pub async fn availability(
        &self,
        location_id: &str,
        product_ids: &[String],
    ) -> EngineResult<HashMap<String, i64>> {
        debug!(location_id = %location_id, products = product_ids.len(), "availability");

        Ok(self.db.stock().availability(location_id, product_ids).await?)
    }

    /// Gets one stock entry.
    pub async fn get_entry(
        &self,
        location_id: &str,
        product_id: &str,
    ) -> EngineResult<Option<StockEntry>> {
        Ok(self.db.stock().get(location_id, product_id).await?)
    }

    /// Applies a manual stock correction.
    ///
    /// ADD/SUBTRACT take a positive delta; SET takes the new absolute
    /// quantity (>= 0). SUBTRACT and SET floor at zero instead of erroring.
    /// If the result sits at or below the reorder threshold, a `StockLow`
    /// event is emitted after the write - emission failure never undoes the
    /// correction.
    pub async fn adjust(&self, request: AdjustStockRequest) -> EngineResult<StockEntry> {
        match request.mode {
            AdjustMode::Add | AdjustMode::Subtract => {
                if request.quantity <= 0 {
                    return Err(ValidationError::MustBePositive {
                        field: "quantity".to_string(),
                    }
                    .into());
                }
            }
            AdjustMode::Set => {
                if request.quantity < 0 {
                    return Err(ValidationError::MustNotBeNegative {
                        field: "quantity".to_string(),
                    }
                    .into());
                }
            }
        }

        let entry = self
            .db
            .stock()
            .adjust(
                &request.location_id,
                &request.product_id,
                request.quantity,
                request.mode,
                Utc::now(),
            )
            .await?;

        if entry.is_low() {
            self.notifier.emit(DomainEvent::StockLow {
                product_id: entry.product_id.clone(),
                location_id: entry.location_id.clone(),
                quantity: entry.quantity,
                threshold: entry.minimum_threshold,
            });
        }

        info!(
            product_id = %entry.product_id,
            location_id = %entry.location_id,
            quantity = %entry.quantity,
            mode = ?request.mode,
            "Stock adjusted"
        );

        Ok(entry)
    }
}
