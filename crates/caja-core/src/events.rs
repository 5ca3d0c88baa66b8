//! # Domain Events
//!
//! Events the engine hands to the notification sink after a successful
//! commit. Delivery is fire-and-forget: the sink is a collaborator, not part
//! of any transaction, and a failed delivery never affects committed state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Domain Event
// =============================================================================

/// An event raised by the engine for external fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A sale committed.
    SaleCreated {
        sale_id: String,
        location_id: String,
        total_cents: i64,
        occurred_at: DateTime<Utc>,
    },

    /// A stock entry dropped to or below its reorder threshold.
    StockLow {
        product_id: String,
        location_id: String,
        quantity: i64,
        threshold: i64,
    },

    /// A catalog price changed.
    PriceChanged {
        product_id: String,
        old_price_cents: i64,
        new_price_cents: i64,
    },
}

impl DomainEvent {
    /// Short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::SaleCreated { .. } => "sale_created",
            DomainEvent::StockLow { .. } => "stock_low",
            DomainEvent::PriceChanged { .. } => "price_changed",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
