//! # caja-engine: Transaction Engine for Caja
//!
//! The orchestration layer of the Caja point-of-sale backend. Hosts (an HTTP
//! layer, a desktop shell - out of scope here) embed [`Engine`] and call its
//! services; every sale and shift operation is one atomic unit of work
//! against the SQLite store, and every committed state change can raise
//! fire-and-forget domain events.
//!
//! ## Services
//!
//! - [`sale::SaleCoordinator`] - `create_sale`: validate, price, debit
//!   credit, decrement stock, write the sale - all in one transaction
//! - [`shift::ShiftManager`] - open/close/active shift with cash
//!   reconciliation
//! - [`inventory::InventoryService`] - availability reads, manual corrections
//! - [`credit::CreditService`] - balance reads, top-ups
//! - [`catalog::CatalogService`] - price change (raises `PriceChanged`)
//! - [`notifier::Notifier`] - best-effort event dispatch
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caja_engine::{Engine, EngineConfig};
//!
//! let (engine, mut events) = Engine::connect(&EngineConfig::load()?).await?;
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         // fan out to webhooks, dashboards, ...
//!     }
//! });
//!
//! let receipt = engine.sales().create_sale(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod credit;
pub mod error;
pub mod inventory;
pub mod notifier;
pub mod sale;
pub mod shift;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, EngineConfig};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use notifier::Notifier;
pub use sale::{CreateSaleRequest, SaleCoordinator, SaleLineRequest, SaleReceipt};
pub use shift::{CloseShiftRequest, OpenShiftRequest, ShiftManager};

use tokio::sync::mpsc::UnboundedReceiver;

use caja_core::DomainEvent;
use caja_db::Database;

// =============================================================================
// Engine Facade
// =============================================================================

/// The assembled engine: one database handle, one notifier, service accessors.
#[derive(Debug, Clone)]
pub struct Engine {
    db: Database,
    notifier: Notifier,
}

impl Engine {
    /// Assembles an engine over an existing database and notifier.
    pub fn new(db: Database, notifier: Notifier) -> Self {
        Engine { db, notifier }
    }

    /// Connects per configuration and returns the engine plus the receiving
    /// half of the event channel for the host's fan-out loop.
    pub async fn connect(
        config: &EngineConfig,
    ) -> EngineResult<(Engine, UnboundedReceiver<DomainEvent>)> {
        let db = Database::new(config.db_config()).await?;
        let (notifier, events) = Notifier::channel();
        Ok((Engine::new(db, notifier), events))
    }

    /// The sale transaction coordinator.
    pub fn sales(&self) -> sale::SaleCoordinator {
        sale::SaleCoordinator::new(self.db.clone(), self.notifier.clone())
    }

    /// The shift lifecycle manager.
    pub fn shifts(&self) -> shift::ShiftManager {
        shift::ShiftManager::new(self.db.clone())
    }

    /// The inventory service.
    pub fn inventory(&self) -> inventory::InventoryService {
        inventory::InventoryService::new(self.db.clone(), self.notifier.clone())
    }

    /// The credit-account service.
    pub fn credit(&self) -> credit::CreditService {
        credit::CreditService::new(self.db.clone())
    }

    /// The catalog service.
    pub fn catalog(&self) -> catalog::CatalogService {
        catalog::CatalogService::new(self.db.clone(), self.notifier.clone())
    }

    /// The underlying database handle (seeding, host-side queries).
    pub fn database(&self) -> &Database {
        &self.db
    }
}
