//! # Catalog Service
//!
//! The catalog is owned elsewhere; the engine carries exactly one catalog
//! mutation - the price change - because it raises the `PriceChanged` event
//! that downstream consumers fan out.

use chrono::Utc;
use tracing::info;

use caja_core::{validation, CoreError, DomainEvent, Product};
use caja_db::Database;

use crate::error::EngineResult;
use crate::notifier::Notifier;

/// Catalog reads and the price-change operation.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
    notifier: Notifier,
}

impl CatalogService {
    /// Creates a new CatalogService.
    pub fn new(db: Database, notifier: Notifier) -> Self {
        CatalogService { db, notifier }
    }

    /// Gets a product by id.
    pub async fn get_product(&self, product_id: &str) -> EngineResult<Option<Product>> {
        Ok(self.db.products().get_by_id(product_id).await?)
    }

    /// Updates a product's catalog price and emits `PriceChanged`.
    ///
    /// Emission is best-effort after the write; an unchanged price is a
    /// no-op and emits nothing.
    pub async fn update_price(
        &self,
        product_id: &str,
        new_price_cents: i64,
    ) -> EngineResult<Product> {
        validation::validate_unit_price_cents(new_price_cents)?;

        let mut product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if product.price_cents == new_price_cents {
            return Ok(product);
        }

        let old_price_cents = product.price_cents;
        let now = Utc::now();
        self.db
            .products()
            .update_price(product_id, new_price_cents, now)
            .await?;

        product.price_cents = new_price_cents;
        product.updated_at = now;

        self.notifier.emit(DomainEvent::PriceChanged {
            product_id: product_id.to_string(),
            old_price_cents,
            new_price_cents,
        });

        info!(
            product_id = %product_id,
            old_price_cents = %old_price_cents,
            new_price_cents = %new_price_cents,
            "Price updated"
        );

        Ok(product)
    }
}
