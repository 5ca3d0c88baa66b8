//! # Pricing Resolver
//!
//! Determines the unit price for a sale line. Pure: no persistence, no side
//! effects.
//!
//! Today every location sells at the single catalog price. The location id is
//! already part of the signature so per-location price lists can land here
//! later without touching the sale coordinator.

use crate::money::Money;
use crate::types::Product;

/// Resolves unit prices for sale lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingResolver;

impl PricingResolver {
    pub fn new() -> Self {
        PricingResolver
    }

    /// Resolves the unit price for `product` sold at `location_id`.
    ///
    /// Currently the catalog price; `_location_id` is the seam for future
    /// per-location overrides.
    pub fn resolve(&self, product: &Product, _location_id: &str) -> Money {
        product.price()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(price_cents: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            price_cents,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_resolves_catalog_price() {
        let resolver = PricingResolver::new();
        assert_eq!(resolver.resolve(&product(1250), "loc-1").cents(), 1250);
    }

    #[test]
    fn test_location_does_not_affect_price_yet() {
        let resolver = PricingResolver::new();
        let p = product(700);
        assert_eq!(
            resolver.resolve(&p, "loc-a").cents(),
            resolver.resolve(&p, "loc-b").cents()
        );
    }
}
