//! # Shift Reconciliation Arithmetic
//!
//! Pure cash math for closing a shift. The shift manager aggregates sales and
//! calls into this module; all arithmetic is exact integer cents, no rounding.
//!
//! ## The Close Equation
//! ```text
//! cash_collected = Σ cash portion of COMPLETED CASH/MIXED sales in the shift
//! expected_cash  = opening_float + cash_collected
//! variance       = closing_cash − expected_cash   (signed, no clamping)
//! ```

use crate::money::Money;
use crate::types::{Sale, SaleStatus};

/// The computed outcome of a shift close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// opening float + cash collected.
    pub expected_cash: Money,
    /// closing cash − expected cash. Positive = overage, negative = shortage.
    pub variance: Money,
}

/// Cash a single sale put into the drawer.
///
/// - CASH: the full total (tendered minus change stays in the drawer, which
///   is exactly the total).
/// - MIXED: total minus the credit portion.
/// - CREDIT: nothing.
/// - Cancelled sales contribute nothing regardless of method.
pub fn cash_portion(sale: &Sale) -> Money {
    if sale.status != SaleStatus::Completed || !sale.payment_method.touches_drawer() {
        return Money::zero();
    }

    sale.total() - sale.credit_applied()
}

/// Computes expected cash and variance for a closing shift.
pub fn reconcile(opening_float: Money, cash_collected: Money, closing_cash: Money) -> Reconciliation {
    let expected_cash = opening_float + cash_collected;
    Reconciliation {
        expected_cash,
        variance: closing_cash - expected_cash,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::Utc;

    fn sale(method: PaymentMethod, total: i64, credit: i64, status: SaleStatus) -> Sale {
        Sale {
            id: "s".to_string(),
            location_id: "l".to_string(),
            seller_id: "u".to_string(),
            customer_id: None,
            shift_id: Some("t".to_string()),
            status,
            payment_method: method,
            credit_applied_cents: credit,
            cash_tendered_cents: None,
            total_cents: total,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cash_portion_by_method() {
        let cash = sale(PaymentMethod::Cash, 3000, 0, SaleStatus::Completed);
        assert_eq!(cash_portion(&cash).cents(), 3000);

        let credit = sale(PaymentMethod::Credit, 3000, 3000, SaleStatus::Completed);
        assert_eq!(cash_portion(&credit).cents(), 0);

        let mixed = sale(PaymentMethod::Mixed, 3000, 1200, SaleStatus::Completed);
        assert_eq!(cash_portion(&mixed).cents(), 1800);
    }

    #[test]
    fn test_cancelled_sales_contribute_nothing() {
        let cancelled = sale(PaymentMethod::Cash, 3000, 0, SaleStatus::Cancelled);
        assert_eq!(cash_portion(&cancelled).cents(), 0);
    }

    /// Float 50.00, one CASH sale of 30.00, counted 80.00 → variance 0.
    #[test]
    fn test_reconcile_balanced_drawer() {
        let r = reconcile(
            Money::from_cents(5000),
            Money::from_cents(3000),
            Money::from_cents(8000),
        );
        assert_eq!(r.expected_cash.cents(), 8000);
        assert_eq!(r.variance.cents(), 0);
    }

    #[test]
    fn test_reconcile_shortage_is_negative() {
        let r = reconcile(
            Money::from_cents(5000),
            Money::from_cents(3000),
            Money::from_cents(7500),
        );
        assert_eq!(r.variance.cents(), -500);
    }

    #[test]
    fn test_reconcile_overage_is_positive() {
        let r = reconcile(
            Money::from_cents(5000),
            Money::from_cents(3000),
            Money::from_cents(8200),
        );
        assert_eq!(r.variance.cents(), 200);
    }

    /// Exactness over a scripted mix of methods: no rounding drift.
    #[test]
    fn test_reconcile_scripted_mix_exact() {
        let sales = vec![
            sale(PaymentMethod::Cash, 3_000, 0, SaleStatus::Completed),
            sale(PaymentMethod::Credit, 10_000, 10_000, SaleStatus::Completed),
            sale(PaymentMethod::Mixed, 4_550, 2_000, SaleStatus::Completed),
            sale(PaymentMethod::Cash, 199, 0, SaleStatus::Completed),
            sale(PaymentMethod::Cash, 999, 0, SaleStatus::Cancelled),
        ];

        let collected = sales
            .iter()
            .map(cash_portion)
            .fold(Money::zero(), |acc, m| acc + m);
        // 3000 + 0 + 2550 + 199
        assert_eq!(collected.cents(), 5_749);

        let r = reconcile(Money::from_cents(5_000), collected, Money::from_cents(10_749));
        assert_eq!(r.expected_cash.cents(), 10_749);
        assert_eq!(r.variance.cents(), 0);
    }
}
