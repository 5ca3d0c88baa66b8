//! # Sale Transaction Coordinator
//!
//! Orchestrates one sale end to end: validation, shift resolution, pricing,
//! payment rules, and the single transaction that debits credit, decrements
//! stock, and writes the sale - all of it or none of it.
//!
//! ## Commit Pipeline
//! ```text
//! validate input (no I/O)
//!      │
//! resolve shift ── seller: open shift required; admin: may sell without
//!      │
//! load products ── missing/inactive → ProductNotFound
//!      │
//! check availability ── first failing line wins (input order)
//!      │
//! price lines ── caller override (admin only) or catalog price, snapshotted
//!      │
//! payment rules ── CASH / CREDIT / MIXED
//!      │
//! ┌────▼─────────────── ONE TRANSACTION ───────────────────┐
//! │ debit credit (guarded)                                  │
//! │ decrement stock per line (guarded, write-time check)    │
//! │ insert sale + lines                                     │
//! └────┬────────────────────────────────────────────────────┘
//!      │ commit
//! emit SaleCreated + any StockLow (fire-and-forget)
//! ```
//!
//! A guarded write that matches no row means a concurrent transaction got
//! there first (or the resource was short all along); both cases surface as
//! the same business error and roll the whole sale back.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use caja_core::pricing::PricingResolver;
use caja_core::{
    validation, CallerRole, CoreError, DomainEvent, Money, PaymentMethod, Sale, SaleLine,
    SaleStatus, ValidationError,
};
use caja_db::{CustomerRepository, Database, DbError, SaleRepository, StockRepository};

use crate::error::EngineResult;
use crate::notifier::Notifier;

// =============================================================================
// Request / Response Types
// =============================================================================

/// One requested line of a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: String,

    /// Units requested, must be positive.
    pub quantity: i64,

    /// Optional price override in cents. Admin callers only; recorded
    /// as supplied.
    #[serde(default)]
    pub requested_unit_price_cents: Option<i64>,
}

/// Input for [`SaleCoordinator::create_sale`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub location_id: String,
    pub seller_id: String,

    /// Resolved by the host's auth layer, never trusted from end users.
    pub caller_role: CallerRole,

    #[serde(default)]
    pub customer_id: Option<String>,

    pub payment_method: PaymentMethod,

    /// Store credit to apply, in cents. Must equal the total for CREDIT,
    /// must be 0 for CASH.
    #[serde(default)]
    pub credit_requested_cents: i64,

    /// Cash handed over, in cents. Recorded for drawer math; sufficiency is
    /// NOT validated here - change-making is the caller's concern.
    #[serde(default)]
    pub cash_tendered_cents: Option<i64>,

    /// Ordered line list; validated and reported in this order.
    pub lines: Vec<SaleLineRequest>,
}

/// A committed sale with its hydrated lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// Sale Coordinator
// =============================================================================

/// Coordinates sale transactions.
#[derive(Debug, Clone)]
pub struct SaleCoordinator {
    db: Database,
    notifier: Notifier,
    pricing: PricingResolver,
}

impl SaleCoordinator {
    /// Creates a new SaleCoordinator.
    pub fn new(db: Database, notifier: Notifier) -> Self {
        SaleCoordinator {
            db,
            notifier,
            pricing: PricingResolver::new(),
        }
    }

    /// Creates a sale as one atomic unit.
    ///
    /// Validation failures abort before any mutation. Once the transaction
    /// starts, every write either lands with the commit or is rolled back
    /// with it; no partial sale is ever observable.
    ///
    /// Sales are deliberately NOT idempotent: submitting the same request
    /// twice produces two sales and two decrements. Retrying after an
    /// infrastructure error is the caller's decision.
    pub async fn create_sale(&self, request: CreateSaleRequest) -> EngineResult<SaleReceipt> {
        debug!(
            location_id = %request.location_id,
            seller_id = %request.seller_id,
            lines = request.lines.len(),
            "create_sale"
        );

        // ---- Input validation, before any I/O --------------------------------
        validation::validate_line_count(request.lines.len())?;
        for line in &request.lines {
            validation::validate_quantity(line.quantity)?;
            if let Some(price_cents) = line.requested_unit_price_cents {
                if request.caller_role != CallerRole::Admin {
                    return Err(ValidationError::NotPermitted {
                        field: "requested_unit_price_cents".to_string(),
                        reason: "price overrides require an administrator".to_string(),
                    }
                    .into());
                }
                validation::validate_unit_price_cents(price_cents)?;
            }
        }
        validation::validate_non_negative_cents(
            "credit_requested_cents",
            request.credit_requested_cents,
        )?;
        if let Some(cash) = request.cash_tendered_cents {
            validation::validate_non_negative_cents("cash_tendered_cents", cash)?;
        }

        match request.payment_method {
            PaymentMethod::Cash if request.credit_requested_cents != 0 => {
                return Err(CoreError::InvalidPayment {
                    reason: "cash sales cannot apply store credit".to_string(),
                }
                .into());
            }
            PaymentMethod::Credit | PaymentMethod::Mixed if request.customer_id.is_none() => {
                return Err(CoreError::InvalidPayment {
                    reason: "credit and mixed sales require a customer".to_string(),
                }
                .into());
            }
            _ => {}
        }

        // ---- Location and shift resolution -----------------------------------
        if self
            .db
            .locations()
            .get_active(&request.location_id)
            .await?
            .is_none()
        {
            return Err(CoreError::LocationInactive(request.location_id.clone()).into());
        }

        let open_shift = self
            .db
            .shifts()
            .find_open_for_seller(&request.seller_id)
            .await?;
        let shift_id = match open_shift {
            Some(shift) if shift.location_id == request.location_id => Some(shift.id),
            // Admins may sell without a personal shift at the location; such
            // sales carry no shift link and stay out of drawer reconciliation.
            _ if request.caller_role == CallerRole::Admin => None,
            _ => {
                return Err(CoreError::NoOpenShift {
                    seller_id: request.seller_id.clone(),
                    location_id: request.location_id.clone(),
                }
                .into());
            }
        };

        // ---- Load products in line order --------------------------------------
        let product_repo = self.db.products();
        let mut products = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            let product = product_repo
                .get_by_id(&line.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            products.push(product);
        }

        // ---- Availability pre-check, first failing line wins -------------------
        let product_ids: Vec<String> = request
            .lines
            .iter()
            .map(|l| l.product_id.clone())
            .collect();
        let available = self
            .db
            .stock()
            .availability(&request.location_id, &product_ids)
            .await?;
        for (line, product) in request.lines.iter().zip(&products) {
            let on_hand = *available.get(&line.product_id).unwrap_or(&0);
            if line.quantity > on_hand {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: on_hand,
                    requested: line.quantity,
                }
                .into());
            }
        }

        // ---- Pricing and totals ------------------------------------------------
        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();
        let mut total = Money::zero();
        let mut lines = Vec::with_capacity(request.lines.len());
        for (line_no, (line, product)) in request.lines.iter().zip(&products).enumerate() {
            let unit_price = match line.requested_unit_price_cents {
                Some(cents) => Money::from_cents(cents),
                None => self.pricing.resolve(product, &request.location_id),
            };
            validation::validate_unit_price_cents(unit_price.cents())?;

            let subtotal = unit_price.multiply_quantity(line.quantity);
            total += subtotal;

            lines.push(SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: product.name.clone(),
                quantity: line.quantity,
                unit_price_cents: unit_price.cents(),
                subtotal_cents: subtotal.cents(),
                line_no: line_no as i64,
                created_at: now,
            });
        }

        // ---- Payment-method rules against the computed total -------------------
        let credit_requested = Money::from_cents(request.credit_requested_cents);
        match request.payment_method {
            PaymentMethod::Credit => {
                if credit_requested != total {
                    return Err(CoreError::InvalidPayment {
                        reason: format!(
                            "credit sales must be fully covered by credit: requested {credit_requested}, total {total}"
                        ),
                    }
                    .into());
                }
            }
            PaymentMethod::Mixed => {
                if credit_requested > total {
                    return Err(CoreError::InvalidPayment {
                        reason: format!(
                            "credit portion {credit_requested} exceeds total {total}"
                        ),
                    }
                    .into());
                }
            }
            PaymentMethod::Cash => {}
        }

        // ---- The atomic unit ---------------------------------------------------
        let mut tx = self.db.begin().await?;
        let mut pending_events = Vec::new();

        if credit_requested.is_positive() {
            let customer_id = request.customer_id.as_deref().ok_or_else(|| {
                CoreError::InvalidPayment {
                    reason: "credit requested without a customer".to_string(),
                }
            })?;

            let applied =
                CustomerRepository::debit_tx(&mut tx, customer_id, credit_requested.cents(), now)
                    .await?;
            if !applied {
                // Guard failed: read back to tell "unknown customer" from
                // "short balance". The drop of `tx` rolls everything back.
                let balance = CustomerRepository::balance_tx(&mut tx, customer_id).await?;
                return Err(match balance {
                    None => CoreError::CustomerNotFound(customer_id.to_string()),
                    Some(balance_cents) => CoreError::InsufficientCredit {
                        customer_id: customer_id.to_string(),
                        balance_cents,
                        requested_cents: credit_requested.cents(),
                    },
                }
                .into());
            }
        }

        for (line, product) in lines.iter().zip(&products) {
            let decremented = StockRepository::decrement_tx(
                &mut tx,
                &request.location_id,
                &line.product_id,
                line.quantity,
                now,
            )
            .await?;

            match decremented {
                Some((new_quantity, threshold)) => {
                    if new_quantity <= threshold {
                        pending_events.push(DomainEvent::StockLow {
                            product_id: line.product_id.clone(),
                            location_id: request.location_id.clone(),
                            quantity: new_quantity,
                            threshold,
                        });
                    }
                }
                None => {
                    // A concurrent sale won the row, or two lines of this sale
                    // target the same product. Either way the write-time check
                    // holds and the whole sale rolls back.
                    let on_hand = StockRepository::quantity_tx(
                        &mut tx,
                        &request.location_id,
                        &line.product_id,
                    )
                    .await?;
                    return Err(CoreError::InsufficientStock {
                        name: product.name.clone(),
                        available: on_hand,
                        requested: line.quantity,
                    }
                    .into());
                }
            }
        }

        let sale = Sale {
            id: sale_id,
            location_id: request.location_id.clone(),
            seller_id: request.seller_id.clone(),
            customer_id: request.customer_id.clone(),
            shift_id,
            status: SaleStatus::Completed,
            payment_method: request.payment_method,
            credit_applied_cents: credit_requested.cents(),
            cash_tendered_cents: request.cash_tendered_cents,
            total_cents: total.cents(),
            created_at: now,
        };

        SaleRepository::insert_sale_tx(&mut tx, &sale).await?;
        for line in &lines {
            SaleRepository::insert_line_tx(&mut tx, line).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        // ---- Post-commit, fire-and-forget --------------------------------------
        self.notifier.emit(DomainEvent::SaleCreated {
            sale_id: sale.id.clone(),
            location_id: sale.location_id.clone(),
            total_cents: sale.total_cents,
            occurred_at: now,
        });
        for event in pending_events {
            self.notifier.emit(event);
        }

        info!(
            sale_id = %sale.id,
            total_cents = %sale.total_cents,
            payment_method = ?sale.payment_method,
            lines = lines.len(),
            "Sale committed"
        );

        Ok(SaleReceipt { sale, lines })
    }

    /// Gets a committed sale with its lines.
    pub async fn get_sale(&self, sale_id: &str) -> EngineResult<Option<SaleReceipt>> {
        let Some(sale) = self.db.sales().get_by_id(sale_id).await? else {
            return Ok(None);
        };
        let lines = self.db.sales().get_lines(sale_id).await?;
        Ok(Some(SaleReceipt { sale, lines }))
    }
}
