//! Sale coordinator integration tests: payment rules, atomicity, oversell
//! protection, and event emission against real SQLite.

mod common;

use common::*;

use caja_core::{CallerRole, CoreError, DomainEvent, PaymentMethod};
use caja_engine::{CreateSaleRequest, EngineError, ErrorKind, OpenShiftRequest, SaleLineRequest};

const SELLER: &str = "seller-1";
const ADMIN: &str = "admin-1";

async fn open_shift_for(engine: &caja_engine::Engine, fixture: &Fixture, seller_id: &str) {
    engine
        .shifts()
        .open_shift(OpenShiftRequest {
            seller_id: seller_id.to_string(),
            location_id: fixture.location_id.clone(),
            opening_float_cents: 5_000,
        })
        .await
        .unwrap();
}

fn as_admin(mut request: CreateSaleRequest) -> CreateSaleRequest {
    request.seller_id = ADMIN.to_string();
    request.caller_role = CallerRole::Admin;
    request
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn empty_lines_rejected_before_any_write() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;

    let mut request = cash_sale(&fixture, SELLER, &fixture.product_a, 1);
    request.lines.clear();

    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(sale_count(&engine).await, 0);
}

#[tokio::test]
async fn nonpositive_quantity_rejected() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;

    let request = cash_sale(&fixture, SELLER, &fixture.product_a, 0);
    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn price_override_requires_admin() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    let mut request = cash_sale(&fixture, SELLER, &fixture.product_a, 1);
    request.lines[0].requested_unit_price_cents = Some(100);

    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // The admin's override is recorded as supplied.
    let mut request = as_admin(cash_sale(&fixture, SELLER, &fixture.product_a, 2));
    request.lines[0].requested_unit_price_cents = Some(100);

    let receipt = engine.sales().create_sale(request).await.unwrap();
    assert_eq!(receipt.lines[0].unit_price_cents, 100);
    assert_eq!(receipt.sale.total_cents, 200);
}

// =============================================================================
// Happy Paths
// =============================================================================

#[tokio::test]
async fn cash_sale_commits_decrements_and_notifies() {
    let (engine, mut events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    let mut request = cash_sale(&fixture, SELLER, &fixture.product_a, 2);
    request.cash_tendered_cents = Some(1_000);

    let receipt = engine.sales().create_sale(request).await.unwrap();

    // Snapshot pricing: 2 × $2.50 catalog price.
    assert_eq!(receipt.sale.total_cents, 500);
    assert_eq!(receipt.lines.len(), 1);
    assert_eq!(receipt.lines[0].unit_price_cents, 250);
    assert_eq!(receipt.lines[0].subtotal_cents, 500);
    assert!(receipt.sale.shift_id.is_some());
    assert_eq!(receipt.sale.cash_tendered_cents, Some(1_000));

    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_a).await,
        8
    );

    let emitted = drain_events(&mut events);
    assert!(emitted
        .iter()
        .any(|e| matches!(e, DomainEvent::SaleCreated { total_cents, .. } if *total_cents == 500)));

    // Hydrated read-back matches the receipt.
    let fetched = engine.sales().get_sale(&receipt.sale.id).await.unwrap().unwrap();
    assert_eq!(fetched.sale.total_cents, 500);
    assert_eq!(fetched.lines.len(), 1);
}

#[tokio::test]
async fn admin_may_sell_without_a_shift() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;

    let request = as_admin(cash_sale(&fixture, SELLER, &fixture.product_a, 1));
    let receipt = engine.sales().create_sale(request).await.unwrap();

    assert_eq!(receipt.sale.shift_id, None);
}

#[tokio::test]
async fn seller_without_shift_is_rejected() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;

    let request = cash_sale(&fixture, SELLER, &fixture.product_a, 1);
    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoOpenShift);
}

// =============================================================================
// Product / Stock Rules
// =============================================================================

#[tokio::test]
async fn unknown_or_inactive_product_is_rejected() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    let request = cash_sale(&fixture, SELLER, "00000000-0000-0000-0000-000000000000", 1);
    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    sqlx::query("UPDATE products SET is_active = 0 WHERE id = ?1")
        .bind(&fixture.product_b)
        .execute(engine.database().pool())
        .await
        .unwrap();

    let request = cash_sale(&fixture, SELLER, &fixture.product_b, 1);
    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn insufficient_stock_reports_first_failing_line() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    // Line order decides which failure is reported: A (99 > 10) comes first.
    let mut request = cash_sale(&fixture, SELLER, &fixture.product_a, 99);
    request.lines.push(SaleLineRequest {
        product_id: fixture.product_b.clone(),
        quantity: 9,
        requested_unit_price_cents: None,
    });

    let err = engine.sales().create_sale(request).await.unwrap_err();
    match err {
        EngineError::Business(CoreError::InsufficientStock {
            name,
            available,
            requested,
        }) => {
            assert_eq!(name, "Cola 330ml");
            assert_eq!(available, 10);
            assert_eq!(requested, 99);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Nothing moved.
    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_a).await,
        10
    );
    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_b).await,
        5
    );
    assert_eq!(sale_count(&engine).await, 0);
}

#[tokio::test]
async fn duplicate_lines_jointly_exceeding_stock_roll_back() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    // Each line alone passes the pre-check (6 <= 10); together they oversell.
    // The write-time guard catches the second decrement and rolls back both.
    let mut request = cash_sale(&fixture, SELLER, &fixture.product_a, 6);
    request.lines.push(SaleLineRequest {
        product_id: fixture.product_a.clone(),
        quantity: 6,
        requested_unit_price_cents: None,
    });

    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_a).await,
        10
    );
    assert_eq!(sale_count(&engine).await, 0);
}

#[tokio::test]
async fn stock_low_event_fires_when_threshold_is_crossed() {
    let (engine, mut events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    // B: stock 5, threshold 1. Selling 4 leaves exactly the threshold.
    let request = cash_sale(&fixture, SELLER, &fixture.product_b, 4);
    engine.sales().create_sale(request).await.unwrap();

    let emitted = drain_events(&mut events);
    assert!(emitted.iter().any(|e| matches!(
        e,
        DomainEvent::StockLow { quantity: 1, threshold: 1, .. }
    )));
}

// =============================================================================
// Payment Rules
// =============================================================================

#[tokio::test]
async fn credit_sale_drains_balance_then_fails() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;
    seed_stock(&engine, &fixture.location_id, &fixture.product_a, 100, 2).await;

    // 40 × $2.50 = $100.00, exactly the opening balance.
    let request = CreateSaleRequest {
        customer_id: Some(fixture.customer_id.clone()),
        payment_method: PaymentMethod::Credit,
        credit_requested_cents: 10_000,
        ..cash_sale(&fixture, SELLER, &fixture.product_a, 40)
    };

    let receipt = engine.sales().create_sale(request.clone()).await.unwrap();
    assert_eq!(receipt.sale.credit_applied_cents, 10_000);
    assert_eq!(credit_balance(&engine, &fixture.customer_id).await, 0);

    // Identical sale on the drained account fails with full detail.
    let err = engine.sales().create_sale(request).await.unwrap_err();
    match err {
        EngineError::Business(CoreError::InsufficientCredit {
            balance_cents,
            requested_cents,
            ..
        }) => {
            assert_eq!(balance_cents, 0);
            assert_eq!(requested_cents, 10_000);
        }
        other => panic!("unexpected error: {other}"),
    }

    // The failed attempt left no trace: first sale's decrement only.
    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_a).await,
        60
    );
    assert_eq!(sale_count(&engine).await, 1);
}

#[tokio::test]
async fn credit_sale_must_cover_total_exactly() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    let request = CreateSaleRequest {
        customer_id: Some(fixture.customer_id.clone()),
        payment_method: PaymentMethod::Credit,
        credit_requested_cents: 400, // total is 500
        ..cash_sale(&fixture, SELLER, &fixture.product_a, 2)
    };

    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayment);
}

#[tokio::test]
async fn credit_sale_requires_customer() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    let request = CreateSaleRequest {
        payment_method: PaymentMethod::Credit,
        credit_requested_cents: 500,
        ..cash_sale(&fixture, SELLER, &fixture.product_a, 2)
    };

    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayment);
}

#[tokio::test]
async fn cash_sale_cannot_apply_credit() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    let request = CreateSaleRequest {
        customer_id: Some(fixture.customer_id.clone()),
        credit_requested_cents: 100,
        ..cash_sale(&fixture, SELLER, &fixture.product_a, 2)
    };

    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayment);
}

#[tokio::test]
async fn mixed_sale_cash_shortfall_is_not_a_commit_blocker() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    // Total $10.00, credit $6.00, tendered only $1.00. Change-making is the
    // caller's concern; the commit goes through.
    let request = CreateSaleRequest {
        customer_id: Some(fixture.customer_id.clone()),
        payment_method: PaymentMethod::Mixed,
        credit_requested_cents: 600,
        cash_tendered_cents: Some(100),
        ..cash_sale(&fixture, SELLER, &fixture.product_a, 4)
    };

    let receipt = engine.sales().create_sale(request).await.unwrap();
    assert_eq!(receipt.sale.total_cents, 1_000);
    assert_eq!(receipt.sale.credit_applied_cents, 600);
    assert_eq!(credit_balance(&engine, &fixture.customer_id).await, 9_400);
}

#[tokio::test]
async fn mixed_sale_credit_portion_cannot_exceed_total() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    let request = CreateSaleRequest {
        customer_id: Some(fixture.customer_id.clone()),
        payment_method: PaymentMethod::Mixed,
        credit_requested_cents: 1_200, // total is 1000
        ..cash_sale(&fixture, SELLER, &fixture.product_a, 4)
    };

    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayment);
}

#[tokio::test]
async fn mixed_sale_credit_portion_cannot_exceed_balance() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;
    seed_stock(&engine, &fixture.location_id, &fixture.product_b, 50, 1).await;

    // Total 30 × $5.00 = $150.00; credit portion $120.00 > $100.00 balance.
    let request = CreateSaleRequest {
        customer_id: Some(fixture.customer_id.clone()),
        payment_method: PaymentMethod::Mixed,
        credit_requested_cents: 12_000,
        ..cash_sale(&fixture, SELLER, &fixture.product_b, 30)
    };

    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientCredit);

    // Guard failure rolled the whole sale back.
    assert_eq!(credit_balance(&engine, &fixture.customer_id).await, 10_000);
    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_b).await,
        50
    );
    assert_eq!(sale_count(&engine).await, 0);
}

// =============================================================================
// Atomicity & Concurrency
// =============================================================================

#[tokio::test]
async fn failed_sale_leaves_no_partial_state() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    // Line 1 (A × 2) decrements fine; line 2 (B × 9 > 5) fails mid-transaction
    // after the credit debit and the first decrement already applied.
    let mut request = CreateSaleRequest {
        customer_id: Some(fixture.customer_id.clone()),
        payment_method: PaymentMethod::Mixed,
        credit_requested_cents: 500,
        ..cash_sale(&fixture, SELLER, &fixture.product_a, 2)
    };
    request.lines.push(SaleLineRequest {
        product_id: fixture.product_b.clone(),
        quantity: 9,
        requested_unit_price_cents: None,
    });

    let before_a = stock_quantity(&engine, &fixture.location_id, &fixture.product_a).await;
    let before_balance = credit_balance(&engine, &fixture.customer_id).await;

    // The availability pre-check already rejects B, but even forcing past it
    // the write-time guard would; either way nothing may persist.
    let err = engine.sales().create_sale(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_a).await,
        before_a
    );
    assert_eq!(
        credit_balance(&engine, &fixture.customer_id).await,
        before_balance
    );
    assert_eq!(sale_count(&engine).await, 0);

    let line_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines")
        .fetch_one(engine.database().pool())
        .await
        .unwrap();
    assert_eq!(line_count, 0);
}

#[tokio::test]
async fn concurrent_sales_cannot_oversell() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    seed_stock(&engine, &fixture.location_id, &fixture.product_a, 5, 0).await;

    // Two concurrent sales of 3 against stock 5: exactly one may win.
    let first = as_admin(cash_sale(&fixture, SELLER, &fixture.product_a, 3));
    let second = as_admin(cash_sale(&fixture, SELLER, &fixture.product_a, 3));

    let sales = engine.sales();
    let (a, b) = tokio::join!(sales.create_sale(first), sales.create_sale(second));

    let outcomes = [a, b];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one of two racing sales must commit");

    let loser = outcomes.iter().find(|r| r.is_err()).unwrap();
    assert_eq!(
        loser.as_ref().unwrap_err().kind(),
        ErrorKind::InsufficientStock
    );

    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_a).await,
        2
    );
    assert_eq!(sale_count(&engine).await, 1);
}

#[tokio::test]
async fn identical_payloads_create_two_sales() {
    let (engine, _events) = engine_in_memory().await;
    let fixture = seed_basic(&engine).await;
    open_shift_for(&engine, &fixture, SELLER).await;

    // No idempotency key by design: resubmitting sells again.
    let request = cash_sale(&fixture, SELLER, &fixture.product_a, 2);
    let first = engine.sales().create_sale(request.clone()).await.unwrap();
    let second = engine.sales().create_sale(request).await.unwrap();

    assert_ne!(first.sale.id, second.sale.id);
    assert_eq!(sale_count(&engine).await, 2);
    assert_eq!(
        stock_quantity(&engine, &fixture.location_id, &fixture.product_a).await,
        6
    );
}
