#![allow(dead_code)] // each test binary compiles this module separately

//! Shared fixtures for engine integration tests.
//!
//! Tests run against real SQLite. The in-memory pool is capped at one
//! connection, which both keeps the database alive and serializes writers,
//! so race tests are deterministic: the loser always hits the guarded
//! UPDATE, never a busy database.

use chrono::Utc;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use caja_core::{
    CallerRole, Customer, DomainEvent, Location, PaymentMethod, Product, StockEntry,
};
use caja_db::{Database, DbConfig};
use caja_engine::{CreateSaleRequest, Engine, Notifier, SaleLineRequest};

/// Engine over a fresh in-memory database, with the event receiver.
pub async fn engine_in_memory() -> (Engine, UnboundedReceiver<DomainEvent>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .try_init();

    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let (notifier, events) = Notifier::channel();
    (Engine::new(db, notifier), events)
}

/// Seeded ids used across tests.
pub struct Fixture {
    pub location_id: String,
    pub product_a: String,
    pub product_b: String,
    pub customer_id: String,
}

/// Seeds one location, two products (A: $2.50 stock 10/threshold 2,
/// B: $5.00 stock 5/threshold 1) and one customer with $100.00 credit.
pub async fn seed_basic(engine: &Engine) -> Fixture {
    let db = engine.database();
    let now = Utc::now();

    let location = Location {
        id: Uuid::new_v4().to_string(),
        name: "Centro".to_string(),
        is_active: true,
        created_at: now,
    };
    db.locations().insert(&location).await.unwrap();

    let product_a = seed_product(engine, "COLA-330", "Cola 330ml", 250).await;
    let product_b = seed_product(engine, "ARROZ-1K", "Rice 1kg", 500).await;

    seed_stock(engine, &location.id, &product_a, 10, 2).await;
    seed_stock(engine, &location.id, &product_b, 5, 1).await;

    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        name: "Ana Morales".to_string(),
        credit_balance_cents: 10_000,
        created_at: now,
        updated_at: now,
    };
    db.customers().insert(&customer).await.unwrap();

    Fixture {
        location_id: location.id,
        product_a,
        product_b,
        customer_id: customer.id,
    }
}

pub async fn seed_product(engine: &Engine, sku: &str, name: &str, price_cents: i64) -> String {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        name: name.to_string(),
        price_cents,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    engine.database().products().insert(&product).await.unwrap();
    product.id
}

pub async fn seed_stock(
    engine: &Engine,
    location_id: &str,
    product_id: &str,
    quantity: i64,
    minimum_threshold: i64,
) {
    let entry = StockEntry {
        product_id: product_id.to_string(),
        location_id: location_id.to_string(),
        quantity,
        minimum_threshold,
        updated_at: Utc::now(),
    };
    engine.database().stock().upsert(&entry).await.unwrap();
}

/// A plain cash sale request for one line.
pub fn cash_sale(
    fixture: &Fixture,
    seller_id: &str,
    product_id: &str,
    quantity: i64,
) -> CreateSaleRequest {
    CreateSaleRequest {
        location_id: fixture.location_id.clone(),
        seller_id: seller_id.to_string(),
        caller_role: CallerRole::Seller,
        customer_id: None,
        payment_method: PaymentMethod::Cash,
        credit_requested_cents: 0,
        cash_tendered_cents: None,
        lines: vec![SaleLineRequest {
            product_id: product_id.to_string(),
            quantity,
            requested_unit_price_cents: None,
        }],
    }
}

/// Current stock quantity, straight from the store.
pub async fn stock_quantity(engine: &Engine, location_id: &str, product_id: &str) -> i64 {
    engine
        .database()
        .stock()
        .get(location_id, product_id)
        .await
        .unwrap()
        .map(|e| e.quantity)
        .unwrap_or(0)
}

/// Current credit balance, straight from the store.
pub async fn credit_balance(engine: &Engine, customer_id: &str) -> i64 {
    engine
        .database()
        .customers()
        .balance(customer_id)
        .await
        .unwrap()
        .unwrap()
}

/// Number of persisted sale rows.
pub async fn sale_count(engine: &Engine) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sales")
        .fetch_one(engine.database().pool())
        .await
        .unwrap()
}

/// Drains every event currently in the channel.
pub fn drain_events(rx: &mut UnboundedReceiver<DomainEvent>) -> Vec<DomainEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
