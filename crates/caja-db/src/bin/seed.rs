//! # Seed Data Generator
//!
//! Populates a database with development data: two locations, a small
//! catalog, stock at both locations, and a few credit customers.
//!
//! ## Usage
//! ```bash
//! cargo run -p caja-db --bin seed
//! cargo run -p caja-db --bin seed -- --db ./data/caja.db
//! ```

use chrono::Utc;
use std::env;
use uuid::Uuid;

use caja_core::{Customer, Location, Product, StockEntry};
use caja_db::{Database, DbConfig};

/// (sku, name, price in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("BEV-COLA-330", "Cola 330ml", 250),
    ("BEV-AGUA-600", "Water 600ml", 150),
    ("BEV-JUGO-1L", "Orange Juice 1L", 520),
    ("SNK-PAPAS-45", "Potato Chips 45g", 199),
    ("SNK-CHOC-BAR", "Chocolate Bar", 320),
    ("GRO-ARROZ-1K", "Rice 1kg", 890),
    ("GRO-AZUCAR-1K", "Sugar 1kg", 640),
    ("GRO-ACEITE-1L", "Cooking Oil 1L", 1450),
    ("HOG-JABON", "Bar Soap", 280),
    ("HOG-DETERG-500", "Detergent 500g", 750),
];

/// (name, opening credit in cents)
const CUSTOMERS: &[(&str, i64)] = &[
    ("Ana Morales", 10_000),
    ("Luis Herrera", 5_000),
    ("Carmen Díaz", 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./caja_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Caja Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./caja_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Caja Seed Data Generator");
    println!("========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let now = Utc::now();

    // Locations
    let mut location_ids = Vec::new();
    for name in ["Centro", "Norte"] {
        let location = Location {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_active: true,
            created_at: now,
        };
        db.locations().insert(&location).await?;
        location_ids.push(location.id);
    }
    println!("✓ Seeded {} locations", location_ids.len());

    // Products + stock at every location
    for (i, (sku, name, price_cents)) in PRODUCTS.iter().enumerate() {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            price_cents: *price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;

        for location_id in &location_ids {
            let entry = StockEntry {
                product_id: product.id.clone(),
                location_id: location_id.clone(),
                quantity: 20 + (i as i64 * 7) % 40,
                minimum_threshold: 5,
                updated_at: now,
            };
            db.stock().upsert(&entry).await?;
        }
    }
    println!(
        "✓ Seeded {} products with stock at {} locations",
        PRODUCTS.len(),
        location_ids.len()
    );

    // Customers
    for (name, credit_cents) in CUSTOMERS {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            credit_balance_cents: *credit_cents,
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await?;
    }
    println!("✓ Seeded {} customers", CUSTOMERS.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
