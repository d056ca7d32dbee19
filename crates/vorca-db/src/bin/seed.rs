//! # Seed Data Generator
//!
//! Populates a database with a two-branch coffee shop for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./vorca_dev.db
//! cargo run -p vorca-db --bin seed
//!
//! # Specify database path
//! cargo run -p vorca-db --bin seed -- --db ./data/vorca.db
//! ```
//!
//! ## Generated Data
//! - Locations: Kemang (KMG), Setiabudi (STB)
//! - Catalog: drinks and bakery items, prices in Rupiah
//! - Opening stock at both locations via STOCK_TAKE adjustments
//! - Low-stock threshold of 10 on every inventory row

use std::env;

use vorca_core::{
    AdjustmentReason, AdjustmentRequest, Money, NewLocation, NewProduct, Principal, Role,
    ThresholdRequest,
};
use vorca_db::{Database, DbConfig};

/// Seeding runs as the chain owner.
const SEED_ACTOR: &str = "seed";

const LOCATIONS: &[(&str, &str)] = &[("Kemang", "KMG"), ("Setiabudi", "STB")];

/// (sku, name, price, cost, opening stock per location)
const CATALOG: &[(&str, &str, i64, i64, i64)] = &[
    ("BN-AM-001", "Americano", 28_000, 9_000, 40),
    ("BN-LT-001", "Latte", 32_000, 11_000, 40),
    ("BN-CP-001", "Cappuccino", 35_000, 12_000, 30),
    ("BK-CR-001", "Croissant", 22_000, 8_000, 15),
    ("BK-MF-001", "Muffin", 18_000, 6_000, 8),
];

const LOW_STOCK_THRESHOLD: i64 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vorca_dev.db");

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
                println!("Vorca POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vorca_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vorca POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.locations().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} locations", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let owner = Principal::new(SEED_ACTOR, Role::Owner);
    let start = std::time::Instant::now();

    println!();
    println!("Creating locations...");
    let mut locations = Vec::with_capacity(LOCATIONS.len());
    for (name, code) in LOCATIONS {
        let location = db
            .locations()
            .create(
                &owner,
                &NewLocation {
                    name: name.to_string(),
                    code: code.to_string(),
                },
            )
            .await?;
        println!("  {} ({})", location.name, location.code);
        locations.push(location);
    }

    // Catalog rows are homed at the first branch
    let home = &locations[0];

    println!();
    println!("Creating catalog and opening stock...");
    for (sku, name, price, cost, opening) in CATALOG {
        let product = db
            .products()
            .create(
                &owner,
                &NewProduct {
                    sku: sku.to_string(),
                    name: name.to_string(),
                    description: None,
                    barcode: None,
                    price: Money::from_minor(*price),
                    cost: Some(Money::from_minor(*cost)),
                    location_id: home.id.clone(),
                },
            )
            .await?;

        for location in &locations {
            db.inventory()
                .adjust(
                    &owner,
                    &AdjustmentRequest {
                        product_id: product.id.clone(),
                        location_id: location.id.clone(),
                        quantity: *opening,
                        reason: AdjustmentReason::StockTake,
                        notes: Some("Opening stock".to_string()),
                    },
                )
                .await?;

            db.inventory()
                .set_low_stock_threshold(
                    &owner,
                    &ThresholdRequest {
                        product_id: product.id.clone(),
                        location_id: location.id.clone(),
                        low_stock_threshold: LOW_STOCK_THRESHOLD,
                    },
                )
                .await?;
        }

        println!("  {:<10} {:<12} {}", product.sku, product.name, product.price);
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Seeded {} locations and {} products in {:?}",
        locations.len(),
        CATALOG.len(),
        elapsed
    );

    println!();
    println!("Verifying stock...");
    let low = db.inventory().low_stock(None).await?;
    println!("  Low-stock rows: {}", low.len());
    for level in &low {
        println!("    {} at {}: {}", level.sku, level.inventory.location_id, level.inventory.quantity);
    }

    db.close().await;

    println!();
    println!("✓ Done!");

    Ok(())
}
