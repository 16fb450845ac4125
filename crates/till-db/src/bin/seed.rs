//! # Seed Data Generator
//!
//! Populates the database with categories and demo products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p till-db --bin seed
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./till_dev.db
//! ```

use std::env;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use till_core::validation::validate_product;
use till_core::{Category, Money, Product};
use till_db::{generate_id, Database, DbConfig};

/// (category, [(product name, price, cost, stock, min stock)])
const CATALOG: &[(&str, &[(&str, &str, &str, i64, i64)])] = &[
    (
        "Beverages",
        &[
            ("Coca-Cola 330ml", "180.00", "130.00", 48, 12),
            ("Sprite 330ml", "175.00", "125.00", 36, 12),
            ("Orange Juice 1L", "650.00", "480.00", 20, 6),
            ("Drinking Water 1.5L", "120.00", "70.00", 60, 24),
        ],
    ),
    (
        "Snacks",
        &[
            ("Potato Chips 100g", "350.00", "240.00", 30, 10),
            ("Salted Peanuts 200g", "420.00", "300.00", 25, 8),
            ("Chocolate Bar 50g", "280.00", "190.00", 40, 10),
        ],
    ),
    (
        "Dairy",
        &[
            ("Fresh Milk 1L", "480.00", "390.00", 24, 8),
            ("Butter 200g", "890.00", "720.00", 12, 4),
            ("Yoghurt 80ml", "95.00", "60.00", 50, 20),
        ],
    ),
    (
        "Household",
        &[
            ("Dish Soap 500ml", "540.00", "380.00", 18, 6),
            ("Laundry Powder 1kg", "980.00", "710.00", 15, 5),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./till_dev.db");

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
                println!("Till POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Till POS Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let mut barcode_seq: u64 = 1;
    let mut product_count = 0usize;

    for &(category_name, products) in CATALOG {
        let category = Category {
            id: generate_id(),
            name: category_name.to_string(),
            description: None,
            is_active: true,
        };
        db.categories().insert(&category).await?;

        for &(name, price, cost, stock, min_stock) in products {
            let product = build_product(name, price, cost, stock, min_stock, &category.id, barcode_seq);
            barcode_seq += 1;

            validate_product(&product)?;
            db.products().insert(&product).await?;
            product_count += 1;
        }

        println!("  {} ({} products)", category_name, products.len());
    }

    println!();
    println!("✓ Seeded {} categories, {} products", CATALOG.len(), product_count);

    let low = db.products().list_low_stock().await?;
    println!("  Low stock right now: {} products", low.len());

    Ok(())
}

/// Builds one catalog product with a synthetic (non-checksummed) EAN-13.
fn build_product(
    name: &str,
    price: &str,
    cost: &str,
    stock: i64,
    min_stock: i64,
    category_id: &str,
    barcode_seq: u64,
) -> Product {
    let now = Utc::now();

    Product {
        id: generate_id(),
        name: name.to_string(),
        barcode: Some(format!("479{:010}", barcode_seq)),
        description: None,
        price: price.parse::<Money>().expect("seed prices are valid decimals"),
        cost_price: cost.parse::<Money>().expect("seed costs are valid decimals"),
        stock,
        min_stock,
        category_id: Some(category_id.to_string()),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
