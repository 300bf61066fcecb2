//! # Seed Data Generator
//!
//! Populates the carton and product catalogs for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./cartonization_dev.db
//! cargo run -p cartonization-db --bin seed
//!
//! # Specify database path
//! cargo run -p cartonization-db --bin seed -- --db ./data/cartonization.db
//! ```
//!
//! ## Generated Data
//! - Cartons: the standard Small / Medium / Large boxes plus a few
//!   specialty shapes, one of them measured in inches and pounds
//! - Products: a handful of SKUs per category, some fragile, so every
//!   packing policy flag has something to act on

use rust_decimal::Decimal;
use std::env;

use cartonization_core::{
    Carton, Dimension, DimensionUnit, ProductInfo, Weight, WeightUnit,
};
use cartonization_db::{Database, DbConfig};

/// (name, length, width, height, unit, max weight, weight unit)
///
/// Measurements are in hundredths.
const CARTONS: &[(&str, i64, i64, i64, DimensionUnit, i64, WeightUnit)] = &[
    ("Small Box", 1500, 1000, 800, DimensionUnit::Centimeters, 500, WeightUnit::Kilograms),
    ("Medium Box", 2500, 2000, 1500, DimensionUnit::Centimeters, 1500, WeightUnit::Kilograms),
    ("Large Box", 4000, 3000, 2500, DimensionUnit::Centimeters, 3000, WeightUnit::Kilograms),
    ("Padded Mailer", 3000, 2200, 300, DimensionUnit::Centimeters, 100, WeightUnit::Kilograms),
    ("Tube", 1000, 1000, 9000, DimensionUnit::Centimeters, 800, WeightUnit::Kilograms),
    ("12in Cube", 1200, 1200, 1200, DimensionUnit::Inches, 4000, WeightUnit::Pounds),
];

/// (sku, name, length, width, height, unit, weight, weight unit, category, fragile)
///
/// Measurements are in hundredths.
const PRODUCTS: &[(&str, &str, i64, i64, i64, DimensionUnit, i64, WeightUnit, &str, bool)] = &[
    ("BOOK-001", "Paperback Novel", 2000, 1300, 250, DimensionUnit::Centimeters, 35, WeightUnit::Kilograms, "books", false),
    ("BOOK-002", "Hardcover Atlas", 3500, 2600, 400, DimensionUnit::Centimeters, 180, WeightUnit::Kilograms, "books", false),
    ("BOOK-003", "Pocket Dictionary", 1200, 800, 300, DimensionUnit::Centimeters, 25, WeightUnit::Kilograms, "books", false),
    ("KIT-001", "Coffee Mug", 450, 450, 400, DimensionUnit::Inches, 75, WeightUnit::Pounds, "kitchen", true),
    ("KIT-002", "Wine Glass Pair", 2500, 1200, 1200, DimensionUnit::Centimeters, 60, WeightUnit::Kilograms, "kitchen", true),
    ("KIT-003", "Chef Knife", 3300, 500, 250, DimensionUnit::Centimeters, 30, WeightUnit::Kilograms, "kitchen", false),
    ("KIT-004", "Cast Iron Pan", 1200, 1200, 200, DimensionUnit::Inches, 800, WeightUnit::Pounds, "kitchen", false),
    ("ELEC-001", "USB Cable", 1000, 800, 200, DimensionUnit::Centimeters, 10, WeightUnit::Kilograms, "electronics", false),
    ("ELEC-002", "Wireless Mouse", 1200, 700, 400, DimensionUnit::Centimeters, 12, WeightUnit::Kilograms, "electronics", false),
    ("ELEC-003", "Tablet", 2500, 1700, 100, DimensionUnit::Centimeters, 50, WeightUnit::Kilograms, "electronics", true),
    ("TOY-001", "Puzzle 1000pc", 3000, 2000, 600, DimensionUnit::Centimeters, 90, WeightUnit::Kilograms, "toys", false),
    ("TOY-002", "Plush Bear", 1000, 800, 600, DimensionUnit::Inches, 50, WeightUnit::Pounds, "toys", false),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cartonization_dev.db");

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
                println!("Cartonization Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cartonization_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Cartonization Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.cartons().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} cartons", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating cartons...");

    for &(name, l, w, h, unit, max, weight_unit) in CARTONS {
        let dims = Dimension::new(hundredths(l), hundredths(w), hundredths(h), unit)?;
        let max_weight = Weight::new(hundredths(max), weight_unit)?;
        let mut carton = Carton::create(name, dims, max_weight)?;

        if let Err(e) = db.cartons().save(&mut carton).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }
        println!("  {} ({})", carton.name(), carton.dimensions());
    }

    println!();
    println!("Creating products...");

    let mut generated = 0;
    for &(sku, name, l, w, h, unit, weight, weight_unit, category, fragile) in PRODUCTS {
        let product = ProductInfo {
            sku: sku.to_string(),
            name: name.to_string(),
            dimensions: Dimension::new(hundredths(l), hundredths(w), hundredths(h), unit)?,
            weight: Weight::new(hundredths(weight), weight_unit)?,
            category: category.to_string(),
            fragile,
            active: true,
        };

        if let Err(e) = db.products().upsert(&product).await {
            eprintln!("Failed to insert {}: {}", sku, e);
            continue;
        }
        generated += 1;
    }

    println!("✓ Generated {} products", generated);
    println!(
        "  Outbox: {} CartonCreated events pending",
        db.outbox().count_pending().await?
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn hundredths(value: i64) -> Decimal {
    Decimal::new(value, 2)
}
