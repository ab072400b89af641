//! # Seed Data Generator
//!
//! Populates an empty database with a starter cigarette catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p tally-db --bin seed
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! Products get zero stock and are ordered as listed. A database that
//! already holds products is left untouched.

use std::env;

use tally_core::persistence::save_store;
use tally_core::InventoryStore;
use tally_db::{Database, DbConfig};

/// (name, barcode) pairs. Mixes EAN-13, EAN-8 and a shop-internal code so
/// every symbology shows up on the barcode screen.
const CATALOG: &[(&str, &str)] = &[
    ("Marlboro Gold", "88011745"),
    ("Marlboro Red", "8801116000194"),
    ("Esse Change", "8801116034192"),
    ("Esse Special Gold", "8801116011541"),
    ("Raison Black", "88020761"),
    ("This Plus", "8801047019510"),
    ("Dunhill Fine Cut", "8801116018540"),
    ("Parliament Aqua 5", "8801116039258"),
    ("Mevius Original", "4902111738218"),
    ("Camel Blue", "8801116042524"),
    ("Bohem Cigar No.6", "8801116051717"),
    ("Loose tobacco pouch", "SHOP-0001"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tally_dev.db");

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
                println!("Tally Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let repo = db.products();
    let existing = repo.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut store = InventoryStore::new();
    for (name, barcode) in CATALOG {
        store.add(name, barcode)?;
    }

    save_store(&repo, &store).await?;

    println!("✓ Seeded {} products", store.len());
    db.close().await;
    Ok(())
}
