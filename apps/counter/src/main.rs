//! # Tally Counter Entry Point
//!
//! Prints the reconciliation report for the configured store.
//!
//! ## Usage
//! ```bash
//! tally-counter                      # every product
//! tally-counter esse                 # rows whose name contains "esse"
//! tally-counter --json               # report as JSON
//! tally-counter --config ./tally.toml
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (file, then TALLY_* overrides)
//! 3. Open the database and load the inventory
//! 4. Print the report

use std::env;
use std::path::PathBuf;

use chrono::Local;
use tally_counter::commands::stock;
use tally_counter::{init_tracing, App, AppConfig};

struct Args {
    config: Option<PathBuf>,
    json: bool,
    query: String,
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        config: None,
        json: false,
        query: String::new(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--json" => parsed.json = true,
            "--help" | "-h" => {
                println!("Tally Counter");
                println!();
                println!("Usage: tally-counter [OPTIONS] [QUERY]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("      --json           Print the report as JSON");
                println!("  -h, --help           Show this help message");
                return None;
            }
            other => parsed.query = other.to_string(),
        }
        i += 1;
    }

    Some(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let Some(args) = parse_args() else {
        return Ok(());
    };

    let config = AppConfig::load_or_default(args.config);
    let app = App::start(config).await?;

    let report = stock::get_report(&app.inventory, args.query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} · stock count · {}",
            app.config.store_name,
            Local::now().format("%Y-%m-%d %H:%M")
        );
        match app.db.last_saved_at().await? {
            Some(saved) => println!(
                "last saved {}",
                saved.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            None => println!("not saved yet"),
        }
        println!();
        print!("{}", report.to_table());
    }

    app.shutdown().await;
    Ok(())
}
