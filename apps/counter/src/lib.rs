//! # Tally Counter Library
//!
//! Application shell for the stock count: configuration, state and the
//! command surface a UI binds to.
//!
//! ## Module Organization
//! ```text
//! tally_counter/
//! ├── lib.rs          ◄─── You are here (startup)
//! ├── config.rs       ◄─── tally.toml + TALLY_* overrides
//! ├── state/
//! │   ├── inventory.rs ◄── Arc<RwLock<InventoryStore>> + event broadcast
//! │   ├── db.rs        ◄── Snapshot persistence (SQLite or memory)
//! │   └── barcode.rs   ◄── Background rendering, stale-result check
//! ├── commands/       ◄─── product, stock, focus, barcode
//! ├── render.rs       ◄─── EAN/Code128 module renderer (PBM output)
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! One focused type per concern; commands borrow only what they use.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  App                                                                    │
//! │  ├── config: AppConfig         store name, db path, barcode size        │
//! │  ├── db: DbState               save lock + repository                   │
//! │  ├── inventory: InventoryState the only copy of the product list        │
//! │  └── barcodes: BarcodeState    renderer, asset-keyed cache, in-flight   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub use config::AppConfig;
pub use error::{ApiError, ErrorCode};

use render::ModuleRenderer;
use state::{BarcodeState, DbState, InventoryState};
use tally_db::migrations::migration_status;
use tally_db::{Database, DbConfig};

/// Everything a running counter needs.
#[derive(Debug)]
pub struct App {
    pub config: AppConfig,
    pub db: DbState,
    pub inventory: InventoryState,
    pub barcodes: BarcodeState,
}

impl App {
    /// Opens the database and loads the inventory.
    ///
    /// ## Startup Sequence
    /// ```text
    /// 1. Resolve database path (config, TALLY_DB_PATH, or platform data dir)
    /// 2. Connect (WAL) and run pending migrations
    /// 3. Load the product snapshot, re-validating every invariant
    /// 4. Build the barcode worker with the configured module size
    /// ```
    pub async fn start(config: AppConfig) -> Result<Self, ApiError> {
        let db_path = config.resolve_database_path()?;
        info!(?db_path, "Database path determined");

        let database = Database::new(DbConfig::new(db_path)).await?;
        let (total, applied) = migration_status(database.pool()).await?;
        info!(total, applied, "Database connected and migrations applied");

        Self::with_db(config, DbState::new(database)).await
    }

    /// Same as [`App::start`] but keeps everything in memory.
    pub async fn in_memory(config: AppConfig) -> Result<Self, ApiError> {
        Self::with_db(config, DbState::in_memory()).await
    }

    async fn with_db(config: AppConfig, db: DbState) -> Result<Self, ApiError> {
        let store = db.load().await?;
        info!(products = store.len(), "Inventory loaded");

        let renderer = ModuleRenderer::new(config.barcode.scale, config.barcode.height);

        Ok(App {
            config,
            db,
            inventory: InventoryState::new(store),
            barcodes: BarcodeState::new(Arc::new(renderer)),
        })
    }

    /// Closes the database pool, if any.
    pub async fn shutdown(&self) {
        if let Some(db) = self.db.database() {
            db.close().await;
        }
        info!("Counter shut down");
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_core=trace` - Trace the store only
/// - Default: INFO, DEBUG for tally crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}
