//! # tally-core: Pure Reconciliation Logic for Tally
//!
//! This crate holds every rule of the cigarette stock count: products and
//! their three counters, identity and ordering rules, the name filter, focus
//! navigation and barcode symbology selection. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Counter app (apps/counter)                     │   │
//! │  │   commands: search, add, apply_entry, move, barcode, reset     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  product  │  │   store   │  │  search   │  │ symbology │  │   │
//! │  │   │  Product  │  │ Inventory │  │ NameQuery │  │ EAN/Code  │  │   │
//! │  │   │  units    │  │  events   │  │  focus    │  │ fallback  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO RENDERING • PURE FUNCTIONS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ ProductPersistence                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  tally-db (Database Layer)                      │   │
//! │  │               SQLite snapshot, migrations, seed                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`product`] - Product, ids, discrepancy
//! - [`units`] - Carton/stick conversion
//! - [`store`] - InventoryStore, the only mutator
//! - [`search`] - Name filter
//! - [`focus`] - Next/previous field navigation
//! - [`symbology`] - Barcode type selection and render fallback
//! - [`events`] - Change notifications
//! - [`persistence`] - Storage collaborator trait
//! - [`report`] - Reconciliation summary
//! - [`input`] - Lenient count parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::InventoryStore;
//!
//! let mut store = InventoryStore::new();
//! let id = store.add("Marlboro Gold", "88011745").unwrap().id();
//!
//! store.set_registered_units(id, 50).unwrap();
//! store.set_warehouse_cartons(id, 3).unwrap(); // 30 sticks
//! store.set_storefront_units(id, 15).unwrap();
//!
//! // registered - (warehouse + storefront)
//! assert_eq!(store.get(id).unwrap().discrepancy(), 5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod focus;
pub mod input;
pub mod persistence;
pub mod product;
pub mod report;
pub mod search;
pub mod store;
pub mod symbology;
pub mod units;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, PersistenceError, ValidationError};
pub use events::{InventoryEvent, ResetScope, SubscriptionId};
pub use focus::{FieldKind, FocusTarget};
pub use persistence::{MemoryPersistence, ProductPersistence};
pub use product::{BarcodeAsset, DiscrepancyStatus, Product, ProductId, ProductRecord};
pub use report::{InventorySummary, ReportLine};
pub use search::NameQuery;
pub use store::InventoryStore;
pub use symbology::{BarcodeRenderer, RenderError, RenderedBarcode, Symbology};
pub use units::UNITS_PER_CARTON;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name shown in report headers when none is configured.
pub const DEFAULT_STORE_NAME: &str = "Tally";
