//! # State Module
//!
//! One state type per concern; each command takes only what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │  InventoryState  │ │     DbState      │ │    BarcodeState      │   │
//! │  │                  │ │                  │ │                      │   │
//! │  │  Arc<RwLock<     │ │  snapshot saves  │ │  spawn_blocking      │   │
//! │  │   InventoryStore │ │  (serialized)    │ │  renders + cache     │   │
//! │  │  >> + broadcast  │ │                  │ │  keyed by asset      │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • InventoryState: every mutation is one write-locked read-modify-write│
//! │  • DbState: saves are serialized so the newest snapshot lands last     │
//! │  • BarcodeState: results are applied only if the asset is unchanged    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod barcode;
mod db;
mod inventory;

pub use barcode::{BarcodeOutcome, BarcodeState};
pub use db::DbState;
pub use inventory::InventoryState;
