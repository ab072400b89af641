//! # Counter Commands
//!
//! Every operation the counting screen can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports, id parsing)
//! ├── product.rs  ◄─── Search, add/update/delete, reorder, duplicate checks
//! ├── stock.rs    ◄─── Count entry, carton increment, resets, report
//! ├── focus.rs    ◄─── Next/previous count field
//! └── barcode.rs  ◄─── Symbology lookup and background rendering
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  UI: apply_entry({ kind: "warehouse", productId }, "3")                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  InventoryState::write ──► InventoryStore::apply_entry  (write lock)   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  DbState::persist ──► snapshot saved in one transaction                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Result<EntryResponse, ApiError>  (camelCase JSON)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs. Mutating commands persist
//! after the in-memory change succeeds; a failed save is reported but the
//! change stays in memory and is written by the next successful save.

pub mod barcode;
pub mod focus;
pub mod product;
pub mod stock;

use crate::error::ApiError;
use tally_core::ProductId;

/// Parses a product id sent by the UI.
pub(crate) fn parse_id(id: &str) -> Result<ProductId, ApiError> {
    Ok(id.trim().parse::<ProductId>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_id() {
        let id = ProductId::new();
        assert_eq!(parse_id(&format!(" {id} ")).unwrap(), id);
        assert_eq!(parse_id("not-a-uuid").unwrap_err().code, ErrorCode::ValidationError);
    }
}
