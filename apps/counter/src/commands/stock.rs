//! # Stock Commands
//!
//! Count entry and the reconciliation report.
//!
//! ## Count Fields
//! ```text
//! ┌──────────────┬──────────────────┬───────────────────────────────────┐
//! │ FieldKind    │ Typed unit       │ Stored as                         │
//! ├──────────────┼──────────────────┼───────────────────────────────────┤
//! │ Storefront   │ sticks/packs     │ units                             │
//! │ Warehouse    │ cartons          │ units (cartons × 10)              │
//! │ Registered   │ units            │ units                             │
//! └──────────────┴──────────────────┴───────────────────────────────────┘
//! ```
//!
//! Text that is not a non-negative integer is stored as 0. That is never an
//! error; the response echoes the value that was stored so the field can
//! redraw it.

use serde::Serialize;
use tracing::{debug, info};

use super::parse_id;
use super::product::ProductDto;
use crate::error::ApiError;
use crate::state::{DbState, InventoryState};
use tally_core::input::entry_text;
use tally_core::{DiscrepancyStatus, FocusTarget, InventorySummary, ReportLine};

/// What a count field shows after an entry was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub target: FocusTarget,
    /// Stored value in the field's display unit.
    pub value: u32,
    /// Field text to redraw; empty for zero.
    pub text: String,
    pub product: ProductDto,
}

/// Reconciliation report: visible rows plus store-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub lines: Vec<ReportLine>,
    pub summary: InventorySummary,
}

impl ReportResponse {
    /// Plain-text table for terminals and printouts.
    pub fn to_table(&self) -> String {
        let mut out = format!(
            "{:<24} {:>10} {:>14} {:>10} {:>11}\n",
            "name", "storefront", "warehouse(ctn)", "registered", "discrepancy"
        );
        for line in &self.lines {
            out.push_str(&format!(
                "{:<24} {:>10} {:>14} {:>10} {:>+11}  {}\n",
                line.name,
                line.storefront_units,
                line.warehouse_cartons,
                line.registered_units,
                line.discrepancy,
                status_label(line),
            ));
        }

        let s = &self.summary;
        out.push_str(&"─".repeat(74));
        out.push('\n');
        out.push_str(&format!(
            "{} products · {} balanced · {} shortage · {} overage · net {:+}\n",
            s.product_count, s.balanced, s.shortages, s.overages, s.net_discrepancy
        ));
        out
    }
}

fn status_label(line: &ReportLine) -> &'static str {
    match line.status {
        DiscrepancyStatus::Balanced => "balanced",
        DiscrepancyStatus::Shortage => "shortage",
        DiscrepancyStatus::Overage => "overage",
    }
}

/// Applies text typed into one count field.
pub async fn apply_entry(
    inventory: &InventoryState,
    db: &DbState,
    target: FocusTarget,
    text: String,
) -> Result<EntryResponse, ApiError> {
    debug!(id = %target.product_id, kind = ?target.kind, text = %text, "apply_entry command");

    let (value, product) = inventory.write(|s| {
        let value = s.apply_entry(target, &text)?;
        Ok((value, s.get(target.product_id).map(ProductDto::from)))
    })?;
    db.persist(inventory).await?;

    let product = product.ok_or_else(|| ApiError::not_found("Product", target.product_id))?;
    Ok(EntryResponse {
        target,
        value,
        text: entry_text(value),
        product,
    })
}

/// Adds one carton to a product's warehouse stock (the "+1 carton" button).
pub async fn increment_warehouse(
    inventory: &InventoryState,
    db: &DbState,
    product_id: String,
) -> Result<ProductDto, ApiError> {
    let id = parse_id(&product_id)?;

    let product = inventory.write(|s| {
        s.increment_warehouse_carton(id)?;
        Ok(s.get(id).map(ProductDto::from))
    })?;
    db.persist(inventory).await?;

    product.ok_or_else(|| ApiError::not_found("Product", id))
}

/// Zeroes warehouse stock on every product (start of a warehouse recount).
pub async fn reset_warehouse(
    inventory: &InventoryState,
    db: &DbState,
) -> Result<InventorySummary, ApiError> {
    let summary = inventory.write(|s| {
        s.reset_warehouse_only();
        Ok(s.summary())
    })?;
    db.persist(inventory).await?;

    info!(products = summary.product_count, "reset_warehouse complete");
    Ok(summary)
}

/// Zeroes every counter on every product (start of a full count).
pub async fn reset_all_stocks(
    inventory: &InventoryState,
    db: &DbState,
) -> Result<InventorySummary, ApiError> {
    let summary = inventory.write(|s| {
        s.reset_all_stocks();
        Ok(s.summary())
    })?;
    db.persist(inventory).await?;

    info!(products = summary.product_count, "reset_all_stocks complete");
    Ok(summary)
}

pub async fn get_summary(inventory: &InventoryState) -> Result<InventorySummary, ApiError> {
    inventory.read(|s| s.summary())
}

/// Report rows for products matching `query`. Totals always cover the whole
/// store.
pub async fn get_report(
    inventory: &InventoryState,
    query: String,
) -> Result<ReportResponse, ApiError> {
    inventory.read(|s| ReportResponse {
        lines: s.filtered(&query).into_iter().map(ReportLine::from).collect(),
        summary: s.summary(),
    })
}
