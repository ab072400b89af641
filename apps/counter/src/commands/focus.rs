//! # Focus Commands
//!
//! Enter/arrow navigation between count fields.
//!
//! ```text
//!              storefront   warehouse   registered
//! Esse One        [  ]        [  ]        [  ]
//! Esse Two        [  ]        [▓▓]  ◄── current
//! Esse Three      [  ]        [  ]        next_focus ──► same column, next row
//! ```
//!
//! The sequence is whatever the operator currently sees, i.e. the rows
//! matching `query` in manual order. Focus never wraps.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::InventoryState;
use tally_core::focus;
use tally_core::FocusTarget;

/// Current target and whether the arrow keys can move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub target: FocusTarget,
    pub can_move_next: bool,
    pub can_move_previous: bool,
}

fn describe(inventory: &InventoryState, query: &str, target: FocusTarget) -> Result<FocusState, ApiError> {
    let sequence = inventory.read(|s| s.filtered_ids(query))?;
    Ok(FocusState {
        target,
        can_move_next: focus::can_move_next(&sequence, &target),
        can_move_previous: focus::can_move_previous(&sequence, &target),
    })
}

pub async fn focus_state(
    inventory: &InventoryState,
    current: FocusTarget,
    query: String,
) -> Result<FocusState, ApiError> {
    describe(inventory, &query, current)
}

/// Same field on the next visible product.
pub async fn next_focus(
    inventory: &InventoryState,
    current: FocusTarget,
    query: String,
) -> Result<FocusState, ApiError> {
    let sequence = inventory.read(|s| s.filtered_ids(&query))?;
    let target = focus::next(&sequence, current);
    debug!(from = %current.product_id, to = %target.product_id, "next_focus");
    describe(inventory, &query, target)
}

/// Same field on the previous visible product.
pub async fn previous_focus(
    inventory: &InventoryState,
    current: FocusTarget,
    query: String,
) -> Result<FocusState, ApiError> {
    let sequence = inventory.read(|s| s.filtered_ids(&query))?;
    let target = focus::previous(&sequence, current);
    debug!(from = %current.product_id, to = %target.product_id, "previous_focus");
    describe(inventory, &query, target)
}
