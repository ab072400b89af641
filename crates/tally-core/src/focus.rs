//! # Focus Sequencing
//!
//! Next/previous navigation between count fields on the counting screen.
//!
//! Navigation keeps the field kind and walks the displayed product list, so
//! an operator can type every storefront count top to bottom without
//! touching the screen:
//!
//! ```text
//!              Storefront   Warehouse   Registered
//!  Product A   [  12  ]     [  3  ]     [ 150 ]
//!                 │ next
//!                 ▼
//!  Product B   [  ▮   ]     [     ]     [     ]
//! ```
//!
//! Everything here is a pure function of the displayed id sequence and the
//! current target. Nothing is stored.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::product::ProductId;

/// The three count fields of a product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FieldKind {
    Storefront,
    Warehouse,
    Registered,
}

/// One focusable input: a field kind on a specific product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FocusTarget {
    pub kind: FieldKind,
    pub product_id: ProductId,
}

impl FocusTarget {
    pub fn new(kind: FieldKind, product_id: ProductId) -> Self {
        FocusTarget { kind, product_id }
    }
}

fn position(sequence: &[ProductId], target: &FocusTarget) -> Option<usize> {
    sequence.iter().position(|id| *id == target.product_id)
}

/// True when the target's product is displayed and is not the last one.
pub fn can_move_next(sequence: &[ProductId], current: &FocusTarget) -> bool {
    matches!(position(sequence, current), Some(i) if i + 1 < sequence.len())
}

/// True when the target's product is displayed and is not the first one.
pub fn can_move_previous(sequence: &[ProductId], current: &FocusTarget) -> bool {
    matches!(position(sequence, current), Some(i) if i > 0)
}

/// Same field on the next displayed product; unchanged at the end or when
/// the product is not displayed.
pub fn next(sequence: &[ProductId], current: FocusTarget) -> FocusTarget {
    match position(sequence, &current) {
        Some(i) if i + 1 < sequence.len() => FocusTarget::new(current.kind, sequence[i + 1]),
        _ => current,
    }
}

/// Same field on the previous displayed product; unchanged at the start or
/// when the product is not displayed.
pub fn previous(sequence: &[ProductId], current: FocusTarget) -> FocusTarget {
    match position(sequence, &current) {
        Some(i) if i > 0 => FocusTarget::new(current.kind, sequence[i - 1]),
        _ => current,
    }
}
