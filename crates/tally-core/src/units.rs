//! # Stock Units
//!
//! Conversion between cartons (what the operator counts in the warehouse)
//! and sticks (the canonical unit every counter is stored in).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Warehouse entry: "3" cartons                                   │
//! │       │                                                         │
//! │       ▼  from_cartons(3)                                        │
//! │  warehouse_units = 30 sticks  (stored)                          │
//! │       │                                                         │
//! │       ▼  to_cartons(30)                                         │
//! │  Warehouse display: "3"                                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store only ever writes warehouse stock through [`from_cartons`], so
//! [`to_cartons`] is exact in practice. It still floor-divides so it stays a
//! total function over any `u32`.

/// Sticks per carton.
pub const UNITS_PER_CARTON: u32 = 10;

/// Largest carton count whose stick total still fits in a `u32`.
pub const MAX_CARTONS: u32 = u32::MAX / UNITS_PER_CARTON;

/// Converts a carton count into sticks.
///
/// Counts above [`MAX_CARTONS`] saturate at `MAX_CARTONS` so the result is
/// always a whole number of cartons.
///
/// ## Example
/// ```rust
/// use tally_core::units::from_cartons;
///
/// assert_eq!(from_cartons(3), 30);
/// assert_eq!(from_cartons(0), 0);
/// ```
#[inline]
pub const fn from_cartons(cartons: u32) -> u32 {
    let cartons = if cartons > MAX_CARTONS {
        MAX_CARTONS
    } else {
        cartons
    };
    cartons * UNITS_PER_CARTON
}

/// Converts sticks into whole cartons (floor division).
///
/// ## Example
/// ```rust
/// use tally_core::units::to_cartons;
///
/// assert_eq!(to_cartons(30), 3);
/// assert_eq!(to_cartons(39), 3);
/// ```
#[inline]
pub const fn to_cartons(units: u32) -> u32 {
    units / UNITS_PER_CARTON
}

/// Returns true when `units` is a whole number of cartons.
#[inline]
pub const fn is_whole_cartons(units: u32) -> bool {
    units % UNITS_PER_CARTON == 0
}
