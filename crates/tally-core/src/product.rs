//! # Product
//!
//! The canonical record for one stocked item.
//!
//! ## Type Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Product                                       │
//! │                                                                         │
//! │  id (UUID)            immutable, never reused                           │
//! │  name                 unique, case-insensitive                          │
//! │  barcode              unique, exact match                               │
//! │  barcode_asset        rendered-image identity, changes with barcode     │
//! │  storefront_units     sticks on the shelf                               │
//! │  warehouse_units      sticks in the back room (always whole cartons)    │
//! │  registered_units     what the register system thinks we have          │
//! │  order                manual display position                           │
//! │                                                                         │
//! │  discrepancy = registered - (warehouse + storefront)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields are private: the only way to change a product is through
//! [`crate::store::InventoryStore`], which keeps the identity and ordering
//! rules intact. Storage layers go through [`ProductRecord`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::units::{self, UNITS_PER_CARTON};

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque product identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        ProductId(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        ProductId(uuid)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(ProductId)
    }
}

/// Identity of the rendered barcode image for a product.
///
/// A new asset key is minted every time the barcode payload changes, so a
/// cached image (or an in-flight render) keyed by the old asset is
/// recognisably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BarcodeAsset(Uuid);

impl BarcodeAsset {
    pub fn new() -> Self {
        BarcodeAsset(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        BarcodeAsset(uuid)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BarcodeAsset {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BarcodeAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "custom_{}", self.0)
    }
}

// =============================================================================
// Discrepancy Status
// =============================================================================

/// How the physical count compares to the registered count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DiscrepancyStatus {
    /// Physical stock matches the register.
    Balanced,
    /// The register says we should have more than we counted.
    Shortage,
    /// We counted more than the register knows about.
    Overage,
}

impl DiscrepancyStatus {
    pub fn from_discrepancy(discrepancy: i64) -> Self {
        match discrepancy {
            0 => DiscrepancyStatus::Balanced,
            d if d > 0 => DiscrepancyStatus::Shortage,
            _ => DiscrepancyStatus::Overage,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A stocked item with its three counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    id: ProductId,
    name: String,
    barcode: String,
    barcode_asset: BarcodeAsset,
    storefront_units: u32,
    warehouse_units: u32,
    registered_units: u32,
    order: u32,
}

impl Product {
    /// Builds a new product with zero stock. Callers have already trimmed
    /// and validated `name` and `barcode`.
    pub(crate) fn new(name: String, barcode: String, order: u32) -> Self {
        Product {
            id: ProductId::new(),
            name,
            barcode,
            barcode_asset: BarcodeAsset::new(),
            storefront_units: 0,
            warehouse_units: 0,
            registered_units: 0,
            order,
        }
    }

    /// Rebuilds a product from a stored record.
    ///
    /// ## Rules
    /// - `name` and `barcode` must be non-empty after trimming
    /// - `warehouse_units` must be a whole number of cartons
    pub fn restore(record: ProductRecord) -> Result<Self, ValidationError> {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField { field: "name" });
        }

        let barcode = record.barcode.trim();
        if barcode.is_empty() {
            return Err(ValidationError::EmptyField { field: "barcode" });
        }

        if !units::is_whole_cartons(record.warehouse_units) {
            return Err(ValidationError::InvalidWarehouseUnits {
                units: record.warehouse_units,
                per_carton: UNITS_PER_CARTON,
            });
        }

        Ok(Product {
            id: record.id,
            name: name.to_string(),
            barcode: barcode.to_string(),
            barcode_asset: record.barcode_asset,
            storefront_units: record.storefront_units,
            warehouse_units: record.warehouse_units,
            registered_units: record.registered_units,
            order: record.order,
        })
    }

    #[inline]
    pub fn id(&self) -> ProductId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    #[inline]
    pub fn barcode_asset(&self) -> BarcodeAsset {
        self.barcode_asset
    }

    #[inline]
    pub fn storefront_units(&self) -> u32 {
        self.storefront_units
    }

    /// Warehouse stock in sticks.
    #[inline]
    pub fn warehouse_units(&self) -> u32 {
        self.warehouse_units
    }

    /// Warehouse stock in cartons, as shown to the operator.
    #[inline]
    pub fn warehouse_cartons(&self) -> u32 {
        units::to_cartons(self.warehouse_units)
    }

    #[inline]
    pub fn registered_units(&self) -> u32 {
        self.registered_units
    }

    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Everything physically counted: warehouse plus storefront.
    pub fn physical_units(&self) -> i64 {
        i64::from(self.warehouse_units) + i64::from(self.storefront_units)
    }

    /// `registered - (warehouse + storefront)`.
    ///
    /// Positive means a shortage to investigate, negative an overage.
    pub fn discrepancy(&self) -> i64 {
        i64::from(self.registered_units) - self.physical_units()
    }

    pub fn discrepancy_status(&self) -> DiscrepancyStatus {
        DiscrepancyStatus::from_discrepancy(self.discrepancy())
    }

    // -------------------------------------------------------------------------
    // Store-only mutators
    // -------------------------------------------------------------------------

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    /// Replaces the barcode payload. Returns true (and mints a new asset key)
    /// when the payload actually changed.
    pub(crate) fn set_barcode(&mut self, barcode: String) -> bool {
        if self.barcode == barcode {
            return false;
        }
        self.barcode = barcode;
        self.barcode_asset = BarcodeAsset::new();
        true
    }

    pub(crate) fn set_storefront_units(&mut self, units: u32) {
        self.storefront_units = units;
    }

    pub(crate) fn set_warehouse_cartons(&mut self, cartons: u32) {
        self.warehouse_units = units::from_cartons(cartons);
    }

    /// Adds one carton and returns the new carton count.
    pub(crate) fn add_warehouse_carton(&mut self) -> u32 {
        let cartons = self.warehouse_cartons().saturating_add(1);
        self.set_warehouse_cartons(cartons);
        self.warehouse_cartons()
    }

    pub(crate) fn set_registered_units(&mut self, units: u32) {
        self.registered_units = units;
    }

    pub(crate) fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    pub(crate) fn reset_stock(&mut self) {
        self.storefront_units = 0;
        self.warehouse_units = 0;
        self.registered_units = 0;
    }

    pub(crate) fn reset_warehouse(&mut self) {
        self.warehouse_units = 0;
    }
}

// =============================================================================
// Product Record
// =============================================================================

/// Flat, lossless storage form of a [`Product`].
///
/// Persistence layers read and write this; [`Product::restore`] turns it
/// back into a validated product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub barcode: String,
    pub barcode_asset: BarcodeAsset,
    pub storefront_units: u32,
    pub warehouse_units: u32,
    pub registered_units: u32,
    pub order: u32,
}

impl From<&Product> for ProductRecord {
    fn from(p: &Product) -> Self {
        ProductRecord {
            id: p.id,
            name: p.name.clone(),
            barcode: p.barcode.clone(),
            barcode_asset: p.barcode_asset,
            storefront_units: p.storefront_units,
            warehouse_units: p.warehouse_units,
            registered_units: p.registered_units,
            order: p.order,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
