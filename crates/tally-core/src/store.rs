//! # Inventory Store
//!
//! Owns every [`Product`] and is the only place products change.
//!
//! ## Invariants (hold after every operation)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (a) ids are distinct                                                   │
//! │  (b) names are distinct, compared case-insensitively                    │
//! │  (c) barcodes are distinct, compared exactly                            │
//! │  (d) counters are ≥ 0 (u32)                                             │
//! │  (e) `order` is a strict total order matching the last reorder          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products are kept in a `Vec` sorted by `order`, so display order is plain
//! iteration order.
//!
//! ## Operation Map
//! ```text
//! Detail / edit screens   ──► add, update, delete, move_to, move_within
//! Counting list           ──► filtered, apply_entry, set_*
//! Warehouse quick entry   ──► increment_warehouse_carton, reset_warehouse_only
//! Global reset            ──► reset_all_stocks
//! ```
//!
//! Every successful mutation publishes one [`InventoryEvent`] to subscribers.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::events::{InventoryEvent, ResetScope, Subscribers, SubscriptionId};
use crate::focus::{FieldKind, FocusTarget};
use crate::input::parse_count;
use crate::product::{Product, ProductId};
use crate::report::InventorySummary;
use crate::search::{self, NameQuery};

/// The collection of products for one retail point.
#[derive(Debug, Default)]
pub struct InventoryStore {
    products: Vec<Product>,
    subscribers: Subscribers,
}

impl InventoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from loaded products.
    ///
    /// ## Rules
    /// - Identity invariants (a)–(c) are re-checked; a violation rejects the
    ///   whole load
    /// - Products are sorted by `order` (ties broken by id), and renumbered
    ///   1..n only when stored orders collide
    pub fn from_products(mut products: Vec<Product>) -> CoreResult<Self> {
        let mut ids = HashSet::with_capacity(products.len());
        let mut names = HashSet::with_capacity(products.len());
        let mut barcodes = HashSet::with_capacity(products.len());

        for p in &products {
            if !ids.insert(p.id()) {
                return Err(ValidationError::DuplicateId { id: p.id() }.into());
            }
            if !names.insert(p.name().to_lowercase()) {
                return Err(ValidationError::DuplicateName {
                    name: p.name().to_string(),
                }
                .into());
            }
            if !barcodes.insert(p.barcode().to_string()) {
                return Err(ValidationError::DuplicateBarcode {
                    barcode: p.barcode().to_string(),
                }
                .into());
            }
        }

        products.sort_by_key(|p| (p.order(), p.id()));

        let mut store = InventoryStore {
            products,
            subscribers: Subscribers::default(),
        };

        let collides = store
            .products
            .windows(2)
            .any(|w| w[0].order() == w[1].order());
        if collides {
            debug!("Stored order values collide, renumbering");
            store.renumber();
        }

        info!(count = store.products.len(), "Inventory loaded");
        Ok(store)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All products in display order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    /// Owned copy of every product, for the persistence collaborator.
    pub fn snapshot(&self) -> Vec<Product> {
        self.products.clone()
    }

    /// Products whose name contains `query` (case-insensitive), in display
    /// order. An empty query returns everything.
    pub fn filtered(&self, query: &str) -> Vec<&Product> {
        search::filter(&self.products, query)
    }

    /// Ids of [`Self::filtered`], the sequence focus navigation walks.
    pub fn filtered_ids(&self, query: &str) -> Vec<ProductId> {
        self.filtered(query).iter().map(|p| p.id()).collect()
    }

    pub fn summary(&self) -> InventorySummary {
        InventorySummary::from_products(&self.products)
    }

    /// True when another product (other than `excluding`) already has this
    /// name, ignoring case.
    pub fn is_duplicate_name(&self, name: &str, excluding: Option<ProductId>) -> bool {
        let name = name.to_lowercase();
        self.products
            .iter()
            .filter(|p| Some(p.id()) != excluding)
            .any(|p| p.name().to_lowercase() == name)
    }

    /// True when another product (other than `excluding`) already has
    /// exactly this barcode.
    pub fn is_duplicate_barcode(&self, barcode: &str, excluding: Option<ProductId>) -> bool {
        self.products
            .iter()
            .filter(|p| Some(p.id()) != excluding)
            .any(|p| p.barcode() == barcode)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers a listener called after every successful mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&InventoryEvent) + Send + Sync + 'static,
    {
        self.subscribers.add(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    // =========================================================================
    // Identity Mutations
    // =========================================================================

    /// Adds a product with zero stock at the end of the manual order.
    ///
    /// ## Validation
    /// 1. Trim both inputs; either empty → `EmptyField`
    /// 2. Name taken (case-insensitive) → `DuplicateName`
    /// 3. Barcode taken (exact) → `DuplicateBarcode`
    pub fn add(&mut self, name: &str, barcode: &str) -> CoreResult<Product> {
        let (name, barcode) = self.validate_identity(name, barcode, None)?;

        let order = match self.next_order() {
            Some(order) => order,
            None => {
                debug!("Order values exhausted, renumbering before add");
                self.renumber();
                self.next_order().unwrap_or(u32::MAX)
            }
        };

        let product = Product::new(name, barcode, order);
        info!(id = %product.id(), name = %product.name(), order, "Product added");

        self.products.push(product.clone());
        self.subscribers
            .emit(&InventoryEvent::ProductAdded { id: product.id() });
        Ok(product)
    }

    /// Renames and/or re-barcodes a product.
    ///
    /// Uniqueness checks ignore the product itself. A changed barcode mints a
    /// new barcode asset, which invalidates any rendered image.
    pub fn update(&mut self, id: ProductId, name: &str, barcode: &str) -> CoreResult<()> {
        let index = self.index_of(id)?;
        let (name, barcode) = self.validate_identity(name, barcode, Some(id))?;

        let product = &mut self.products[index];
        product.rename(name);
        let barcode_changed = product.set_barcode(barcode);

        debug!(id = %id, barcode_changed, "Product updated");
        self.subscribers.emit(&InventoryEvent::ProductUpdated {
            id,
            barcode_changed,
        });
        Ok(())
    }

    /// Removes a product. Other products keep their `order` values.
    pub fn delete(&mut self, id: ProductId) -> CoreResult<Product> {
        let index = self.index_of(id)?;
        let removed = self.products.remove(index);

        info!(id = %id, name = %removed.name(), "Product deleted");
        self.subscribers.emit(&InventoryEvent::ProductDeleted { id });
        Ok(removed)
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// Moves a product to `new_index` in the full display order, then
    /// renumbers every product to its 1-based position.
    ///
    /// An index past the end moves the product to the end.
    pub fn move_to(&mut self, id: ProductId, new_index: usize) -> CoreResult<()> {
        let from = self.index_of(id)?;
        let to = new_index.min(self.products.len() - 1);

        let product = self.products.remove(from);
        self.products.insert(to, product);
        self.renumber();

        debug!(id = %id, from, to, "Product moved");
        self.subscribers.emit(&InventoryEvent::Reordered);
        Ok(())
    }

    /// Moves a product to `new_index` among the products visible for
    /// `query`.
    ///
    /// Visible products are permuted inside the slots they already occupy,
    /// so hidden products keep their relative positions. The whole sequence
    /// is then renumbered 1..n.
    ///
    /// Fails with `ProductNotFound` if the product is unknown or hidden by
    /// the query.
    pub fn move_within(&mut self, query: &str, id: ProductId, new_index: usize) -> CoreResult<()> {
        let query = NameQuery::new(query);
        let slots: Vec<usize> = self
            .products
            .iter()
            .enumerate()
            .filter(|(_, p)| query.matches(p))
            .map(|(i, _)| i)
            .collect();

        let from = slots
            .iter()
            .position(|&slot| self.products[slot].id() == id)
            .ok_or(CoreError::ProductNotFound(id))?;
        let to = new_index.min(slots.len() - 1);

        let mut visible: Vec<Product> = slots.iter().map(|&slot| self.products[slot].clone()).collect();
        let product = visible.remove(from);
        visible.insert(to, product);

        for (slot, product) in slots.into_iter().zip(visible) {
            self.products[slot] = product;
        }
        self.renumber();

        debug!(id = %id, from, to, "Product moved within filtered view");
        self.subscribers.emit(&InventoryEvent::Reordered);
        Ok(())
    }

    // =========================================================================
    // Stock Mutations
    // =========================================================================

    pub fn set_storefront_units(&mut self, id: ProductId, units: u32) -> CoreResult<()> {
        self.product_mut(id)?.set_storefront_units(units);
        self.stock_changed(id, FieldKind::Storefront);
        Ok(())
    }

    /// Sets warehouse stock from a carton count (1 carton = 10 units).
    pub fn set_warehouse_cartons(&mut self, id: ProductId, cartons: u32) -> CoreResult<()> {
        self.product_mut(id)?.set_warehouse_cartons(cartons);
        self.stock_changed(id, FieldKind::Warehouse);
        Ok(())
    }

    pub fn set_registered_units(&mut self, id: ProductId, units: u32) -> CoreResult<()> {
        self.product_mut(id)?.set_registered_units(units);
        self.stock_changed(id, FieldKind::Registered);
        Ok(())
    }

    /// Applies free-form text typed into a count field.
    ///
    /// Text that is not a non-negative integer counts as zero. Warehouse
    /// text is read as cartons. Returns the stored value in the field's
    /// display unit.
    pub fn apply_entry(&mut self, target: FocusTarget, text: &str) -> CoreResult<u32> {
        let value = parse_count(text);
        let id = target.product_id;
        match target.kind {
            FieldKind::Storefront => self.set_storefront_units(id, value)?,
            FieldKind::Warehouse => self.set_warehouse_cartons(id, value)?,
            FieldKind::Registered => self.set_registered_units(id, value)?,
        }

        let product = self.get(id).ok_or(CoreError::ProductNotFound(id))?;
        Ok(match target.kind {
            FieldKind::Storefront => product.storefront_units(),
            FieldKind::Warehouse => product.warehouse_cartons(),
            FieldKind::Registered => product.registered_units(),
        })
    }

    /// Adds one carton (10 units) of warehouse stock. Returns the new
    /// carton count.
    pub fn increment_warehouse_carton(&mut self, id: ProductId) -> CoreResult<u32> {
        let cartons = self.product_mut(id)?.add_warehouse_carton();
        self.stock_changed(id, FieldKind::Warehouse);
        Ok(cartons)
    }

    /// Zeroes every counter on every product. Identity and order are kept.
    pub fn reset_all_stocks(&mut self) {
        self.products.iter_mut().for_each(Product::reset_stock);
        info!(count = self.products.len(), "All stock counts reset");
        self.subscribers.emit(&InventoryEvent::StocksReset {
            scope: ResetScope::AllStock,
        });
    }

    /// Zeroes warehouse stock only.
    pub fn reset_warehouse_only(&mut self) {
        self.products.iter_mut().for_each(Product::reset_warehouse);
        info!(count = self.products.len(), "Warehouse counts reset");
        self.subscribers.emit(&InventoryEvent::StocksReset {
            scope: ResetScope::WarehouseOnly,
        });
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn index_of(&self, id: ProductId) -> CoreResult<usize> {
        self.products
            .iter()
            .position(|p| p.id() == id)
            .ok_or(CoreError::ProductNotFound(id))
    }

    fn product_mut(&mut self, id: ProductId) -> CoreResult<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(CoreError::ProductNotFound(id))
    }

    fn stock_changed(&self, id: ProductId, field: FieldKind) {
        debug!(id = %id, ?field, "Stock changed");
        self.subscribers
            .emit(&InventoryEvent::StockChanged { id, field });
    }

    /// One past the highest order, or `None` when that would overflow.
    fn next_order(&self) -> Option<u32> {
        self.products.last().map_or(Some(1), |p| p.order().checked_add(1))
    }

    fn renumber(&mut self) {
        for (position, product) in (1u32..).zip(self.products.iter_mut()) {
            product.set_order(position);
        }
    }

    fn validate_identity(
        &self,
        name: &str,
        barcode: &str,
        excluding: Option<ProductId>,
    ) -> Result<(String, String), ValidationError> {
        let name = name.trim();
        let barcode = barcode.trim();

        if name.is_empty() {
            return Err(ValidationError::EmptyField { field: "name" });
        }
        if barcode.is_empty() {
            return Err(ValidationError::EmptyField { field: "barcode" });
        }
        if self.is_duplicate_name(name, excluding) {
            return Err(ValidationError::DuplicateName {
                name: name.to_string(),
            });
        }
        if self.is_duplicate_barcode(barcode, excluding) {
            return Err(ValidationError::DuplicateBarcode {
                barcode: barcode.to_string(),
            });
        }

        Ok((name.to_string(), barcode.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
