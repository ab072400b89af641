//! # Store Events
//!
//! Publish-on-change interface for [`crate::store::InventoryStore`].
//!
//! UI layers subscribe with a callback instead of holding references into the
//! store. Every successful mutation emits exactly one event after the change
//! is applied; failed mutations emit nothing.
//!
//! ```text
//! store.add(..) ──► Ok ──► emit(ProductAdded) ──► listener 1
//!                                             └─► listener 2
//! ```

use std::fmt;

use serde::Serialize;

use crate::focus::FieldKind;
use crate::product::ProductId;

/// Which counters a bulk reset touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetScope {
    /// Storefront, warehouse and registered.
    AllStock,
    /// Warehouse only (quick-entry screen).
    WarehouseOnly,
}

/// A change that has been applied to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryEvent {
    ProductAdded { id: ProductId },
    ProductUpdated { id: ProductId, barcode_changed: bool },
    StockChanged { id: ProductId, field: FieldKind },
    ProductDeleted { id: ProductId },
    Reordered,
    StocksReset { scope: ResetScope },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&InventoryEvent) + Send + Sync>;

/// Registered listeners, in subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub(crate) fn emit(&self, event: &InventoryEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.listeners.len())
            .finish()
    }
}
