//! # Persistence Collaborator
//!
//! The store never touches storage itself. A [`ProductPersistence`]
//! implementation loads and saves the full product list as a snapshot.
//!
//! ```text
//! ┌──────────────┐  snapshot()   ┌─────────────────────┐   save_all   ┌────────┐
//! │InventoryStore│ ────────────► │ ProductPersistence  │ ───────────► │ SQLite │
//! │              │ ◄──────────── │ (tally-db / memory) │ ◄─────────── │        │
//! └──────────────┘ from_products └─────────────────────┘   load_all   └────────┘
//! ```
//!
//! Only successful mutations should be persisted. Failures come back as
//! [`PersistenceError`] and are never retried here.

use std::future::Future;
use std::sync::Mutex;

use crate::error::{CoreResult, PersistenceError};
use crate::product::{Product, ProductRecord};
use crate::store::InventoryStore;

/// Loads and saves the complete product list.
pub trait ProductPersistence: Send + Sync {
    /// Every stored product. Order of the returned list is not significant.
    fn load_all(&self) -> impl Future<Output = Result<Vec<Product>, PersistenceError>> + Send;

    /// Replaces the stored list with `products`.
    fn save_all(
        &self,
        products: &[Product],
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Builds a store from whatever `persistence` holds.
pub async fn load_store<P>(persistence: &P) -> CoreResult<InventoryStore>
where
    P: ProductPersistence + ?Sized,
{
    let products = persistence.load_all().await?;
    InventoryStore::from_products(products)
}

/// Saves the store's current snapshot.
pub async fn save_store<P>(persistence: &P, store: &InventoryStore) -> CoreResult<()>
where
    P: ProductPersistence + ?Sized,
{
    persistence.save_all(store.products()).await?;
    Ok(())
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// Keeps records in memory. Backs tests and the counter app's in-memory mode.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: Mutex<Vec<ProductRecord>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given records already "stored".
    pub fn with_records(records: Vec<ProductRecord>) -> Self {
        MemoryPersistence {
            records: Mutex::new(records),
        }
    }

    /// Copy of what is currently stored.
    pub fn records(&self) -> Result<Vec<ProductRecord>, PersistenceError> {
        self.records
            .lock()
            .map(|r| r.clone())
            .map_err(|_| PersistenceError::new("memory store lock poisoned"))
    }
}

impl ProductPersistence for MemoryPersistence {
    async fn load_all(&self) -> Result<Vec<Product>, PersistenceError> {
        self.records()?
            .into_iter()
            .map(|record| Product::restore(record).map_err(|e| PersistenceError::new(e.to_string())))
            .collect()
    }

    async fn save_all(&self, products: &[Product]) -> Result<(), PersistenceError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| PersistenceError::new("memory store lock poisoned"))?;
        *guard = products.iter().map(ProductRecord::from).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    struct FailingPersistence;

    impl ProductPersistence for FailingPersistence {
        async fn load_all(&self) -> Result<Vec<Product>, PersistenceError> {
            Err(PersistenceError::new("disk unavailable"))
        }

        async fn save_all(&self, _products: &[Product]) -> Result<(), PersistenceError> {
            Err(PersistenceError::new("disk unavailable"))
        }
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let persistence = MemoryPersistence::new();

        let mut store = InventoryStore::new();
        let gold = store.add("Marlboro Gold", "88011745").unwrap().id();
        let esse = store.add("Esse Change", "8801116034192").unwrap().id();
        store.set_warehouse_cartons(gold, 4).unwrap();
        store.set_registered_units(esse, 25).unwrap();
        store.move_to(esse, 0).unwrap();

        save_store(&persistence, &store).await.unwrap();
        let reloaded = load_store(&persistence).await.unwrap();

        assert_eq!(reloaded.products(), store.products());
        assert_eq!(reloaded.products()[0].id(), esse);
        assert_eq!(reloaded.get(gold).unwrap().warehouse_units(), 40);
    }

    #[tokio::test]
    async fn test_load_from_empty_storage() {
        let store = load_store(&MemoryPersistence::new()).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_record_fails_load() {
        let mut store = InventoryStore::new();
        store.add("Raison", "88020761").unwrap();
        let mut record = ProductRecord::from(&store.products()[0]);
        record.warehouse_units = 15;

        let persistence = MemoryPersistence::with_records(vec![record]);
        let err = load_store(&persistence).await.unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_failures_surface_as_persistence_errors() {
        let err = load_store(&FailingPersistence).await.unwrap_err();
        assert_eq!(err.to_string(), "Persistence failed: disk unavailable");

        let store = InventoryStore::new();
        let err = save_store(&FailingPersistence, &store).await.unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
    }
}
