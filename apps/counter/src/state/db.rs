//! # Database State
//!
//! Persists the inventory snapshot after successful mutations.
//!
//! ```text
//! command ──► InventoryState::write(..) ──ok──► DbState::persist(&inventory)
//!                                                 │ save lock
//!                                                 ├─ snapshot (read lock)
//!                                                 └─ save_all
//! ```
//!
//! The snapshot is taken while holding the save lock, so when two commands
//! race the one that saves last also saw the newest state.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ApiError;
use crate::state::InventoryState;
use tally_core::persistence::load_store;
use tally_core::{InventoryStore, MemoryPersistence, Product, ProductPersistence};
use tally_db::Database;

#[derive(Debug)]
enum Backend {
    Sqlite(Database),
    Memory(MemoryPersistence),
}

#[derive(Debug)]
pub struct DbState {
    backend: Backend,
    save_lock: Mutex<()>,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState {
            backend: Backend::Sqlite(db),
            save_lock: Mutex::new(()),
        }
    }

    /// Keeps snapshots in memory only.
    pub fn in_memory() -> Self {
        DbState {
            backend: Backend::Memory(MemoryPersistence::new()),
            save_lock: Mutex::new(()),
        }
    }

    /// The SQLite handle, if this state is database-backed.
    pub fn database(&self) -> Option<&Database> {
        match &self.backend {
            Backend::Sqlite(db) => Some(db),
            Backend::Memory(_) => None,
        }
    }

    /// Loads the stored inventory.
    pub async fn load(&self) -> Result<InventoryStore, ApiError> {
        let store = match &self.backend {
            Backend::Sqlite(db) => load_store(&db.products()).await?,
            Backend::Memory(mem) => load_store(mem).await?,
        };
        Ok(store)
    }

    /// When the snapshot was last written. Always `None` in memory mode.
    pub async fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>, ApiError> {
        match &self.backend {
            Backend::Sqlite(db) => Ok(db.products().last_saved_at().await?),
            Backend::Memory(_) => Ok(None),
        }
    }

    /// Saves the current inventory snapshot.
    pub async fn persist(&self, inventory: &InventoryState) -> Result<(), ApiError> {
        let _guard = self.save_lock.lock().await;
        let snapshot = inventory.read(InventoryStore::snapshot)?;
        self.save(&snapshot).await?;
        debug!(count = snapshot.len(), "Inventory persisted");
        Ok(())
    }

    async fn save(&self, products: &[Product]) -> Result<(), ApiError> {
        match &self.backend {
            Backend::Sqlite(db) => db.products().save_all(products).await?,
            Backend::Memory(mem) => mem
                .save_all(products)
                .await
                .map_err(tally_core::CoreError::from)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_db::DbConfig;

    async fn seeded(db: &DbState) -> InventoryState {
        let inventory = InventoryState::new(db.load().await.unwrap());
        inventory
            .write(|s| {
                s.add("Marlboro Gold", "88011745")?;
                s.add("Raison Black", "88020761")
            })
            .unwrap();
        inventory
    }

    #[tokio::test]
    async fn test_memory_persist_round_trip() {
        let db = DbState::in_memory();
        let inventory = seeded(&db).await;
        db.persist(&inventory).await.unwrap();

        let reloaded = db.load().await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(db.database().is_none());
        assert_eq!(db.last_saved_at().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_persist_round_trip() {
        let db = DbState::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let inventory = seeded(&db).await;
        assert_eq!(db.last_saved_at().await.unwrap(), None);
        db.persist(&inventory).await.unwrap();
        assert!(db.last_saved_at().await.unwrap().is_some());

        let reloaded = db.load().await.unwrap();
        let expected = inventory.read(InventoryStore::snapshot).unwrap();
        assert_eq!(reloaded.products(), expected.as_slice());
    }
}
