//! # Inventory State
//!
//! Shares one [`InventoryStore`] between commands.
//!
//! ## Locking
//! The store sits behind `Arc<std::sync::RwLock<_>>`. A mutation runs as a
//! single closure under the write lock, so two concurrent
//! `increment_warehouse_carton` calls can never lose an update. The lock is
//! never held across an `.await`.
//!
//! ## Events
//! Store events are forwarded into a `tokio::sync::broadcast` channel so any
//! number of UI listeners can follow changes.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::warn;

use crate::error::ApiError;
use tally_core::{CoreError, InventoryEvent, InventoryStore};

/// Buffered events per receiver before lagging receivers skip ahead.
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct InventoryState {
    store: Arc<RwLock<InventoryStore>>,
    events: broadcast::Sender<InventoryEvent>,
}

impl InventoryState {
    /// Wraps `store` and bridges its events into the broadcast channel.
    pub fn new(mut store: InventoryStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let sender = events.clone();
        store.subscribe(move |event| {
            // No receivers is fine
            let _ = sender.send(event.clone());
        });

        InventoryState {
            store: Arc::new(RwLock::new(store)),
            events,
        }
    }

    /// New receiver for store events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.events.subscribe()
    }

    /// Runs `f` with shared access.
    pub fn read<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&InventoryStore) -> T,
    {
        let guard = self.store.read().map_err(|_| poisoned())?;
        Ok(f(&guard))
    }

    /// Runs `f` with exclusive access.
    pub fn write<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut InventoryStore) -> Result<T, CoreError>,
    {
        let mut guard = self.store.write().map_err(|_| poisoned())?;
        Ok(f(&mut guard)?)
    }
}

fn poisoned() -> ApiError {
    warn!("Inventory lock poisoned");
    ApiError::internal("Inventory state is unavailable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tally_core::FieldKind;

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let mut store = InventoryStore::new();
        let id = store.add("Marlboro Gold", "88011745").unwrap().id();
        let state = InventoryState::new(store);

        const THREADS: u32 = 8;
        const PER_THREAD: u32 = 25;

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let state = state.clone();
                thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        state.write(|s| s.increment_warehouse_carton(id)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let units = state
            .read(|s| s.get(id).map(|p| p.warehouse_units()))
            .unwrap()
            .unwrap();
        assert_eq!(units, 10 * THREADS * PER_THREAD);
    }

    #[tokio::test]
    async fn test_events_reach_broadcast_receivers() {
        let mut store = InventoryStore::new();
        let id = store.add("Esse Change", "8801116034192").unwrap().id();
        let state = InventoryState::new(store);
        let mut rx = state.subscribe();

        state.write(|s| s.set_storefront_units(id, 4)).unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            InventoryEvent::StockChanged {
                id,
                field: FieldKind::Storefront
            }
        );
    }

    #[test]
    fn test_core_errors_pass_through() {
        let state = InventoryState::new(InventoryStore::new());
        let err = state.write(|s| s.add("", "1")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }
}
