//! # Barcode Worker
//!
//! Renders barcodes off the interactive path and drops stale results.
//!
//! ## Request Lifecycle
//! ```text
//! render(id)
//!   │  read lock: capture (payload, barcode_asset)
//!   ├─ cache hit for asset? ──► Ready (no render)
//!   ▼
//! spawn_blocking(generate(renderer, payload))   ◄── abortable via cancel(id)
//!   │
//!   ▼
//! read lock: product still carries the captured asset?
//!   ├─ yes ──► cache + Ready
//!   └─ no  ──► Stale (result discarded)
//! ```
//!
//! The asset key changes whenever the payload changes, so it doubles as the
//! request's generation token. There is no timeout.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::InventoryState;
use tally_core::symbology::generate;
use tally_core::{BarcodeAsset, BarcodeRenderer, CoreError, ProductId, RenderedBarcode};

/// What a render request produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BarcodeOutcome {
    /// The image matches the product's current payload.
    Ready {
        asset: BarcodeAsset,
        #[serde(skip)]
        rendered: RenderedBarcode,
    },
    /// The payload changed (or the product was deleted) while rendering.
    Stale,
    /// The request was cancelled before it finished.
    Cancelled,
}

type Cache = HashMap<BarcodeAsset, RenderedBarcode>;

/// Pending render for one product, tagged with the request that owns it.
struct InFlight {
    request: u64,
    handle: AbortHandle,
}

type InFlightMap = HashMap<ProductId, InFlight>;

pub struct BarcodeState {
    renderer: Arc<dyn BarcodeRenderer>,
    cache: Mutex<Cache>,
    in_flight: Mutex<InFlightMap>,
    next_request: AtomicU64,
}

impl std::fmt::Debug for BarcodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeState").finish_non_exhaustive()
    }
}

impl BarcodeState {
    pub fn new(renderer: Arc<dyn BarcodeRenderer>) -> Self {
        BarcodeState {
            renderer,
            cache: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            next_request: AtomicU64::new(0),
        }
    }

    /// Renders the current barcode of product `id`.
    ///
    /// A newer request for the same product aborts an older one that has
    /// not started yet.
    pub async fn render(
        &self,
        inventory: &InventoryState,
        id: ProductId,
    ) -> Result<BarcodeOutcome, ApiError> {
        let (payload, asset) = inventory
            .read(|s| s.get(id).map(|p| (p.barcode().to_string(), p.barcode_asset())))?
            .ok_or(CoreError::ProductNotFound(id))?;

        let cached = self.lock_cache()?.get(&asset).cloned();
        if let Some(rendered) = cached {
            debug!(id = %id, asset = %asset, "Barcode cache hit");
            return Ok(BarcodeOutcome::Ready { asset, rendered });
        }

        let renderer = Arc::clone(&self.renderer);
        let task = tokio::task::spawn_blocking(move || generate(&*renderer, &payload));

        let request = self.next_request.fetch_add(1, Ordering::Relaxed);
        let entry = InFlight {
            request,
            handle: task.abort_handle(),
        };
        let previous = self.lock_in_flight()?.insert(id, entry);
        if let Some(previous) = previous {
            previous.handle.abort();
        }

        let joined = task.await;
        {
            // A newer request may have replaced this one; leave its handle alone.
            let mut in_flight = self.lock_in_flight()?;
            if in_flight.get(&id).map(|f| f.request) == Some(request) {
                in_flight.remove(&id);
            }
        }

        let rendered = match joined {
            Ok(result) => result?,
            Err(e) if e.is_cancelled() => {
                debug!(id = %id, "Barcode render cancelled");
                return Ok(BarcodeOutcome::Cancelled);
            }
            Err(e) => return Err(ApiError::internal(format!("Barcode worker failed: {e}"))),
        };

        let current = inventory.read(|s| s.get(id).map(|p| p.barcode_asset()))?;
        if current != Some(asset) {
            info!(id = %id, asset = %asset, "Discarding stale barcode render");
            return Ok(BarcodeOutcome::Stale);
        }

        self.lock_cache()?.insert(asset, rendered.clone());
        Ok(BarcodeOutcome::Ready { asset, rendered })
    }

    /// Aborts the pending render for `id`. Returns false if none was pending.
    pub fn cancel(&self, id: ProductId) -> Result<bool, ApiError> {
        Ok(match self.lock_in_flight()?.remove(&id) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        })
    }

    /// Drops cached images whose asset no product carries any more.
    pub fn prune(&self, inventory: &InventoryState) -> Result<usize, ApiError> {
        let live: Vec<BarcodeAsset> =
            inventory.read(|s| s.products().iter().map(|p| p.barcode_asset()).collect())?;

        let mut cache = self.lock_cache()?;
        let before = cache.len();
        cache.retain(|asset, _| live.contains(asset));
        Ok(before - cache.len())
    }

    pub fn cached_count(&self) -> Result<usize, ApiError> {
        Ok(self.lock_cache()?.len())
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, Cache>, ApiError> {
        self.cache
            .lock()
            .map_err(|_| ApiError::internal("Barcode cache is unavailable"))
    }

    fn lock_in_flight(&self) -> Result<std::sync::MutexGuard<'_, InFlightMap>, ApiError> {
        self.in_flight
            .lock()
            .map_err(|_| ApiError::internal("Barcode worker is unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::render::ModuleRenderer;
    use std::sync::mpsc;
    use tally_core::{InventoryStore, RenderError, Symbology};

    /// Announces each render, then blocks until the test releases it.
    struct GatedRenderer {
        started: Mutex<mpsc::Sender<()>>,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl BarcodeRenderer for GatedRenderer {
        fn render(&self, payload: &str, symbology: Symbology) -> Result<Vec<u8>, RenderError> {
            let _ = self.started.lock().unwrap().send(());
            self.gate
                .lock()
                .unwrap()
                .recv()
                .map_err(|_| RenderError::new(symbology, "gate closed"))?;
            Ok(payload.as_bytes().to_vec())
        }
    }

    fn inventory_with(name: &str, barcode: &str) -> (InventoryState, ProductId) {
        let mut store = InventoryStore::new();
        let id = store.add(name, barcode).unwrap().id();
        (InventoryState::new(store), id)
    }

    #[tokio::test]
    async fn test_render_caches_by_asset() {
        let (inventory, id) = inventory_with("Marlboro Gold", "88011745");
        let barcodes = BarcodeState::new(Arc::new(ModuleRenderer::new(1, 1)));

        let first = barcodes.render(&inventory, id).await.unwrap();
        let BarcodeOutcome::Ready { rendered, .. } = &first else {
            panic!("expected a ready barcode, got {first:?}");
        };
        assert_eq!(rendered.symbology, Symbology::Ean8);
        assert_eq!(barcodes.cached_count().unwrap(), 1);

        let second = barcodes.render(&inventory, id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(barcodes.cached_count().unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_payload_change_during_render_is_stale() {
        let (inventory, id) = inventory_with("Esse Change", "8801116034192");
        let (started_tx, started_rx) = mpsc::channel();
        let (release, gate) = mpsc::channel();
        let barcodes = Arc::new(BarcodeState::new(Arc::new(GatedRenderer {
            started: Mutex::new(started_tx),
            gate: Mutex::new(gate),
        })));

        let pending = {
            let barcodes = Arc::clone(&barcodes);
            let inventory = inventory.clone();
            tokio::spawn(async move { barcodes.render(&inventory, id).await })
        };

        // Change the payload while the render is blocked
        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();
        inventory
            .write(|s| s.update(id, "Esse Change", "8801116011541"))
            .unwrap();
        release.send(()).unwrap();

        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome, BarcodeOutcome::Stale);
        assert_eq!(barcodes.cached_count().unwrap(), 0);
    }

    /// Blocks on the blocking pool until the next render has started.
    async fn wait_started(rx: mpsc::Receiver<()>) -> mpsc::Receiver<()> {
        tokio::task::spawn_blocking(move || {
            rx.recv().unwrap();
            rx
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_older_request_keeps_newer_handle() {
        let (inventory, id) = inventory_with("Esse Change", "8801116034192");
        let (started_tx, started_rx) = mpsc::channel();
        let (release, gate) = mpsc::channel();
        let barcodes = Arc::new(BarcodeState::new(Arc::new(GatedRenderer {
            started: Mutex::new(started_tx),
            gate: Mutex::new(gate),
        })));

        let spawn_render = || {
            let barcodes = Arc::clone(&barcodes);
            let inventory = inventory.clone();
            tokio::spawn(async move { barcodes.render(&inventory, id).await })
        };

        let first = spawn_render();
        let started_rx = wait_started(started_rx).await;
        let second = spawn_render();
        let _started_rx = wait_started(started_rx).await;

        // The second request owns the slot once it has registered
        while barcodes.in_flight.lock().unwrap().get(&id).map(|f| f.request) != Some(1) {
            tokio::task::yield_now().await;
        }

        release.send(()).unwrap();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, BarcodeOutcome::Ready { .. }));

        assert!(barcodes.cancel(id).unwrap());

        release.send(()).unwrap();
        second.await.unwrap().unwrap();
        assert!(!barcodes.cancel(id).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (inventory, _) = inventory_with("Raison", "88020761");
        let barcodes = BarcodeState::new(Arc::new(ModuleRenderer::new(1, 1)));
        let err = barcodes.render(&inventory, ProductId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_terminal_failure_maps_to_barcode_error() {
        let (inventory, id) = inventory_with("Loose pouch", "파우치");
        let barcodes = BarcodeState::new(Arc::new(ModuleRenderer::new(1, 1)));
        let err = barcodes.render(&inventory, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BarcodeError);
    }

    #[tokio::test]
    async fn test_prune_drops_replaced_assets() {
        let (inventory, id) = inventory_with("Marlboro Gold", "88011745");
        let barcodes = BarcodeState::new(Arc::new(ModuleRenderer::new(1, 1)));
        barcodes.render(&inventory, id).await.unwrap();

        inventory
            .write(|s| s.update(id, "Marlboro Gold", "8801116000194"))
            .unwrap();
        assert_eq!(barcodes.prune(&inventory).unwrap(), 1);
        assert_eq!(barcodes.cached_count().unwrap(), 0);
        assert!(!barcodes.cancel(id).unwrap());
    }
}
