//! # Product Commands
//!
//! Search, catalog editing and manual ordering.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator types "marl"                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_products("marl")                                               │
//! │       │  read lock                                                      │
//! │       ▼                                                                 │
//! │  InventoryStore::filtered ──► case-insensitive name match, by order    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<ProductDto>  (one row per product, counts + discrepancy)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reordering while a filter is active only shuffles the visible rows among
//! themselves; see [`move_product`].

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use super::parse_id;
use crate::error::ApiError;
use crate::state::{BarcodeState, DbState, InventoryState};
use tally_core::symbology::select_symbology;
use tally_core::{DiscrepancyStatus, NameQuery, Product, Symbology};

/// One counting row as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub barcode: String,
    /// Changes whenever the barcode does; the UI keys image caches on it.
    pub barcode_asset: String,
    pub storefront_units: u32,
    pub warehouse_cartons: u32,
    pub registered_units: u32,
    pub order: u32,
    /// `registered - (warehouse + storefront)`, in units.
    pub discrepancy: i64,
    pub status: DiscrepancyStatus,
    pub symbology: Option<Symbology>,
}

impl From<&Product> for ProductDto {
    fn from(p: &Product) -> Self {
        ProductDto {
            id: p.id().to_string(),
            name: p.name().to_string(),
            barcode: p.barcode().to_string(),
            barcode_asset: p.barcode_asset().to_string(),
            storefront_units: p.storefront_units(),
            warehouse_cartons: p.warehouse_cartons(),
            registered_units: p.registered_units(),
            order: p.order(),
            discrepancy: p.discrepancy(),
            status: p.discrepancy_status(),
            symbology: select_symbology(p.barcode()).ok(),
        }
    }
}

/// Result of a live uniqueness check while the operator edits a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheck {
    pub name_taken: bool,
    pub barcode_taken: bool,
}

/// Lists products whose name contains `query`, in manual order.
///
/// An empty (or whitespace) query lists everything.
pub async fn search_products(
    inventory: &InventoryState,
    query: String,
) -> Result<Vec<ProductDto>, ApiError> {
    let start = Instant::now();

    let dtos = inventory.read(|s| {
        s.filtered(&query)
            .into_iter()
            .map(ProductDto::from)
            .collect::<Vec<_>>()
    })?;

    debug!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = dtos.len(),
        query = %query.trim(),
        "search_products complete"
    );

    Ok(dtos)
}

pub async fn get_product(inventory: &InventoryState, id: String) -> Result<ProductDto, ApiError> {
    let id = parse_id(&id)?;
    inventory
        .read(|s| s.get(id).map(ProductDto::from))?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// Adds a product with zero stock at the end of the list.
pub async fn add_product(
    inventory: &InventoryState,
    db: &DbState,
    name: String,
    barcode: String,
) -> Result<ProductDto, ApiError> {
    debug!(name = %name, barcode = %barcode, "add_product command");

    let product = inventory.write(|s| s.add(&name, &barcode))?;
    db.persist(inventory).await?;

    Ok(ProductDto::from(&product))
}

/// Changes a product's name and barcode.
///
/// Cached images for a replaced barcode are dropped.
pub async fn update_product(
    inventory: &InventoryState,
    db: &DbState,
    barcodes: &BarcodeState,
    id: String,
    name: String,
    barcode: String,
) -> Result<ProductDto, ApiError> {
    let id = parse_id(&id)?;
    debug!(id = %id, name = %name, barcode = %barcode, "update_product command");

    let dto = inventory.write(|s| {
        s.update(id, &name, &barcode)?;
        Ok(s.get(id).map(ProductDto::from))
    })?;
    db.persist(inventory).await?;

    let pruned = barcodes.prune(inventory)?;
    if pruned > 0 {
        debug!(id = %id, pruned, "Dropped replaced barcode images");
    }

    dto.ok_or_else(|| ApiError::not_found("Product", id))
}

/// Removes a product and cancels any render still pending for it.
pub async fn delete_product(
    inventory: &InventoryState,
    db: &DbState,
    barcodes: &BarcodeState,
    id: String,
) -> Result<(), ApiError> {
    let id = parse_id(&id)?;

    let removed = inventory.write(|s| s.delete(id))?;
    db.persist(inventory).await?;

    barcodes.cancel(id)?;
    barcodes.prune(inventory)?;

    info!(id = %id, name = %removed.name(), "delete_product complete");
    Ok(())
}

/// Drags a product to `new_index`.
///
/// Without a query (or with a blank one) the index is a position in the full
/// list. With a query it is a position among the matching rows, and hidden
/// rows keep their places. Returns the rows visible for `query` afterwards.
pub async fn move_product(
    inventory: &InventoryState,
    db: &DbState,
    id: String,
    new_index: usize,
    query: Option<String>,
) -> Result<Vec<ProductDto>, ApiError> {
    let id = parse_id(&id)?;
    let query = query.unwrap_or_default();
    debug!(id = %id, new_index, query = %query, "move_product command");

    let visible = inventory.write(|s| {
        if NameQuery::new(&query).is_all() {
            s.move_to(id, new_index)?;
        } else {
            s.move_within(&query, id, new_index)?;
        }
        Ok(s.filtered(&query)
            .into_iter()
            .map(ProductDto::from)
            .collect::<Vec<_>>())
    })?;
    db.persist(inventory).await?;

    Ok(visible)
}

/// Reports whether `name` or `barcode` is already used by another product.
///
/// `excluding` is the id of the product being edited, if any.
pub async fn check_duplicate(
    inventory: &InventoryState,
    name: String,
    barcode: String,
    excluding: Option<String>,
) -> Result<DuplicateCheck, ApiError> {
    let excluding = excluding.as_deref().map(parse_id).transpose()?;

    inventory.read(|s| DuplicateCheck {
        name_taken: s.is_duplicate_name(name.trim(), excluding),
        barcode_taken: s.is_duplicate_barcode(barcode.trim(), excluding),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::render::ModuleRenderer;
    use std::sync::Arc;
    use tally_core::InventoryStore;

    struct Fixture {
        inventory: InventoryState,
        db: DbState,
        barcodes: BarcodeState,
    }

    fn fixture() -> Fixture {
        Fixture {
            inventory: InventoryState::new(InventoryStore::new()),
            db: DbState::in_memory(),
            barcodes: BarcodeState::new(Arc::new(ModuleRenderer::new(1, 1))),
        }
    }

    async fn add(f: &Fixture, name: &str, barcode: &str) -> ProductDto {
        add_product(&f.inventory, &f.db, name.into(), barcode.into())
            .await
            .unwrap()
    }

    fn names(rows: &[ProductDto]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_then_search() {
        let f = fixture();
        let dto = add(&f, "  Marlboro Gold ", "88011745").await;
        add(&f, "Esse Change", "8801116034192").await;

        assert_eq!(dto.name, "Marlboro Gold");
        assert_eq!(dto.order, 1);
        assert_eq!(dto.symbology, Some(Symbology::Ean8));
        assert_eq!(dto.status, DiscrepancyStatus::Balanced);

        let rows = search_products(&f.inventory, "MARL".into()).await.unwrap();
        assert_eq!(names(&rows), vec!["Marlboro Gold"]);

        let all = search_products(&f.inventory, "   ".into()).await.unwrap();
        assert_eq!(names(&all), vec!["Marlboro Gold", "Esse Change"]);

        let none = search_products(&f.inventory, "parliament".into()).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_add_persists_snapshot() {
        let f = fixture();
        add(&f, "Marlboro Gold", "88011745").await;

        let reloaded = f.db.load().await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.products()[0].name(), "Marlboro Gold");
    }

    #[tokio::test]
    async fn test_duplicate_add_is_rejected() {
        let f = fixture();
        add(&f, "Marlboro Gold", "88011745").await;

        let err = add_product(&f.inventory, &f.db, "marlboro gold".into(), "1".into())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);

        let err = add_product(&f.inventory, &f.db, "".into(), "2".into())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_update_changes_asset_only_with_barcode() {
        let f = fixture();
        let before = add(&f, "Raison", "88020761").await;

        let renamed = update_product(
            &f.inventory,
            &f.db,
            &f.barcodes,
            before.id.clone(),
            "Raison Black".into(),
            "88020761".into(),
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Raison Black");
        assert_eq!(renamed.barcode_asset, before.barcode_asset);

        let rebarcoded = update_product(
            &f.inventory,
            &f.db,
            &f.barcodes,
            before.id.clone(),
            "Raison Black".into(),
            "8801116000194".into(),
        )
        .await
        .unwrap();
        assert_ne!(rebarcoded.barcode_asset, before.barcode_asset);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let f = fixture();
        let dto = add(&f, "This Plus", "88002315").await;

        assert_eq!(get_product(&f.inventory, dto.id.clone()).await.unwrap(), dto);

        delete_product(&f.inventory, &f.db, &f.barcodes, dto.id.clone())
            .await
            .unwrap();
        let err = get_product(&f.inventory, dto.id.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = delete_product(&f.inventory, &f.db, &f.barcodes, dto.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(f.db.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_in_full_list_renumbers() {
        let f = fixture();
        let a = add(&f, "A Mild", "1001").await;
        add(&f, "B Mild", "1002").await;
        add(&f, "C Mild", "1003").await;

        let rows = move_product(&f.inventory, &f.db, a.id, 99, None).await.unwrap();
        assert_eq!(names(&rows), vec!["B Mild", "C Mild", "A Mild"]);
        assert_eq!(rows.iter().map(|r| r.order).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_move_with_query_keeps_hidden_rows_in_place() {
        let f = fixture();
        let a = add(&f, "Esse One", "2001").await;
        add(&f, "Marlboro Red", "2002").await;
        add(&f, "Esse Two", "2003").await;

        let rows = move_product(&f.inventory, &f.db, a.id, 1, Some("esse".into()))
            .await
            .unwrap();
        assert_eq!(names(&rows), vec!["Esse Two", "Esse One"]);

        let all = search_products(&f.inventory, String::new()).await.unwrap();
        assert_eq!(names(&all), vec!["Esse Two", "Marlboro Red", "Esse One"]);
    }

    #[tokio::test]
    async fn test_check_duplicate_excludes_self() {
        let f = fixture();
        let dto = add(&f, "Marlboro Gold", "88011745").await;

        let check = check_duplicate(&f.inventory, "MARLBORO GOLD".into(), "88011745".into(), None)
            .await
            .unwrap();
        assert_eq!(
            check,
            DuplicateCheck {
                name_taken: true,
                barcode_taken: true
            }
        );

        let check = check_duplicate(
            &f.inventory,
            "Marlboro Gold".into(),
            "88011745".into(),
            Some(dto.id),
        )
        .await
        .unwrap();
        assert!(!check.name_taken && !check.barcode_taken);
    }

    #[test]
    fn test_dto_shape() {
        let mut store = InventoryStore::new();
        let product = store.add("Esse Change", "8801116034192").unwrap();
        let json = serde_json::to_value(ProductDto::from(&product)).unwrap();

        assert_eq!(json["warehouseCartons"], 0);
        assert_eq!(json["status"], "balanced");
        assert_eq!(json["symbology"], "ean13");
        assert!(json["barcodeAsset"].is_string());
    }
}
