//! # Product Repository
//!
//! Stores the product list as a whole-table snapshot.
//!
//! ## Save Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    DELETE FROM products                                                 │
//! │    INSERT row 1 .. row n   (sort_order, updated_at = now)               │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls back: the previous snapshot stays intact.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table is small (one shop's cigarette range), so rewriting it is
//! cheaper than tracking row-level changes.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::{
    BarcodeAsset, PersistenceError, Product, ProductId, ProductPersistence, ProductRecord,
};

/// A `products` row as SQLite returns it.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub barcode: String,
    pub barcode_asset: String,
    pub storefront_units: i64,
    pub warehouse_units: i64,
    pub registered_units: i64,
    pub sort_order: i64,
    pub updated_at: DateTime<Utc>,
}

fn counter(id: &str, column: &str, value: i64) -> DbResult<u32> {
    u32::try_from(value).map_err(|_| DbError::corrupt(id, format!("{column} out of range: {value}")))
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Product> {
        let id = row
            .id
            .parse::<ProductId>()
            .map_err(|e| DbError::corrupt(&row.id, e))?;
        let asset = row
            .barcode_asset
            .parse::<Uuid>()
            .map_err(|e| DbError::corrupt(&row.id, e))?;

        let record = ProductRecord {
            id,
            storefront_units: counter(&row.id, "storefront_units", row.storefront_units)?,
            warehouse_units: counter(&row.id, "warehouse_units", row.warehouse_units)?,
            registered_units: counter(&row.id, "registered_units", row.registered_units)?,
            order: counter(&row.id, "sort_order", row.sort_order)?,
            barcode_asset: BarcodeAsset::from_uuid(asset),
            name: row.name,
            barcode: row.barcode,
        };

        Product::restore(record).map_err(|e| DbError::corrupt(id.to_string(), e))
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let products = repo.load_all().await?;
/// repo.save_all(store.products()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Every stored product, in display order.
    ///
    /// A single corrupt row fails the whole load.
    pub async fn load_all(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                name,
                barcode,
                barcode_asset,
                storefront_units,
                warehouse_units,
                registered_units,
                sort_order,
                updated_at
            FROM products
            ORDER BY sort_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded product rows");
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Replaces the table contents with `products` in one transaction.
    pub async fn save_all(&self, products: &[Product]) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM products")
            .execute(&mut *tx)
            .await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, name, barcode, barcode_asset,
                    storefront_units, warehouse_units, registered_units,
                    sort_order, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(product.id().to_string())
            .bind(product.name())
            .bind(product.barcode())
            .bind(product.barcode_asset().as_uuid().to_string())
            .bind(i64::from(product.storefront_units()))
            .bind(i64::from(product.warehouse_units()))
            .bind(i64::from(product.registered_units()))
            .bind(i64::from(product.order()))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(count = products.len(), "Product snapshot saved");
        Ok(())
    }

    /// Number of stored products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// When the snapshot was last written, if ever.
    pub async fn last_saved_at(&self) -> DbResult<Option<DateTime<Utc>>> {
        let saved: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(updated_at) FROM products")
                .fetch_one(&self.pool)
                .await?;
        Ok(saved)
    }
}

impl ProductPersistence for ProductRepository {
    async fn load_all(&self) -> Result<Vec<Product>, PersistenceError> {
        Ok(ProductRepository::load_all(self).await?)
    }

    async fn save_all(&self, products: &[Product]) -> Result<(), PersistenceError> {
        Ok(ProductRepository::save_all(self, products).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use tally_core::persistence::{load_store, save_store};
    use tally_core::{CoreError, InventoryStore};

    async fn repo() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    fn sample_store() -> InventoryStore {
        let mut store = InventoryStore::new();
        let gold = store.add("Marlboro Gold", "88011745").unwrap().id();
        let esse = store.add("에쎄 체인지", "8801116034192").unwrap().id();
        store.add("Raison Black", "88020761").unwrap();

        store.set_storefront_units(gold, 12).unwrap();
        store.set_warehouse_cartons(gold, 3).unwrap();
        store.set_registered_units(gold, 50).unwrap();
        store.set_registered_units(esse, 7).unwrap();
        store.move_to(esse, 0).unwrap();
        store
    }

    #[tokio::test]
    async fn test_empty_database_loads_empty() {
        let repo = repo().await;
        assert!(repo.load_all().await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.last_saved_at().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let repo = repo().await;
        let store = sample_store();

        save_store(&repo, &store).await.unwrap();
        let reloaded = load_store(&repo).await.unwrap();

        assert_eq!(reloaded.products(), store.products());
        assert_eq!(repo.count().await.unwrap(), 3);
        assert!(repo.last_saved_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let repo = repo().await;
        let mut store = sample_store();
        save_store(&repo, &store).await.unwrap();

        let victim = store.products()[1].id();
        store.delete(victim).unwrap();
        save_store(&repo, &store).await.unwrap();

        let loaded = repo.load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|p| p.id() != victim));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_snapshot() {
        let repo = repo().await;
        let store = sample_store();
        save_store(&repo, &store).await.unwrap();

        // Same product twice violates the primary key mid-transaction
        let mut doubled = store.snapshot();
        doubled.push(doubled[0].clone());
        let err = repo.save_all(&doubled).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        assert_eq!(repo.load_all().await.unwrap(), store.snapshot());
    }

    #[tokio::test]
    async fn test_corrupt_row_fails_load() {
        let repo = repo().await;
        save_store(&repo, &sample_store()).await.unwrap();

        sqlx::query("UPDATE products SET barcode_asset = 'garbage'")
            .execute(&repo.pool)
            .await
            .unwrap();

        assert!(matches!(
            repo.load_all().await,
            Err(DbError::CorruptRow { .. })
        ));
        assert!(matches!(
            load_store(&repo).await,
            Err(CoreError::Persistence(_))
        ));
    }
}
