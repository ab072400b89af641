//! # Barcode Commands
//!
//! ```text
//! barcode_format("8801116034192")  ──► { symbology: "ean13", label: "EAN-13" }   (no rendering)
//! render_barcode(productId)        ──► BarcodeState::render on the blocking pool
//!                                        ├─ ready      image bytes + symbology actually drawn
//!                                        ├─ stale      payload changed meanwhile, discard
//!                                        └─ cancelled  superseded or cancel_barcode
//! ```

use serde::Serialize;
use tracing::debug;

use super::parse_id;
use crate::error::ApiError;
use crate::state::{BarcodeOutcome, BarcodeState, InventoryState};
use tally_core::symbology::select_symbology;
use tally_core::Symbology;

/// Symbology a payload would be drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeFormat {
    pub payload: String,
    pub symbology: Symbology,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeStatus {
    Ready,
    Stale,
    Cancelled,
}

/// Result of a render request. Only `ready` responses carry an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeDto {
    pub product_id: String,
    pub status: BarcodeStatus,
    pub asset: Option<String>,
    pub symbology: Option<Symbology>,
    pub label: Option<String>,
    /// True when an EAN payload had to be drawn as Code128.
    pub fell_back: bool,
    pub bytes: Option<Vec<u8>>,
}

impl BarcodeDto {
    fn from_outcome(product_id: String, outcome: BarcodeOutcome) -> Self {
        match outcome {
            BarcodeOutcome::Ready { asset, rendered } => BarcodeDto {
                product_id,
                status: BarcodeStatus::Ready,
                asset: Some(asset.to_string()),
                symbology: Some(rendered.symbology),
                label: Some(rendered.symbology.label().to_string()),
                fell_back: rendered.fell_back(),
                bytes: Some(rendered.bytes),
            },
            BarcodeOutcome::Stale => BarcodeDto::empty(product_id, BarcodeStatus::Stale),
            BarcodeOutcome::Cancelled => BarcodeDto::empty(product_id, BarcodeStatus::Cancelled),
        }
    }

    fn empty(product_id: String, status: BarcodeStatus) -> Self {
        BarcodeDto {
            product_id,
            status,
            asset: None,
            symbology: None,
            label: None,
            fell_back: false,
            bytes: None,
        }
    }
}

/// Looks up the symbology for a payload without rendering it.
pub async fn barcode_format(payload: String) -> Result<BarcodeFormat, ApiError> {
    let payload = payload.trim().to_string();
    let symbology = select_symbology(&payload)?;

    Ok(BarcodeFormat {
        payload,
        symbology,
        label: symbology.label().to_string(),
    })
}

/// Renders a product's barcode in the background.
pub async fn render_barcode(
    inventory: &InventoryState,
    barcodes: &BarcodeState,
    product_id: String,
) -> Result<BarcodeDto, ApiError> {
    let id = parse_id(&product_id)?;
    let outcome = barcodes.render(inventory, id).await?;
    let dto = BarcodeDto::from_outcome(id.to_string(), outcome);
    debug!(id = %id, status = ?dto.status, "render_barcode complete");
    Ok(dto)
}

/// Cancels a pending render. Returns false when nothing was pending.
pub async fn cancel_barcode(barcodes: &BarcodeState, product_id: String) -> Result<bool, ApiError> {
    let id = parse_id(&product_id)?;
    barcodes.cancel(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::render::ModuleRenderer;
    use std::sync::Arc;
    use tally_core::InventoryStore;

    #[tokio::test]
    async fn test_format_table() {
        let cases = [
            ("8801116034192", Symbology::Ean13, "EAN-13"),
            ("88011745", Symbology::Ean8, "EAN-8"),
            ("123456789012", Symbology::Code128, "Code128"),
            ("SHOP-0001", Symbology::Code128, "Code128"),
        ];
        for (payload, symbology, label) in cases {
            let format = barcode_format(payload.into()).await.unwrap();
            assert_eq!(format.symbology, symbology, "payload {payload}");
            assert_eq!(format.label, label);
        }

        let err = barcode_format("  ".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_render_reports_fallback() {
        let mut store = InventoryStore::new();
        let valid = store.add("Esse Change", "8801116034192").unwrap().id();
        let bad_check = store.add("House Brand", "8801116000194").unwrap().id();
        let inventory = InventoryState::new(store);
        let barcodes = BarcodeState::new(Arc::new(ModuleRenderer::new(1, 1)));

        let dto = render_barcode(&inventory, &barcodes, valid.to_string()).await.unwrap();
        assert_eq!(dto.status, BarcodeStatus::Ready);
        assert_eq!(dto.label.as_deref(), Some("EAN-13"));
        assert!(!dto.fell_back);
        assert!(dto.bytes.unwrap().starts_with(b"P1\n"));

        let dto = render_barcode(&inventory, &barcodes, bad_check.to_string()).await.unwrap();
        assert_eq!(dto.symbology, Some(Symbology::Code128));
        assert!(dto.fell_back);
    }

    #[tokio::test]
    async fn test_cancel_without_pending_render() {
        let barcodes = BarcodeState::new(Arc::new(ModuleRenderer::new(1, 1)));
        let id = tally_core::ProductId::new().to_string();
        assert!(!cancel_barcode(&barcodes, id).await.unwrap());

        let err = cancel_barcode(&barcodes, "nope".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_non_ready_outcomes_carry_no_image() {
        let dto = BarcodeDto::from_outcome("x".into(), BarcodeOutcome::Stale);
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["status"], "stale");
        assert!(json["bytes"].is_null());
    }
}
