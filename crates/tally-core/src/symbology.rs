//! # Barcode Symbology
//!
//! Picks the barcode encoding for a payload and drives the render fallback
//! chain. Pixel work is delegated to a [`BarcodeRenderer`].
//!
//! ## Selection Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  payload                         │  symbology                           │
//! │  ────────────────────────────────┼────────────────────────────────────  │
//! │  ""                              │  InvalidPayload (error)              │
//! │  13 digits  "8801047019510"      │  EAN-13                              │
//! │  8 digits   "88011745"           │  EAN-8                               │
//! │  other digit lengths "12345"     │  Code128                             │
//! │  anything with a non-digit       │  Code128                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fallback Chain
//! ```text
//! select ──► EAN-13 / EAN-8 render ──ok──► done
//!                   │
//!                 error
//!                   ▼
//!            Code128 render ──ok──► done (symbology = Code128)
//!                   │
//!                 error
//!                   ▼
//!        BarcodeGenerationFailed (terminal)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Symbology
// =============================================================================

/// Supported barcode encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Symbology {
    Ean13,
    Ean8,
    Code128,
}

impl Symbology {
    /// Display label for the "format" line under a barcode.
    pub const fn label(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::Code128 => "Code128",
        }
    }

    /// EAN symbologies can be rejected by an encoder and fall back to Code128.
    pub const fn is_ean(&self) -> bool {
        matches!(self, Symbology::Ean13 | Symbology::Ean8)
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chooses the symbology for a payload.
///
/// ## Example
/// ```rust
/// use tally_core::symbology::{select_symbology, Symbology};
///
/// assert_eq!(select_symbology("8801047019510").unwrap(), Symbology::Ean13);
/// assert_eq!(select_symbology("12345678").unwrap(), Symbology::Ean8);
/// assert_eq!(select_symbology("ABC123").unwrap(), Symbology::Code128);
/// assert!(select_symbology("").is_err());
/// ```
pub fn select_symbology(payload: &str) -> CoreResult<Symbology> {
    if payload.is_empty() {
        return Err(CoreError::InvalidPayload);
    }

    if !payload.chars().all(|c| c.is_ascii_digit()) {
        return Ok(Symbology::Code128);
    }

    Ok(match payload.len() {
        13 => Symbology::Ean13,
        8 => Symbology::Ean8,
        _ => Symbology::Code128,
    })
}

/// Verifies the trailing EAN (mod 10) check digit of an all-digit payload.
///
/// Renderers that validate strictly reject EAN payloads failing this check,
/// which is what sends them down the Code128 fallback.
pub fn has_valid_check_digit(payload: &str) -> bool {
    if payload.len() < 2 || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = payload.bytes().map(|b| u32::from(b - b'0')).collect();
    let (body, check) = digits.split_at(digits.len() - 1);

    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();

    (10 - sum % 10) % 10 == check[0]
}

// =============================================================================
// Renderer Collaborator
// =============================================================================

/// Why a renderer refused to encode a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{symbology} render failed: {reason}")]
pub struct RenderError {
    pub symbology: Symbology,
    pub reason: String,
}

impl RenderError {
    pub fn new(symbology: Symbology, reason: impl Into<String>) -> Self {
        RenderError {
            symbology,
            reason: reason.into(),
        }
    }
}

/// Turns a payload into image bytes for one symbology.
///
/// Implementations are CPU-bound and may be slow; the counter app runs them
/// on a blocking worker.
pub trait BarcodeRenderer: Send + Sync {
    fn render(&self, payload: &str, symbology: Symbology) -> Result<Vec<u8>, RenderError>;
}

/// Output of a successful [`generate`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBarcode {
    /// What [`select_symbology`] asked for.
    pub requested: Symbology,
    /// What was actually drawn (differs from `requested` after a fallback).
    pub symbology: Symbology,
    pub bytes: Vec<u8>,
}

impl RenderedBarcode {
    pub fn fell_back(&self) -> bool {
        self.requested != self.symbology
    }
}

/// Renders `payload`, retrying as Code128 when an EAN encode fails.
pub fn generate<R>(renderer: &R, payload: &str) -> CoreResult<RenderedBarcode>
where
    R: BarcodeRenderer + ?Sized,
{
    let requested = select_symbology(payload)?;
    debug!(payload = %payload, symbology = %requested, "Generating barcode");

    if requested.is_ean() {
        match renderer.render(payload, requested) {
            Ok(bytes) => {
                return Ok(RenderedBarcode {
                    requested,
                    symbology: requested,
                    bytes,
                })
            }
            Err(e) => {
                warn!(payload = %payload, error = %e, "EAN render failed, falling back to Code128");
            }
        }
    }

    match renderer.render(payload, Symbology::Code128) {
        Ok(bytes) => Ok(RenderedBarcode {
            requested,
            symbology: Symbology::Code128,
            bytes,
        }),
        Err(e) => {
            warn!(payload = %payload, error = %e, "Code128 render failed");
            Err(CoreError::BarcodeGenerationFailed {
                payload: payload.to_string(),
                reason: e.reason,
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
