//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError          - Store, barcode and persistence failures      │
//! │  ├── ValidationError    - Input rejected by identity rules             │
//! │  └── PersistenceError   - Opaque failure from the storage collaborator │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError            - Database operation failures                  │
//! │                                                                         │
//! │  counter app errors                                                    │
//! │  └── ApiError           - What the UI sees (serialized)                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed numeric text is deliberately absent from this taxonomy: stock
//! entry coerces anything unparseable to zero (see [`crate::input`]).

use thiserror::Error;

use crate::product::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// None of these are fatal: every mutating operation returns them as a typed
/// result and leaves the store untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation referenced an id the store does not hold.
    ///
    /// ## When This Occurs
    /// - Product was deleted while an edit screen was still open
    /// - A stale focus target points at a removed product
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Symbology selection was asked about an empty payload.
    #[error("Barcode payload is empty")]
    InvalidPayload,

    /// Rendering failed for every symbology in the fallback chain.
    ///
    /// ## User Workflow
    /// ```text
    /// "8801116000194" ──► EAN-13 render ──► rejected
    ///                          │
    ///                          ▼
    ///                    Code128 render ──► rejected
    ///                          │
    ///                          ▼
    ///          BarcodeGenerationFailed { payload, reason }
    /// ```
    #[error("Barcode generation failed for '{payload}': {reason}")]
    BarcodeGenerationFailed { payload: String, reason: String },

    /// The persistence collaborator failed. The core never retries.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors raised before the store is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty after trimming.
    #[error("{field} is required")]
    EmptyField { field: &'static str },

    /// Another product already uses this name (case-insensitive).
    #[error("A product named '{name}' already exists")]
    DuplicateName { name: String },

    /// Another product already uses this barcode payload (exact match).
    #[error("Barcode '{barcode}' is already assigned to another product")]
    DuplicateBarcode { barcode: String },

    /// Two loaded records share an id.
    #[error("Product id {id} appears more than once")]
    DuplicateId { id: ProductId },

    /// A restored record carried warehouse stock that is not a whole number
    /// of cartons.
    #[error("Warehouse stock {units} is not a multiple of {per_carton}")]
    InvalidWarehouseUnits { units: u32, per_carton: u32 },
}

// =============================================================================
// Persistence Error
// =============================================================================

/// Failure reported by a [`crate::persistence::ProductPersistence`]
/// implementation. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Persistence failed: {0}")]
pub struct PersistenceError(pub String);

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        PersistenceError(message.into())
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
