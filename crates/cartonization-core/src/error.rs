//! # Error Types
//!
//! Domain-specific error types for cartonization-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cartonization-core errors (this file)                                 │
//! │  ├── CoreError        - Packing and carton lifecycle failures          │
//! │  └── ValidationError  - Request / measurement validation failures      │
//! │                                                                         │
//! │  cartonization-db errors (separate crate)                              │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  cartonization-service errors (app)                                    │
//! │  └── ServiceError     - What the CLI reports                           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → stderr / exit code │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these errors are retried or swallowed inside the core. Either a
//! complete solution comes back, or one of these does.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core packing errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The request was rejected before packing started.
    #[error("Invalid packing request: {0}")]
    Validation(#[from] ValidationError),

    /// No active carton can hold the item, not even an empty one.
    ///
    /// ## When This Occurs
    /// - Item is larger than every active carton on some axis
    /// - Item is heavier than every active carton's capacity
    /// - Every carton that would fit is inactive
    ///
    /// The whole calculation is aborted; partially built packages are dropped.
    #[error("Cannot pack item: {sku}")]
    InfeasibleItem { sku: String },

    /// `Package::add_item` was called for an item the package cannot accept.
    #[error("Cannot add item to package: {sku}")]
    ConstraintViolation { sku: String },

    /// A carton mutation was given invalid input.
    #[error("Invalid carton state: {reason}")]
    CartonState { reason: String },
}

impl CoreError {
    /// Creates a CartonState error.
    pub fn carton_state(reason: impl Into<String>) -> Self {
        CoreError::CartonState {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by measurement constructors and by the business rule validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Decimal value is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// A unit name could not be parsed.
    #[error("Unknown unit: '{0}'")]
    UnknownUnit(String),

    /// The request contains no items.
    #[error("Packing request must contain at least one item")]
    EmptyRequest,

    /// No packing policy was supplied.
    #[error("Packing rules cannot be null")]
    MissingPolicy,

    /// An item failed a structural check.
    #[error("Invalid item in packing request: {sku}: {reason}")]
    InvalidItem { sku: String, reason: String },

    /// An item's largest dimension is above the absolute ceiling.
    #[error("Item dimensions exceed maximum allowed size: {sku}")]
    ItemTooLarge { sku: String },

    /// An item's weight is above the absolute ceiling.
    #[error("Item weight exceeds maximum allowed weight: {sku}")]
    ItemTooHeavy { sku: String },

    /// More than one category while the policy forbids mixing.
    #[error("Mixed categories not allowed according to packing rules")]
    MixedCategories,

    /// Fragile and non-fragile items while the policy separates them.
    #[error("Fragile and non-fragile items cannot be packed together according to packing rules")]
    MixedFragility,
}

impl ValidationError {
    /// Creates a MustBePositive error for a named field.
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
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
