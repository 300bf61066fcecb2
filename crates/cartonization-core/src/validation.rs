//! # Validation Module
//!
//! Request-level business rules, checked before any packing happens.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization                                              │
//! │  └── Dimension / Weight reject non-positive values (try_from)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (validate_packing_request)                       │
//! │  ├── request shape: items present, policy present, threshold in (0,1] │
//! │  ├── per item: sku, quantity, absolute size / weight ceilings         │
//! │  └── whole request: category mixing, fragile separation               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Package::can_add_item                                        │
//! │  └── per-package weight, volume and compatibility budgets             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cartonization_core::validation::{validate_sku, validate_quantity};
//!
//! validate_sku("MUG-330").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::error::ValidationError;
use crate::items::EnrichedItem;
use crate::measurement::ratio;
use crate::policy::PackingPolicy;
use crate::{MAX_ITEM_DIMENSION, MAX_ITEM_WEIGHT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit): must not be blank.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    if sku.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }
    Ok(())
}

/// Validates a requested quantity: must be at least 1.
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }
    Ok(())
}

// =============================================================================
// Request Validation
// =============================================================================

/// Validates a packing request before the algorithm runs.
///
/// ## Order of Checks
/// 1. at least one item
/// 2. a policy is present, with threshold in `(0, 1]`
/// 3. every item is structurally valid and under the absolute ceilings
/// 4. category mixing (if the policy forbids it)
/// 5. fragile separation (if the policy requires it)
///
/// The first failure is returned.
pub fn validate_packing_request(
    items: &[EnrichedItem],
    policy: Option<&PackingPolicy>,
) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptyRequest);
    }

    let policy = policy.ok_or(ValidationError::MissingPolicy)?;
    policy.validate()?;

    for item in items {
        validate_item(item)?;
    }

    validate_item_compatibility(items, policy)
}

fn validate_item(item: &EnrichedItem) -> ValidationResult<()> {
    if !is_item_valid(item) {
        return Err(ValidationError::InvalidItem {
            sku: item.sku.clone(),
            reason: "sku, quantity, dimensions and weight must all be present and positive"
                .to_string(),
        });
    }

    // Ceilings apply to the raw stored values, whatever the unit.
    if item.dimensions.largest() > Decimal::from(MAX_ITEM_DIMENSION) {
        return Err(ValidationError::ItemTooLarge {
            sku: item.sku.clone(),
        });
    }

    if item.weight.value() > Decimal::from(MAX_ITEM_WEIGHT) {
        return Err(ValidationError::ItemTooHeavy {
            sku: item.sku.clone(),
        });
    }

    Ok(())
}

fn validate_item_compatibility(
    items: &[EnrichedItem],
    policy: &PackingPolicy,
) -> ValidationResult<()> {
    if !policy.allow_mixed_categories {
        let categories: HashSet<&str> = items.iter().map(|i| i.category.as_str()).collect();
        if categories.len() > 1 {
            return Err(ValidationError::MixedCategories);
        }
    }

    if policy.separate_fragile_items {
        let has_fragile = items.iter().any(|i| i.fragile);
        let has_sturdy = items.iter().any(|i| !i.fragile);
        if has_fragile && has_sturdy {
            return Err(ValidationError::MixedFragility);
        }
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// True if the item passes every structural check.
pub fn is_item_valid(item: &EnrichedItem) -> bool {
    validate_sku(&item.sku).is_ok()
        && validate_quantity(item.quantity).is_ok()
        && !item.dimensions.has_zero_or_negative_values()
        && !item.weight.is_zero_or_negative()
}

/// True if the policy lets `a` and `b` share a package.
pub fn can_pack_together(a: &EnrichedItem, b: &EnrichedItem, policy: &PackingPolicy) -> bool {
    if !policy.allow_mixed_categories && a.category != b.category {
        return false;
    }
    if policy.separate_fragile_items && a.fragile != b.fragile {
        return false;
    }
    true
}

/// True if `total / max` (4 dp) is above `threshold`. A zero max always exceeds.
pub fn exceeds_weight_threshold(total: Decimal, max: Decimal, threshold: Decimal) -> bool {
    if max.is_zero() {
        return true;
    }
    ratio(total, max) > threshold
}

/// True if `used / total` (4 dp) is above `threshold`. A zero total always exceeds.
pub fn exceeds_volume_threshold(used: Decimal, total: Decimal, threshold: Decimal) -> bool {
    if total.is_zero() {
        return true;
    }
    ratio(used, total) > threshold
}

// =============================================================================
// Unit Tests
// =============================================================================
