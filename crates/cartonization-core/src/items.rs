//! # Items Module
//!
//! The three shapes an ordered item takes on its way into a package.
//!
//! ```text
//! ┌───────────────┐   catalog lookup   ┌───────────────┐   packing   ┌─────────┐
//! │ RequestedItem │ ─────────────────► │ EnrichedItem  │ ──────────► │ Package │
//! │  sku, qty     │   (ProductInfo)    │ + dims, weight│             │         │
//! └───────────────┘                    │ + category    │             └─────────┘
//!                                      │ + fragile     │
//!                                      └───────────────┘
//! ```
//!
//! Weights and volumes on an [`EnrichedItem`] are per unit. Multiply by
//! `quantity` with [`EnrichedItem::total_volume`] / [`EnrichedItem::total_weight`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::measurement::{Dimension, Weight};
use crate::validation::{validate_quantity, validate_sku, ValidationResult};

// =============================================================================
// Requested Item
// =============================================================================

/// What the caller asked for: a stock unit and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedItem {
    pub sku: String,
    pub quantity: u32,
}

impl RequestedItem {
    /// Creates a requested item, rejecting a blank sku or a zero quantity.
    pub fn new(sku: impl Into<String>, quantity: u32) -> ValidationResult<Self> {
        let item = RequestedItem {
            sku: sku.into(),
            quantity,
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks the structural rules on a deserialized value.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_sku(&self.sku)?;
        validate_quantity(self.quantity)
    }
}

// =============================================================================
// Enriched Item
// =============================================================================

/// A requested item with the physical attributes needed for packing.
///
/// This is the unit the packing algorithm operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedItem {
    pub sku: String,
    pub quantity: u32,
    /// Per-unit dimensions.
    pub dimensions: Dimension,
    /// Per-unit weight.
    pub weight: Weight,
    pub category: String,
    #[serde(default)]
    pub fragile: bool,
}

impl EnrichedItem {
    /// Volume of all units, in the item's length unit cubed.
    pub fn total_volume(&self) -> Decimal {
        self.dimensions.volume() * Decimal::from(self.quantity)
    }

    /// Weight of all units, in the item's weight unit.
    pub fn total_weight(&self) -> Decimal {
        self.weight.value() * Decimal::from(self.quantity)
    }
}

// =============================================================================
// Product Info
// =============================================================================

/// A product catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub sku: String,
    pub name: String,
    pub dimensions: Dimension,
    pub weight: Weight,
    pub category: String,
    #[serde(default)]
    pub fragile: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ProductInfo {
    /// Builds the enriched item for `quantity` units of this product.
    pub fn to_enriched_item(&self, quantity: u32) -> EnrichedItem {
        EnrichedItem {
            sku: self.sku.clone(),
            quantity,
            dimensions: self.dimensions.clone(),
            weight: self.weight.clone(),
            category: self.category.clone(),
            fragile: self.fragile,
        }
    }

    /// Checks the fields the measurement types cannot check themselves.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_sku(&self.sku)?;
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            });
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "category".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{DimensionUnit, WeightUnit};

    fn widget() -> ProductInfo {
        ProductInfo {
            sku: "WIDGET-1".to_string(),
            name: "Widget".to_string(),
            dimensions: Dimension::new(
                Decimal::from(10),
                Decimal::from(5),
                Decimal::from(2),
                DimensionUnit::Centimeters,
            )
            .unwrap(),
            weight: Weight::new(Decimal::new(25, 1), WeightUnit::Kilograms).unwrap(),
            category: "hardware".to_string(),
            fragile: false,
            active: true,
        }
    }

    #[test]
    fn test_requested_item_validation() {
        assert!(RequestedItem::new("SKU-1", 2).is_ok());
        assert!(RequestedItem::new("  ", 2).is_err());
        assert!(RequestedItem::new("SKU-1", 0).is_err());
    }

    #[test]
    fn test_enrichment_keeps_per_unit_values() {
        let item = widget().to_enriched_item(3);

        assert_eq!(item.sku, "WIDGET-1");
        assert_eq!(item.quantity, 3);
        assert_eq!(item.weight.value(), Decimal::new(25, 1));
        assert_eq!(item.total_weight(), Decimal::new(75, 1));
        assert_eq!(item.total_volume(), Decimal::from(300));
    }

    #[test]
    fn test_product_validation() {
        assert!(widget().validate().is_ok());

        let mut product = widget();
        product.category = String::new();
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_product_deserializes_with_defaults() {
        let json = r#"{
            "sku": "MUG-1",
            "name": "Mug",
            "dimensions": {"length": 10, "width": 10, "height": 12, "unit": "centimeters"},
            "weight": {"value": "0.4", "unit": "kilograms"},
            "category": "kitchen"
        }"#;
        let product: ProductInfo = serde_json::from_str(json).unwrap();

        assert!(product.active);
        assert!(!product.fragile);
    }
}
