//! # Package
//!
//! An in-progress bin: one carton plus the items assigned to it so far.
//!
//! ## Insertion Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  can_add_item(item, policy): first failing check wins                   │
//! │                                                                         │
//! │  1. carton.can_fit_item(item)            whole-carton fit, one unit     │
//! │  2. current_weight + item.weight ≤ max   carton weight unit             │
//! │  3. (used + item.volume) / carton volume ≤ threshold   4 dp, half-up    │
//! │  4. policy: fragility matches every item; category matches if unmixed   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no free-space tracking. Checks 2 and 3 use cumulative totals
//! only, and they count one unit per line regardless of `quantity`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::carton::Carton;
use crate::error::{CoreError, CoreResult};
use crate::items::EnrichedItem;
use crate::measurement::{ratio, DimensionUnit, WeightUnit};
use crate::policy::PackingPolicy;

/// A carton being filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    carton: Arc<Carton>,
    items: Vec<EnrichedItem>,
    /// In the carton's weight unit.
    current_weight: Decimal,
    /// In the carton's length unit, cubed.
    used_volume: Decimal,
}

impl Package {
    /// Opens an empty package bound to `carton`.
    pub fn new(carton: Arc<Carton>) -> Self {
        Package {
            carton,
            items: Vec::new(),
            current_weight: Decimal::ZERO,
            used_volume: Decimal::ZERO,
        }
    }

    /// Checks whether `item` may be added without breaking any constraint.
    pub fn can_add_item(&self, item: &EnrichedItem, policy: &PackingPolicy) -> bool {
        if !self.carton.can_fit_item(&item.dimensions, &item.weight) {
            return false;
        }

        let max_weight = self.carton.max_weight();
        let new_weight = self.current_weight + item.weight.value_in(max_weight.unit());
        if new_weight > max_weight.value() {
            return false;
        }

        let new_volume = self.used_volume + self.item_volume(item);
        if ratio(new_volume, self.carton_volume()) > policy.max_utilization_threshold {
            return false;
        }

        self.is_compatible(item, policy)
    }

    /// Adds `item`.
    ///
    /// ## Errors
    /// [`CoreError::ConstraintViolation`] if [`Package::can_add_item`] fails.
    pub fn add_item(&mut self, item: EnrichedItem, policy: &PackingPolicy) -> CoreResult<()> {
        if !self.can_add_item(&item, policy) {
            return Err(CoreError::ConstraintViolation { sku: item.sku });
        }

        self.current_weight += item.weight.value_in(self.carton.max_weight().unit());
        self.used_volume += self.item_volume(&item);
        self.items.push(item);
        Ok(())
    }

    fn is_compatible(&self, item: &EnrichedItem, policy: &PackingPolicy) -> bool {
        if policy.separate_fragile_items
            && self.items.iter().any(|existing| existing.fragile != item.fragile)
        {
            return false;
        }

        if !policy.allow_mixed_categories
            && self
                .items
                .iter()
                .any(|existing| existing.category != item.category)
        {
            return false;
        }

        true
    }

    fn item_volume(&self, item: &EnrichedItem) -> Decimal {
        item.dimensions.convert_to(self.length_unit()).volume()
    }

    fn length_unit(&self) -> DimensionUnit {
        self.carton.dimensions().unit()
    }

    fn carton_volume(&self) -> Decimal {
        self.carton.dimensions().volume()
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    /// Used volume / carton volume, 4 dp half-up. Zero for a zero-volume carton.
    pub fn utilization(&self) -> Decimal {
        ratio(self.used_volume, self.carton_volume())
    }

    /// Carton volume minus used volume, in the carton's length unit cubed.
    pub fn remaining_volume(&self) -> Decimal {
        self.carton_volume() - self.used_volume
    }

    /// Max weight minus current weight, in the carton's weight unit.
    pub fn remaining_weight(&self) -> Decimal {
        self.carton.max_weight().value() - self.current_weight
    }

    /// Sum of item quantities.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn carton(&self) -> &Carton {
        &self.carton
    }

    pub fn items(&self) -> &[EnrichedItem] {
        &self.items
    }

    pub fn current_weight(&self) -> Decimal {
        self.current_weight
    }

    pub fn used_volume(&self) -> Decimal {
        self.used_volume
    }

    /// Current weight in kilograms.
    pub fn weight_kg(&self) -> Decimal {
        self.current_weight * self.carton.max_weight().unit().factor_to(WeightUnit::Kilograms)
    }

    /// Used volume in cubic centimeters.
    pub fn used_volume_cm3(&self) -> Decimal {
        self.used_volume * self.length_unit().volume_factor_to(DimensionUnit::Centimeters)
    }

    /// Carton volume in cubic centimeters.
    pub fn carton_volume_cm3(&self) -> Decimal {
        self.carton_volume() * self.length_unit().volume_factor_to(DimensionUnit::Centimeters)
    }

    /// Remaining volume in cubic centimeters, comparable across packages
    /// whose cartons use different units.
    pub fn remaining_volume_cm3(&self) -> Decimal {
        self.carton_volume_cm3() - self.used_volume_cm3()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
