//! # Packing Policy
//!
//! The business rules a packing run must respect.
//!
//! | Field | Default | Effect |
//! |-------|---------|--------|
//! | `optimize_for_minimum_boxes` | `true` | best-fit-decreasing, else first-fit |
//! | `allow_mixed_categories` | `true` | several categories may share a request |
//! | `separate_fragile_items` | `true` | fragile and non-fragile never mix |
//! | `max_utilization_threshold` | `0.95` | fraction of carton volume usable |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Default fraction of a carton's volume that may be filled.
pub fn default_max_utilization_threshold() -> Decimal {
    Decimal::new(95, 2)
}

/// Packing rules for one request.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingPolicy {
    pub optimize_for_minimum_boxes: bool,
    pub allow_mixed_categories: bool,
    pub separate_fragile_items: bool,
    pub max_utilization_threshold: Decimal,
}

impl Default for PackingPolicy {
    fn default() -> Self {
        PackingPolicy {
            optimize_for_minimum_boxes: true,
            allow_mixed_categories: true,
            separate_fragile_items: true,
            max_utilization_threshold: default_max_utilization_threshold(),
        }
    }
}

impl PackingPolicy {
    /// Checks that the threshold lies in `(0, 1]`.
    pub fn validate(&self) -> ValidationResult<()> {
        let threshold = self.max_utilization_threshold;
        if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
            return Err(ValidationError::OutOfRange {
                field: "max utilization threshold".to_string(),
                min: "0 (exclusive)".to_string(),
                max: "1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = PackingPolicy::default();
        assert!(policy.optimize_for_minimum_boxes);
        assert!(policy.allow_mixed_categories);
        assert!(policy.separate_fragile_items);
        assert_eq!(policy.max_utilization_threshold, Decimal::new(95, 2));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        let mut policy = PackingPolicy::default();

        policy.max_utilization_threshold = Decimal::ONE;
        assert!(policy.validate().is_ok());

        policy.max_utilization_threshold = Decimal::ZERO;
        assert!(policy.validate().is_err());

        policy.max_utilization_threshold = Decimal::new(101, 2);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let policy: PackingPolicy =
            serde_json::from_str(r#"{"allow_mixed_categories": false}"#).unwrap();

        assert!(!policy.allow_mixed_categories);
        assert!(policy.separate_fragile_items);
        assert_eq!(policy.max_utilization_threshold, Decimal::new(95, 2));
    }
}
