//! # Packing Solution
//!
//! The result of one packing run and the read models derived from it.
//!
//! Metrics are computed on read from the packages; nothing is cached.
//!
//! | Metric | Unit |
//! |--------|------|
//! | `total_packages` | count |
//! | `total_items` | sum of quantities |
//! | `average_utilization` | ratio, 4 dp half-up, 0 when empty |
//! | `total_volume` / `total_used_volume` | cm³ |
//! | `total_weight` | kg, packed contents |
//! | `total_weight_capacity` | kg, sum of carton max weights |

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::PACKING_SOLUTION_CALCULATED_TOPIC;
use crate::measurement::{ratio, round_half_up, WeightUnit};
use crate::package::Package;

/// A complete packing answer for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingSolution {
    id: String,
    request_id: Option<String>,
    order_id: Option<String>,
    packages: Vec<Package>,
    created_at: DateTime<Utc>,
}

impl PackingSolution {
    /// Wraps packages into a solution with a fresh `sol-` id.
    pub fn new(packages: Vec<Package>) -> Self {
        PackingSolution {
            id: generate_solution_id(),
            request_id: None,
            order_id: None,
            packages,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn set_request_id(&mut self, request_id: impl Into<String>) {
        self.request_id = Some(request_id.into());
    }

    pub fn set_order_id(&mut self, order_id: impl Into<String>) {
        self.order_id = Some(order_id.into());
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // =========================================================================
    // Derived Metrics
    // =========================================================================

    pub fn total_packages(&self) -> usize {
        self.packages.len()
    }

    pub fn total_items(&self) -> u64 {
        self.packages.iter().map(Package::item_count).sum()
    }

    /// Mean of per-package utilization, 4 dp half-up. Zero with no packages.
    pub fn average_utilization(&self) -> Decimal {
        if self.packages.is_empty() {
            return Decimal::ZERO;
        }
        let sum: Decimal = self.packages.iter().map(Package::utilization).sum();
        ratio(sum, Decimal::from(self.packages.len()))
    }

    /// Sum of carton volumes in cm³, 2 dp.
    pub fn total_volume(&self) -> Decimal {
        let sum: Decimal = self.packages.iter().map(Package::carton_volume_cm3).sum();
        round_half_up(sum, 2)
    }

    /// Sum of used volumes in cm³, 2 dp.
    pub fn total_used_volume(&self) -> Decimal {
        let sum: Decimal = self.packages.iter().map(Package::used_volume_cm3).sum();
        round_half_up(sum, 2)
    }

    /// Weight of the packed contents in kg.
    pub fn total_weight(&self) -> Decimal {
        self.packages.iter().map(Package::weight_kg).sum()
    }

    /// Sum of the cartons' max weights in kg.
    pub fn total_weight_capacity(&self) -> Decimal {
        self.packages
            .iter()
            .map(|p| p.carton().max_weight().value_in(WeightUnit::Kilograms))
            .sum()
    }

    // =========================================================================
    // Read Models
    // =========================================================================

    pub fn summary(&self) -> SolutionSummary {
        SolutionSummary {
            solution_id: self.id.clone(),
            request_id: self.request_id.clone(),
            order_id: self.order_id.clone(),
            total_packages: self.total_packages(),
            total_items: self.total_items(),
            average_utilization: self.average_utilization(),
            total_weight_kg: round_half_up(self.total_weight(), 3),
            total_volume_cm3: self.total_volume(),
            total_used_volume_cm3: self.total_used_volume(),
            packages: self.packages.iter().map(PackageSummary::from).collect(),
            created_at: self.created_at,
        }
    }

    pub fn calculated_event(&self) -> PackingSolutionCalculated {
        PackingSolutionCalculated {
            solution_id: self.id.clone(),
            request_id: self.request_id.clone(),
            order_id: self.order_id.clone(),
            total_packages: self.total_packages(),
            total_items: self.total_items(),
            average_utilization: self.average_utilization(),
            occurred_on: Utc::now(),
        }
    }
}

fn generate_solution_id() -> String {
    let uuid: String = Uuid::new_v4().to_string().chars().take(12).collect();
    format!("sol-{uuid}")
}

// =============================================================================
// Summary
// =============================================================================

/// Flat view of a solution for output and storage columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSummary {
    pub solution_id: String,
    pub request_id: Option<String>,
    pub order_id: Option<String>,
    pub total_packages: usize,
    pub total_items: u64,
    pub average_utilization: Decimal,
    pub total_weight_kg: Decimal,
    pub total_volume_cm3: Decimal,
    pub total_used_volume_cm3: Decimal,
    pub packages: Vec<PackageSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub carton_id: String,
    pub carton_name: String,
    pub item_count: u64,
    pub utilization: Decimal,
    pub skus: Vec<String>,
}

impl From<&Package> for PackageSummary {
    fn from(package: &Package) -> Self {
        PackageSummary {
            carton_id: package.carton().id().to_string(),
            carton_name: package.carton().name().to_string(),
            item_count: package.item_count(),
            utilization: package.utilization(),
            skus: package.items().iter().map(|i| i.sku.clone()).collect(),
        }
    }
}

// =============================================================================
// Event
// =============================================================================

/// Emitted once a solution has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingSolutionCalculated {
    pub solution_id: String,
    pub request_id: Option<String>,
    pub order_id: Option<String>,
    pub total_packages: usize,
    pub total_items: u64,
    pub average_utilization: Decimal,
    pub occurred_on: DateTime<Utc>,
}

impl PackingSolutionCalculated {
    pub const EVENT_TYPE: &'static str = "PackingSolutionCalculated";

    pub fn topic(&self) -> &'static str {
        PACKING_SOLUTION_CALCULATED_TOPIC
    }

    /// Message key: the request id, falling back to the solution id.
    pub fn key(&self) -> &str {
        self.request_id.as_deref().unwrap_or(&self.solution_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
