//! # Packing Module
//!
//! Greedy bin-packing over a carton catalog.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate_packing_solution(items, cartons, policy, algorithm)          │
//! │                                                                         │
//! │  1. validate_packing_request ──── Err ──► return, algorithm untouched  │
//! │           │ Ok                                                          │
//! │           ▼                                                             │
//! │  2. algorithm.pack                                                      │
//! │     ├── items:   sort by volume, largest first (stable)                │
//! │     ├── cartons: active only, sort by volume, smallest first (stable)  │
//! │     └── for each item:                                                  │
//! │           BFD: open package with least remaining volume that accepts   │
//! │           FFD: first open package (creation order) that accepts        │
//! │           none: open the smallest carton that takes the item           │
//! │                 none at all: InfeasibleItem(sku), nothing returned     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. PackingSolution::new(packages)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Volumes used for sorting and for best-fit comparison are normalized to
//! cubic centimeters so that catalogs and requests may mix units.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::carton::Carton;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::items::EnrichedItem;
use crate::measurement::DimensionUnit;
use crate::package::Package;
use crate::policy::PackingPolicy;
use crate::solution::PackingSolution;
use crate::validation::validate_packing_request;

// =============================================================================
// Algorithm Seam
// =============================================================================

/// Assigns items to packages.
///
/// Implementations receive a request that has already passed validation.
pub trait PackingAlgorithm {
    fn pack(
        &self,
        items: &[EnrichedItem],
        cartons: &[Carton],
        policy: &PackingPolicy,
    ) -> CoreResult<Vec<Package>>;
}

/// Which heuristic a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackingStrategy {
    BestFitDecreasing,
    FirstFitDecreasing,
}

impl PackingStrategy {
    pub fn for_policy(policy: &PackingPolicy) -> Self {
        if policy.optimize_for_minimum_boxes {
            PackingStrategy::BestFitDecreasing
        } else {
            PackingStrategy::FirstFitDecreasing
        }
    }
}

/// Best-fit / first-fit decreasing, chosen by the policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPacker;

impl PackingAlgorithm for GreedyPacker {
    fn pack(
        &self,
        items: &[EnrichedItem],
        cartons: &[Carton],
        policy: &PackingPolicy,
    ) -> CoreResult<Vec<Package>> {
        let strategy = PackingStrategy::for_policy(policy);

        let mut sorted_items: Vec<&EnrichedItem> = items.iter().collect();
        sorted_items.sort_by(|a, b| volume_cm3(b).cmp(&volume_cm3(a)));

        let mut catalog: Vec<Arc<Carton>> = cartons
            .iter()
            .filter(|c| c.is_active())
            .map(|c| Arc::new(c.detached()))
            .collect();
        catalog.sort_by(|a, b| carton_volume_cm3(a).cmp(&carton_volume_cm3(b)));

        debug!(
            items = sorted_items.len(),
            cartons = catalog.len(),
            ?strategy,
            "Packing items"
        );

        let mut packages: Vec<Package> = Vec::new();

        for item in sorted_items {
            let target = match strategy {
                PackingStrategy::BestFitDecreasing => best_fit(&packages, item, policy),
                PackingStrategy::FirstFitDecreasing => first_fit(&packages, item, policy),
            };

            match target {
                Some(index) => packages[index].add_item(item.clone(), policy)?,
                None => {
                    let carton = smallest_accepting_carton(&catalog, item, policy).ok_or_else(|| {
                        error!(sku = %item.sku, "No suitable carton found for item");
                        CoreError::InfeasibleItem {
                            sku: item.sku.clone(),
                        }
                    })?;

                    let mut package = Package::new(carton);
                    package.add_item(item.clone(), policy)?;
                    packages.push(package);
                }
            }
        }

        Ok(packages)
    }
}

/// Open package with the smallest remaining volume in cm³; earliest wins ties.
fn best_fit(packages: &[Package], item: &EnrichedItem, policy: &PackingPolicy) -> Option<usize> {
    let mut best: Option<(usize, Decimal)> = None;

    for (index, package) in packages.iter().enumerate() {
        if !package.can_add_item(item, policy) {
            continue;
        }
        let remaining = package.remaining_volume_cm3();
        match best {
            Some((_, tightest)) if remaining >= tightest => {}
            _ => best = Some((index, remaining)),
        }
    }

    best.map(|(index, _)| index)
}

fn first_fit(packages: &[Package], item: &EnrichedItem, policy: &PackingPolicy) -> Option<usize> {
    packages
        .iter()
        .position(|package| package.can_add_item(item, policy))
}

/// Smallest carton that fits the item and whose empty package accepts it.
///
/// Stricter than picking by [`Carton::can_fit_item`] alone: a carton the item
/// fits but would fill past the utilization threshold is skipped, so the
/// following `add_item` cannot fail.
fn smallest_accepting_carton(
    catalog: &[Arc<Carton>],
    item: &EnrichedItem,
    policy: &PackingPolicy,
) -> Option<Arc<Carton>> {
    catalog
        .iter()
        .filter(|carton| carton.can_fit_item(&item.dimensions, &item.weight))
        .find(|carton| Package::new(Arc::clone(carton)).can_add_item(item, policy))
        .cloned()
}

fn volume_cm3(item: &EnrichedItem) -> Decimal {
    item.dimensions
        .convert_to(DimensionUnit::Centimeters)
        .volume()
}

fn carton_volume_cm3(carton: &Carton) -> Decimal {
    carton
        .dimensions()
        .convert_to(DimensionUnit::Centimeters)
        .volume()
}

// =============================================================================
// Orchestration
// =============================================================================

/// Validates the request, then packs it.
///
/// The algorithm is never invoked for a request the validator rejects.
/// On success the solution has no request or order id yet.
///
/// ## Example
/// ```rust
/// use cartonization_core::packing::{calculate_packing_solution, GreedyPacker};
/// use cartonization_core::{Carton, Dimension, DimensionUnit, EnrichedItem, PackingPolicy, Weight, WeightUnit};
/// use rust_decimal::Decimal;
///
/// let cm = |l: i64, w: i64, h: i64| {
///     Dimension::new(Decimal::from(l), Decimal::from(w), Decimal::from(h), DimensionUnit::Centimeters).unwrap()
/// };
/// let kg = |v: i64| Weight::new(Decimal::from(v), WeightUnit::Kilograms).unwrap();
///
/// let cartons = vec![Carton::create("Small", cm(15, 10, 8), kg(5)).unwrap()];
/// let items = vec![EnrichedItem {
///     sku: "MUG".to_string(),
///     quantity: 1,
///     dimensions: cm(8, 8, 6),
///     weight: kg(1),
///     category: "kitchen".to_string(),
///     fragile: false,
/// }];
///
/// let solution = calculate_packing_solution(
///     &items,
///     &cartons,
///     Some(&PackingPolicy::default()),
///     &GreedyPacker,
/// )
/// .unwrap();
/// assert_eq!(solution.total_packages(), 1);
/// ```
pub fn calculate_packing_solution(
    items: &[EnrichedItem],
    cartons: &[Carton],
    policy: Option<&PackingPolicy>,
    algorithm: &dyn PackingAlgorithm,
) -> CoreResult<PackingSolution> {
    validate_packing_request(items, policy)?;
    let policy = policy.ok_or(ValidationError::MissingPolicy)?;

    info!(
        items = items.len(),
        carton_types = cartons.len(),
        "Starting packing calculation"
    );

    let packages = algorithm.pack(items, cartons, policy)?;
    let solution = PackingSolution::new(packages);

    info!(
        solution_id = %solution.id(),
        packages = solution.total_packages(),
        average_utilization = %solution.average_utilization(),
        "Packing calculation completed"
    );

    Ok(solution)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{Dimension, Weight, WeightUnit};
    use std::cell::Cell;

    fn cm(l: i64, w: i64, h: i64) -> Dimension {
        Dimension::new(
            Decimal::from(l),
            Decimal::from(w),
            Decimal::from(h),
            DimensionUnit::Centimeters,
        )
        .unwrap()
    }

    fn kg(value: i64) -> Weight {
        Weight::new(Decimal::from(value), WeightUnit::Kilograms).unwrap()
    }

    fn item(sku: &str, dimensions: Dimension, weight: i64) -> EnrichedItem {
        EnrichedItem {
            sku: sku.to_string(),
            quantity: 1,
            dimensions,
            weight: kg(weight),
            category: "general".to_string(),
            fragile: false,
        }
    }

    /// Small 15x10x8 / 5 kg, Medium 25x20x15 / 15 kg, Large 40x30x25 / 30 kg.
    /// Deliberately out of volume order.
    fn catalog() -> Vec<Carton> {
        vec![
            Carton::create("Large", cm(40, 30, 25), kg(30)).unwrap(),
            Carton::create("Small", cm(15, 10, 8), kg(5)).unwrap(),
            Carton::create("Medium", cm(25, 20, 15), kg(15)).unwrap(),
        ]
    }

    fn pack(items: &[EnrichedItem], cartons: &[Carton], policy: &PackingPolicy) -> CoreResult<Vec<Package>> {
        GreedyPacker.pack(items, cartons, policy)
    }

    #[test]
    fn test_best_fit_compares_free_space_across_units() {
        let policy = PackingPolicy::default();
        let inches = |l: i64, w: i64, h: i64| {
            Dimension::new(
                Decimal::from(l),
                Decimal::from(w),
                Decimal::from(h),
                DimensionUnit::Inches,
            )
            .unwrap()
        };

        // 100 in³ free, about 1638.71 cm³
        let mut imperial = Package::new(Arc::new(
            Carton::create("Imperial", inches(10, 10, 10), kg(50)).unwrap(),
        ));
        imperial
            .add_item(item("BIG", inches(10, 10, 9), 1), &policy)
            .unwrap();

        // 500 cm³ free
        let mut metric = Package::new(Arc::new(
            Carton::create("Metric", cm(10, 10, 10), kg(50)).unwrap(),
        ));
        metric.add_item(item("HALF", cm(10, 10, 5), 1), &policy).unwrap();

        let packages = vec![imperial, metric];
        let chosen = best_fit(&packages, &item("DIE", cm(2, 2, 2), 1), &policy).unwrap();
        assert_eq!(packages[chosen].carton().name(), "Metric");
    }

    #[test]
    fn test_largest_allowed_carton_packs_without_overflow() {
        let max = Decimal::from(crate::MAX_MEASUREMENT);
        let huge = Dimension::new(max, max, max, DimensionUnit::Inches).unwrap();
        let cartons = vec![Carton::create("Warehouse", huge, kg(1000)).unwrap()];

        let packages = pack(
            &[item("PEBBLE", cm(1, 1, 1), 1)],
            &cartons,
            &PackingPolicy::default(),
        )
        .unwrap();
        assert_eq!(packages.len(), 1);
    }

    #[test]
    fn test_small_item_goes_into_smallest_carton() {
        let packages = pack(
            &[item("MUG", cm(8, 8, 6), 1)],
            &catalog(),
            &PackingPolicy::default(),
        )
        .unwrap();

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].carton().name(), "Small");
    }

    #[test]
    fn test_heavy_item_skips_to_stronger_carton() {
        let packages = pack(
            &[item("ANVIL", cm(5, 5, 5), 12)],
            &catalog(),
            &PackingPolicy::default(),
        )
        .unwrap();

        assert_eq!(packages[0].carton().name(), "Medium");
    }

    #[test]
    fn test_two_items_consolidate_into_one_package() {
        // Each item is 8 cm³; the carton holds 18 cm³ ≥ 16 / 0.95
        let cartons = vec![Carton::create("Tiny", cm(3, 3, 2), kg(10)).unwrap()];
        let items = [item("A", cm(2, 2, 2), 1), item("B", cm(2, 2, 2), 1)];

        for optimize in [true, false] {
            let policy = PackingPolicy {
                optimize_for_minimum_boxes: optimize,
                ..PackingPolicy::default()
            };
            let packages = pack(&items, &cartons, &policy).unwrap();
            assert_eq!(packages.len(), 1);
            assert_eq!(packages[0].item_count(), 2);
        }
    }

    #[test]
    fn test_infeasible_item_names_sku() {
        let items = [
            item("MUG", cm(8, 8, 6), 1),
            item("SOFA", cm(200, 90, 80), 10),
        ];

        let err = pack(&items, &catalog(), &PackingPolicy::default()).unwrap_err();
        assert!(matches!(err, CoreError::InfeasibleItem { ref sku } if sku == "SOFA"));
    }

    #[test]
    fn test_inactive_carton_never_selected() {
        let mut cartons = catalog();
        for carton in cartons.iter_mut() {
            if carton.name() == "Small" {
                carton.deactivate();
            }
        }

        let packages = pack(
            &[item("MUG", cm(8, 8, 6), 1)],
            &cartons,
            &PackingPolicy::default(),
        )
        .unwrap();
        assert_eq!(packages[0].carton().name(), "Medium");

        for carton in cartons.iter_mut() {
            carton.deactivate();
        }
        let err = pack(
            &[item("MUG", cm(8, 8, 6), 1)],
            &cartons,
            &PackingPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InfeasibleItem { .. }));
    }

    #[test]
    fn test_best_fit_uses_no_more_packages_than_first_fit() {
        // One 2000 cm³ carton type, items of 1400/900/700/400/300/300 cm³.
        // FFD strands the last item in a third box; BFD fills two exactly.
        let cartons = vec![Carton::create("Tall", cm(10, 10, 20), kg(100)).unwrap()];
        let items: Vec<EnrichedItem> = [14, 9, 7, 4, 3, 3]
            .iter()
            .enumerate()
            .map(|(i, h)| item(&format!("I{i}"), cm(10, 10, *h), 1))
            .collect();

        let bfd = PackingPolicy {
            optimize_for_minimum_boxes: true,
            max_utilization_threshold: Decimal::ONE,
            ..PackingPolicy::default()
        };
        let ffd = PackingPolicy {
            optimize_for_minimum_boxes: false,
            ..bfd.clone()
        };

        let bfd_packages = pack(&items, &cartons, &bfd).unwrap();
        let ffd_packages = pack(&items, &cartons, &ffd).unwrap();

        assert_eq!(bfd_packages.len(), 2);
        assert_eq!(ffd_packages.len(), 3);
        assert!(bfd_packages.len() <= ffd_packages.len());
    }

    #[test]
    fn test_items_sorted_largest_first_stably() {
        let cartons = vec![Carton::create("Big", cm(50, 50, 50), kg(100)).unwrap()];
        let items = [
            item("SMALL", cm(2, 2, 2), 1),
            item("EQUAL-1", cm(5, 5, 5), 1),
            item("EQUAL-2", cm(5, 5, 5), 1),
        ];

        let packages = pack(&items, &cartons, &PackingPolicy::default()).unwrap();
        let skus: Vec<&str> = packages[0].items().iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(skus, vec!["EQUAL-1", "EQUAL-2", "SMALL"]);
    }

    #[test]
    fn test_item_over_threshold_in_small_carton_moves_up() {
        // Fills Small completely, which is over the 0.95 threshold
        let policy = PackingPolicy::default();
        let packages = pack(&[item("SNUG", cm(15, 10, 8), 1)], &catalog(), &policy).unwrap();
        assert_eq!(packages[0].carton().name(), "Medium");
    }

    struct CountingPacker {
        calls: Cell<u32>,
    }

    impl PackingAlgorithm for CountingPacker {
        fn pack(
            &self,
            items: &[EnrichedItem],
            cartons: &[Carton],
            policy: &PackingPolicy,
        ) -> CoreResult<Vec<Package>> {
            self.calls.set(self.calls.get() + 1);
            GreedyPacker.pack(items, cartons, policy)
        }
    }

    #[test]
    fn test_mixed_categories_rejected_before_algorithm() {
        let packer = CountingPacker { calls: Cell::new(0) };
        let mut book = item("BOOK", cm(5, 5, 5), 1);
        book.category = "books".to_string();
        let items = [item("MUG", cm(8, 8, 6), 1), book];
        let policy = PackingPolicy {
            allow_mixed_categories: false,
            ..PackingPolicy::default()
        };

        let err = calculate_packing_solution(&items, &catalog(), Some(&policy), &packer).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MixedCategories)
        ));
        assert_eq!(packer.calls.get(), 0);

        let solution =
            calculate_packing_solution(&items, &catalog(), Some(&PackingPolicy::default()), &packer)
                .unwrap();
        assert_eq!(packer.calls.get(), 1);
        assert_eq!(solution.total_items(), 2);
        assert!(solution.request_id().is_none());
    }

    #[test]
    fn test_missing_policy_rejected() {
        let err = calculate_packing_solution(
            &[item("MUG", cm(8, 8, 6), 1)],
            &catalog(),
            None,
            &GreedyPacker,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::MissingPolicy)));
    }
}
