//! # Packing Solution Service
//!
//! Orchestrates one packing request end to end.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   PackingSolutionService::calculate                     │
//! │                                                                         │
//! │  CalculatePackingCommand { request_id, order_id, items, policy }       │
//! │       │                                                                 │
//! │       ├── stored solution for request_id? ──► return it (idempotent)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cartons.find_all_active()        ── empty ──► NoActiveCartons         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  enricher.enrich(items)           ── unknown ──► ProductNotFound       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  overrides.apply(default_policy)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  calculate_packing_solution()     ── rejected ──► Core(Validation)     │
//! │       │                           ── no carton ──► Core(Infeasible)    │
//! │       ▼                                                                 │
//! │  solutions.save()  ← solution row + PackingSolutionCalculated outbox   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use cartonization_core::validation::ValidationResult;
use cartonization_core::{
    calculate_packing_solution, GreedyPacker, PackingAlgorithm, PackingPolicy, PackingSolution,
    RequestedItem, ValidationError,
};
use cartonization_db::{
    CartonRepository, Database, DbError, PackingSolutionRepository,
};

use crate::error::{ServiceError, ServiceResult};
use crate::services::enrichment::ProductDimensionEnricher;

// =============================================================================
// Command
// =============================================================================

/// Per-request policy flags. Unset fields fall back to the configured policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverrides {
    #[serde(default)]
    pub optimize_for_minimum_boxes: Option<bool>,
    #[serde(default)]
    pub allow_mixed_categories: Option<bool>,
    #[serde(default)]
    pub separate_fragile_items: Option<bool>,
    #[serde(default)]
    pub max_utilization_threshold: Option<Decimal>,
}

impl PolicyOverrides {
    pub fn apply(&self, base: &PackingPolicy) -> PackingPolicy {
        PackingPolicy {
            optimize_for_minimum_boxes: self
                .optimize_for_minimum_boxes
                .unwrap_or(base.optimize_for_minimum_boxes),
            allow_mixed_categories: self
                .allow_mixed_categories
                .unwrap_or(base.allow_mixed_categories),
            separate_fragile_items: self
                .separate_fragile_items
                .unwrap_or(base.separate_fragile_items),
            max_utilization_threshold: self
                .max_utilization_threshold
                .unwrap_or(base.max_utilization_threshold),
        }
    }
}

/// A request to pack a list of SKUs.
///
/// ## JSON Form
/// ```json
/// {
///   "request_id": "req-42",
///   "order_id": "order-7",
///   "items": [{ "sku": "BOOK-001", "quantity": 2 }],
///   "policy": { "allow_mixed_categories": false }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatePackingCommand {
    pub request_id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub items: Vec<RequestedItem>,
    #[serde(default)]
    pub policy: PolicyOverrides,
}

impl CalculatePackingCommand {
    pub fn new(request_id: impl Into<String>, items: Vec<RequestedItem>) -> Self {
        CalculatePackingCommand {
            request_id: request_id.into(),
            order_id: None,
            items,
            policy: PolicyOverrides::default(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.request_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "request_id".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Service
// =============================================================================

/// Calculates, stores and announces packing solutions.
pub struct PackingSolutionService<A = GreedyPacker> {
    cartons: CartonRepository,
    solutions: PackingSolutionRepository,
    enricher: ProductDimensionEnricher,
    default_policy: PackingPolicy,
    algorithm: A,
}

impl PackingSolutionService<GreedyPacker> {
    pub fn new(db: &Database, default_policy: PackingPolicy) -> Self {
        Self::with_algorithm(db, default_policy, GreedyPacker)
    }
}

impl<A: PackingAlgorithm> PackingSolutionService<A> {
    pub fn with_algorithm(db: &Database, default_policy: PackingPolicy, algorithm: A) -> Self {
        PackingSolutionService {
            cartons: db.cartons(),
            solutions: db.solutions(),
            enricher: ProductDimensionEnricher::new(db.products()),
            default_policy,
            algorithm,
        }
    }

    /// Calculates the solution for a request, or returns the one already
    /// stored for its request id.
    pub async fn calculate(&self, command: &CalculatePackingCommand) -> ServiceResult<PackingSolution> {
        command.validate()?;
        info!(
            request_id = %command.request_id,
            items = command.items.len(),
            "Processing packing solution request"
        );

        if let Some(existing) = self.solutions.find_by_request_id(&command.request_id).await? {
            info!(
                request_id = %command.request_id,
                solution_id = %existing.id(),
                "Returning stored solution"
            );
            return Ok(existing);
        }

        match self.calculate_new(command).await {
            Ok(solution) => Ok(solution),
            Err(e) => {
                error!(request_id = %command.request_id, error = %e, "Failed to calculate packing solution");
                Err(e)
            }
        }
    }

    async fn calculate_new(&self, command: &CalculatePackingCommand) -> ServiceResult<PackingSolution> {
        let cartons = self.cartons.find_all_active().await?;
        if cartons.is_empty() {
            return Err(ServiceError::NoActiveCartons);
        }

        let items = self.enricher.enrich(&command.items).await?;
        let policy = command.policy.apply(&self.default_policy);

        let mut solution =
            calculate_packing_solution(&items, &cartons, Some(&policy), &self.algorithm)?;
        solution.set_request_id(command.request_id.clone());
        if let Some(order_id) = &command.order_id {
            solution.set_order_id(order_id.clone());
        }

        match self.solutions.save(&solution).await {
            Ok(()) => {}
            // Another caller stored this request first.
            Err(DbError::UniqueViolation { .. }) => {
                if let Some(existing) =
                    self.solutions.find_by_request_id(&command.request_id).await?
                {
                    return Ok(existing);
                }
                return Err(DbError::duplicate("request_id", command.request_id.clone()).into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            request_id = %command.request_id,
            solution_id = %solution.id(),
            packages = solution.total_packages(),
            items = solution.total_items(),
            average_utilization = %solution.average_utilization(),
            "Calculated packing solution"
        );

        Ok(solution)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{book, cm, kg, memory_db, seed_cartons};
    use cartonization_core::{Carton, CoreError, ProductInfo};

    fn command(request_id: &str, items: &[(&str, u32)]) -> CalculatePackingCommand {
        CalculatePackingCommand::new(
            request_id,
            items
                .iter()
                .map(|(sku, qty)| RequestedItem::new(*sku, *qty).unwrap())
                .collect(),
        )
    }

    fn mug() -> ProductInfo {
        ProductInfo {
            sku: "MUG-1".to_string(),
            name: "Mug".to_string(),
            dimensions: cm(10, 10, 10),
            weight: kg(Decimal::new(4, 1)),
            category: "kitchen".to_string(),
            fragile: false,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_calculate_persists_and_queues_event() {
        let db = memory_db().await;
        seed_cartons(&db).await;
        db.products().upsert(&book("BOOK-1")).await.unwrap();

        let service = PackingSolutionService::new(&db, PackingPolicy::default());
        let mut cmd = command("req-1", &[("BOOK-1", 2)]);
        cmd.order_id = Some("order-1".to_string());

        let solution = service.calculate(&cmd).await.unwrap();

        assert_eq!(solution.total_packages(), 1);
        assert_eq!(solution.total_items(), 2);
        assert_eq!(solution.request_id(), Some("req-1"));
        assert_eq!(solution.order_id(), Some("order-1"));
        assert!(db.solutions().exists_by_request_id("req-1").await.unwrap());

        let pending = db.outbox().get_pending(100).await.unwrap();
        let calculated: Vec<_> = pending
            .iter()
            .filter(|e| e.event_type == "PackingSolutionCalculated")
            .collect();
        assert_eq!(calculated.len(), 1);
        assert_eq!(calculated[0].event_key, "req-1");
    }

    #[tokio::test]
    async fn test_same_request_id_returns_stored_solution() {
        let db = memory_db().await;
        seed_cartons(&db).await;
        db.products().upsert(&book("BOOK-1")).await.unwrap();
        let service = PackingSolutionService::new(&db, PackingPolicy::default());

        let first = service.calculate(&command("req-1", &[("BOOK-1", 1)])).await.unwrap();
        let second = service.calculate(&command("req-1", &[("BOOK-1", 1)])).await.unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(db.solutions().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_active_cartons() {
        let db = memory_db().await;
        db.products().upsert(&book("BOOK-1")).await.unwrap();

        let mut only = Carton::create("Only", cm(30, 30, 30), kg(Decimal::from(10))).unwrap();
        only.deactivate();
        db.cartons().save(&mut only).await.unwrap();

        let service = PackingSolutionService::new(&db, PackingPolicy::default());
        let err = service
            .calculate(&command("req-1", &[("BOOK-1", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NoActiveCartons));
    }

    #[tokio::test]
    async fn test_override_forbids_mixed_categories() {
        let db = memory_db().await;
        seed_cartons(&db).await;
        db.products().upsert(&book("BOOK-1")).await.unwrap();
        db.products().upsert(&mug()).await.unwrap();

        let service = PackingSolutionService::new(&db, PackingPolicy::default());
        let mut cmd = command("req-1", &[("BOOK-1", 1), ("MUG-1", 1)]);
        cmd.policy.allow_mixed_categories = Some(false);

        let err = service.calculate(&cmd).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Validation(ValidationError::MixedCategories))
        ));
        assert_eq!(db.solutions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_sku() {
        let db = memory_db().await;
        seed_cartons(&db).await;

        let service = PackingSolutionService::new(&db, PackingPolicy::default());
        let err = service
            .calculate(&command("req-1", &[("GHOST", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::ProductNotFound { ref sku } if sku == "GHOST"));
    }

    #[tokio::test]
    async fn test_blank_request_id() {
        let db = memory_db().await;
        let service = PackingSolutionService::new(&db, PackingPolicy::default());

        let err = service
            .calculate(&command("  ", &[("BOOK-1", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Validation(ValidationError::Required { ref field }))
                if field == "request_id"
        ));
    }

    #[test]
    fn test_overrides_fall_back_to_defaults() {
        let base = PackingPolicy::default();
        let overrides = PolicyOverrides {
            separate_fragile_items: Some(false),
            max_utilization_threshold: Some(Decimal::new(8, 1)),
            ..PolicyOverrides::default()
        };

        let policy = overrides.apply(&base);
        assert!(policy.optimize_for_minimum_boxes);
        assert!(policy.allow_mixed_categories);
        assert!(!policy.separate_fragile_items);
        assert_eq!(policy.max_utilization_threshold, Decimal::new(8, 1));
    }

    #[test]
    fn test_command_from_json() {
        let json = r#"{
            "request_id": "req-9",
            "items": [{ "sku": "BOOK-1", "quantity": 2 }],
            "policy": { "optimize_for_minimum_boxes": false }
        }"#;
        let cmd: CalculatePackingCommand = serde_json::from_str(json).unwrap();

        assert_eq!(cmd.order_id, None);
        assert_eq!(cmd.items[0].quantity, 2);
        assert_eq!(cmd.policy.optimize_for_minimum_boxes, Some(false));
        assert_eq!(cmd.policy.allow_mixed_categories, None);
    }
}
