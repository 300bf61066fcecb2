//! Carton catalog management.
//!
//! Every mutation loads the aggregate, applies the change through its own
//! methods and saves it, so lifecycle events reach the outbox with the row.

use serde::{Deserialize, Serialize};
use tracing::info;

use cartonization_core::{Carton, CartonId, Dimension, Weight};
use cartonization_db::{CartonRepository, Database};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCartonCommand {
    pub name: String,
    pub dimensions: Dimension,
    pub max_weight: Weight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCartonCommand {
    pub carton_id: String,
    pub name: String,
    pub dimensions: Dimension,
    pub max_weight: Weight,
}

/// Use cases over the carton catalog.
#[derive(Debug, Clone)]
pub struct CartonManagementService {
    cartons: CartonRepository,
}

impl CartonManagementService {
    pub fn new(db: &Database) -> Self {
        CartonManagementService {
            cartons: db.cartons(),
        }
    }

    pub async fn create_carton(&self, command: CreateCartonCommand) -> ServiceResult<Carton> {
        let mut carton = Carton::create(command.name, command.dimensions, command.max_weight)?;
        self.cartons.save(&mut carton).await?;

        info!(carton_id = %carton.id(), "Carton stored");
        Ok(carton)
    }

    pub async fn get_carton(&self, id: &str) -> ServiceResult<Carton> {
        self.load(id).await
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<Carton>> {
        Ok(self.cartons.find_all().await?)
    }

    pub async fn list_active(&self) -> ServiceResult<Vec<Carton>> {
        Ok(self.cartons.find_all_active().await?)
    }

    /// Replaces name, dimensions and capacity. The carton keeps its id.
    pub async fn update_carton(&self, command: UpdateCartonCommand) -> ServiceResult<Carton> {
        let mut carton = self.load(&command.carton_id).await?;
        carton.update_carton(&command.name, command.dimensions, command.max_weight)?;
        self.cartons.save(&mut carton).await?;
        Ok(carton)
    }

    pub async fn deactivate_carton(&self, id: &str) -> ServiceResult<Carton> {
        let mut carton = self.load(id).await?;
        carton.deactivate();
        self.cartons.save(&mut carton).await?;
        Ok(carton)
    }

    pub async fn activate_carton(&self, id: &str) -> ServiceResult<Carton> {
        let mut carton = self.load(id).await?;
        carton.activate();
        self.cartons.save(&mut carton).await?;
        Ok(carton)
    }

    async fn load(&self, id: &str) -> ServiceResult<Carton> {
        self.cartons
            .find_by_id(&CartonId::from_existing(id))
            .await?
            .ok_or_else(|| ServiceError::CartonNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{cm, kg, memory_db};
    use cartonization_core::{CartonStatus, CoreError};
    use rust_decimal::Decimal;

    fn create(name: &str) -> CreateCartonCommand {
        CreateCartonCommand {
            name: name.to_string(),
            dimensions: cm(25, 20, 15),
            max_weight: kg(Decimal::from(15)),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = memory_db().await;
        let service = CartonManagementService::new(&db);

        let created = service.create_carton(create("  Medium  ")).await.unwrap();
        assert_eq!(created.name(), "Medium");
        assert!(created.pending_events().is_empty());

        let loaded = service.get_carton(created.id().as_str()).await.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let db = memory_db().await;
        let service = CartonManagementService::new(&db);

        let err = service.create_carton(create("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::CartonState { .. })));
        assert_eq!(db.cartons().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let db = memory_db().await;
        let service = CartonManagementService::new(&db);
        let created = service.create_carton(create("Medium")).await.unwrap();

        let updated = service
            .update_carton(UpdateCartonCommand {
                carton_id: created.id().to_string(),
                name: "Medium Plus".to_string(),
                dimensions: cm(30, 20, 15),
                max_weight: kg(Decimal::from(18)),
            })
            .await
            .unwrap();

        assert_eq!(updated.id(), created.id());
        let loaded = service.get_carton(created.id().as_str()).await.unwrap();
        assert_eq!(loaded.name(), "Medium Plus");
        assert_eq!(loaded.dimensions().length(), Decimal::from(30));
        assert_eq!(db.cartons().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_and_activate() {
        let db = memory_db().await;
        let service = CartonManagementService::new(&db);
        let created = service.create_carton(create("Medium")).await.unwrap();
        let id = created.id().to_string();

        let carton = service.deactivate_carton(&id).await.unwrap();
        assert_eq!(carton.status(), CartonStatus::Inactive);
        assert!(service.list_active().await.unwrap().is_empty());

        // Second deactivate is a no-op and queues nothing.
        service.deactivate_carton(&id).await.unwrap();

        service.activate_carton(&id).await.unwrap();
        assert_eq!(service.list_active().await.unwrap().len(), 1);

        let types: Vec<String> = db
            .outbox()
            .get_pending(100)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(types, vec!["CartonCreated", "CartonDeactivated", "CartonUpdated"]);
    }

    #[tokio::test]
    async fn test_unknown_carton() {
        let db = memory_db().await;
        let service = CartonManagementService::new(&db);

        let err = service.deactivate_carton("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::CartonNotFound { ref id } if id == "missing"));
    }
}
