//! # Carton Repository
//!
//! Persistence for the carton catalog.
//!
//! ## Saving a Carton
//! ```text
//! carton.update_max_weight(..)      ← aggregate records CartonEvent::Updated
//!       │
//!       ▼
//! CartonRepository::save(&mut carton)
//!       │
//!       ├── BEGIN
//!       ├── UPSERT cartons row
//!       ├── INSERT event_outbox row per pending event
//!       ├── COMMIT
//!       └── carton.take_events()    ← buffer cleared only after commit
//! ```
//!
//! A failed save leaves the events on the aggregate, so retrying the save
//! queues them again.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use cartonization_core::carton::{Carton, CartonId, CartonStatus};
use cartonization_core::measurement::{Dimension, DimensionUnit, Weight, WeightUnit};

use super::outbox::{self, NewOutboxEntry};
use super::parse_decimal;
use crate::error::{DbError, DbResult};

const CARTON_AGGREGATE: &str = "carton";

const SELECT_CARTON: &str = r#"
    SELECT
        id, name, length, width, height, dimension_unit,
        max_weight, weight_unit, status, created_at, updated_at
    FROM cartons
"#;

/// Raw `cartons` row.
#[derive(Debug, sqlx::FromRow)]
struct CartonRow {
    id: String,
    name: String,
    length: String,
    width: String,
    height: String,
    dimension_unit: DimensionUnit,
    max_weight: String,
    weight_unit: WeightUnit,
    status: CartonStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CartonRow {
    fn into_carton(self) -> DbResult<Carton> {
        let dimensions = Dimension::new(
            parse_decimal("length", &self.length)?,
            parse_decimal("width", &self.width)?,
            parse_decimal("height", &self.height)?,
            self.dimension_unit,
        )
        .map_err(|e| DbError::invalid_data(format!("carton {}: {e}", self.id)))?;

        let max_weight = Weight::new(parse_decimal("max_weight", &self.max_weight)?, self.weight_unit)
            .map_err(|e| DbError::invalid_data(format!("carton {}: {e}", self.id)))?;

        Ok(Carton::reconstitute(
            CartonId::from_existing(self.id),
            self.name,
            dimensions,
            max_weight,
            self.status,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Repository for carton catalog operations.
#[derive(Debug, Clone)]
pub struct CartonRepository {
    pool: SqlitePool,
}

impl CartonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartonRepository { pool }
    }

    /// Inserts or updates a carton and queues its pending events.
    ///
    /// The row and the outbox entries are written in one transaction.
    /// The aggregate's event buffer is drained only when the commit succeeds.
    pub async fn save(&self, carton: &mut Carton) -> DbResult<()> {
        let dims = carton.dimensions();
        let max_weight = carton.max_weight();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cartons (
                id, name, length, width, height, dimension_unit,
                max_weight, weight_unit, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                length = excluded.length,
                width = excluded.width,
                height = excluded.height,
                dimension_unit = excluded.dimension_unit,
                max_weight = excluded.max_weight,
                weight_unit = excluded.weight_unit,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(carton.id().as_str())
        .bind(carton.name())
        .bind(dims.length().to_string())
        .bind(dims.width().to_string())
        .bind(dims.height().to_string())
        .bind(dims.unit())
        .bind(max_weight.value().to_string())
        .bind(max_weight.unit())
        .bind(carton.status())
        .bind(carton.created_at())
        .bind(carton.updated_at())
        .execute(&mut *tx)
        .await?;

        for event in carton.pending_events() {
            let payload = serde_json::to_string(event)?;
            outbox::enqueue(
                &mut tx,
                NewOutboxEntry {
                    aggregate_type: CARTON_AGGREGATE,
                    aggregate_id: carton.id().as_str(),
                    event_type: event.event_type(),
                    topic: event.topic(),
                    event_key: event.carton_id(),
                    payload,
                },
            )
            .await?;
        }

        tx.commit().await?;

        let drained = carton.take_events();
        debug!(
            carton_id = %carton.id(),
            events = drained.len(),
            "Saved carton"
        );

        Ok(())
    }

    pub async fn find_by_id(&self, id: &CartonId) -> DbResult<Option<Carton>> {
        let row = sqlx::query_as::<_, CartonRow>(&format!("{SELECT_CARTON} WHERE id = ?1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(CartonRow::into_carton).transpose()
    }

    /// Like [`find_by_id`](Self::find_by_id) but a missing carton is an error.
    pub async fn get_by_id(&self, id: &CartonId) -> DbResult<Carton> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Carton", id.as_str()))
    }

    /// All cartons, oldest first.
    pub async fn find_all(&self) -> DbResult<Vec<Carton>> {
        let rows = sqlx::query_as::<_, CartonRow>(&format!(
            "{SELECT_CARTON} ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartonRow::into_carton).collect()
    }

    /// Active cartons, oldest first. This is the packing catalog.
    pub async fn find_all_active(&self) -> DbResult<Vec<Carton>> {
        let rows = sqlx::query_as::<_, CartonRow>(&format!(
            "{SELECT_CARTON} WHERE status = ?1 ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(CartonStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartonRow::into_carton).collect()
    }

    /// Returns whether a row was deleted.
    pub async fn delete_by_id(&self, id: &CartonId) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cartons WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists_by_id(&self, id: &CartonId) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cartons WHERE id = ?1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cartons")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
