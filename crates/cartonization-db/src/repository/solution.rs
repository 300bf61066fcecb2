//! # Packing Solution Repository
//!
//! Stores calculated solutions and queues `PackingSolutionCalculated`.
//!
//! ## Storage Layout
//! ```text
//! packing_solutions
//! ├── id, request_id (UNIQUE), order_id   ← lookup columns
//! ├── total_packages, total_items         ← summary columns
//! ├── average_utilization                 ← decimal as TEXT
//! ├── payload                             ← full PackingSolution JSON
//! └── created_at
//! ```
//!
//! The request id is the idempotency key: a second save for the same
//! request fails with [`DbError::UniqueViolation`] and queues nothing.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use cartonization_core::solution::{PackingSolution, PackingSolutionCalculated};

use super::outbox::{self, NewOutboxEntry};
use crate::error::{DbError, DbResult};

const SOLUTION_AGGREGATE: &str = "packing_solution";

#[derive(Debug, sqlx::FromRow)]
struct SolutionRow {
    id: String,
    payload: String,
}

impl SolutionRow {
    fn into_solution(self) -> DbResult<PackingSolution> {
        serde_json::from_str(&self.payload)
            .map_err(|e| DbError::invalid_data(format!("solution {}: {e}", self.id)))
    }
}

/// Repository for stored packing solutions.
#[derive(Debug, Clone)]
pub struct PackingSolutionRepository {
    pool: SqlitePool,
}

impl PackingSolutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PackingSolutionRepository { pool }
    }

    /// Stores a solution and queues its calculated event in one transaction.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] on `request_id` when a solution for the
    /// same request already exists.
    pub async fn save(&self, solution: &PackingSolution) -> DbResult<()> {
        let payload = serde_json::to_string(solution)?;
        let event = solution.calculated_event();
        let event_payload = serde_json::to_string(&event)?;
        let total_items = i64::try_from(solution.total_items())
            .map_err(|_| DbError::invalid_data("total_items exceeds INTEGER range"))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO packing_solutions (
                id, request_id, order_id, total_packages, total_items,
                average_utilization, payload, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(solution.id())
        .bind(solution.request_id())
        .bind(solution.order_id())
        .bind(solution.total_packages() as i64)
        .bind(total_items)
        .bind(solution.average_utilization().to_string())
        .bind(&payload)
        .bind(solution.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field.ends_with("request_id") => {
                DbError::duplicate("request_id", solution.request_id().unwrap_or_default())
            }
            other => other,
        })?;

        outbox::enqueue(
            &mut tx,
            NewOutboxEntry {
                aggregate_type: SOLUTION_AGGREGATE,
                aggregate_id: solution.id(),
                event_type: PackingSolutionCalculated::EVENT_TYPE,
                topic: event.topic(),
                event_key: event.key(),
                payload: event_payload,
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            solution_id = %solution.id(),
            request_id = ?solution.request_id(),
            packages = solution.total_packages(),
            "Stored packing solution"
        );
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<PackingSolution>> {
        let row = sqlx::query_as::<_, SolutionRow>(
            "SELECT id, payload FROM packing_solutions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SolutionRow::into_solution).transpose()
    }

    pub async fn find_by_request_id(&self, request_id: &str) -> DbResult<Option<PackingSolution>> {
        let row = sqlx::query_as::<_, SolutionRow>(
            "SELECT id, payload FROM packing_solutions WHERE request_id = ?1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SolutionRow::into_solution).transpose()
    }

    /// All solutions for an order, newest first.
    pub async fn find_by_order_id(&self, order_id: &str) -> DbResult<Vec<PackingSolution>> {
        let rows = sqlx::query_as::<_, SolutionRow>(
            r#"
            SELECT id, payload FROM packing_solutions
            WHERE order_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SolutionRow::into_solution).collect()
    }

    /// The `limit` most recent solutions, newest first.
    pub async fn find_recent(&self, limit: u32) -> DbResult<Vec<PackingSolution>> {
        let rows = sqlx::query_as::<_, SolutionRow>(
            r#"
            SELECT id, payload FROM packing_solutions
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SolutionRow::into_solution).collect()
    }

    pub async fn exists_by_request_id(&self, request_id: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM packing_solutions WHERE request_id = ?1)",
        )
        .bind(request_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Deletes solutions created before `cutoff`. Returns the number deleted.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM packing_solutions WHERE created_at < ?1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        debug!(deleted = result.rows_affected(), "Pruned packing solutions");
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packing_solutions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
