//! # Event Outbox Repository
//!
//! Durable queue of domain events waiting to be relayed.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  LOCAL OPERATION (e.g., CartonRepository::save)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. INSERT ... ON CONFLICT DO UPDATE cartons                   │   │
//! │  │                                                                 │   │
//! │  │  2. INSERT INTO event_outbox (event_type, topic, payload, ...) │   │
//! │  │     one row per drained CartonEvent                            │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both succeed or both fail                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            OUTBOX RELAY (cartonization-service)                 │   │
//! │  │                                                                 │   │
//! │  │  1. get_pending(limit): published_at IS NULL, attempts < 10    │   │
//! │  │  2. For each entry:                                            │   │
//! │  │     a. publish(topic, key, payload)                            │   │
//! │  │     b. On success: mark_published                              │   │
//! │  │     c. On failure: mark_failed (attempts += 1, last_error)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Entries that reach MAX_DELIVERY_ATTEMPTS stay in the table for        │
//! │  inspection but are no longer returned by get_pending.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Delivery attempts after which an entry is no longer retried.
pub const MAX_DELIVERY_ATTEMPTS: i64 = 10;

/// A stored outbox row.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct OutboxEntry {
    pub id: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub topic: String,
    pub event_key: String,
    pub payload: String,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub attempted_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

/// An event about to be queued.
#[derive(Debug, Clone)]
pub struct NewOutboxEntry<'a> {
    pub aggregate_type: &'a str,
    pub aggregate_id: &'a str,
    pub event_type: &'a str,
    pub topic: &'a str,
    pub event_key: &'a str,
    pub payload: String,
}

/// Inserts an outbox row on an open connection or transaction.
///
/// Returns the new entry id.
pub(crate) async fn enqueue(
    conn: &mut SqliteConnection,
    entry: NewOutboxEntry<'_>,
) -> DbResult<String> {
    let id = Uuid::new_v4().to_string();

    debug!(
        event_type = %entry.event_type,
        aggregate_id = %entry.aggregate_id,
        "Queuing event"
    );

    sqlx::query(
        r#"
        INSERT INTO event_outbox (
            id, aggregate_type, aggregate_id, event_type, topic,
            event_key, payload, attempts, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
        "#,
    )
    .bind(&id)
    .bind(entry.aggregate_type)
    .bind(entry.aggregate_id)
    .bind(entry.event_type)
    .bind(entry.topic)
    .bind(entry.event_key)
    .bind(&entry.payload)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(id)
}

/// Repository for outbox operations.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    pool: SqlitePool,
}

impl OutboxRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OutboxRepository { pool }
    }

    /// Queues an event outside any aggregate transaction.
    pub async fn enqueue(&self, entry: NewOutboxEntry<'_>) -> DbResult<String> {
        let mut conn = self.pool.acquire().await?;
        enqueue(&mut conn, entry).await
    }

    /// Unpublished entries below the retry limit, oldest first.
    pub async fn get_pending(&self, limit: u32) -> DbResult<Vec<OutboxEntry>> {
        let entries = sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT
                id, aggregate_type, aggregate_id, event_type, topic,
                event_key, payload, attempts, last_error,
                created_at, attempted_at, published_at
            FROM event_outbox
            WHERE published_at IS NULL
              AND attempts < ?1
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?2
            "#,
        )
        .bind(MAX_DELIVERY_ATTEMPTS)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<OutboxEntry>> {
        let entry = sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT
                id, aggregate_type, aggregate_id, event_type, topic,
                event_key, payload, attempts, last_error,
                created_at, attempted_at, published_at
            FROM event_outbox
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Marks an entry as delivered.
    pub async fn mark_published(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE event_outbox SET
                published_at = ?2,
                attempted_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a failed delivery attempt.
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE event_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts entries still eligible for delivery.
    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_outbox WHERE published_at IS NULL AND attempts < ?1",
        )
        .bind(MAX_DELIVERY_ATTEMPTS)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Counts entries that exhausted their retries.
    pub async fn count_exhausted(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_outbox WHERE published_at IS NULL AND attempts >= ?1",
        )
        .bind(MAX_DELIVERY_ATTEMPTS)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Deletes entries published more than `days_old` days ago.
    ///
    /// Returns the number of deleted entries.
    pub async fn cleanup_old_entries(&self, days_old: u32) -> DbResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(days_old));

        let result = sqlx::query(
            r#"
            DELETE FROM event_outbox
            WHERE published_at IS NOT NULL
              AND published_at < ?1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn entry(key: &str) -> NewOutboxEntry<'_> {
        NewOutboxEntry {
            aggregate_type: "carton",
            aggregate_id: key,
            event_type: "CartonCreated",
            topic: "cartonization.carton.created",
            event_key: key,
            payload: format!(r#"{{"carton_id":"{key}"}}"#),
        }
    }

    #[tokio::test]
    async fn test_pending_lifecycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();

        let first = outbox.enqueue(entry("c-1")).await.unwrap();
        let second = outbox.enqueue(entry("c-2")).await.unwrap();
        assert_eq!(outbox.count_pending().await.unwrap(), 2);

        let pending = outbox.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, first);
        assert_eq!(pending[0].event_key, "c-1");

        outbox.mark_published(&first).await.unwrap();
        outbox.mark_failed(&second, "broker down").await.unwrap();

        let pending = outbox.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 1);
        assert_eq!(pending[0].last_error.as_deref(), Some("broker down"));

        let published = outbox.find_by_id(&first).await.unwrap().unwrap();
        assert!(published.published_at.is_some());
    }

    #[tokio::test]
    async fn test_exhausted_entries_are_not_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();
        let id = outbox.enqueue(entry("c-1")).await.unwrap();

        for _ in 0..MAX_DELIVERY_ATTEMPTS {
            outbox.mark_failed(&id, "nope").await.unwrap();
        }

        assert!(outbox.get_pending(10).await.unwrap().is_empty());
        assert_eq!(outbox.count_pending().await.unwrap(), 0);
        assert_eq!(outbox.count_exhausted().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_recent_entries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();
        let id = outbox.enqueue(entry("c-1")).await.unwrap();
        outbox.mark_published(&id).await.unwrap();

        assert_eq!(outbox.cleanup_old_entries(7).await.unwrap(), 0);
        assert!(outbox.find_by_id(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_pending_respects_limit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();
        for key in ["a", "b", "c"] {
            outbox.enqueue(entry(key)).await.unwrap();
        }

        assert_eq!(outbox.get_pending(2).await.unwrap().len(), 2);
    }
}
