//! # Outbox Relay
//!
//! Delivers queued events from `event_outbox` to an [`EventPublisher`].
//!
//! ## Relay Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       OutboxRelay::relay_pending                        │
//! │                                                                         │
//! │  outbox.get_pending(batch_size)                                        │
//! │       │   (published_at IS NULL AND attempts < 10, oldest first)       │
//! │       ▼                                                                 │
//! │  for each entry:                                                       │
//! │       publisher.publish(topic, event_key, payload)                     │
//! │            │                                                            │
//! │            ├── Ok  ──► outbox.mark_published(id)                       │
//! │            └── Err ──► outbox.mark_failed(id, error)                   │
//! │                         attempts += 1; at 10 the entry is parked       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed entry does not stop the pass; later entries are still tried.

use serde::Serialize;
use std::future::Future;
use tracing::{debug, info, warn};

use cartonization_db::{OutboxRepository, MAX_DELIVERY_ATTEMPTS};

use crate::error::ServiceResult;

// =============================================================================
// Publisher
// =============================================================================

/// Destination for domain events.
pub trait EventPublisher {
    fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> impl Future<Output = ServiceResult<()>> + Send;
}

/// Publishes each event as a structured log record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> ServiceResult<()> {
        info!(
            target: "cartonization::events",
            topic = %topic,
            key = %key,
            payload = %payload,
            "Event published"
        );
        Ok(())
    }
}

// =============================================================================
// Relay
// =============================================================================

/// Outcome of one relay pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelayReport {
    pub published: usize,
    pub failed: usize,
}

/// Moves pending outbox entries to a publisher.
pub struct OutboxRelay<P> {
    outbox: OutboxRepository,
    publisher: P,
    batch_size: u32,
}

impl<P: EventPublisher> OutboxRelay<P> {
    pub fn new(outbox: OutboxRepository, publisher: P, batch_size: u32) -> Self {
        OutboxRelay {
            outbox,
            publisher,
            batch_size,
        }
    }

    /// Runs one pass over at most `batch_size` pending entries.
    pub async fn relay_pending(&self) -> ServiceResult<RelayReport> {
        let entries = self.outbox.get_pending(self.batch_size).await?;
        if entries.is_empty() {
            debug!("No pending outbox entries");
            return Ok(RelayReport::default());
        }

        info!(count = entries.len(), "Relaying outbox batch");
        let mut report = RelayReport::default();

        for entry in entries {
            match self
                .publisher
                .publish(&entry.topic, &entry.event_key, &entry.payload)
                .await
            {
                Ok(()) => {
                    self.outbox.mark_published(&entry.id).await?;
                    report.published += 1;
                }
                Err(e) => {
                    self.outbox.mark_failed(&entry.id, &e.to_string()).await?;
                    report.failed += 1;

                    if entry.attempts + 1 >= MAX_DELIVERY_ATTEMPTS {
                        warn!(
                            id = %entry.id,
                            event_type = %entry.event_type,
                            aggregate_id = %entry.aggregate_id,
                            "Giving up on event after max delivery attempts"
                        );
                    } else {
                        warn!(
                            id = %entry.id,
                            event_type = %entry.event_type,
                            attempts = entry.attempts + 1,
                            error = %e,
                            "Event delivery failed"
                        );
                    }
                }
            }
        }

        info!(
            published = report.published,
            failed = report.failed,
            "Relay pass complete"
        );
        Ok(report)
    }

    /// Deletes entries published more than `days` days ago.
    pub async fn cleanup(&self, days: u32) -> ServiceResult<u64> {
        let deleted = self.outbox.cleanup_old_entries(days).await?;
        info!(deleted, days, "Cleaned up published outbox entries");
        Ok(deleted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
