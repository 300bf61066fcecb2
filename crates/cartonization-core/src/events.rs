//! # Domain Events
//!
//! Facts recorded by the carton aggregate and the packing service.
//!
//! The core never delivers events. A [`Carton`](crate::carton::Carton)
//! appends them to an internal buffer; the persistence layer drains the
//! buffer with `take_events()` and writes it into the outbox in the same
//! transaction as the carton row.
//!
//! ```text
//! Carton::create ──► [Created] ──┐
//! update_*       ──► [Updated] ──┼──► take_events() ──► event_outbox ──► relay
//! deactivate     ──► [Deactivated]┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::measurement::{Dimension, Weight};

// =============================================================================
// Topics
// =============================================================================

pub const CARTON_CREATED_TOPIC: &str = "cartonization.carton.created";
pub const CARTON_UPDATED_TOPIC: &str = "cartonization.carton.updated";
pub const CARTON_DEACTIVATED_TOPIC: &str = "cartonization.carton.deactivated";
pub const PACKING_SOLUTION_CALCULATED_TOPIC: &str = "cartonization.packing-solution.calculated";

// =============================================================================
// Carton Events
// =============================================================================

/// A lifecycle event emitted by a carton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CartonEvent {
    Created {
        carton_id: String,
        name: String,
        dimensions: Dimension,
        max_weight: Weight,
        occurred_on: DateTime<Utc>,
    },
    Updated {
        carton_id: String,
        name: String,
        dimensions: Dimension,
        max_weight: Weight,
        occurred_on: DateTime<Utc>,
    },
    Deactivated {
        carton_id: String,
        occurred_on: DateTime<Utc>,
    },
}

impl CartonEvent {
    /// Name stored in the outbox `event_type` column.
    pub fn event_type(&self) -> &'static str {
        match self {
            CartonEvent::Created { .. } => "CartonCreated",
            CartonEvent::Updated { .. } => "CartonUpdated",
            CartonEvent::Deactivated { .. } => "CartonDeactivated",
        }
    }

    /// Topic the relay publishes this event to.
    pub fn topic(&self) -> &'static str {
        match self {
            CartonEvent::Created { .. } => CARTON_CREATED_TOPIC,
            CartonEvent::Updated { .. } => CARTON_UPDATED_TOPIC,
            CartonEvent::Deactivated { .. } => CARTON_DEACTIVATED_TOPIC,
        }
    }

    /// The carton the event belongs to. Used as the message key.
    pub fn carton_id(&self) -> &str {
        match self {
            CartonEvent::Created { carton_id, .. }
            | CartonEvent::Updated { carton_id, .. }
            | CartonEvent::Deactivated { carton_id, .. } => carton_id,
        }
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            CartonEvent::Created { occurred_on, .. }
            | CartonEvent::Updated { occurred_on, .. }
            | CartonEvent::Deactivated { occurred_on, .. } => *occurred_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deactivated_event_serialization() {
        let event = CartonEvent::Deactivated {
            carton_id: "c-1".to_string(),
            occurred_on: Utc::now(),
        };

        assert_eq!(event.event_type(), "CartonDeactivated");
        assert_eq!(event.topic(), CARTON_DEACTIVATED_TOPIC);
        assert_eq!(event.carton_id(), "c-1");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "deactivated");

        let back: CartonEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
