//! # Carton Aggregate
//!
//! A container type from the shipping catalog.
//!
//! ## Lifecycle
//! ```text
//!   Carton::create ──► ACTIVE ◄──────────────┐
//!                        │                   │ activate()
//!                        │ deactivate()      │ (emits Updated)
//!                        ▼                   │
//!                     INACTIVE ──────────────┘
//!
//!   deactivate() on INACTIVE / activate() on ACTIVE: no-op, warn, no event
//! ```
//!
//! Every successful mutation bumps `updated_at` and appends exactly one
//! [`CartonEvent`]. The buffer is drained by [`Carton::take_events`].
//! A carton rebuilt with [`Carton::reconstitute`] has an empty buffer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::events::CartonEvent;
use crate::measurement::{Dimension, Weight};

// =============================================================================
// Identity
// =============================================================================

/// Immutable carton identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartonId(String);

impl CartonId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        CartonId(Uuid::new_v4().to_string())
    }

    /// Wraps an identifier loaded from storage.
    pub fn from_existing(value: impl Into<String>) -> Self {
        CartonId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a carton may be selected by the packing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CartonStatus {
    Active,
    Inactive,
}

// =============================================================================
// Carton
// =============================================================================

/// A shipping container type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carton {
    id: CartonId,
    name: String,
    dimensions: Dimension,
    max_weight: Weight,
    status: CartonStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<CartonEvent>,
}

impl PartialEq for Carton {
    /// Cartons are equal when they share an identity.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Carton {}

impl Carton {
    /// Creates a new active carton and records a `Created` event.
    ///
    /// ## Errors
    /// [`CoreError::CartonState`] if the name is blank.
    ///
    /// ## Example
    /// ```rust
    /// use cartonization_core::carton::{Carton, CartonStatus};
    /// use cartonization_core::measurement::{Dimension, DimensionUnit, Weight, WeightUnit};
    /// use rust_decimal::Decimal;
    ///
    /// let dims = Dimension::new(
    ///     Decimal::from(25), Decimal::from(20), Decimal::from(15),
    ///     DimensionUnit::Centimeters,
    /// ).unwrap();
    /// let max = Weight::new(Decimal::from(15), WeightUnit::Kilograms).unwrap();
    ///
    /// let mut carton = Carton::create("Medium Box", dims, max).unwrap();
    /// assert_eq!(carton.status(), CartonStatus::Active);
    /// assert_eq!(carton.take_events().len(), 1);
    /// ```
    pub fn create(
        name: impl Into<String>,
        dimensions: Dimension,
        max_weight: Weight,
    ) -> CoreResult<Carton> {
        let name = name.into();
        validate_carton_data(&name, &dimensions, &max_weight)?;

        let now = Utc::now();
        let mut carton = Carton {
            id: CartonId::generate(),
            name: name.trim().to_string(),
            dimensions,
            max_weight,
            status: CartonStatus::Active,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };

        carton.events.push(CartonEvent::Created {
            carton_id: carton.id.to_string(),
            name: carton.name.clone(),
            dimensions: carton.dimensions.clone(),
            max_weight: carton.max_weight.clone(),
            occurred_on: now,
        });

        info!(carton_id = %carton.id, name = %carton.name, "Created carton");
        Ok(carton)
    }

    /// Rebuilds a carton from persisted state. No events are recorded.
    pub fn reconstitute(
        id: CartonId,
        name: String,
        dimensions: Dimension,
        max_weight: Weight,
        status: CartonStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Carton {
        Carton {
            id,
            name,
            dimensions,
            max_weight,
            status,
            created_at,
            updated_at,
            events: Vec::new(),
        }
    }

    /// A copy of this carton with an empty event buffer.
    ///
    /// Used when a carton is handed to packages, which only read it.
    pub fn detached(&self) -> Carton {
        Carton {
            events: Vec::new(),
            ..self.clone()
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &CartonId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &Dimension {
        &self.dimensions
    }

    pub fn max_weight(&self) -> &Weight {
        &self.max_weight
    }

    pub fn status(&self) -> CartonStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == CartonStatus::Active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Events recorded since the last drain.
    pub fn pending_events(&self) -> &[CartonEvent] {
        &self.events
    }

    /// Drains the event buffer.
    pub fn take_events(&mut self) -> Vec<CartonEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Fit Check
    // =========================================================================

    /// Checks whether one unit of an item fits in an empty carton.
    ///
    /// Weight is checked first; dimensions only if the weight passes.
    pub fn can_fit_item(&self, item_dimensions: &Dimension, item_weight: &Weight) -> bool {
        if item_weight.is_greater_than(&self.max_weight) {
            return false;
        }
        self.dimensions.can_contain(item_dimensions)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn update_dimensions(&mut self, dimensions: Dimension) -> CoreResult<()> {
        validate_dimensions(&dimensions)?;
        self.dimensions = dimensions;
        self.record_update();
        info!(carton_id = %self.id, "Updated carton dimensions");
        Ok(())
    }

    pub fn update_name(&mut self, name: &str) -> CoreResult<()> {
        validate_name(name)?;
        self.name = name.trim().to_string();
        self.record_update();
        info!(carton_id = %self.id, "Updated carton name");
        Ok(())
    }

    pub fn update_max_weight(&mut self, max_weight: Weight) -> CoreResult<()> {
        validate_weight(&max_weight)?;
        self.max_weight = max_weight;
        self.record_update();
        info!(carton_id = %self.id, "Updated carton max weight");
        Ok(())
    }

    /// Replaces name, dimensions and max weight at once. One event is recorded.
    pub fn update_carton(
        &mut self,
        name: &str,
        dimensions: Dimension,
        max_weight: Weight,
    ) -> CoreResult<()> {
        validate_carton_data(name, &dimensions, &max_weight)?;
        self.name = name.trim().to_string();
        self.dimensions = dimensions;
        self.max_weight = max_weight;
        self.record_update();
        info!(carton_id = %self.id, "Updated carton");
        Ok(())
    }

    /// Takes the carton out of the packing catalog.
    pub fn deactivate(&mut self) {
        if self.status == CartonStatus::Inactive {
            warn!(carton_id = %self.id, "Carton is already inactive");
            return;
        }

        self.status = CartonStatus::Inactive;
        self.updated_at = Utc::now();
        self.events.push(CartonEvent::Deactivated {
            carton_id: self.id.to_string(),
            occurred_on: self.updated_at,
        });
        info!(carton_id = %self.id, "Deactivated carton");
    }

    /// Returns an inactive carton to the packing catalog.
    pub fn activate(&mut self) {
        if self.status == CartonStatus::Active {
            warn!(carton_id = %self.id, "Carton is already active");
            return;
        }

        self.status = CartonStatus::Active;
        self.record_update();
        info!(carton_id = %self.id, "Activated carton");
    }

    fn record_update(&mut self) {
        self.updated_at = Utc::now();
        self.events.push(CartonEvent::Updated {
            carton_id: self.id.to_string(),
            name: self.name.clone(),
            dimensions: self.dimensions.clone(),
            max_weight: self.max_weight.clone(),
            occurred_on: self.updated_at,
        });
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_carton_data(name: &str, dimensions: &Dimension, max_weight: &Weight) -> CoreResult<()> {
    validate_name(name)?;
    validate_dimensions(dimensions)?;
    validate_weight(max_weight)
}

fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::carton_state("Carton name cannot be empty"));
    }
    Ok(())
}

fn validate_dimensions(dimensions: &Dimension) -> CoreResult<()> {
    if dimensions.has_zero_or_negative_values() {
        return Err(CoreError::carton_state("Invalid carton dimensions"));
    }
    Ok(())
}

fn validate_weight(weight: &Weight) -> CoreResult<()> {
    if weight.is_zero_or_negative() {
        return Err(CoreError::carton_state("Invalid carton weight capacity"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
