//! # cartonization-core: Pure Packing Logic
//!
//! This crate is the **heart** of the cartonization engine. It decides how
//! many boxes an order needs, of which type, and what goes in each, with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cartonization Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 cartonization CLI (clap)                        │   │
//! │  │        pack ──► carton create/list/... ──► relay               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  Application Services                           │   │
//! │  │   enrichment, idempotent packing, carton management, relay     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ cartonization-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │measurement│  │  carton   │  │  packing  │  │ validation│  │   │
//! │  │   │ Dimension │  │  Carton   │  │  BFD/FFD  │  │   rules   │  │   │
//! │  │   │  Weight   │  │  events   │  │  Package  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO ASYNC • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               cartonization-db (Database Layer)                 │   │
//! │  │         SQLite queries, migrations, repositories, outbox        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`measurement`] - Dimension and Weight value objects, unit conversion
//! - [`items`] - Requested, enriched and catalog item shapes
//! - [`policy`] - Packing rules
//! - [`carton`] - Carton aggregate and lifecycle
//! - [`events`] - Carton lifecycle events and topics
//! - [`package`] - In-progress bin with constraint-checked insertion
//! - [`packing`] - Best-fit / first-fit decreasing and the orchestration entry point
//! - [`solution`] - Packing result, summary and calculated event
//! - [`validation`] - Request-level business rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same request and catalog in, same packages out
//! 2. **No I/O**: events are buffered on the aggregate, never sent from here
//! 3. **Exact Decimals**: all measurements use `rust_decimal`, never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use cartonization_core::{Dimension, DimensionUnit};
//! use rust_decimal::Decimal;
//!
//! let carton = Dimension::new(Decimal::from(30), Decimal::from(20), Decimal::from(10), DimensionUnit::Centimeters).unwrap();
//! let item = Dimension::new(Decimal::from(9), Decimal::from(25), Decimal::from(18), DimensionUnit::Centimeters).unwrap();
//!
//! // Any axis-aligned rotation counts
//! assert!(carton.can_contain(&item));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod carton;
pub mod error;
pub mod events;
pub mod items;
pub mod measurement;
pub mod package;
pub mod packing;
pub mod policy;
pub mod solution;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use carton::{Carton, CartonId, CartonStatus};
pub use error::{CoreError, CoreResult, ValidationError};
pub use events::CartonEvent;
pub use items::{EnrichedItem, ProductInfo, RequestedItem};
pub use measurement::{Dimension, DimensionUnit, Weight, WeightUnit};
pub use package::Package;
pub use packing::{calculate_packing_solution, GreedyPacker, PackingAlgorithm, PackingStrategy};
pub use policy::PackingPolicy;
pub use solution::{PackingSolution, PackingSolutionCalculated, SolutionSummary};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest accepted item dimension, in whatever unit the item declares.
///
/// ## Business Reason
/// Catches data-entry errors (millimeters typed as centimeters) before
/// they reach the packer.
pub const MAX_ITEM_DIMENSION: i64 = 1000;

/// Largest accepted item weight, in whatever unit the item declares.
pub const MAX_ITEM_WEIGHT: i64 = 1000;

/// Upper bound for any single length, width or height.
///
/// Applies to cartons and items alike. It keeps every volume, unit
/// conversion and per-solution sum well inside `Decimal` range.
pub const MAX_MEASUREMENT: i64 = 1_000_000;
