//! # cartonization-db: Database Layer for the Cartonization Engine
//!
//! SQLite persistence for cartons, products, packing solutions and the
//! event outbox, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cartonization Data Flow                              │
//! │                                                                         │
//! │  cartonization pack / carton create                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 cartonization-db (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ CartonRepo     │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │   │ 001_initial  │  │   │
//! │  │   │ Connection    │    │ SolutionRepo   │   │ _schema.sql  │  │   │
//! │  │   │ Management    │    │ OutboxRepo     │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                 CARTONIZATION_DATABASE_PATH                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartonization_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("cartonization.db")).await?;
//!
//! let cartons = db.cartons().find_all_active().await?;
//! let product = db.products().get_by_sku("BOOK-001").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::carton::CartonRepository;
pub use repository::outbox::{NewOutboxEntry, OutboxEntry, OutboxRepository, MAX_DELIVERY_ATTEMPTS};
pub use repository::product::ProductRepository;
pub use repository::solution::PackingSolutionRepository;
