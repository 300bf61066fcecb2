//! # cartonization-service
//!
//! Application layer of the cartonization engine: use-case services over
//! the core and the database, plus the outbox relay.
//!
//! ## Module Organization
//!
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Service error type
//! - [`services`] - Packing, carton management and product enrichment
//! - [`relay`] - Outbox delivery to an [`relay::EventPublisher`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartonization_service::{ServiceConfig, PackingSolutionService};
//!
//! let config = ServiceConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let service = PackingSolutionService::new(&db, config.default_policy.clone());
//! let solution = service.calculate(&command).await?;
//! ```

pub mod config;
pub mod error;
pub mod relay;
pub mod services;

pub use config::{ConfigError, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use relay::{EventPublisher, OutboxRelay, RelayReport, TracingEventPublisher};
pub use services::{
    CalculatePackingCommand, CartonManagementService, CreateCartonCommand,
    PackingSolutionService, PolicyOverrides, ProductDimensionEnricher, UpdateCartonCommand,
};
