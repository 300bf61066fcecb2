//! # cartonization
//!
//! Command line entry point.
//!
//! ## Commands
//! ```text
//! cartonization pack --request order.json      calculate (or fetch) a solution
//! cartonization carton create --name .. -l .. -w .. -H .. --max-weight ..
//! cartonization carton list [--active]
//! cartonization carton update <ID> --name .. -l .. -w .. -H .. --max-weight ..
//! cartonization carton deactivate <ID>
//! cartonization carton activate <ID>
//! cartonization relay [--cleanup-days N] [--prune-solutions-days N]
//! ```
//!
//! Results are printed to stdout as JSON. Logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cartonization_core::{Dimension, DimensionUnit, Weight, WeightUnit};
use cartonization_db::Database;
use cartonization_service::{
    CalculatePackingCommand, CartonManagementService, CreateCartonCommand, OutboxRelay,
    PackingSolutionService, ServiceConfig, TracingEventPublisher, UpdateCartonCommand,
};

#[derive(Parser)]
#[command(name = "cartonization")]
#[command(about = "Chooses shipping cartons and packs items into them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate a packing solution for a request file
    Pack {
        /// Path to the request JSON
        #[arg(short, long)]
        request: PathBuf,
    },

    /// Manage the carton catalog
    Carton {
        #[command(subcommand)]
        action: CartonAction,
    },

    /// Deliver pending outbox events
    Relay {
        /// Also delete events published more than N days ago
        #[arg(long)]
        cleanup_days: Option<u32>,

        /// Also delete stored solutions older than N days
        #[arg(long)]
        prune_solutions_days: Option<u32>,
    },
}

#[derive(Subcommand)]
enum CartonAction {
    /// Add a carton to the catalog
    Create(CartonSpec),

    /// List cartons
    List {
        /// Only cartons available for packing
        #[arg(long)]
        active: bool,
    },

    /// Replace a carton's name, dimensions and capacity
    Update {
        id: String,
        #[command(flatten)]
        spec: CartonSpec,
    },

    /// Remove a carton from packing
    Deactivate { id: String },

    /// Return a carton to packing
    Activate { id: String },
}

#[derive(Args)]
struct CartonSpec {
    #[arg(long)]
    name: String,

    #[arg(short = 'l', long)]
    length: Decimal,

    #[arg(short = 'w', long)]
    width: Decimal,

    #[arg(short = 'H', long)]
    height: Decimal,

    /// centimeters | inches
    #[arg(long, default_value = "centimeters")]
    unit: DimensionUnit,

    #[arg(long)]
    max_weight: Decimal,

    /// kilograms | pounds
    #[arg(long, default_value = "kilograms")]
    weight_unit: WeightUnit,
}

impl CartonSpec {
    fn measurements(&self) -> anyhow::Result<(Dimension, Weight)> {
        let dimensions = Dimension::new(self.length, self.width, self.height, self.unit)?;
        let max_weight = Weight::new(self.max_weight, self.weight_unit)?;
        Ok((dimensions, max_weight))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ServiceConfig::load().context("Failed to load configuration")?;
    init_tracing(config.log_json);

    info!(
        database = %config.database_path.display(),
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let result = run(cli.command, &config, &db).await;
    db.close().await;
    result
}

async fn run(command: Command, config: &ServiceConfig, db: &Database) -> anyhow::Result<()> {
    match command {
        Command::Pack { request } => {
            let raw = tokio::fs::read_to_string(&request)
                .await
                .with_context(|| format!("Failed to read {}", request.display()))?;
            let command: CalculatePackingCommand = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid request file {}", request.display()))?;

            let service = PackingSolutionService::new(db, config.default_policy.clone());
            let solution = service.calculate(&command).await?;
            print_json(&solution.summary())
        }

        Command::Carton { action } => {
            let service = CartonManagementService::new(db);
            match action {
                CartonAction::Create(spec) => {
                    let (dimensions, max_weight) = spec.measurements()?;
                    let carton = service
                        .create_carton(CreateCartonCommand {
                            name: spec.name,
                            dimensions,
                            max_weight,
                        })
                        .await?;
                    print_json(&carton)
                }
                CartonAction::List { active } => {
                    let cartons = if active {
                        service.list_active().await?
                    } else {
                        service.list_all().await?
                    };
                    print_json(&cartons)
                }
                CartonAction::Update { id, spec } => {
                    let (dimensions, max_weight) = spec.measurements()?;
                    let carton = service
                        .update_carton(UpdateCartonCommand {
                            carton_id: id,
                            name: spec.name,
                            dimensions,
                            max_weight,
                        })
                        .await?;
                    print_json(&carton)
                }
                CartonAction::Deactivate { id } => print_json(&service.deactivate_carton(&id).await?),
                CartonAction::Activate { id } => print_json(&service.activate_carton(&id).await?),
            }
        }

        Command::Relay {
            cleanup_days,
            prune_solutions_days,
        } => {
            let relay = OutboxRelay::new(db.outbox(), TracingEventPublisher, config.outbox_batch_size);
            let report = relay.relay_pending().await?;

            if let Some(days) = cleanup_days {
                relay.cleanup(days).await?;
            }
            if let Some(days) = prune_solutions_days {
                let cutoff = Utc::now() - Duration::days(i64::from(days));
                let deleted = db.solutions().delete_older_than(cutoff).await?;
                info!(deleted, days, "Pruned stored solutions");
            }

            print_json(&report)
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
