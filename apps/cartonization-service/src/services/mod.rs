//! Application services.
//!
//! Each service owns repository handles cloned from one [`Database`] and
//! is cheap to construct per command.
//!
//! [`Database`]: cartonization_db::Database

pub mod carton_service;
pub mod enrichment;
pub mod packing_service;

pub use carton_service::{CartonManagementService, CreateCartonCommand, UpdateCartonCommand};
pub use enrichment::ProductDimensionEnricher;
pub use packing_service::{CalculatePackingCommand, PackingSolutionService, PolicyOverrides};

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;

    use cartonization_core::{Carton, Dimension, DimensionUnit, ProductInfo, Weight, WeightUnit};
    use cartonization_db::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn cm(l: i64, w: i64, h: i64) -> Dimension {
        Dimension::new(
            Decimal::from(l),
            Decimal::from(w),
            Decimal::from(h),
            DimensionUnit::Centimeters,
        )
        .unwrap()
    }

    pub fn kg(value: Decimal) -> Weight {
        Weight::new(value, WeightUnit::Kilograms).unwrap()
    }

    /// 20x15x3 cm, 0.8 kg, category "books".
    pub fn book(sku: &str) -> ProductInfo {
        ProductInfo {
            sku: sku.to_string(),
            name: format!("Book {sku}"),
            dimensions: cm(20, 15, 3),
            weight: kg(Decimal::new(8, 1)),
            category: "books".to_string(),
            fragile: false,
            active: true,
        }
    }

    /// Saves the Small / Medium / Large catalog.
    pub async fn seed_cartons(db: &Database) -> Vec<Carton> {
        let mut cartons = vec![
            Carton::create("Small", cm(15, 10, 8), kg(Decimal::from(5))).unwrap(),
            Carton::create("Medium", cm(25, 20, 15), kg(Decimal::from(15))).unwrap(),
            Carton::create("Large", cm(40, 30, 25), kg(Decimal::from(30))).unwrap(),
        ];
        for carton in &mut cartons {
            db.cartons().save(carton).await.unwrap();
        }
        cartons
    }
}
