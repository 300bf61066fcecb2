//! # Product Repository
//!
//! The product catalog that requested SKUs are enriched from.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use cartonization_core::items::ProductInfo;
use cartonization_core::measurement::{Dimension, DimensionUnit, Weight, WeightUnit};

use super::parse_decimal;
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    sku: String,
    name: String,
    length: String,
    width: String,
    height: String,
    dimension_unit: DimensionUnit,
    weight: String,
    weight_unit: WeightUnit,
    category: String,
    fragile: bool,
    active: bool,
}

impl ProductRow {
    fn into_product(self) -> DbResult<ProductInfo> {
        let dimensions = Dimension::new(
            parse_decimal("length", &self.length)?,
            parse_decimal("width", &self.width)?,
            parse_decimal("height", &self.height)?,
            self.dimension_unit,
        )
        .map_err(|e| DbError::invalid_data(format!("product {}: {e}", self.sku)))?;

        let weight = Weight::new(parse_decimal("weight", &self.weight)?, self.weight_unit)
            .map_err(|e| DbError::invalid_data(format!("product {}: {e}", self.sku)))?;

        Ok(ProductInfo {
            sku: self.sku,
            name: self.name,
            dimensions,
            weight,
            category: self.category,
            fragile: self.fragile,
            active: self.active,
        })
    }
}

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product or replaces the existing record for its SKU.
    pub async fn upsert(&self, product: &ProductInfo) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                sku, name, length, width, height, dimension_unit,
                weight, weight_unit, category, fragile, active, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(sku) DO UPDATE SET
                name = excluded.name,
                length = excluded.length,
                width = excluded.width,
                height = excluded.height,
                dimension_unit = excluded.dimension_unit,
                weight = excluded.weight,
                weight_unit = excluded.weight_unit,
                category = excluded.category,
                fragile = excluded.fragile,
                active = excluded.active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.dimensions.length().to_string())
        .bind(product.dimensions.width().to_string())
        .bind(product.dimensions.height().to_string())
        .bind(product.dimensions.unit())
        .bind(product.weight.value().to_string())
        .bind(product.weight.unit())
        .bind(&product.category)
        .bind(product.fragile)
        .bind(product.active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(sku = %product.sku, "Upserted product");
        Ok(())
    }

    /// Looks up a product by SKU. Inactive products are returned too.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<ProductInfo>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT
                sku, name, length, width, height, dimension_unit,
                weight, weight_unit, category, fragile, active
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal::Decimal;

    fn mug() -> ProductInfo {
        ProductInfo {
            sku: "MUG-001".to_string(),
            name: "Coffee Mug".to_string(),
            dimensions: Dimension::new(
                Decimal::new(45, 1),
                Decimal::new(45, 1),
                Decimal::from(4),
                DimensionUnit::Inches,
            )
            .unwrap(),
            weight: Weight::new(Decimal::new(75, 2), WeightUnit::Pounds).unwrap(),
            category: "kitchen".to_string(),
            fragile: true,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.upsert(&mug()).await.unwrap();

        let found = repo.get_by_sku("MUG-001").await.unwrap().unwrap();
        assert_eq!(found, mug());
        assert_eq!(found.dimensions.unit(), DimensionUnit::Inches);
        assert!(found.fragile);
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.upsert(&mug()).await.unwrap();

        let mut retired = mug();
        retired.active = false;
        retired.category = "clearance".to_string();
        repo.upsert(&retired).await.unwrap();

        let found = repo.get_by_sku("MUG-001").await.unwrap().unwrap();
        assert!(!found.active);
        assert_eq!(found.category, "clearance");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_sku() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.products().get_by_sku("NOPE").await.unwrap().is_none());
    }
}
