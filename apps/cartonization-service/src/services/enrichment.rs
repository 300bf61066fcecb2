//! Resolves requested SKUs against the product catalog.

use tracing::{debug, warn};

use cartonization_core::{EnrichedItem, RequestedItem};
use cartonization_db::ProductRepository;

use crate::error::{ServiceError, ServiceResult};

/// Turns `(sku, quantity)` pairs into items with dimensions, weight and
/// handling attributes.
#[derive(Debug, Clone)]
pub struct ProductDimensionEnricher {
    products: ProductRepository,
}

impl ProductDimensionEnricher {
    pub fn new(products: ProductRepository) -> Self {
        ProductDimensionEnricher { products }
    }

    /// Enriches every item in request order.
    ///
    /// Fails on the first SKU that is unknown or inactive.
    pub async fn enrich(&self, items: &[RequestedItem]) -> ServiceResult<Vec<EnrichedItem>> {
        let mut enriched = Vec::with_capacity(items.len());

        for item in items {
            item.validate()?;

            let product = match self.products.get_by_sku(&item.sku).await? {
                Some(product) if product.active => product,
                Some(_) => {
                    warn!(sku = %item.sku, "Requested product is inactive");
                    return Err(ServiceError::ProductNotFound {
                        sku: item.sku.clone(),
                    });
                }
                None => {
                    warn!(sku = %item.sku, "Requested product is not in the catalog");
                    return Err(ServiceError::ProductNotFound {
                        sku: item.sku.clone(),
                    });
                }
            };

            enriched.push(product.to_enriched_item(item.quantity));
        }

        debug!(count = enriched.len(), "Enriched requested items");
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{book, memory_db};
    use cartonization_core::{CoreError, ValidationError};

    #[tokio::test]
    async fn test_enrich_carries_quantity() {
        let db = memory_db().await;
        db.products().upsert(&book("BOOK-1")).await.unwrap();

        let enricher = ProductDimensionEnricher::new(db.products());
        let items = enricher
            .enrich(&[RequestedItem::new("BOOK-1", 3).unwrap()])
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].category, "books");
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products() {
        let db = memory_db().await;
        let mut retired = book("OLD-1");
        retired.active = false;
        db.products().upsert(&retired).await.unwrap();

        let enricher = ProductDimensionEnricher::new(db.products());

        let err = enricher
            .enrich(&[RequestedItem::new("MISSING", 1).unwrap()])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ProductNotFound { ref sku } if sku == "MISSING"));

        let err = enricher
            .enrich(&[RequestedItem::new("OLD-1", 1).unwrap()])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ProductNotFound { ref sku } if sku == "OLD-1"));
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let db = memory_db().await;
        let enricher = ProductDimensionEnricher::new(db.products());
        let item = RequestedItem {
            sku: "BOOK-1".to_string(),
            quantity: 0,
        };

        let err = enricher.enrich(&[item]).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Validation(ValidationError::MustBePositive { ref field }))
                if field == "quantity"
        ));
    }
}
