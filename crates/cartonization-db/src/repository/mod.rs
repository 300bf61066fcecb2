//! # Repositories
//!
//! One repository per table, each holding a clone of the pool.
//!
//! | Repository | Table | Writes events? |
//! |------------|-------|----------------|
//! | [`carton::CartonRepository`] | `cartons` | yes, drained from the aggregate |
//! | [`product::ProductRepository`] | `products` | no |
//! | [`solution::PackingSolutionRepository`] | `packing_solutions` | yes, `PackingSolutionCalculated` |
//! | [`outbox::OutboxRepository`] | `event_outbox` | (is the outbox) |
//!
//! Decimal columns are TEXT; [`parse_decimal`] turns them back into numbers.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{DbError, DbResult};

pub mod carton;
pub mod outbox;
pub mod product;
pub mod solution;

/// Parses a decimal TEXT column.
pub(crate) fn parse_decimal(column: &str, value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| DbError::invalid_data(format!("{column} = '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("length", "12.50").unwrap(), Decimal::new(1250, 2));

        let err = parse_decimal("length", "twelve").unwrap_err();
        assert!(matches!(err, DbError::InvalidData(ref msg) if msg.contains("length")));
    }
}
