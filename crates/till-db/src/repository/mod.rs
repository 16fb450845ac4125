//! # Repository Implementations
//!
//! One repository per aggregate: [`category`], [`product`], [`sale`].
//!
//! ## Money Columns
//! Monetary values are stored as full-precision decimal TEXT, never floats
//! and never pre-rounded. The helpers below are the single conversion point
//! between `Money` and its stored form, so a malformed column surfaces as a
//! typed [`DbError::Decode`] instead of a panic.

pub mod category;
pub mod product;
pub mod sale;

use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::Money;

/// Serializes money for storage: the raw decimal, full precision.
pub(crate) fn money_to_db(money: Money) -> String {
    money.amount().to_string()
}

/// Parses a stored money column back into `Money`.
pub(crate) fn money_from_db(column: &str, raw: &str) -> DbResult<Money> {
    raw.parse()
        .map_err(|e: rust_decimal::Error| DbError::Decode(format!("{}: {}", column, e)))
}

/// Generates a fresh UUID v4 entity id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_round_trips_at_full_precision() {
        let money: Money = "330.7525".parse().unwrap();
        let stored = money_to_db(money);
        assert_eq!(stored, "330.7525");
        assert_eq!(money_from_db("total", &stored).unwrap(), money);
    }

    #[test]
    fn test_malformed_money_column_is_a_decode_error() {
        let err = money_from_db("total", "not-a-number").unwrap_err();
        assert!(matches!(err, DbError::Decode(_)));
    }
}
