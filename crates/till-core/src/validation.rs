//! # Validation Module
//!
//! Business rule validation for catalog input.
//!
//! Validation runs where data ENTERS the system (product management, seed
//! tooling), before anything reaches the database. The database schema backs
//! the same rules up with NOT NULL / UNIQUE / CHECK constraints.
//!
//! Note the cart engine does not live here: quantity problems inside the
//! cart are resolved by silent clamping (see [`crate::cart`]), not by
//! validation errors.

use crate::error::ValidationError;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Digits only (EAN/UPC family)
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 50,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates that a stock figure is not negative.
pub fn validate_stock(field: &str, stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validator
// =============================================================================

/// Validates a complete product before insert/update.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_name(&product.name)?;

    if let Some(barcode) = &product.barcode {
        validate_barcode(barcode)?;
    }

    if product.price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if product.cost_price.is_negative() {
        return Err(ValidationError::Negative {
            field: "cost_price".to_string(),
        });
    }

    validate_stock("stock", product.stock)?;
    validate_stock("min_stock", product.min_stock)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
