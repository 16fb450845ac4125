//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  till-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                       │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  till-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  till-register errors (separate crate)                              │
//! │  ├── RegisterError    - Session-level failures                      │
//! │  └── CheckoutError    - Checkout rejection reasons                  │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → RegisterError → host           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that cart mutations never produce errors: quantity requests that
//! exceed stock are clamped silently, and removals of absent lines are
//! no-ops. Only checkout and lookup failures surface to the caller.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations or lookup failures. They are
/// caught by the session layer and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (unknown id, soft-deleted, or inactive).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements and are used for
/// early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., bad characters in a barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ProductNotFound("2f1c".to_string());
        assert_eq!(err.to_string(), "Product not found: 2f1c");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
