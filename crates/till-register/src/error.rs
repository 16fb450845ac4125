//! # Register Error Type
//!
//! Session-level failures surfaced to the host.
//!
//! Cart mutations themselves never fail (clamping absorbs quantity problems
//! silently); what CAN fail at this layer is looking a product up and
//! talking to storage. Checkout has its own error type,
//! [`crate::checkout::CheckoutError`], because its rejection reasons drive
//! distinct host prompts (re-enter payment vs. re-sync stock).

use thiserror::Error;

use till_core::CoreError;
use till_db::DbError;

/// Errors from register session operations (lookups, catalog access).
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Business rule or lookup failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for register operations.
pub type RegisterResult<T> = Result<T, RegisterError>;
