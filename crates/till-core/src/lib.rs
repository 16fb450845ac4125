//! # till-core: Pure Business Logic for Till POS
//!
//! This crate is the heart of Till POS. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Till POS Architecture                         │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                UI Host (out of scope here)                  │   │
//! │  │    Product grid ──► Cart panel ──► Tender ──► Receipt       │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                 till-register (session layer)               │   │
//! │  │    Register, Catalog, CheckoutService, CartSession          │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                    │   │
//! │  │                                                             │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐    │   │
//! │  │   │  types  │  │  money  │  │  cart   │  │   format   │    │   │
//! │  │   │ Product │  │  Money  │  │  Cart   │  │  currency  │    │   │
//! │  │   │  Sale   │  │ Percent │  │CartLine │  │ percentage │    │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └────────────┘    │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                  till-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleLine, Percentage, etc.)
//! - [`money`] - Money type backed by exact decimal arithmetic
//! - [`cart`] - The cart engine: lines, stock clamping, pricing math
//! - [`format`] - Display formatting (currency, quantity, percentage, dates)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Exact Money**: All monetary values are `rust_decimal` decimals; rounding
//!    happens once, at the formatting boundary, never mid-computation
//! 4. **Explicit Errors**: Errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod format;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use till_core::Money` instead of
// `use till_core::money::Money`

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;
