//! # till-db: Database Layer for Till POS
//!
//! SQLite storage for the Till POS system, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Till POS Data Flow                            │
//! │                                                                     │
//! │  till-register (Register / CheckoutService)                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                   till-db (THIS CRATE)                      │   │
//! │  │                                                             │   │
//! │  │   ┌─────────────┐   ┌──────────────┐   ┌───────────────┐   │   │
//! │  │   │  Database   │   │ Repositories │   │  Migrations   │   │   │
//! │  │   │  (pool.rs)  │◄──│ category     │   │  (embedded)   │   │   │
//! │  │   │  SqlitePool │   │ product      │   │  001_init.sql │   │   │
//! │  │   │  WAL mode   │   │ sale         │   │               │   │   │
//! │  │   └─────────────┘   └──────────────┘   └───────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database file (or :memory: for tests)                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (category, product, sale)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//! let products = db.products().search("cola").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::generate_id;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
