//! # till-register: Terminal Session Layer for Till POS
//!
//! The library surface a UI host consumes. One [`Register`] is one POS
//! terminal session: it owns the process-wide cart, reads the catalog
//! through [`Catalog`], and turns carts into committed sales through
//! [`CheckoutService`].
//!
//! ## Typical Host Flow
//! ```rust,ignore
//! use std::sync::Arc;
//! use till_db::{Database, DbConfig};
//! use till_register::{Register, RegisterConfig, StaticSession};
//! use till_core::{Money, PaymentMethod};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//! let session = Arc::new(StaticSession::new("u1", "Asha"));
//! let register = Register::new(db, RegisterConfig::from_env(), session);
//!
//! register.add_by_barcode("4791234567890").await?;
//! register.set_discount_percent("10".parse()?)?;
//!
//! let paid: Money = "500.00".parse()?;
//! let receipt = register.checkout(PaymentMethod::Cash, paid).await?;
//! println!("{}", receipt.summary(&register.config().currency_label));
//! ```
//!
//! ## Modules
//!
//! - [`register`] - The [`Register`] aggregate (cart ops + checkout entry)
//! - [`session`] - Cart session and the cashier-identity collaborator
//! - [`catalog`] - Catalog snapshots and fresh product reads
//! - [`checkout`] - The checkout state machine and its rejection reasons
//! - [`invoice`] - Monotonic, human-readable invoice numbers
//! - [`config`] - Register configuration (env + defaults)
//! - [`error`] - Session-level error type

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod invoice;
pub mod register;
pub mod session;

pub use catalog::{Catalog, CatalogSnapshot};
pub use checkout::{CheckoutError, CheckoutService, Receipt};
pub use config::RegisterConfig;
pub use error::{RegisterError, RegisterResult};
pub use invoice::InvoiceNumbers;
pub use register::{CartView, Register};
pub use session::{CartSession, SessionProvider, StaticSession};
