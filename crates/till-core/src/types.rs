//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐         │
//! │  │    Product    │   │     Sale      │   │   SaleLine    │         │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │         │
//! │  │ id (UUID)     │   │ id (UUID)     │   │ sale_id (FK)  │         │
//! │  │ barcode       │   │ invoice_no    │   │ product_id?   │         │
//! │  │ price (Money) │   │ totals        │   │ frozen copy   │         │
//! │  │ stock         │   │ status        │   │ of the line   │         │
//! │  └───────────────┘   └───────────────┘   └───────────────┘         │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐         │
//! │  │  Percentage   │   │  SaleStatus   │   │ PaymentMethod │         │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │         │
//! │  │ [0, 100]      │   │ Completed     │   │ Cash          │         │
//! │  │ validated     │   │ Refunded      │   │ Card          │         │
//! │  └───────────────┘   │ Voided        │   └───────────────┘         │
//! │                      └───────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `SaleLine` uses the snapshot pattern: product name, barcode and unit price
//! are copied verbatim at commit time and never re-joined, so a sale's
//! history survives later price changes and product deletion.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Percentage
// =============================================================================

/// A percentage validated into the closed range [0, 100].
///
/// Used for the cart-level discount and tax rates. Construction is the only
/// validation point; once a `Percentage` exists it is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentage(Decimal);

impl Percentage {
    /// Creates a percentage, rejecting values outside [0, 100].
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(ValidationError::OutOfRange {
                field: "percentage".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(Percentage(value))
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(Decimal::ZERO)
    }

    /// Returns the percentage value (e.g. `10.5` for 10.5%).
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the multiplier form (e.g. `0.105` for 10.5%), full precision.
    #[inline]
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl FromStr for Percentage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| ValidationError::InvalidFormat {
            field: "percentage".to_string(),
            reason: e.to_string(),
        })?;
        Percentage::new(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category (soft-deletable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Whether the category is active (soft delete).
    pub is_active: bool,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.). Unique when present.
    pub barcode: Option<String>,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Selling price per unit.
    pub price: Money,

    /// Cost per unit (for margin reporting).
    pub cost_price: Money,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Reorder threshold: stock at or below this is "low".
    pub min_stock: i64,

    /// Category reference (optional; nulled if the category is deleted).
    pub category_id: Option<String>,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Stock is at or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Nothing left to sell.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }
}

// =============================================================================
// Cashier Identity
// =============================================================================

/// The identity of the cashier operating the register.
///
/// Produced by the session collaborator; authentication itself is out of
/// scope for the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashierIdentity {
    pub id: String,
    pub display_name: String,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a committed sale.
///
/// A sale is created `Completed`; refund/void operations may later flip the
/// status, but totals and lines never change after commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale has been paid and committed.
    Completed,
    /// Sale was refunded after completion.
    Refunded,
    /// Sale was voided.
    Voided,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction.
///
/// Immutable once created: only `status` may be changed afterwards, by the
/// (separate) refund/void operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Human-readable invoice number, unique per sale.
    pub invoice_number: String,
    pub cashier_id: String,
    /// Cashier display name, denormalized for receipts and history.
    pub cashier_name: String,
    pub sale_date: DateTime<Utc>,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub amount_paid: Money,
    pub change: Money,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item of a committed sale.
///
/// Denormalized snapshot of a cart line at commit time: the product name,
/// barcode and unit price are frozen copies, and `product_id` is nullable so
/// the line survives product deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: Option<String>,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Barcode at time of sale (frozen).
    pub product_barcode: Option<String>,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// Per-line discount amount.
    pub discount: Money,
    /// unit_price × quantity − discount.
    pub line_total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
