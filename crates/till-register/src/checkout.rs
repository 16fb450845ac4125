//! # Checkout Transaction
//!
//! Orchestrates the cart-to-sale commit.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Checkout State Machine                          │
//! │                                                                     │
//! │            ┌────────┐                                               │
//! │            │  Open  │  cart has ≥ 1 line                            │
//! │            └───┬────┘                                               │
//! │                │ checkout(method, amount_paid)                      │
//! │                ▼                                                    │
//! │          ┌────────────┐     empty cart ──────────► Rejected         │
//! │          │ Validating │     paid < total ────────► Rejected         │
//! │          └─────┬──────┘     stock stale ─────────► Rejected         │
//! │                │ all checks pass                                    │
//! │                ▼                                                    │
//! │      ┌──────────────────┐   conditional decrement                   │
//! │      │ Atomic DB commit │   misses ──────────────► Rejected         │
//! │      └────────┬─────────┘   (transaction rolls back)                │
//! │               │ COMMIT durable                                      │
//! │               ▼                                                     │
//! │          ┌───────────┐                                              │
//! │          │ Committed │  cart cleared, receipt returned              │
//! │          └───────────┘                                              │
//! │                                                                     │
//! │  Every rejection leaves the cart untouched, so the host can fix     │
//! │  the problem (new tender amount, re-synced stock) and retry.        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is validated twice: once here against fresh product reads, and
//! again inside the commit transaction itself, where each decrement is
//! conditional on sufficient stock. The second check is the authoritative
//! one; the first just rejects early without burning an invoice number.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::invoice::InvoiceNumbers;
use crate::session::CartSession;
use till_core::format::format_currency;
use till_core::{CartLine, CashierIdentity, Money, PaymentMethod, Sale, SaleLine, SaleStatus};
use till_db::{generate_id, Database, DbError};

// =============================================================================
// Checkout Error
// =============================================================================

/// Why a checkout was rejected.
///
/// Each variant maps to a distinct host prompt, so they must stay
/// distinguishable: `InsufficientPayment` re-opens the tender field,
/// `StockChanged` tells the host to re-sync the catalog and re-price.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout requires at least one cart line.
    #[error("Cart is empty")]
    EmptyCart,

    /// Payment does not cover the total. The transaction stays open.
    #[error("Insufficient payment: total is {required}, offered {offered}")]
    InsufficientPayment { required: Money, offered: Money },

    /// A product's stock changed (or the product vanished) between cart
    /// validation and commit. Re-sync stock and re-price before retrying.
    #[error("Stock changed for {product_name}")]
    StockChanged {
        product_id: String,
        product_name: String,
    },

    /// The storage collaborator failed during commit. The transaction
    /// rolled back; nothing was persisted.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DbError),
}

// =============================================================================
// Receipt
// =============================================================================

/// The finalized sale handed to downstream consumers (receipt rendering,
/// host confirmation dialogs).
#[derive(Debug, Clone)]
pub struct Receipt {
    pub store_name: String,
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

impl Receipt {
    /// One-paragraph confirmation summary for the host's "sale completed"
    /// prompt.
    pub fn summary(&self, currency_label: &str) -> String {
        format!(
            "Invoice: {}\nTotal: {}\nChange: {}",
            self.sale.invoice_number,
            format_currency(self.sale.total, currency_label),
            format_currency(self.sale.change, currency_label),
        )
    }
}

// =============================================================================
// Checkout Service
// =============================================================================

/// Turns the current cart into a committed sale.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    invoices: Arc<InvoiceNumbers>,
    store_name: String,
}

impl CheckoutService {
    pub fn new(db: Database, invoices: Arc<InvoiceNumbers>, store_name: impl Into<String>) -> Self {
        CheckoutService {
            db,
            invoices,
            store_name: store_name.into(),
        }
    }

    /// Runs the full checkout: validate → commit atomically → clear cart.
    ///
    /// On any rejection the cart is left exactly as it was. The cart is
    /// cleared only after the database transaction is durable, so a crash
    /// mid-checkout can never lose a recorded sale's cart nor record a sale
    /// for a cart that still looks open.
    pub async fn checkout(
        &self,
        session: &CartSession,
        cashier: &CashierIdentity,
        payment_method: PaymentMethod,
        amount_paid: Money,
    ) -> Result<Receipt, CheckoutError> {
        // Snapshot lines and totals in one locked read; later cart activity
        // cannot shear the figures apart.
        let (lines, totals) = session.with_cart(|cart| (cart.lines(), cart.totals()));

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if amount_paid < totals.total {
            debug!(
                required = %totals.total,
                offered = %amount_paid,
                "Checkout rejected: insufficient payment"
            );
            return Err(CheckoutError::InsufficientPayment {
                required: totals.total,
                offered: amount_paid,
            });
        }

        // Re-validate stock against fresh reads. Add-time clamping already
        // enforced the ceiling, but stock may have moved since.
        self.revalidate_stock(&lines).await?;

        let sale_id = generate_id();
        let invoice_number = self.invoices.next();
        let now = Utc::now();

        let sale = Sale {
            id: sale_id.clone(),
            invoice_number,
            cashier_id: cashier.id.clone(),
            cashier_name: cashier.display_name.clone(),
            sale_date: now,
            subtotal: totals.subtotal,
            discount: totals.discount_amount,
            tax: totals.tax_amount,
            total: totals.total,
            amount_paid,
            change: amount_paid - totals.total,
            payment_method,
            status: SaleStatus::Completed,
        };

        let sale_lines: Vec<SaleLine> = lines
            .iter()
            .map(|line| SaleLine {
                id: generate_id(),
                sale_id: sale_id.clone(),
                product_id: Some(line.product_id.clone()),
                product_name: line.product_name.clone(),
                product_barcode: line.product_barcode.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                discount: line.discount,
                line_total: line.total(),
            })
            .collect();

        match self.db.sales().commit_sale(&sale, &sale_lines).await {
            Ok(()) => {}
            Err(DbError::StockConflict { product_id }) => {
                // The transaction rolled back; translate to the checkout
                // rejection the host knows how to handle.
                let product_name = lines
                    .iter()
                    .find(|l| l.product_id == product_id)
                    .map(|l| l.product_name.clone())
                    .unwrap_or_default();
                return Err(CheckoutError::StockChanged {
                    product_id,
                    product_name,
                });
            }
            Err(e) => return Err(CheckoutError::Persistence(e)),
        }

        // Only now that the sale is durable does the cart reset. Discount
        // goes back to zero; the tax rate survives for the next sale.
        session.with_cart_mut(|cart| cart.clear());

        info!(
            invoice = %sale.invoice_number,
            total = %sale.total,
            cashier = %sale.cashier_name,
            lines = sale_lines.len(),
            "Sale committed"
        );

        Ok(Receipt {
            store_name: self.store_name.clone(),
            sale,
            lines: sale_lines,
        })
    }

    async fn revalidate_stock(&self, lines: &[CartLine]) -> Result<(), CheckoutError> {
        let products = self.db.products();

        for line in lines {
            let current = products.get_by_id(&line.product_id).await?;
            let available = current.map(|p| p.stock).unwrap_or(0);

            if available < line.quantity {
                debug!(
                    product = %line.product_name,
                    requested = line.quantity,
                    available,
                    "Checkout rejected: stock changed"
                );
                return Err(CheckoutError::StockChanged {
                    product_id: line.product_id.clone(),
                    product_name: line.product_name.clone(),
                });
            }
        }

        Ok(())
    }
}
