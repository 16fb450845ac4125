//! # Register
//!
//! The single-owner aggregate a host drives: cart mutations, catalog
//! access and checkout, wired together over one database handle.
//!
//! ## Stock Guard
//! Every quantity-changing operation re-reads the product row FIRST and
//! feeds the fresh stock figure into the cart's clamp logic. The cart never
//! caches stock; the product row is the single source of truth at the
//! moment of each mutation. This is a best-effort check for a
//! single-terminal system - the authoritative enforcement happens inside
//! the checkout commit transaction.
//!
//! ## Mutation Results
//! Cart mutations return the updated [`CartView`] so hosts can re-render
//! without a second call. Clamped and no-op mutations return the same shape
//! as successful ones: the host reflects whatever the cart now contains.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::checkout::{CheckoutError, CheckoutService, Receipt};
use crate::config::RegisterConfig;
use crate::error::{RegisterError, RegisterResult};
use crate::invoice::InvoiceNumbers;
use crate::session::{CartSession, SessionProvider};
use till_core::{Cart, CartLine, CartTotals, CoreError, Money, PaymentMethod, Percentage};
use till_db::Database;

// =============================================================================
// Cart View
// =============================================================================

/// Copy of the cart state, for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            lines: cart.lines(),
            totals: cart.totals(),
        }
    }
}

// =============================================================================
// Register
// =============================================================================

/// One POS terminal session.
pub struct Register {
    db: Database,
    config: RegisterConfig,
    session: Arc<dyn SessionProvider>,
    cart: CartSession,
    catalog: Catalog,
    checkout: CheckoutService,
}

impl Register {
    /// Opens a register session: fresh empty cart, tax rate seeded from
    /// configuration.
    pub fn new(db: Database, config: RegisterConfig, session: Arc<dyn SessionProvider>) -> Self {
        let cart = CartSession::new();
        cart.with_cart_mut(|c| c.set_tax_percent(config.tax_percent));

        let invoices = Arc::new(InvoiceNumbers::new(config.invoice_prefix.clone()));
        let checkout = CheckoutService::new(db.clone(), invoices, config.store_name.clone());
        let catalog = Catalog::new(db.clone());

        Register {
            db,
            config,
            session,
            cart,
            catalog,
            checkout,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RegisterConfig {
        &self.config
    }

    /// Catalog access (snapshots and fresh single-product reads).
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current cart contents and totals.
    pub fn cart(&self) -> CartView {
        self.cart.with_cart(|c| CartView::from(c))
    }

    // -------------------------------------------------------------------------
    // Cart Mutations
    // -------------------------------------------------------------------------

    /// Adds a product to the cart by id, clamped to current stock.
    pub async fn add_product(&self, product_id: &str, quantity: i64) -> RegisterResult<CartView> {
        debug!(product_id = %product_id, quantity = %quantity, "add_product");

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        Ok(self.cart.with_cart_mut(|c| {
            c.add_product(&product, quantity);
            CartView::from(&*c)
        }))
    }

    /// Adds one unit of the product behind a decoded barcode string.
    ///
    /// The barcode DECODING is a collaborator concern (camera, scanner); by
    /// the time the string reaches this call it is just a lookup key.
    pub async fn add_by_barcode(&self, decoded: &str) -> RegisterResult<CartView> {
        debug!(barcode = %decoded, "add_by_barcode");

        let product = self
            .db
            .products()
            .get_by_barcode(decoded)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(decoded.to_string()))?;

        Ok(self.cart.with_cart_mut(|c| {
            c.add_product(&product, 1);
            CartView::from(&*c)
        }))
    }

    /// Sets a line's quantity (≤ 0 removes; otherwise clamped to current
    /// stock). A product that vanished from the catalog counts as stock 0,
    /// so its line is removed - consistent with the clamp policy.
    pub async fn set_quantity(&self, product_id: &str, quantity: i64) -> RegisterResult<CartView> {
        debug!(product_id = %product_id, quantity = %quantity, "set_quantity");

        let stock = self.current_stock(product_id).await?;

        Ok(self.cart.with_cart_mut(|c| {
            c.set_quantity(product_id, quantity, stock);
            CartView::from(&*c)
        }))
    }

    /// Increments a line's quantity by 1, respecting the stock ceiling.
    pub async fn increment_quantity(&self, product_id: &str) -> RegisterResult<CartView> {
        debug!(product_id = %product_id, "increment_quantity");

        let stock = self.current_stock(product_id).await?;

        Ok(self.cart.with_cart_mut(|c| {
            c.increment_quantity(product_id, stock);
            CartView::from(&*c)
        }))
    }

    /// Decrements a line's quantity by 1; quantity 1 removes the line.
    pub fn decrement_quantity(&self, product_id: &str) -> CartView {
        debug!(product_id = %product_id, "decrement_quantity");

        self.cart.with_cart_mut(|c| {
            c.decrement_quantity(product_id);
            CartView::from(&*c)
        })
    }

    /// Removes a line unconditionally. Absent lines are a no-op.
    pub fn remove_product(&self, product_id: &str) -> CartView {
        debug!(product_id = %product_id, "remove_product");

        self.cart.with_cart_mut(|c| {
            c.remove_product(product_id);
            CartView::from(&*c)
        })
    }

    /// Sets a per-line discount amount.
    pub fn set_line_discount(&self, product_id: &str, amount: Money) -> CartView {
        self.cart.with_cart_mut(|c| {
            c.set_line_discount(product_id, amount);
            CartView::from(&*c)
        })
    }

    /// Sets the cart-level discount percentage from raw host input.
    /// Values outside [0, 100] are rejected.
    pub fn set_discount_percent(&self, value: Decimal) -> RegisterResult<CartView> {
        let pct = Percentage::new(value).map_err(CoreError::from)?;

        Ok(self.cart.with_cart_mut(|c| {
            c.set_discount_percent(pct);
            CartView::from(&*c)
        }))
    }

    /// Sets the tax percentage (semi-persistent register configuration).
    pub fn set_tax_percent(&self, value: Decimal) -> RegisterResult<CartView> {
        let pct = Percentage::new(value).map_err(CoreError::from)?;

        Ok(self.cart.with_cart_mut(|c| {
            c.set_tax_percent(pct);
            CartView::from(&*c)
        }))
    }

    /// Abandons the current sale: empties the cart and resets the discount.
    /// The tax rate stays.
    pub fn clear_cart(&self) -> CartView {
        debug!("clear_cart");

        self.cart.with_cart_mut(|c| {
            c.clear();
            CartView::from(&*c)
        })
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Commits the current cart as a sale.
    ///
    /// See [`CheckoutService::checkout`] for the validation and atomicity
    /// guarantees. The cashier identity is read from the session provider at
    /// commit time.
    pub async fn checkout(
        &self,
        payment_method: PaymentMethod,
        amount_paid: Money,
    ) -> Result<Receipt, CheckoutError> {
        let cashier = self.session.current_cashier();
        self.checkout
            .checkout(&self.cart, &cashier, payment_method, amount_paid)
            .await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Fresh stock figure for a product; a missing (or deactivated) product
    /// reads as zero stock.
    async fn current_stock(&self, product_id: &str) -> Result<i64, RegisterError> {
        let stock = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .map(|p| p.stock)
            .unwrap_or(0);
        Ok(stock)
    }
}
