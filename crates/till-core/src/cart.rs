//! # Cart Engine
//!
//! The mutable, single-owner aggregate of line items for the active sale.
//!
//! ## Stock Clamping Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Quantity Clamping                              │
//! │                                                                     │
//! │  Every mutation checks the product's CURRENT stock, supplied by     │
//! │  the caller from a fresh catalog read:                              │
//! │                                                                     │
//! │  add_product(P, 10)  with P.stock = 4  ──►  line quantity = 4       │
//! │  add_product(P, 1)   with P.stock = 0  ──►  no line created         │
//! │  set_quantity(P, 0)                    ──►  line removed            │
//! │  decrement_quantity(P) at quantity 1   ──►  line removed            │
//! │                                                                     │
//! │  Clamping is SILENT - the caller re-renders from the cart and sees  │
//! │  the corrected quantity. It is never an error. The invariant:       │
//! │                                                                     │
//! │     1 ≤ line.quantity ≤ product.stock (at last mutation)            │
//! │                                                                     │
//! │  and zero-quantity lines never exist.                               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing
//! All pricing reads are pure functions over the current lines and run at
//! full decimal precision:
//!
//! ```text
//! subtotal        = Σ (line.unit_price × line.quantity)
//! discount_amount = subtotal × discount% / 100
//! tax_amount      = (subtotal − discount_amount) × tax% / 100
//! total           = subtotal − discount_amount + tax_amount
//! ```
//!
//! Nothing is rounded here; rounding belongs to [`crate::format`].

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Percentage, Product};

// =============================================================================
// Cart Line
// =============================================================================

/// One product-and-quantity entry in the cart.
///
/// The product's name, barcode and unit price are frozen copies taken when
/// the line is created. If the catalog price changes while the cart is open,
/// the line keeps the price the customer saw. Only `stock` is ever re-read,
/// and that happens at mutation time, not from this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID), unique within the cart.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub product_name: String,

    /// Barcode at time of adding (frozen).
    pub product_barcode: Option<String>,

    /// Price at time of adding (frozen).
    pub unit_price: Money,

    /// Quantity in cart. Always ≥ 1.
    pub quantity: i64,

    /// Per-line discount amount. Always ≥ 0.
    pub discount: Money,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_barcode: product.barcode.clone(),
            unit_price: product.price,
            quantity,
            discount: Money::zero(),
        }
    }

    /// Line subtotal: unit price × quantity (line discount NOT applied).
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price * self.quantity
    }

    /// Line total: subtotal − line discount.
    #[inline]
    pub fn total(&self) -> Money {
        self.subtotal() - self.discount
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart for the active checkout session.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product accumulates)
/// - Quantity is always ≥ 1; anything that would reach 0 removes the line
/// - `discount_percent` and `tax_percent` are validated into [0, 100]
///
/// ## Lifecycle
/// One cart exists per register session. `clear()` is called after a
/// committed or abandoned sale; the cart itself lives as long as the session.
///
/// The line collection is private: [`Cart::lines`] hands out a copy, so
/// callers can never mutate the engine's state behind its back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount_percent: Percentage,
    tax_percent: Percentage,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    // -------------------------------------------------------------------------
    // Mutations (all clamping is silent - see module docs)
    // -------------------------------------------------------------------------

    /// Adds a product to the cart, or accumulates quantity if a line for it
    /// already exists.
    ///
    /// The resulting quantity is `min(current + quantity, product.stock)`.
    /// A request that clamps to zero (stock exhausted, or non-positive
    /// quantity against an empty line) is a no-op, not an error.
    pub fn add_product(&mut self, product: &Product, quantity: i64) {
        let stock = product.stock.max(0);
        let requested = quantity.max(0);

        if let Some(idx) = self.position(&product.id) {
            let clamped = self.lines[idx].quantity.saturating_add(requested).min(stock);
            if clamped <= 0 {
                // Stock dropped to zero since the line was created
                self.lines.remove(idx);
            } else {
                self.lines[idx].quantity = clamped;
            }
            return;
        }

        let clamped = requested.min(stock);
        if clamped > 0 {
            self.lines.push(CartLine::from_product(product, clamped));
        }
    }

    /// Sets a line's quantity directly.
    ///
    /// A quantity ≤ 0 removes the line; otherwise the quantity is clamped to
    /// `current_stock`. Absent lines are a no-op.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64, current_stock: i64) {
        let Some(idx) = self.position(product_id) else {
            return;
        };

        let clamped = quantity.min(current_stock.max(0));
        if clamped <= 0 {
            self.lines.remove(idx);
        } else {
            self.lines[idx].quantity = clamped;
        }
    }

    /// Removes a line unconditionally. Absent lines are a no-op.
    pub fn remove_product(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Increases a line's quantity by exactly 1, respecting the stock
    /// ceiling: at `current_stock` the call is a no-op.
    pub fn increment_quantity(&mut self, product_id: &str, current_stock: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            if line.quantity < current_stock {
                line.quantity += 1;
            }
        }
    }

    /// Decreases a line's quantity by exactly 1. Decrementing from quantity 1
    /// removes the line entirely (zero-quantity lines never exist).
    pub fn decrement_quantity(&mut self, product_id: &str) {
        if let Some(idx) = self.position(product_id) {
            if self.lines[idx].quantity > 1 {
                self.lines[idx].quantity -= 1;
            } else {
                self.lines.remove(idx);
            }
        }
    }

    /// Sets a per-line discount amount, clamped to ≥ 0.
    pub fn set_line_discount(&mut self, product_id: &str, discount: Money) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.discount = if discount.is_negative() {
                Money::zero()
            } else {
                discount
            };
        }
    }

    /// Empties all lines and resets the cart-level discount to zero.
    ///
    /// The tax percentage is NOT reset: it is register configuration that
    /// outlives individual transactions, while the discount belongs to the
    /// sale being abandoned or committed.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount_percent = Percentage::zero();
    }

    // -------------------------------------------------------------------------
    // Rates
    // -------------------------------------------------------------------------

    /// Sets the cart-level discount percentage.
    pub fn set_discount_percent(&mut self, pct: Percentage) {
        self.discount_percent = pct;
    }

    pub fn discount_percent(&self) -> Percentage {
        self.discount_percent
    }

    /// Sets the tax percentage (semi-persistent - survives `clear()`).
    pub fn set_tax_percent(&mut self, pct: Percentage) {
        self.tax_percent = pct;
    }

    pub fn tax_percent(&self) -> Percentage {
        self.tax_percent
    }

    // -------------------------------------------------------------------------
    // Reads (copies only)
    // -------------------------------------------------------------------------

    /// Returns a copy of all cart lines, in insertion order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    /// Returns a copy of the line for the given product, if present.
    pub fn line(&self, product_id: &str) -> Option<CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id).cloned()
    }

    /// Checks whether a line for the given product exists.
    pub fn contains_product(&self, product_id: &str) -> bool {
        self.lines.iter().any(|l| l.product_id == product_id)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    // -------------------------------------------------------------------------
    // Pricing (pure reads, full precision)
    // -------------------------------------------------------------------------

    /// Subtotal before discount and tax: Σ (unit_price × quantity).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.subtotal()).sum()
    }

    /// Cart-level discount amount: subtotal × discount%.
    pub fn discount_amount(&self) -> Money {
        self.subtotal().percentage_of(self.discount_percent)
    }

    /// Tax amount, computed on the discounted subtotal.
    pub fn tax_amount(&self) -> Money {
        (self.subtotal() - self.discount_amount()).percentage_of(self.tax_percent)
    }

    /// Grand total: subtotal − discount + tax.
    pub fn total(&self) -> Money {
        self.subtotal() - self.discount_amount() + self.tax_amount()
    }

    /// Bundles the pricing figures and counts into one view struct.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for hosts and receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            discount_amount: cart.discount_amount(),
            tax_amount: cart.tax_amount(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: Some(format!("4790{}", id)),
            description: None,
            price: price.parse().unwrap(),
            cost_price: Money::zero(),
            stock,
            min_stock: 0,
            category_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn pct(s: &str) -> Percentage {
        s.parse().unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_product_creates_line() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "9.99", 10), 2);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal(), money("19.98"));
    }

    #[test]
    fn test_add_same_product_accumulates() {
        let mut cart = Cart::new();
        let p = product("a", "9.99", 10);

        cart.add_product(&p, 2);
        cart.add_product(&p, 3);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line("a").unwrap().quantity, 5);
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "5.00", 4), 10);

        assert_eq!(cart.line("a").unwrap().quantity, 4);
    }

    #[test]
    fn test_accumulate_clamps_to_stock() {
        let mut cart = Cart::new();
        let p = product("a", "5.00", 5);

        cart.add_product(&p, 3);
        cart.add_product(&p, 4);

        assert_eq!(cart.line("a").unwrap().quantity, 5);
    }

    #[test]
    fn test_add_out_of_stock_is_noop() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "5.00", 0), 1);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_when_stock_dropped_to_zero_removes_line() {
        let mut cart = Cart::new();
        let mut p = product("a", "5.00", 3);
        cart.add_product(&p, 2);

        // Stock sold out elsewhere; next mutation sees the fresh figure
        p.stock = 0;
        cart.add_product(&p, 1);

        assert!(!cart.contains_product("a"));
    }

    #[test]
    fn test_set_quantity_clamps() {
        let mut cart = Cart::new();
        let p = product("a", "5.00", 8);
        cart.add_product(&p, 1);

        cart.set_quantity("a", 20, p.stock);
        assert_eq!(cart.line("a").unwrap().quantity, 8);

        cart.set_quantity("a", 3, p.stock);
        assert_eq!(cart.line("a").unwrap().quantity, 3);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        let p = product("a", "5.00", 8);
        cart.add_product(&p, 4);

        cart.set_quantity("a", 0, p.stock);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.remove_product("ghost");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increment_respects_ceiling() {
        let mut cart = Cart::new();
        let p = product("a", "5.00", 2);
        cart.add_product(&p, 2);

        cart.increment_quantity("a", p.stock);
        assert_eq!(cart.line("a").unwrap().quantity, 2);
    }

    #[test]
    fn test_decrement_from_one_removes_line() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "5.00", 5), 1);

        cart.decrement_quantity("a");
        assert!(!cart.contains_product("a"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_invariant_over_sequences() {
        let mut cart = Cart::new();
        let p = product("a", "1.00", 3);

        cart.add_product(&p, 2);
        cart.increment_quantity("a", p.stock);
        cart.increment_quantity("a", p.stock); // at ceiling, no-op
        cart.decrement_quantity("a");
        cart.decrement_quantity("a");
        cart.decrement_quantity("a"); // removed here
        cart.decrement_quantity("a"); // absent, no-op

        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_pricing_scenario() {
        // A: 100.00 × 3, B: 50.00 × 1, discount 10%, tax 5%
        let mut cart = Cart::new();
        cart.add_product(&product("a", "100.00", 5), 3);
        cart.add_product(&product("b", "50.00", 1), 1);
        cart.set_discount_percent(pct("10"));
        cart.set_tax_percent(pct("5"));

        assert_eq!(cart.subtotal(), money("350.00"));
        assert_eq!(cart.discount_amount(), money("35.00"));
        assert_eq!(cart.tax_amount(), money("15.75"));
        assert_eq!(cart.total(), money("330.75"));
    }

    #[test]
    fn test_total_identity_holds_for_awkward_rates() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "9.99", 100), 7);
        cart.set_discount_percent(pct("12.5"));
        cart.set_tax_percent(pct("7.3"));

        assert_eq!(
            cart.total(),
            cart.subtotal() - cart.discount_amount() + cart.tax_amount()
        );
    }

    #[test]
    fn test_pricing_reads_are_idempotent() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "3.33", 10), 3);
        cart.set_discount_percent(pct("15"));
        cart.set_tax_percent(pct("8"));

        assert_eq!(cart.total(), cart.total());
        assert_eq!(cart.subtotal(), cart.subtotal());
    }

    #[test]
    fn test_line_discount_affects_line_total_not_subtotal() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "10.00", 10), 2);
        cart.set_line_discount("a", money("3.00"));

        let line = cart.line("a").unwrap();
        assert_eq!(line.subtotal(), money("20.00"));
        assert_eq!(line.total(), money("17.00"));
        // Cart subtotal is defined over unit price × quantity only
        assert_eq!(cart.subtotal(), money("20.00"));
    }

    #[test]
    fn test_negative_line_discount_clamps_to_zero() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "10.00", 10), 1);
        cart.set_line_discount("a", money("-5.00"));

        assert_eq!(cart.line("a").unwrap().discount, Money::zero());
    }

    #[test]
    fn test_clear_resets_discount_but_not_tax() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "10.00", 10), 1);
        cart.set_discount_percent(pct("20"));
        cart.set_tax_percent(pct("8"));

        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.discount_percent().is_zero());
        assert_eq!(cart.tax_percent(), pct("8"));
    }

    #[test]
    fn test_lines_returns_a_copy() {
        let mut cart = Cart::new();
        cart.add_product(&product("a", "10.00", 10), 2);

        let mut copy = cart.lines();
        copy[0].quantity = 999;
        copy.clear();

        assert_eq!(cart.line("a").unwrap().quantity, 2);
        assert_eq!(cart.line_count(), 1);
    }
}
