//! # Session State
//!
//! The cashier identity collaborator and the process-wide cart session.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<Cart>>` because:
//! 1. A host may drive the register from more than one task
//! 2. Cart mutations are read-modify-write sequences (find line → update
//!    quantity) and must be serialized
//! 3. No cart operation blocks or suspends, so the lock is held only for
//!    microseconds and a plain std Mutex beats an async one
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Cart Session Lifecycle                         │
//! │                                                                     │
//! │  Register::new() ──► CartSession created (empty cart)               │
//! │        │                                                            │
//! │        ▼                                                            │
//! │  add / set / remove mutations (serialized through the Mutex)        │
//! │        │                                                            │
//! │        ▼                                                            │
//! │  checkout commits ──► cart.clear() (discount resets, tax kept)      │
//! │        │                        or                                  │
//! │        └── host abandons ──► clear_cart()                           │
//! │                                                                     │
//! │  The session object itself lives as long as the register.           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use till_core::{Cart, CashierIdentity};

// =============================================================================
// Session Provider
// =============================================================================

/// Collaborator that knows who is operating the register.
///
/// Authentication and session storage are out of scope; the register only
/// needs the current cashier's identity at commit time, to stamp the sale.
pub trait SessionProvider: Send + Sync {
    /// Returns the identity of the cashier currently signed in.
    fn current_cashier(&self) -> CashierIdentity;
}

/// A fixed-identity provider for single-operator setups and tests.
#[derive(Debug, Clone)]
pub struct StaticSession {
    cashier: CashierIdentity,
}

impl StaticSession {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        StaticSession {
            cashier: CashierIdentity {
                id: id.into(),
                display_name: display_name.into(),
            },
        }
    }
}

impl SessionProvider for StaticSession {
    fn current_cashier(&self) -> CashierIdentity {
        self.cashier.clone()
    }
}

// =============================================================================
// Cart Session
// =============================================================================

/// The single shared cart for the active register session.
///
/// Cloning shares the same underlying cart (the `Arc` is the identity).
#[derive(Debug, Clone)]
pub struct CartSession {
    cart: Arc<Mutex<Cart>>,
}

impl CartSession {
    /// Creates a new session with an empty cart.
    pub fn new() -> Self {
        CartSession {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = session.with_cart(|cart| cart.totals());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// The closure must not block: the lock is held for its duration.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }
}

impl Default for CartSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
