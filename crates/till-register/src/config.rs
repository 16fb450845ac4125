//! # Register Configuration
//!
//! Configuration loaded once at session start.
//!
//! ## Sources (priority order)
//! 1. Environment variables (`TILL_*`)
//! 2. Defaults (this file)
//!
//! Configuration is read-only after initialization, so no locking is needed.
//! The tax percentage set here seeds the cart's semi-persistent tax rate:
//! it survives `clear()` between sales, unlike the per-sale discount.

use serde::{Deserialize, Serialize};

use till_core::Percentage;

/// Register configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// Store name (stamped onto receipts).
    pub store_name: String,

    /// Currency label prefixed to displayed amounts (e.g. "Rs.").
    pub currency_label: String,

    /// Tax percentage applied to every sale.
    pub tax_percent: Percentage,

    /// Invoice number prefix.
    pub invoice_prefix: String,
}

impl Default for RegisterConfig {
    /// Defaults suitable for development: no tax, rupee label.
    fn default() -> Self {
        RegisterConfig {
            store_name: "Till POS Store".to_string(),
            currency_label: "Rs.".to_string(),
            tax_percent: Percentage::zero(),
            invoice_prefix: "INV".to_string(),
        }
    }
}

impl RegisterConfig {
    /// Creates a configuration from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TILL_STORE_NAME`: store name for receipts
    /// - `TILL_CURRENCY_LABEL`: currency label (e.g. "Rs.", "$")
    /// - `TILL_TAX_PERCENT`: tax percentage, 0-100 (e.g. "8.25")
    /// - `TILL_INVOICE_PREFIX`: invoice number prefix
    ///
    /// Unset or invalid values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = RegisterConfig::default();

        if let Ok(store_name) = std::env::var("TILL_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(label) = std::env::var("TILL_CURRENCY_LABEL") {
            config.currency_label = label;
        }

        if let Ok(raw) = std::env::var("TILL_TAX_PERCENT") {
            if let Ok(pct) = raw.parse::<Percentage>() {
                config.tax_percent = pct;
            }
        }

        if let Ok(prefix) = std::env::var("TILL_INVOICE_PREFIX") {
            config.invoice_prefix = prefix;
        }

        config
    }
}
