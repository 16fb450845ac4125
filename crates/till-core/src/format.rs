//! # Formatting Rules
//!
//! Display formatting for money, quantities, percentages and dates.
//!
//! This module is the ONLY place monetary values are rounded: everything
//! upstream (cart math, checkout totals, persisted sales) carries full
//! decimal precision, and the banker's-rounding rule in [`Money::rounded`]
//! is applied here at the display boundary.
//!
//! Two money formatters:
//! - [`format_currency`] - labelled, for read-only display ("Rs. 1,234.50")
//! - [`format_amount`] - label-free, for populating editable payment fields
//!   ("1,234.50")

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::Percentage;

/// Timestamp layout embedded in invoice numbers (second resolution).
pub const INVOICE_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Formats an amount with the currency label: `Rs. 1,234.50`.
///
/// The label is supplied by register configuration; this function only
/// defines the layout (label, space, grouped 2-decimal amount).
pub fn format_currency(amount: Money, label: &str) -> String {
    format!("{} {}", label, format_amount(amount))
}

/// Formats an amount without a currency label: `1,234.50`.
///
/// Used when pre-filling editable tender fields, where a label would be
/// parsed back as garbage.
pub fn format_amount(amount: Money) -> String {
    let s = format!("{:.2}", amount.rounded());
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = rest.split_once('.').unwrap_or((rest, "00"));
    format!("{}{}.{}", sign, group_digits(int_part), frac_part)
}

/// Formats a quantity with digit grouping: `1,250`.
pub fn format_quantity(quantity: i64) -> String {
    let s = quantity.abs().to_string();
    let sign = if quantity < 0 { "-" } else { "" };
    format!("{}{}", sign, group_digits(&s))
}

/// Formats a percentage with one decimal place: `12.5%`.
pub fn format_percentage(pct: Percentage) -> String {
    pct.to_string()
}

/// Formats a date: `07 Aug 2026`.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%d %b %Y").to_string()
}

/// Formats a time of day: `02:45 PM`.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%I:%M %p").to_string()
}

/// Formats a date and time: `07 Aug 2026, 02:45 PM`.
pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format("%d %b %Y, %I:%M %p").to_string()
}

/// Inserts thousands separators into a bare digit string.
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
