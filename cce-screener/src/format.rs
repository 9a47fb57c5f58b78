//! Display formatting helpers.
//!
//! Pure, total functions deriving presentation strings from record fields.
//! Absent values render as the `"-"` placeholder instead of panicking, and
//! nothing here mutates the records it reads. Export (`export`) deliberately
//! does NOT go through these helpers; it writes raw numerics.

use chrono::NaiveDate;

use crate::model::OptionType;

/// Placeholder shown for absent values.
pub const PLACEHOLDER: &str = "-";

/// Broker-style contract label: `DDMONYY STRIKE C|P`, e.g. `19DEC25 152.5 C`.
///
/// Covered-call rows omit the option type on the wire; absent means call.
pub fn option_contract(expiry: NaiveDate, strike: f64, option_type: Option<OptionType>) -> String {
    let date = expiry.format("%d%b%y").to_string().to_uppercase();
    let side = option_type.unwrap_or(OptionType::Call).code();
    format!("{} {} {}", date, strike, side)
}

/// Currency with two decimals: `$185.50`, or `-` when absent.
pub fn currency(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${:.2}", v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Percentage with two decimals: `1.32%`, or `-` when absent.
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => PLACEHOLDER.to_string(),
    }
}

/// ISO date, or `-` when absent.
pub fn date(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
