//! Filter state for the screening pipeline.
//!
//! `FilterState` is a dumb container: it holds the typed filter groups the
//! screener UI edits and performs no validation. Validation happens in the
//! query compiler (`filters::query`), and the client-side-only predicates
//! live in `postprocess`.
//!
//! Every numeric bound is an `Option`: `None` means "no bound" and is a
//! distinct state from any number, including 0. Blank or unparsable input
//! must map to `None` via the `parse_optional_*` helpers, never to a
//! fallback number.

pub mod preset;
pub mod query;

use serde::{Deserialize, Serialize};

// ============================================================================
// Filter Enums
// ============================================================================

/// Expiration cadence filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationType {
    #[default]
    All,
    Weekly,
    Monthly,
}

/// Moneyness bucket. Applied client-side only; the backend does not accept
/// it as a query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Moneyness {
    #[default]
    All,
    Itm,
    Atm,
    Otm,
}

/// Simple moving average position filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmaFilter {
    #[default]
    All,
    AboveSma20,
    AboveSma50,
    AboveSma200,
}

/// RSI regime filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiFilter {
    #[default]
    All,
    Oversold,
    Neutral,
    Overbought,
}

/// MACD signal filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    #[default]
    All,
    Bullish,
    Bearish,
}

/// Trend strength filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    #[default]
    All,
    Strong,
    Moderate,
    Weak,
}

/// Overall technical signal filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallSignal {
    #[default]
    All,
    Buy,
    Neutral,
    Sell,
}

/// Analyst consensus rating filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalystRating {
    #[default]
    All,
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

/// P/E ratio bucket filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeRatioBucket {
    #[default]
    All,
    Under10,
    TenToTwenty,
    TwentyToForty,
    OverForty,
}

// ============================================================================
// Filter Groups
// ============================================================================

/// Expiration window filters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpirationFilters {
    /// Minimum days to expiration
    #[serde(default)]
    pub min_dte: Option<u32>,
    /// Maximum days to expiration
    #[serde(default)]
    pub max_dte: Option<u32>,
    /// Weekly/monthly cadence
    #[serde(default)]
    pub expiration_type: ExpirationType,
}

/// Underlying stock filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockFilters {
    /// Minimum stock price
    #[serde(default)]
    pub min_price: Option<f64>,
    /// Maximum stock price
    #[serde(default)]
    pub max_price: Option<f64>,
    /// Include common stocks
    #[serde(default = "default_true")]
    pub include_stocks: bool,
    /// Include ETFs
    #[serde(default = "default_true")]
    pub include_etfs: bool,
    /// Include index underlyings
    #[serde(default)]
    pub include_index: bool,
}

impl Default for StockFilters {
    fn default() -> Self {
        Self {
            min_price: None,
            max_price: None,
            include_stocks: true,
            include_etfs: true,
            include_index: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Option contract filters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionFilters {
    /// Minimum daily contract volume
    #[serde(default)]
    pub min_volume: Option<u64>,
    /// Minimum open interest
    #[serde(default)]
    pub min_open_interest: Option<u64>,
    /// Moneyness bucket (client-side only)
    #[serde(default)]
    pub moneyness: Moneyness,
}

/// Greeks filters. Delta is 0..1 for calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GreekFilters {
    #[serde(default)]
    pub min_delta: Option<f64>,
    #[serde(default)]
    pub max_delta: Option<f64>,
    #[serde(default)]
    pub min_theta: Option<f64>,
    #[serde(default)]
    pub max_theta: Option<f64>,
}

/// Probability-of-expiring-OTM filters, in whole percent (0-100).
/// Derived from delta client-side; never sent to the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilityFilters {
    #[serde(default)]
    pub min_prob_otm: Option<u8>,
    #[serde(default)]
    pub max_prob_otm: Option<u8>,
}

/// Technical indicator filters.
///
/// These are round-tripped through saved presets but are inert for the
/// covered-call query: the backend contract defines no parameters for them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TechnicalFilters {
    #[serde(default)]
    pub sma_filter: SmaFilter,
    #[serde(default)]
    pub rsi_filter: RsiFilter,
    #[serde(default)]
    pub macd_signal: MacdSignal,
    #[serde(default)]
    pub trend_strength: TrendStrength,
    #[serde(default)]
    pub overall_signal: OverallSignal,
}

/// Fundamental filters. Inert for the query, same as `TechnicalFilters`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FundamentalFilters {
    #[serde(default)]
    pub analyst_rating: AnalystRating,
    #[serde(default)]
    pub min_analyst_count: Option<u32>,
    #[serde(default)]
    pub pe_ratio: PeRatioBucket,
    #[serde(default)]
    pub min_roe: Option<f64>,
}

/// Return-on-investment filters, in percent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoiFilters {
    #[serde(default)]
    pub min_roi: Option<f64>,
    #[serde(default)]
    pub min_annualized_roi: Option<f64>,
}

// ============================================================================
// Filter State
// ============================================================================

/// The full filter state for a covered-call screening session.
///
/// A session starts from `FilterState::empty()` so an initial scan is not
/// accidentally narrowed; `reset()` loads the documented scan defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub expiration: ExpirationFilters,
    #[serde(default)]
    pub stock: StockFilters,
    #[serde(default)]
    pub options: OptionFilters,
    #[serde(default)]
    pub greeks: GreekFilters,
    #[serde(default)]
    pub probability: ProbabilityFilters,
    #[serde(default)]
    pub technical: TechnicalFilters,
    #[serde(default)]
    pub fundamental: FundamentalFilters,
    #[serde(default)]
    pub roi: RoiFilters,
}

impl FilterState {
    /// Empty state: every bound unset, every enum neutral. Inclusion flags
    /// keep their per-field defaults (stocks and ETFs in, indexes out).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The documented scan defaults used by `reset()`.
    pub fn default_scan() -> Self {
        Self {
            expiration: ExpirationFilters {
                min_dte: Some(1),
                max_dte: Some(45),
                expiration_type: ExpirationType::All,
            },
            stock: StockFilters {
                min_price: Some(10.0),
                max_price: Some(500.0),
                ..StockFilters::default()
            },
            greeks: GreekFilters {
                min_delta: Some(0.15),
                max_delta: Some(0.45),
                ..GreekFilters::default()
            },
            probability: ProbabilityFilters {
                min_prob_otm: Some(50),
                max_prob_otm: Some(100),
            },
            roi: RoiFilters {
                min_roi: Some(0.5),
                min_annualized_roi: Some(10.0),
            },
            ..Self::default()
        }
    }

    /// Replace the entire state with the scan defaults, atomically.
    pub fn reset(&mut self) {
        *self = Self::default_scan();
    }
}

// ============================================================================
// PMCC Filter State
// ============================================================================

/// Filter state for the PMCC (Poor Man's Covered Call) screen.
///
/// The diagonal has two legs: a long LEAPS call and a short-dated short
/// call, each with its own delta and DTE window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PmccFilterState {
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_leaps_delta: Option<f64>,
    #[serde(default)]
    pub max_leaps_delta: Option<f64>,
    #[serde(default)]
    pub min_leaps_dte: Option<u32>,
    #[serde(default)]
    pub max_leaps_dte: Option<u32>,
    #[serde(default)]
    pub min_short_delta: Option<f64>,
    #[serde(default)]
    pub max_short_delta: Option<f64>,
    #[serde(default)]
    pub min_short_dte: Option<u32>,
    #[serde(default)]
    pub max_short_dte: Option<u32>,
    #[serde(default)]
    pub min_roi: Option<f64>,
    #[serde(default)]
    pub min_annualized_roi: Option<f64>,
}

impl PmccFilterState {
    /// Typical PMCC defaults: deep ITM LEAPS leg, 30-45 DTE short leg.
    pub fn default_scan() -> Self {
        Self {
            min_price: Some(20.0),
            min_leaps_delta: Some(0.7),
            max_leaps_delta: Some(0.95),
            min_leaps_dte: Some(180),
            min_short_delta: Some(0.15),
            max_short_delta: Some(0.4),
            min_short_dte: Some(20),
            max_short_dte: Some(45),
            min_roi: Some(1.0),
            min_annualized_roi: Some(15.0),
            ..Self::default()
        }
    }
}

// ============================================================================
// Input Parsing
// ============================================================================

/// Parse a numeric text input into an optional bound.
///
/// Blank, whitespace-only, or unparsable input yields `None`. This is the
/// only sanctioned path from text input to a filter bound; `"0"` parses to
/// `Some(0.0)` and stays distinct from "unset".
pub fn parse_optional_f64(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Integer variant of [`parse_optional_f64`].
pub fn parse_optional_u32(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Wide-integer variant for volume and open interest.
pub fn parse_optional_u64(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

// ============================================================================
// Tests
// ============================================================================
