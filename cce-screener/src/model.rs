//! Wire types returned by the screener backend.
//!
//! These records are read-only to the pipeline: post-processing filters and
//! sorts them, the formatters derive display strings from them, but nothing
//! mutates a field after deserialization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Option Type
// ============================================================================

/// Contract side. Covered-call rows omit it; absent means call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Single-letter broker code.
    pub const fn code(self) -> char {
        match self {
            Self::Call => 'C',
            Self::Put => 'P',
        }
    }
}

// ============================================================================
// Covered Call Opportunity
// ============================================================================

/// One screened covered-call contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Underlying ticker symbol
    pub symbol: String,
    /// Current underlying price
    pub stock_price: f64,
    /// Strike price
    pub strike: f64,
    /// Expiration date
    pub expiry: NaiveDate,
    /// Days to expiration
    pub dte: u32,
    /// Premium (per share)
    pub premium: f64,
    /// Return on investment, percent
    pub roi_pct: f64,
    /// Delta (0..1 for calls)
    pub delta: f64,
    /// Implied volatility; backends without an IV feed omit it
    #[serde(default)]
    pub iv: Option<f64>,
    /// IV rank; optional for the same reason
    #[serde(default)]
    pub iv_rank: Option<f64>,
    /// Daily contract volume
    pub volume: u64,
    /// Open interest
    pub open_interest: u64,
    /// Backend composite score (0-100)
    pub score: f64,
    /// Contract side; absent means call
    #[serde(default)]
    pub option_type: Option<OptionType>,
}

/// Envelope for `GET /screener/covered-calls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveredCallResponse {
    pub opportunities: Vec<Opportunity>,
    /// Whether the backend served a cached scan
    #[serde(default)]
    pub from_cache: bool,
    /// Whether the market was closed at scan time
    #[serde(default)]
    pub market_closed: bool,
    /// Whether today is the last trading day before an expiry
    #[serde(default)]
    pub is_last_trading_day: bool,
}

// ============================================================================
// PMCC Opportunity
// ============================================================================

/// One screened PMCC diagonal (LEAPS long call + short-dated short call).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmccOpportunity {
    pub symbol: String,
    pub stock_price: f64,
    /// Long LEAPS leg
    pub leaps_strike: f64,
    pub leaps_expiry: NaiveDate,
    pub leaps_dte: u32,
    pub leaps_delta: f64,
    pub leaps_premium: f64,
    /// Short-dated short leg
    pub short_strike: f64,
    pub short_expiry: NaiveDate,
    pub short_dte: u32,
    pub short_delta: f64,
    pub short_premium: f64,
    /// Capital at risk for the position
    pub net_debit: f64,
    pub roi_pct: f64,
    pub annualized_roi_pct: f64,
    pub score: f64,
}

/// Envelope for `GET /screener/pmcc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmccResponse {
    pub opportunities: Vec<PmccOpportunity>,
    /// Whether the scan used live quotes
    #[serde(default)]
    pub is_live: bool,
    /// Optional backend notice (e.g. delayed data)
    #[serde(default)]
    pub note: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
