//! Client-side result post-processing.
//!
//! The backend does not accept moneyness or the probability-OTM band as
//! query parameters, so they are applied here after a scan. The final step
//! is a stable sort on a single active field; ties preserve the backend's
//! prior relative order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::filters::{FilterState, Moneyness};
use crate::model::Opportunity;

// ============================================================================
// Derived Metrics
// ============================================================================

/// Relative moneyness band, as a fraction of the underlying price. A strike
/// within ±2% of spot counts as at-the-money, boundaries inclusive.
const ATM_BAND: f64 = 0.02;

/// Classify a contract's moneyness from strike and underlying price.
pub fn moneyness_of(strike: f64, stock_price: f64) -> Moneyness {
    let m = (strike - stock_price) / stock_price;
    if m < -ATM_BAND {
        Moneyness::Itm
    } else if m > ATM_BAND {
        Moneyness::Otm
    } else {
        Moneyness::Atm
    }
}

/// Probability of expiring out-of-the-money, in whole percent, derived
/// from delta: `round((1 - delta) * 100)`.
pub fn prob_otm(delta: f64) -> u8 {
    (((1.0 - delta) * 100.0).round()).clamp(0.0, 100.0) as u8
}

// ============================================================================
// Client-Side Predicates
// ============================================================================

/// Apply the client-side-only predicates from the filter state.
///
/// - moneyness bucket, when not `All`
/// - probability-OTM band, when either bound is set (missing bounds default
///   to 0 and 100)
pub fn apply_client_filters(state: &FilterState, rows: Vec<Opportunity>) -> Vec<Opportunity> {
    let moneyness = state.options.moneyness;
    let prob_lo = state.probability.min_prob_otm;
    let prob_hi = state.probability.max_prob_otm;
    let prob_active = prob_lo.is_some() || prob_hi.is_some();

    rows.into_iter()
        .filter(|opp| {
            if moneyness != Moneyness::All && moneyness_of(opp.strike, opp.stock_price) != moneyness
            {
                return false;
            }
            if prob_active {
                let p = prob_otm(opp.delta);
                if p < prob_lo.unwrap_or(0) || p > prob_hi.unwrap_or(100) {
                    return false;
                }
            }
            true
        })
        .collect()
}

// ============================================================================
// Sorting
// ============================================================================

/// Sortable columns of the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Symbol,
    StockPrice,
    Strike,
    Dte,
    Premium,
    RoiPct,
    Delta,
    ProbOtm,
    Iv,
    IvRank,
    Volume,
    OpenInterest,
    #[default]
    Score,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// The active sort: one field, one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Toggle behavior: selecting the current field flips direction, a new
    /// field resets to descending.
    #[must_use]
    pub fn toggle(self, field: SortField) -> Self {
        if field == self.field {
            let direction = match self.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
            Self { field, direction }
        } else {
            Self {
                field,
                direction: SortDirection::Desc,
            }
        }
    }
}

/// Numeric sort key for a row. Missing values compare as 0; display still
/// shows the true absent value.
fn numeric_key(opp: &Opportunity, field: SortField) -> f64 {
    match field {
        SortField::StockPrice => opp.stock_price,
        SortField::Strike => opp.strike,
        SortField::Dte => opp.dte as f64,
        SortField::Premium => opp.premium,
        SortField::RoiPct => opp.roi_pct,
        SortField::Delta => opp.delta,
        SortField::ProbOtm => f64::from(prob_otm(opp.delta)),
        SortField::Iv => opp.iv.unwrap_or(0.0),
        SortField::IvRank => opp.iv_rank.unwrap_or(0.0),
        SortField::Volume => opp.volume as f64,
        SortField::OpenInterest => opp.open_interest as f64,
        SortField::Score => opp.score,
        SortField::Symbol => 0.0,
    }
}

/// Stable sort of the result set by the active sort spec.
pub fn sort_opportunities(rows: &mut [Opportunity], spec: SortSpec) {
    rows.sort_by(|a, b| {
        let ord = if spec.field == SortField::Symbol {
            a.symbol.cmp(&b.symbol)
        } else {
            numeric_key(a, spec.field)
                .partial_cmp(&numeric_key(b, spec.field))
                .unwrap_or(Ordering::Equal)
        };
        match spec.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

// ============================================================================
// Tests
// ============================================================================
