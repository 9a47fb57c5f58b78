//! Query parameter compilation.
//!
//! Pure transformation of a [`FilterState`] into the sparse key/value set
//! the backend accepts. Unset bounds are omitted entirely; they are never
//! coerced to 0, which would silently over-constrain the query.
//!
//! The emitted set follows the backend contract exactly:
//!
//! - covered calls: `min_roi`, `max_dte`, `min_delta`, `max_delta`,
//!   `min_price`, `max_price`, `min_volume`, `min_open_interest`,
//!   `weekly_only`/`monthly_only`, `bypass_cache`
//! - pmcc: price range, LEAPS/short leg delta and DTE ranges, `min_roi`,
//!   `min_annualized_roi`
//!
//! Everything else in the filter state (moneyness, the prob-OTM band, the
//! technical and fundamental groups, `min_dte`, the theta range) is either
//! applied client-side in `postprocess` or inert until the backend contract
//! defines a parameter for it. Presets still round-trip the full state.

use std::fmt::Display;

use cce_common::{Error, Result};

use super::{ExpirationType, FilterState, PmccFilterState};

// ============================================================================
// Query Params
// ============================================================================

/// An ordered sparse set of query parameters.
///
/// Order is deterministic so two compilations of the same state are
/// byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    fn push(&mut self, key: &str, value: impl Display) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    fn push_opt(&mut self, key: &str, value: Option<impl Display>) {
        if let Some(v) = value {
            self.push(key, v);
        }
    }

    /// The compiled pairs, in emission order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Look up a parameter value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a key was emitted at all.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render as a query string, for logging.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// ============================================================================
// Range Validation
// ============================================================================

fn check_range<T: PartialOrd + Display>(
    name: &str,
    min: Option<T>,
    max: Option<T>,
) -> Result<()> {
    if let (Some(lo), Some(hi)) = (&min, &max) {
        if lo > hi {
            return Err(Error::Validation(format!(
                "{} range is inverted: min {} > max {}",
                name, lo, hi
            )));
        }
    }
    Ok(())
}

/// Defensive precondition check: every present range must have `min <= max`,
/// and the prob-OTM band must stay within 0-100. The UI does not enforce
/// this, so the compiler does.
pub fn validate(state: &FilterState) -> Result<()> {
    check_range("dte", state.expiration.min_dte, state.expiration.max_dte)?;
    check_range("price", state.stock.min_price, state.stock.max_price)?;
    check_range("delta", state.greeks.min_delta, state.greeks.max_delta)?;
    check_range("theta", state.greeks.min_theta, state.greeks.max_theta)?;
    check_range(
        "prob_otm",
        state.probability.min_prob_otm,
        state.probability.max_prob_otm,
    )?;
    for bound in [
        state.probability.min_prob_otm,
        state.probability.max_prob_otm,
    ]
    .into_iter()
    .flatten()
    {
        if bound > 100 {
            return Err(Error::Validation(format!(
                "prob_otm bound {} is outside 0-100",
                bound
            )));
        }
    }
    Ok(())
}

/// Range validation for the PMCC filter state.
pub fn validate_pmcc(state: &PmccFilterState) -> Result<()> {
    check_range("price", state.min_price, state.max_price)?;
    check_range("leaps_delta", state.min_leaps_delta, state.max_leaps_delta)?;
    check_range("leaps_dte", state.min_leaps_dte, state.max_leaps_dte)?;
    check_range("short_delta", state.min_short_delta, state.max_short_delta)?;
    check_range("short_dte", state.min_short_dte, state.max_short_dte)?;
    Ok(())
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile the covered-call query parameters.
///
/// Pure: the only inputs are the state and the explicit `bypass_cache`
/// flag, and calling it twice on unchanged state yields identical output.
pub fn compile(state: &FilterState, bypass_cache: bool) -> QueryParams {
    let mut params = QueryParams::default();

    params.push_opt("min_roi", state.roi.min_roi);
    params.push_opt("max_dte", state.expiration.max_dte);
    params.push_opt("min_delta", state.greeks.min_delta);
    params.push_opt("max_delta", state.greeks.max_delta);
    params.push_opt("min_price", state.stock.min_price);
    params.push_opt("max_price", state.stock.max_price);
    params.push_opt("min_volume", state.options.min_volume);
    params.push_opt("min_open_interest", state.options.min_open_interest);

    match state.expiration.expiration_type {
        ExpirationType::All => {}
        ExpirationType::Weekly => params.push("weekly_only", true),
        ExpirationType::Monthly => params.push("monthly_only", true),
    }

    params.push("bypass_cache", bypass_cache);
    params
}

/// [`compile`] with the defensive range validation applied first.
pub fn compile_checked(state: &FilterState, bypass_cache: bool) -> Result<QueryParams> {
    validate(state)?;
    Ok(compile(state, bypass_cache))
}

/// Compile the PMCC query parameters.
pub fn compile_pmcc(state: &PmccFilterState) -> QueryParams {
    let mut params = QueryParams::default();

    params.push_opt("min_price", state.min_price);
    params.push_opt("max_price", state.max_price);
    params.push_opt("min_leaps_delta", state.min_leaps_delta);
    params.push_opt("max_leaps_delta", state.max_leaps_delta);
    params.push_opt("min_leaps_dte", state.min_leaps_dte);
    params.push_opt("max_leaps_dte", state.max_leaps_dte);
    params.push_opt("min_short_delta", state.min_short_delta);
    params.push_opt("max_short_delta", state.max_short_delta);
    params.push_opt("min_short_dte", state.min_short_dte);
    params.push_opt("max_short_dte", state.max_short_dte);
    params.push_opt("min_roi", state.min_roi);
    params.push_opt("min_annualized_roi", state.min_annualized_roi);

    params
}

/// [`compile_pmcc`] with range validation applied first.
pub fn compile_pmcc_checked(state: &PmccFilterState) -> Result<QueryParams> {
    validate_pmcc(state)?;
    Ok(compile_pmcc(state))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Moneyness, RsiFilter};

    #[test]
    fn test_compile_is_pure() {
        let state = FilterState::default_scan();
        assert_eq!(compile(&state, false), compile(&state, false));
        assert_eq!(
            compile(&state, false).to_query_string(),
            compile(&state, false).to_query_string()
        );
    }

    #[test]
    fn test_unset_bound_is_omitted_not_zero() {
        let state = FilterState::empty();
        let params = compile(&state, false);
        assert!(!params.contains("min_price"));
        assert!(!params.contains("min_roi"));
        assert!(!params.contains("max_dte"));
        // Only the cache flag remains
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("bypass_cache"), Some("false"));
    }

    #[test]
    fn test_zero_bound_is_emitted() {
        let mut state = FilterState::empty();
        state.stock.min_price = Some(0.0);
        let params = compile(&state, false);
        assert_eq!(params.get("min_price"), Some("0"));
    }

    #[test]
    fn test_delta_only_scenario() {
        // Only the delta range set
        let mut state = FilterState::empty();
        state.greeks.min_delta = Some(0.15);
        state.greeks.max_delta = Some(0.45);

        let params = compile(&state, false);
        assert_eq!(
            params.to_query_string(),
            "min_delta=0.15&max_delta=0.45&bypass_cache=false"
        );
    }

    #[test]
    fn test_expiration_type_flags() {
        let mut state = FilterState::empty();
        let params = compile(&state, false);
        assert!(!params.contains("weekly_only"));
        assert!(!params.contains("monthly_only"));

        state.expiration.expiration_type = ExpirationType::Weekly;
        let params = compile(&state, false);
        assert_eq!(params.get("weekly_only"), Some("true"));
        assert!(!params.contains("monthly_only"));

        state.expiration.expiration_type = ExpirationType::Monthly;
        let params = compile(&state, false);
        assert_eq!(params.get("monthly_only"), Some("true"));
        assert!(!params.contains("weekly_only"));
    }

    #[test]
    fn test_bypass_cache_flag() {
        let state = FilterState::empty();
        assert_eq!(compile(&state, true).get("bypass_cache"), Some("true"));
        assert_eq!(compile(&state, false).get("bypass_cache"), Some("false"));
    }

    #[test]
    fn test_client_side_filters_never_emitted() {
        let mut state = FilterState::default_scan();
        state.options.moneyness = Moneyness::Itm;
        state.technical.rsi_filter = RsiFilter::Oversold;
        state.greeks.min_theta = Some(-0.5);

        let params = compile(&state, false);
        let query = params.to_query_string();
        assert!(!query.contains("moneyness"));
        assert!(!query.contains("prob_otm"));
        assert!(!query.contains("rsi"));
        assert!(!query.contains("theta"));
        // min_dte is round-tripped through presets but not in the contract
        assert!(!params.contains("min_dte"));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut state = FilterState::empty();
        state.greeks.min_delta = Some(0.5);
        state.greeks.max_delta = Some(0.2);

        let err = compile_checked(&state, false).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("delta"));
    }

    #[test]
    fn test_prob_otm_out_of_bounds_is_rejected() {
        let mut state = FilterState::empty();
        state.probability.max_prob_otm = Some(150);
        assert!(compile_checked(&state, false).unwrap_err().is_validation());
    }

    #[test]
    fn test_compile_checked_passes_valid_state() {
        let params = compile_checked(&FilterState::default_scan(), false).unwrap();
        assert_eq!(params.get("min_roi"), Some("0.5"));
        assert_eq!(params.get("max_dte"), Some("45"));
        assert_eq!(params.get("min_price"), Some("10"));
        assert_eq!(params.get("max_price"), Some("500"));
    }

    #[test]
    fn test_pmcc_compile_maps_leg_fields() {
        let state = PmccFilterState::default_scan();
        let params = compile_pmcc(&state);
        assert_eq!(params.get("min_leaps_delta"), Some("0.7"));
        assert_eq!(params.get("max_leaps_delta"), Some("0.95"));
        assert_eq!(params.get("min_leaps_dte"), Some("180"));
        assert_eq!(params.get("min_short_dte"), Some("20"));
        assert_eq!(params.get("max_short_dte"), Some("45"));
        assert_eq!(params.get("min_annualized_roi"), Some("15"));
        // Unset bounds stay out; the PMCC contract has no cache flag
        assert!(!params.contains("max_price"));
        assert!(!params.contains("bypass_cache"));
    }

    #[test]
    fn test_pmcc_inverted_range_rejected() {
        let mut state = PmccFilterState::default_scan();
        state.min_short_dte = Some(60);
        state.max_short_dte = Some(30);
        assert!(compile_pmcc_checked(&state).unwrap_err().is_validation());
    }
}
