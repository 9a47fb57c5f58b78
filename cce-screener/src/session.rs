//! Scan session: the explicit object tying the pipeline together.
//!
//! A session owns the filter state, the active sort, and the last-good
//! result set. One logical session means one thread of control: no locking,
//! no overlapping requests to the same resource. A monotonically increasing
//! sequence number guards against a stale in-flight response being applied
//! after a newer scan was issued.
//!
//! A failed scan leaves everything as it was; the error is returned for the
//! caller to surface once.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use cce_common::config::Config;
use cce_common::Result;

use crate::client::{ScreenerBackend, ScreenerClient};
use crate::export;
use crate::filters::preset::{PresetStore, SavedFilterPreset};
use crate::filters::{query, FilterState, PmccFilterState};
use crate::model::{CoveredCallResponse, Opportunity, PmccResponse};
use crate::postprocess::{self, SortField, SortSpec};

// ============================================================================
// Scan Outcome
// ============================================================================

/// Summary of an applied scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    /// Rows the backend returned
    pub total_received: usize,
    /// Rows remaining after client-side predicates
    pub kept: usize,
    /// Backend served a cached scan
    pub from_cache: bool,
    /// Market was closed at scan time
    pub market_closed: bool,
    /// Today is the last trading day before an expiry
    pub is_last_trading_day: bool,
    /// When the scan completed
    pub completed_at: DateTime<Utc>,
}

/// Result of a scan that reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The response was applied to the session
    Applied(ScanSummary),
    /// A newer scan was issued while this one was in flight; the response
    /// was discarded and the result set is untouched
    Superseded,
}

// ============================================================================
// Scan Session
// ============================================================================

/// A covered-call screening session.
pub struct ScanSession<B: ScreenerBackend = ScreenerClient> {
    backend: B,
    presets: PresetStore,
    filters: FilterState,
    pmcc_filters: PmccFilterState,
    sort: SortSpec,
    results: Vec<Opportunity>,
    last_scan: Option<ScanSummary>,
    /// Sequence of the most recently issued request
    issued: u64,
}

impl ScanSession<ScreenerClient> {
    /// Build a session against the configured backend, starting from an
    /// empty filter state.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ScreenerClient::from_config(config),
            PresetStore::from_config(config),
        )
    }
}

impl<B: ScreenerBackend> ScanSession<B> {
    /// Create a session with an explicit backend and preset store.
    pub fn new(backend: B, presets: PresetStore) -> Self {
        Self {
            backend,
            presets,
            filters: FilterState::empty(),
            pmcc_filters: PmccFilterState::default(),
            sort: SortSpec::default(),
            results: Vec::new(),
            last_scan: None,
            issued: 0,
        }
    }

    // ========================================================================
    // State Access
    // ========================================================================

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Mutable access for field-level edits; the store itself validates
    /// nothing.
    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn pmcc_filters_mut(&mut self) -> &mut PmccFilterState {
        &mut self.pmcc_filters
    }

    /// The current post-processed, sorted view.
    pub fn results(&self) -> &[Opportunity] {
        &self.results
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn last_scan(&self) -> Option<&ScanSummary> {
        self.last_scan.as_ref()
    }

    /// Reset the filter state to the documented scan defaults.
    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    fn next_seq(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply a covered-call response, unless a newer request was issued
    /// while this one was in flight.
    fn apply_scan(&mut self, seq: u64, resp: CoveredCallResponse) -> ScanOutcome {
        if seq != self.issued {
            debug!(seq, latest = self.issued, "Discarding stale scan response");
            return ScanOutcome::Superseded;
        }

        let total_received = resp.opportunities.len();
        let mut rows = postprocess::apply_client_filters(&self.filters, resp.opportunities);
        postprocess::sort_opportunities(&mut rows, self.sort);

        let summary = ScanSummary {
            total_received,
            kept: rows.len(),
            from_cache: resp.from_cache,
            market_closed: resp.market_closed,
            is_last_trading_day: resp.is_last_trading_day,
            completed_at: Utc::now(),
        };

        self.results = rows;
        self.last_scan = Some(summary.clone());

        info!(
            received = summary.total_received,
            kept = summary.kept,
            from_cache = summary.from_cache,
            "Scan applied"
        );
        ScanOutcome::Applied(summary)
    }

    /// Run a covered-call scan with the current filter state.
    ///
    /// On any error the previous result set is preserved and the error is
    /// returned once; the post-processor is never invoked on a failure.
    pub async fn scan(&mut self, bypass_cache: bool) -> Result<ScanOutcome> {
        let params = query::compile_checked(&self.filters, bypass_cache)?;
        let seq = self.next_seq();
        let resp = self.backend.covered_calls(&params).await?;
        Ok(self.apply_scan(seq, resp))
    }

    /// Run a PMCC scan with the session's PMCC filter state. PMCC results
    /// are returned as the backend ranks them; the covered-call result view
    /// is untouched.
    pub async fn scan_pmcc(&mut self) -> Result<PmccResponse> {
        let params = query::compile_pmcc_checked(&self.pmcc_filters)?;
        self.backend.pmcc(&params).await
    }

    // ========================================================================
    // Sorting & Export
    // ========================================================================

    /// Toggle the sort column and re-sort the current view in place, without
    /// refetching. Same field flips direction; a new field starts descending.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort = self.sort.toggle(field);
        postprocess::sort_opportunities(&mut self.results, self.sort);
    }

    /// Serialize the current view to CSV.
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.results)
    }

    /// Write the current view to a CSV file.
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<PathBuf> {
        export::write_csv(path, &self.results)
    }

    // ========================================================================
    // Presets
    // ========================================================================

    /// Save the current filter state under a name.
    pub async fn save_preset(&self, name: &str) -> Result<SavedFilterPreset> {
        self.presets.save(name, &self.filters).await
    }

    /// List saved presets in backend order.
    pub async fn list_presets(&self) -> Result<Vec<SavedFilterPreset>> {
        self.presets.list().await
    }

    /// Load a preset, replacing the entire filter state (not a merge).
    /// On failure the current state is unchanged.
    pub async fn load_preset(&mut self, id: &str) -> Result<()> {
        let loaded = self.presets.load(id).await?;
        self.filters = loaded;
        Ok(())
    }

    /// Delete a preset by id. Local state is untouched regardless of
    /// outcome.
    pub async fn delete_preset(&self, id: &str) -> Result<()> {
        self.presets.delete(id).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Moneyness;
    use crate::filters::query::QueryParams;
    use async_trait::async_trait;
    use cce_common::Error;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend that replays a scripted sequence of covered-call responses.
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<CoveredCallResponse>>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<CoveredCallResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl ScreenerBackend for ScriptedBackend {
        async fn covered_calls(&self, _params: &QueryParams) -> Result<CoveredCallResponse> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Network("script exhausted".into())))
        }

        async fn pmcc(&self, _params: &QueryParams) -> Result<PmccResponse> {
            Err(Error::Network("not scripted".into()))
        }
    }

    fn offline_presets() -> PresetStore {
        PresetStore::new("http://127.0.0.1:1", 1)
    }

    fn opp(symbol: &str, stock_price: f64, strike: f64, delta: f64, score: f64) -> Opportunity {
        Opportunity {
            symbol: symbol.to_string(),
            stock_price,
            strike,
            expiry: NaiveDate::from_ymd_opt(2025, 12, 19).unwrap(),
            dte: 30,
            premium: 1.0,
            roi_pct: 1.0,
            delta,
            iv: None,
            iv_rank: None,
            volume: 100,
            open_interest: 500,
            score,
            option_type: None,
        }
    }

    fn response(rows: Vec<Opportunity>) -> CoveredCallResponse {
        CoveredCallResponse {
            opportunities: rows,
            from_cache: false,
            market_closed: false,
            is_last_trading_day: false,
        }
    }

    #[tokio::test]
    async fn test_scan_filters_and_sorts() {
        let rows = vec![
            opp("LOW", 100.0, 100.0, 0.3, 10.0),
            opp("HIGH", 100.0, 100.0, 0.3, 90.0),
            opp("OTM", 100.0, 110.0, 0.3, 50.0),
        ];
        let backend = ScriptedBackend::new(vec![Ok(response(rows))]);
        let mut session = ScanSession::new(backend, offline_presets());
        session.filters_mut().options.moneyness = Moneyness::Atm;

        let outcome = session.scan(false).await.unwrap();
        match outcome {
            ScanOutcome::Applied(summary) => {
                assert_eq!(summary.total_received, 3);
                assert_eq!(summary.kept, 2);
            }
            ScanOutcome::Superseded => panic!("scan should apply"),
        }

        // Default sort: score descending
        let symbols: Vec<_> = session.results().iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(symbols, ["HIGH", "LOW"]);
    }

    #[tokio::test]
    async fn test_failed_scan_preserves_results() {
        let backend = ScriptedBackend::new(vec![
            Ok(response(vec![opp("KEEP", 100.0, 100.0, 0.3, 50.0)])),
            Err(Error::Network("connection failed".into())),
        ]);
        let mut session = ScanSession::new(backend, offline_presets());

        session.scan(false).await.unwrap();
        assert_eq!(session.results().len(), 1);

        let err = session.scan(false).await.unwrap_err();
        assert!(err.is_network());
        // Last-good view survives the failure
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].symbol, "KEEP");
        assert!(session.last_scan().is_some());
    }

    #[tokio::test]
    async fn test_invalid_filters_fail_before_request() {
        // Script is empty: reaching the backend would yield "script exhausted"
        let backend = ScriptedBackend::new(vec![]);
        let mut session = ScanSession::new(backend, offline_presets());
        session.filters_mut().greeks.min_delta = Some(0.9);
        session.filters_mut().greeks.max_delta = Some(0.1);

        let err = session.scan(false).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let backend = ScriptedBackend::new(vec![]);
        let mut session = ScanSession::new(backend, offline_presets());

        let first = session.next_seq();
        let second = session.next_seq();

        // The older in-flight response arrives after a newer one was issued
        let outcome = session.apply_scan(first, response(vec![opp("OLD", 1.0, 1.0, 0.3, 1.0)]));
        assert_eq!(outcome, ScanOutcome::Superseded);
        assert!(session.results().is_empty());

        let outcome = session.apply_scan(second, response(vec![opp("NEW", 1.0, 1.0, 0.3, 1.0)]));
        assert!(matches!(outcome, ScanOutcome::Applied(_)));
        assert_eq!(session.results()[0].symbol, "NEW");
    }

    #[tokio::test]
    async fn test_toggle_sort_resorts_without_refetch() {
        let rows = vec![
            opp("A", 100.0, 100.0, 0.3, 10.0),
            opp("B", 100.0, 100.0, 0.3, 90.0),
        ];
        let backend = ScriptedBackend::new(vec![Ok(response(rows))]);
        let mut session = ScanSession::new(backend, offline_presets());
        session.scan(false).await.unwrap();
        assert_eq!(session.results()[0].symbol, "B");

        // Same field: flips to ascending
        session.toggle_sort(SortField::Score);
        assert_eq!(session.results()[0].symbol, "A");
    }

    #[tokio::test]
    async fn test_export_uses_current_view() {
        let rows = vec![
            opp("A", 100.0, 100.0, 0.3, 10.0),
            opp("B", 100.0, 100.0, 0.3, 90.0),
        ];
        let backend = ScriptedBackend::new(vec![Ok(response(rows))]);
        let mut session = ScanSession::new(backend, offline_presets());
        session.scan(false).await.unwrap();

        let csv = session.export_csv();
        let first_row = csv.lines().nth(1).unwrap();
        assert!(first_row.starts_with("B,"));
    }

    #[tokio::test]
    async fn test_reset_filters() {
        let backend = ScriptedBackend::new(vec![]);
        let mut session = ScanSession::new(backend, offline_presets());
        session.filters_mut().stock.min_price = Some(999.0);
        session.reset_filters();
        assert_eq!(session.filters(), &FilterState::default_scan());
    }
}
