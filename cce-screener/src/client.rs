//! HTTP client for the Covered Call Engine backend.
//!
//! One request, one response: timeouts are delegated to the underlying
//! client and a failed request is reported once, never retried. The
//! [`ScreenerBackend`] trait is the seam the scan session works against, so
//! tests can substitute a scripted backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use cce_common::config::Config;
use cce_common::{Error, Result};

use crate::filters::query::QueryParams;
use crate::model::{CoveredCallResponse, PmccResponse};

/// Covered-call screen endpoint
const COVERED_CALLS_ENDPOINT: &str = "/screener/covered-calls";

/// PMCC screen endpoint
const PMCC_ENDPOINT: &str = "/screener/pmcc";

// ============================================================================
// Error Mapping
// ============================================================================

/// Map a transport failure onto the pipeline taxonomy, keeping the
/// timeout/connect distinction visible in the message.
pub(crate) fn map_transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Network("request timed out".into())
    } else if e.is_connect() {
        Error::Network("connection failed".into())
    } else {
        Error::Network(e.to_string())
    }
}

/// Map a non-success status onto the taxonomy, consuming the body as the
/// message.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        400 => Error::Validation(message),
        404 => Error::NotFound(message),
        409 => Error::Conflict(message),
        s => Error::Backend { status: s, message },
    })
}

// ============================================================================
// Backend Trait
// ============================================================================

/// The screening endpoints the scan session depends on.
#[async_trait]
pub trait ScreenerBackend: Send + Sync {
    /// Run the covered-call screen with the compiled parameters.
    async fn covered_calls(&self, params: &QueryParams) -> Result<CoveredCallResponse>;

    /// Run the PMCC screen with the compiled parameters.
    async fn pmcc(&self, params: &QueryParams) -> Result<PmccResponse>;
}

// ============================================================================
// Screener Client
// ============================================================================

/// Reqwest-backed client for the screener endpoints.
pub struct ScreenerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScreenerClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api.base_url, config.api.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &QueryParams) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, query = %params.to_query_string(), "Screener request");

        let resp = self
            .http
            .get(&url)
            .query(&params.pairs())
            .send()
            .await
            .map_err(map_transport_error)?;

        let resp = check_status(resp).await?;
        let status = resp.status().as_u16();
        resp.json().await.map_err(|e| Error::Backend {
            status,
            message: format!("invalid response body: {}", e),
        })
    }
}

#[async_trait]
impl ScreenerBackend for ScreenerClient {
    async fn covered_calls(&self, params: &QueryParams) -> Result<CoveredCallResponse> {
        self.get_json(COVERED_CALLS_ENDPOINT, params).await
    }

    async fn pmcc(&self, params: &QueryParams) -> Result<PmccResponse> {
        self.get_json(PMCC_ENDPOINT, params).await
    }
}

// ============================================================================
// Tests
// ============================================================================
