//! Saved filter presets.
//!
//! A preset is a named, immutable snapshot of the full [`FilterState`],
//! persisted server-side. The backend collection exposes list, create, and
//! delete; loading by id selects from the list. Name uniqueness is backend
//! policy: the client only rejects blank names (before any network call)
//! and surfaces a backend 409 as a conflict.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use cce_common::config::Config;
use cce_common::{Error, Result};

use crate::client::{check_status, map_transport_error};

use super::FilterState;

/// Preset collection endpoint
const FILTERS_ENDPOINT: &str = "/screener/filters";

// ============================================================================
// Preset Types
// ============================================================================

/// A persisted filter snapshot. Never mutated in place; loading replaces
/// the session's whole filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFilterPreset {
    /// Backend-assigned identifier
    pub id: String,
    /// User-chosen name, non-empty
    pub name: String,
    /// The snapshot itself
    pub filters: FilterState,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct SavePresetRequest<'a> {
    name: &'a str,
    filters: &'a FilterState,
}

// ============================================================================
// Preset Store
// ============================================================================

/// REST client for the preset collection.
pub struct PresetStore {
    http: reqwest::Client,
    base_url: String,
}

impl PresetStore {
    /// Create a store against the given base URL.
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

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, FILTERS_ENDPOINT)
    }

    /// Persist a named snapshot of the given filter state.
    ///
    /// A blank (empty or whitespace-only) name fails with a validation
    /// error without issuing a request.
    pub async fn save(&self, name: &str, filters: &FilterState) -> Result<SavedFilterPreset> {
        if name.trim().is_empty() {
            return Err(Error::Validation("preset name must not be blank".into()));
        }

        debug!(name = %name, "Saving filter preset");
        let resp = self
            .http
            .post(self.collection_url())
            .json(&SavePresetRequest { name, filters })
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

    /// List presets in backend-provided order; no client-side re-sort.
    pub async fn list(&self) -> Result<Vec<SavedFilterPreset>> {
        let resp = self
            .http
            .get(self.collection_url())
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

    /// Fetch the filter snapshot for one preset.
    ///
    /// The backend exposes no per-id GET, so this selects from the list and
    /// fails with `NotFound` when the id is absent.
    pub async fn load(&self, id: &str) -> Result<FilterState> {
        let presets = self.list().await?;
        presets
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.filters)
            .ok_or_else(|| Error::NotFound(format!("preset {} does not exist", id)))
    }

    /// Delete a preset by id. Deleting an unknown id surfaces `NotFound`;
    /// local state is never touched either way.
    pub async fn delete(&self, id: &str) -> Result<()> {
        debug!(id = %id, "Deleting filter preset");
        let resp = self
            .http
            .delete(format!("{}/{}", self.collection_url(), id))
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(resp).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
