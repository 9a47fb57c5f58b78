//! CCE Screener - client-side screening pipeline for the Covered Call
//! Engine backend.
//!
//! The backend performs the actual options screening and scoring; this
//! crate owns everything on the client side of that contract:
//!
//! ```text
//! FilterState ──compile──▶ query params ──HTTP──▶ backend
//!                                                    │
//!      CSV export ◀── stable sort ◀── client-side ◀──┘
//!                          ▲          predicates
//!                     toggle_sort
//! ```
//!
//! # Pipeline Stages
//!
//! - [`filters`] — typed filter groups; unset bounds stay unset, never 0
//! - [`filters::query`] — pure compilation into the sparse parameter set
//! - [`client`] — one-shot REST calls, no retries
//! - [`postprocess`] — moneyness and prob-OTM predicates, stable sorting
//! - [`export`] — raw-value CSV of the current view
//! - [`format`] — total display formatters with `-` placeholders
//! - [`session`] — the explicit session object coordinating the stages

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod client;
pub mod export;
pub mod filters;
pub mod format;
pub mod model;
pub mod postprocess;
pub mod session;

pub use client::{ScreenerBackend, ScreenerClient};
pub use filters::preset::{PresetStore, SavedFilterPreset};
pub use filters::{FilterState, PmccFilterState};
pub use model::{CoveredCallResponse, Opportunity, PmccOpportunity, PmccResponse};
pub use postprocess::{SortDirection, SortField, SortSpec};
pub use session::{ScanOutcome, ScanSession, ScanSummary};
