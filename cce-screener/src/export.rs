//! CSV export of the current result view.
//!
//! Export always operates on the post-processed, sorted view rather than
//! the raw backend response. Numeric values are written raw, without
//! currency symbols or rounding, so downstream tools keep full precision.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::Opportunity;
use crate::postprocess::prob_otm;

/// Fixed CSV header, one column per exported field.
pub const CSV_HEADER: &str =
    "Symbol,Stock Price,Strike,Expiry,DTE,Premium,ROI %,Delta,Prob OTM,IV,IV Rank,Volume,OI,Score";

fn opt_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Serialize the result view to CSV: the fixed header plus one row per
/// opportunity, in the order given. Absent optional values become empty
/// fields. Nothing here is quoted; symbols and numerics are comma-free.
pub fn to_csv(rows: &[Opportunity]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for opp in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            opp.symbol,
            opp.stock_price,
            opp.strike,
            opp.expiry.format("%Y-%m-%d"),
            opp.dte,
            opp.premium,
            opp.roi_pct,
            opp.delta,
            prob_otm(opp.delta),
            opt_field(opp.iv),
            opt_field(opp.iv_rank),
            opp.volume,
            opp.open_interest,
            opp.score,
        ));
    }

    out
}

/// Write the CSV to a file, creating parent directories as needed.
/// Returns the path written.
pub fn write_csv(path: &Path, rows: &[Opportunity]) -> Result<PathBuf> {
    let file_path = if path.extension().is_none() {
        path.with_extension("csv")
    } else {
        path.to_path_buf()
    };

    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create export directory")?;
    }

    std::fs::write(&file_path, to_csv(rows)).context("Failed to write CSV export")?;
    Ok(file_path)
}

// ============================================================================
// Tests
// ============================================================================
