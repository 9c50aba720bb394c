//! Run result and artifact export — JSON and CSV generation.
//!
//! All persisted artifacts include a `schema_version` field. Unknown newer
//! versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::RunId;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub universe: Vec<String>,
    pub initial_cash: f64,
    pub final_nav: f64,
    /// `final_nav - initial_cash`.
    pub pnl: f64,
    pub sharpe: f64,
    pub nav_history: Vec<f64>,
    pub batch_count: usize,
    pub completed_at: String,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Serialize a `SimResult` to pretty JSON.
pub fn export_json(result: &SimResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize SimResult to JSON")
}

/// Deserialize a `SimResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SimResult> {
    let result: SimResult =
        serde_json::from_str(json).context("failed to deserialize SimResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Export the NAV history as CSV with columns `step,nav`.
///
/// Step 0 is the seed sample (initial cash), before any batch is applied.
pub fn export_nav_csv(result: &SimResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["step", "nav"])?;
    for (step, nav) in result.nav_history.iter().enumerate() {
        wtr.write_record([step.to_string(), nav.to_string()])?;
    }
    let bytes = wtr.into_inner().context("failed to flush NAV CSV writer")?;
    String::from_utf8(bytes).context("NAV CSV was not valid UTF-8")
}

/// Write `<run_id>.json` and `<run_id>_nav.csv` into `output_dir`.
///
/// Returns the path of the JSON artifact.
pub fn save_artifacts(result: &SimResult, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let json_path = output_dir.join(format!("{}.json", result.run_id));
    std::fs::write(&json_path, export_json(result)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    let csv_path = output_dir.join(format!("{}_nav.csv", result.run_id));
    std::fs::write(&csv_path, export_nav_csv(result)?)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;

    Ok(json_path)
}
