//! Sensitivity sidecars: mode inference, the summary row and the per-metric rows.
//!
//! The artifact is read as an untyped document. Sections `prior`, `oat`,
//! `posterior`, `interactions`, `sequence`, `summary` and `meta` are all
//! optional, and any missing level below them resolves to null.

use super::{read_json, LoadOutcome};
use crate::lookup::{f64_at, has_key, len_at, lookup, lookup_truthy, str_at};
use crate::model::{SensitivityMode, TRACKED_METRICS};
use crate::storage::rows::{SensitivityMetricRow, SensitivityRunRow};
use crate::storage::Store;
use rusqlite::Connection;
use serde_json::Value;
use std::path::Path;

const PRIOR: &str = "prior";
const OAT: &str = "oat";
const POSTERIOR: &str = "posterior";

/// First match wins: a declared `meta.mode`, then all three phases (hybrid),
/// then `oat` (measured), then `prior`, else unknown.
pub fn infer_mode(doc: &Value) -> SensitivityMode {
    if let Some(declared) = lookup_truthy(doc, &["meta", "mode"]).and_then(Value::as_str) {
        return SensitivityMode::parse(declared);
    }
    let (prior, oat, posterior) = (
        has_key(doc, PRIOR),
        has_key(doc, OAT),
        has_key(doc, POSTERIOR),
    );
    if prior && oat && posterior {
        SensitivityMode::Hybrid
    } else if oat {
        SensitivityMode::Measured
    } else if prior {
        SensitivityMode::Prior
    } else {
        SensitivityMode::Unknown
    }
}

pub fn summary_row(run_id: &str, doc: &Value) -> SensitivityRunRow {
    const TOP: &str = "top_metric";
    const REC: &str = "directional_recommendation";
    SensitivityRunRow {
        run_id: run_id.to_string(),
        mode: infer_mode(doc),
        top_metric_name: str_at(doc, &["summary", TOP, "name"]),
        top_metric_mu: f64_at(doc, &["summary", TOP, "mu"]),
        priority_metric: str_at(doc, &["summary", "priority_metric"]),
        priority_reason: str_at(doc, &["summary", "priority_reason"]),
        recommendation_family: str_at(doc, &["summary", REC, "family"]),
        recommendation_direction: str_at(doc, &["summary", REC, "need"]),
        expected_delta: f64_at(doc, &["summary", REC, "expected_delta"]),
        budget_used: f64_at(doc, &["meta", "budget_used"]).unwrap_or(0.0),
        probes: len_at(doc, &[OAT, "probes"]) as i64,
        interact: lookup_truthy(doc, &["interactions"]).is_some(),
        seq_orders: lookup_truthy(doc, &["sequence"]).is_some(),
        has_prior: has_key(doc, PRIOR),
        has_measured: has_key(doc, OAT),
        has_posterior: has_key(doc, POSTERIOR),
    }
}

/// `(mu, var)` for one metric in one phase section.
fn mu_var(doc: &Value, phase: &str, metric: &str) -> (Option<f64>, Option<f64>) {
    match lookup(doc, &[phase, "per_metric", metric]) {
        Some(entry) => (f64_at(entry, &["mu"]), f64_at(entry, &["var"])),
        None => (None, None),
    }
}

/// One row per tracked metric, always four.
pub fn metric_rows(run_id: &str, doc: &Value) -> Vec<SensitivityMetricRow> {
    TRACKED_METRICS
        .iter()
        .map(|metric| {
            let (prior_mu, prior_var) = mu_var(doc, PRIOR, metric);
            let (oat_mu, oat_var) = mu_var(doc, OAT, metric);
            let (posterior_mu, posterior_var) = mu_var(doc, POSTERIOR, metric);
            SensitivityMetricRow {
                run_id: run_id.to_string(),
                metric: metric.to_string(),
                prior_mu,
                prior_var,
                oat_mu,
                oat_var,
                posterior_mu,
                posterior_var,
            }
        })
        .collect()
}

pub fn ingest(conn: &Connection, run_id: &str, path: &Path) -> anyhow::Result<LoadOutcome> {
    if !path.is_file() {
        return Ok(LoadOutcome::Absent);
    }
    if Store::sensitivity_exists(conn, run_id)? {
        tracing::info!(event = "sensitivity_skipped", run_id = %run_id, reason = "exists");
        return Ok(LoadOutcome::Skipped);
    }

    let doc: Value = read_json(path)?;
    let summary = summary_row(run_id, &doc);
    let metrics = metric_rows(run_id, &doc);
    Store::insert_sensitivity(conn, &summary, &metrics)?;

    tracing::info!(
        event = "sensitivity_inserted",
        run_id = %run_id,
        mode = summary.mode.as_str(),
        probes = summary.probes,
    );
    Ok(LoadOutcome::Inserted(1 + metrics.len()))
}
