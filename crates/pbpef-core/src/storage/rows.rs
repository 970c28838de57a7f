use crate::model::SensitivityMode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRow {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub task_type: Option<String>,
    pub domain: Option<String>,
    pub user_tier: Option<String>,
    pub policy_profile: Option<String>,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
    pub total_energy: Option<f64>,
    pub policy_pass: Option<bool>,
    pub failed_gates: Option<Value>,
    pub cost: Option<Value>,
    pub latency: Option<Value>,
    pub safety: Option<Value>,
    pub true_cost: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanRow {
    /// Store-assigned; `None` until inserted. Breaks `t_start` ties.
    pub id: Option<i64>,
    pub run_id: String,
    pub operator: Option<String>,
    pub t_start: Option<f64>,
    pub t_end: Option<f64>,
    pub energy_before: Option<Value>,
    pub energy_after: Option<Value>,
    pub delta_e: Option<Value>,
    pub state_before: Option<Value>,
    pub state_after: Option<Value>,
    pub state_diff_keys: Option<Value>,
    pub metrics: Option<Value>,
    pub warnings: Option<Value>,
    pub tags: Option<Value>,
    pub attempt_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRunRow {
    pub run_id: String,
    pub mode: SensitivityMode,
    pub top_metric_name: Option<String>,
    pub top_metric_mu: Option<f64>,
    pub priority_metric: Option<String>,
    pub priority_reason: Option<String>,
    pub recommendation_family: Option<String>,
    pub recommendation_direction: Option<String>,
    pub expected_delta: Option<f64>,
    pub budget_used: f64,
    pub probes: i64,
    pub interact: bool,
    pub seq_orders: bool,
    pub has_prior: bool,
    pub has_measured: bool,
    pub has_posterior: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityMetricRow {
    pub run_id: String,
    pub metric: String,
    pub prior_mu: Option<f64>,
    pub prior_var: Option<f64>,
    pub oat_mu: Option<f64>,
    pub oat_var: Option<f64>,
    pub posterior_mu: Option<f64>,
    pub posterior_var: Option<f64>,
}

/// Read-side pairing of a sensitivity summary with its metric rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensitivityView {
    pub summary: Option<SensitivityRunRow>,
    pub metrics: Vec<SensitivityMetricRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceRow {
    pub run_id: String,
    pub profile_id: Option<String>,
    pub environment: Option<String>,
    pub overall_pass: Option<bool>,
    pub gates: Option<Value>,
    pub metrics: Option<Value>,
    pub artifacts: Option<Value>,
    pub governance: Option<Value>,
    pub content_credentials: Option<Value>,
}
