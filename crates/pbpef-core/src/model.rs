//! On-disk artifact shapes. Only the fields the loaders resolve are typed;
//! everything nested is kept as an opaque `serde_json::Value`.

use crate::errors::codes;
use crate::lenient;
use crate::lookup::is_truthy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four scoring components tracked per run and per sensitivity analysis.
pub const TRACKED_METRICS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSummary {
    /// Whatever the producer wrote; see [`RunSummary::declared_run_id`].
    #[serde(default)]
    pub run_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub task_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub user_tier: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub policy_profile: Option<String>,
    #[serde(default)]
    pub metrics: Option<SummaryMetrics>,
    #[serde(default, deserialize_with = "lenient::any")]
    pub policy_gates: Option<PolicyGates>,
    #[serde(default)]
    pub cost: Option<Value>,
    #[serde(default)]
    pub latency: Option<Value>,
    #[serde(default)]
    pub safety: Option<Value>,
    #[serde(default)]
    pub true_cost: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryMetrics {
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default, deserialize_with = "lenient::any")]
    pub total_energy: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyGates {
    #[serde(default, deserialize_with = "lenient::any")]
    pub policy_pass: Option<bool>,
    #[serde(default)]
    pub failed_gates: Option<Value>,
}

/// The mandatory score components of a summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
}

impl RunSummary {
    /// Embedded run id. Non-empty strings are used as-is and non-zero numbers
    /// are rendered as text; anything else defers to the file name.
    pub fn declared_run_id(&self) -> Option<String> {
        match self.run_id.as_ref().filter(|v| is_truthy(v))? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn scores(&self) -> anyhow::Result<Scores> {
        let Some(m) = self.metrics.as_ref() else {
            anyhow::bail!("{}: summary has no 'metrics' section", codes::SUMMARY_METRIC_MISSING);
        };
        let need = |name: &str, v: Option<f64>| {
            v.ok_or_else(|| {
                anyhow::anyhow!(
                    "{}: summary is missing metrics.{}",
                    codes::SUMMARY_METRIC_MISSING,
                    name
                )
            })
        };
        Ok(Scores {
            alpha: need("alpha", m.alpha)?,
            beta: need("beta", m.beta)?,
            gamma: need("gamma", m.gamma)?,
            delta: need("delta", m.delta)?,
        })
    }

    pub fn total_energy(&self) -> Option<f64> {
        self.metrics.as_ref().and_then(|m| m.total_energy)
    }
}

/// One line of a `.spans.jsonl` sidecar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpanRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub operator: Option<String>,
    #[serde(default, deserialize_with = "lenient::instant")]
    pub t_start: Option<f64>,
    #[serde(default, deserialize_with = "lenient::instant")]
    pub t_end: Option<f64>,
    #[serde(default)]
    pub energy_before: Option<Value>,
    #[serde(default)]
    pub energy_after: Option<Value>,
    #[serde(default)]
    pub delta_e: Option<Value>,
    #[serde(default)]
    pub state_before: Option<Value>,
    #[serde(default)]
    pub state_after: Option<Value>,
    #[serde(default)]
    pub state_diff_keys: Option<Value>,
    #[serde(default)]
    pub metrics: Option<Value>,
    #[serde(default)]
    pub warnings: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub attempt_index: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvidenceArtifact {
    #[serde(default, deserialize_with = "lenient::text")]
    pub profile_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub environment: Option<String>,
    #[serde(default)]
    pub gates: Option<Value>,
    #[serde(default)]
    pub metrics: Option<Value>,
    #[serde(default)]
    pub artifacts: Option<Value>,
    #[serde(default)]
    pub governance: Option<Value>,
    #[serde(default)]
    pub content_credentials: Option<Value>,
}

/// Which analysis phases fed a sensitivity artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SensitivityMode {
    Prior,
    Measured,
    Hybrid,
    Unknown,
    /// A mode the artifact declared that is none of the known ones.
    Declared(String),
}

impl SensitivityMode {
    pub fn parse(s: &str) -> Self {
        match s {
            "prior" => SensitivityMode::Prior,
            "measured" => SensitivityMode::Measured,
            "hybrid" => SensitivityMode::Hybrid,
            "unknown" => SensitivityMode::Unknown,
            other => SensitivityMode::Declared(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SensitivityMode::Prior => "prior",
            SensitivityMode::Measured => "measured",
            SensitivityMode::Hybrid => "hybrid",
            SensitivityMode::Unknown => "unknown",
            SensitivityMode::Declared(s) => s,
        }
    }
}

impl From<SensitivityMode> for String {
    fn from(m: SensitivityMode) -> Self {
        m.as_str().to_string()
    }
}

impl From<String> for SensitivityMode {
    fn from(s: String) -> Self {
        SensitivityMode::parse(&s)
    }
}
