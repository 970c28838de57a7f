pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
  run_id TEXT PRIMARY KEY,
  created_at TEXT NOT NULL,
  task_type TEXT,
  domain TEXT,
  user_tier TEXT,
  policy_profile TEXT,
  alpha REAL NOT NULL,
  beta REAL NOT NULL,
  gamma REAL NOT NULL,
  delta REAL NOT NULL,
  total_energy REAL,
  policy_pass INTEGER,
  failed_gates TEXT,
  cost TEXT,
  latency TEXT,
  safety TEXT,
  true_cost TEXT
);

CREATE TABLE IF NOT EXISTS spans (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id TEXT NOT NULL REFERENCES runs(run_id),
  operator TEXT,
  t_start REAL,
  t_end REAL,
  energy_before TEXT,
  energy_after TEXT,
  delta_e TEXT,
  state_before TEXT,
  state_after TEXT,
  state_diff_keys TEXT,
  metrics TEXT,
  warnings TEXT,
  tags TEXT,
  attempt_index INTEGER
);

CREATE TABLE IF NOT EXISTS sensitivity_runs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id TEXT NOT NULL REFERENCES runs(run_id),
  mode TEXT NOT NULL,
  top_metric_name TEXT,
  top_metric_mu REAL,
  priority_metric TEXT,
  priority_reason TEXT,
  recommendation_family TEXT,
  recommendation_direction TEXT,
  expected_delta REAL,
  budget_used REAL NOT NULL DEFAULT 0,
  probes INTEGER NOT NULL DEFAULT 0,
  interact INTEGER NOT NULL DEFAULT 0,
  seq_orders INTEGER NOT NULL DEFAULT 0,
  has_prior INTEGER NOT NULL DEFAULT 0,
  has_measured INTEGER NOT NULL DEFAULT 0,
  has_posterior INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS sensitivity_metrics (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id TEXT NOT NULL REFERENCES runs(run_id),
  metric TEXT NOT NULL,
  prior_mu REAL,
  prior_var REAL,
  oat_mu REAL,
  oat_var REAL,
  posterior_mu REAL,
  posterior_var REAL
);

CREATE TABLE IF NOT EXISTS evidence_bundles (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id TEXT NOT NULL REFERENCES runs(run_id),
  profile_id TEXT,
  environment TEXT,
  overall_pass INTEGER,
  gates TEXT,
  metrics TEXT,
  artifacts TEXT,
  governance TEXT,
  content_credentials TEXT
);

CREATE INDEX IF NOT EXISTS idx_runs_created_at ON runs(created_at);
CREATE INDEX IF NOT EXISTS idx_spans_run_order ON spans(run_id, t_start, id);
CREATE INDEX IF NOT EXISTS idx_sensitivity_runs_run ON sensitivity_runs(run_id);
CREATE INDEX IF NOT EXISTS idx_sensitivity_metrics_run ON sensitivity_metrics(run_id);
CREATE INDEX IF NOT EXISTS idx_evidence_bundles_run ON evidence_bundles(run_id);
"#;

/// Tables the backfill writes, in foreign-key order.
pub const TABLES: [&str; 5] = [
    "runs",
    "spans",
    "sensitivity_runs",
    "sensitivity_metrics",
    "evidence_bundles",
];
