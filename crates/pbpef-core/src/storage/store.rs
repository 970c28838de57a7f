use crate::config::StoreLocation;
use crate::errors::codes;
use crate::model::SensitivityMode;
use crate::storage::rows::{
    EvidenceRow, RunRow, SensitivityMetricRow, SensitivityRunRow, SensitivityView, SpanRow,
};
use crate::storage::schema::TABLES;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite db {}", path.display()))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connect(location: &StoreLocation) -> anyhow::Result<Self> {
        match location {
            StoreLocation::Memory => Self::memory(),
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create store directory {}", parent.display())
                    })?;
                }
                Self::open(path)
            }
        }
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)
            .context("failed to apply schema")?;
        Ok(())
    }

    pub fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store connection mutex poisoned"))
    }

    // --- Idempotency gates ---
    //
    // These take a plain connection so they run inside whatever transaction the
    // caller holds. Check-then-insert assumes a single writer.

    pub fn run_exists(conn: &Connection, run_id: &str) -> anyhow::Result<bool> {
        probe(conn, "SELECT 1 FROM runs WHERE run_id = ?1 LIMIT 1", run_id)
    }

    pub fn spans_exist(conn: &Connection, run_id: &str) -> anyhow::Result<bool> {
        probe(conn, "SELECT 1 FROM spans WHERE run_id = ?1 LIMIT 1", run_id)
    }

    pub fn sensitivity_exists(conn: &Connection, run_id: &str) -> anyhow::Result<bool> {
        probe(
            conn,
            "SELECT 1 FROM sensitivity_runs WHERE run_id = ?1 LIMIT 1",
            run_id,
        )
    }

    pub fn evidence_exists(conn: &Connection, run_id: &str) -> anyhow::Result<bool> {
        probe(
            conn,
            "SELECT 1 FROM evidence_bundles WHERE run_id = ?1 LIMIT 1",
            run_id,
        )
    }

    // --- Inserts ---

    pub fn insert_run(conn: &Connection, row: &RunRow) -> anyhow::Result<()> {
        conn.execute(
            "INSERT INTO runs(run_id, created_at, task_type, domain, user_tier, policy_profile,
                              alpha, beta, gamma, delta, total_energy, policy_pass,
                              failed_gates, cost, latency, safety, true_cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                row.run_id,
                format_ts(&row.created_at),
                row.task_type,
                row.domain,
                row.user_tier,
                row.policy_profile,
                row.alpha,
                row.beta,
                row.gamma,
                row.delta,
                row.total_energy,
                row.policy_pass,
                json_col(&row.failed_gates)?,
                json_col(&row.cost)?,
                json_col(&row.latency)?,
                json_col(&row.safety)?,
                json_col(&row.true_cost)?,
            ],
        )
        .with_context(|| format!("{}: insert run {}", codes::STORE_WRITE, row.run_id))?;
        Ok(())
    }

    /// Inserts every span in order; returns the number written.
    pub fn insert_spans(conn: &Connection, rows: &[SpanRow]) -> anyhow::Result<usize> {
        let mut stmt = conn.prepare(
            "INSERT INTO spans(run_id, operator, t_start, t_end, energy_before, energy_after, delta_e,
                               state_before, state_after, state_diff_keys, metrics, warnings, tags,
                               attempt_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;

        for row in rows {
            stmt.execute(params![
                row.run_id,
                row.operator,
                row.t_start,
                row.t_end,
                json_col(&row.energy_before)?,
                json_col(&row.energy_after)?,
                json_col(&row.delta_e)?,
                json_col(&row.state_before)?,
                json_col(&row.state_after)?,
                json_col(&row.state_diff_keys)?,
                json_col(&row.metrics)?,
                json_col(&row.warnings)?,
                json_col(&row.tags)?,
                row.attempt_index,
            ])
            .with_context(|| format!("{}: insert span for {}", codes::STORE_WRITE, row.run_id))?;
        }
        Ok(rows.len())
    }

    pub fn insert_sensitivity(
        conn: &Connection,
        summary: &SensitivityRunRow,
        metrics: &[SensitivityMetricRow],
    ) -> anyhow::Result<()> {
        conn.execute(
            "INSERT INTO sensitivity_runs(
               run_id, mode, top_metric_name, top_metric_mu,
               priority_metric, priority_reason, recommendation_family, recommendation_direction,
               expected_delta, budget_used, probes, interact, seq_orders,
               has_prior, has_measured, has_posterior)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                summary.run_id,
                summary.mode.as_str(),
                summary.top_metric_name,
                summary.top_metric_mu,
                summary.priority_metric,
                summary.priority_reason,
                summary.recommendation_family,
                summary.recommendation_direction,
                summary.expected_delta,
                summary.budget_used,
                summary.probes,
                summary.interact,
                summary.seq_orders,
                summary.has_prior,
                summary.has_measured,
                summary.has_posterior,
            ],
        )
        .with_context(|| format!("{}: insert sensitivity summary for {}", codes::STORE_WRITE, summary.run_id))?;

        let mut stmt = conn.prepare(
            "INSERT INTO sensitivity_metrics(
               run_id, metric, prior_mu, prior_var, oat_mu, oat_var, posterior_mu, posterior_var)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for m in metrics {
            stmt.execute(params![
                m.run_id,
                m.metric,
                m.prior_mu,
                m.prior_var,
                m.oat_mu,
                m.oat_var,
                m.posterior_mu,
                m.posterior_var,
            ])
            .with_context(|| format!(
                    "{}: insert sensitivity metric {} for {}",
                    codes::STORE_WRITE,
                    m.metric,
                    m.run_id
                ))?;
        }
        Ok(())
    }

    pub fn insert_evidence(conn: &Connection, row: &EvidenceRow) -> anyhow::Result<()> {
        conn.execute(
            "INSERT INTO evidence_bundles(run_id, profile_id, environment, overall_pass,
                                          gates, metrics, artifacts, governance, content_credentials)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.run_id,
                row.profile_id,
                row.environment,
                row.overall_pass,
                json_col(&row.gates)?,
                json_col(&row.metrics)?,
                json_col(&row.artifacts)?,
                json_col(&row.governance)?,
                json_col(&row.content_credentials)?,
            ],
        )
        .with_context(|| format!("{}: insert evidence bundle for {}", codes::STORE_WRITE, row.run_id))?;
        Ok(())
    }

    // --- Read side ---

    pub fn get_run(&self, run_id: &str) -> anyhow::Result<Option<RunRow>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {RUN_COLUMNS} FROM runs WHERE run_id = ?1"),
                params![run_id],
                run_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Most recent first.
    pub fn list_runs(&self, limit: u32, offset: u32) -> anyhow::Result<Vec<RunRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RUN_COLUMNS} FROM runs
             ORDER BY created_at DESC, run_id ASC
             LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
            .query_map(params![limit, offset], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Spans by start time, missing start times last; ties keep insertion order.
    pub fn list_spans(&self, run_id: &str) -> anyhow::Result<Vec<SpanRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, run_id, operator, t_start, t_end, energy_before, energy_after, delta_e,
                    state_before, state_after, state_diff_keys, metrics, warnings, tags, attempt_index
             FROM spans
             WHERE run_id = ?1
             ORDER BY t_start IS NULL, t_start ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(SpanRow {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    operator: row.get(2)?,
                    t_start: row.get(3)?,
                    t_end: row.get(4)?,
                    energy_before: parse_json_col(row.get(5)?),
                    energy_after: parse_json_col(row.get(6)?),
                    delta_e: parse_json_col(row.get(7)?),
                    state_before: parse_json_col(row.get(8)?),
                    state_after: parse_json_col(row.get(9)?),
                    state_diff_keys: parse_json_col(row.get(10)?),
                    metrics: parse_json_col(row.get(11)?),
                    warnings: parse_json_col(row.get(12)?),
                    tags: parse_json_col(row.get(13)?),
                    attempt_index: row.get(14)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_sensitivity(&self, run_id: &str) -> anyhow::Result<SensitivityView> {
        let conn = self.lock()?;
        let summary = conn
            .query_row(
                "SELECT run_id, mode, top_metric_name, top_metric_mu, priority_metric, priority_reason,
                        recommendation_family, recommendation_direction, expected_delta, budget_used,
                        probes, interact, seq_orders, has_prior, has_measured, has_posterior
                 FROM sensitivity_runs
                 WHERE run_id = ?1
                 ORDER BY id ASC
                 LIMIT 1",
                params![run_id],
                |row| {
                    Ok(SensitivityRunRow {
                        run_id: row.get(0)?,
                        mode: SensitivityMode::parse(&row.get::<_, String>(1)?),
                        top_metric_name: row.get(2)?,
                        top_metric_mu: row.get(3)?,
                        priority_metric: row.get(4)?,
                        priority_reason: row.get(5)?,
                        recommendation_family: row.get(6)?,
                        recommendation_direction: row.get(7)?,
                        expected_delta: row.get(8)?,
                        budget_used: row.get(9)?,
                        probes: row.get(10)?,
                        interact: row.get(11)?,
                        seq_orders: row.get(12)?,
                        has_prior: row.get(13)?,
                        has_measured: row.get(14)?,
                        has_posterior: row.get(15)?,
                    })
                },
            )
            .optional()?;

        if summary.is_none() {
            return Ok(SensitivityView::default());
        }

        let mut stmt = conn.prepare(
            "SELECT run_id, metric, prior_mu, prior_var, oat_mu, oat_var, posterior_mu, posterior_var
             FROM sensitivity_metrics
             WHERE run_id = ?1
             ORDER BY id ASC",
        )?;
        let metrics = stmt
            .query_map(params![run_id], |row| {
                Ok(SensitivityMetricRow {
                    run_id: row.get(0)?,
                    metric: row.get(1)?,
                    prior_mu: row.get(2)?,
                    prior_var: row.get(3)?,
                    oat_mu: row.get(4)?,
                    oat_var: row.get(5)?,
                    posterior_mu: row.get(6)?,
                    posterior_var: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SensitivityView { summary, metrics })
    }

    pub fn get_evidence(&self, run_id: &str) -> anyhow::Result<Option<EvidenceRow>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT run_id, profile_id, environment, overall_pass, gates, metrics, artifacts,
                        governance, content_credentials
                 FROM evidence_bundles
                 WHERE run_id = ?1
                 ORDER BY id ASC
                 LIMIT 1",
                params![run_id],
                |row| {
                    Ok(EvidenceRow {
                        run_id: row.get(0)?,
                        profile_id: row.get(1)?,
                        environment: row.get(2)?,
                        overall_pass: row.get(3)?,
                        gates: parse_json_col(row.get(4)?),
                        metrics: parse_json_col(row.get(5)?),
                        artifacts: parse_json_col(row.get(6)?),
                        governance: parse_json_col(row.get(7)?),
                        content_credentials: parse_json_col(row.get(8)?),
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        // Table names cannot be bound; allowlist instead.
        if !TABLES.contains(&table) {
            anyhow::bail!("Invalid table name for count_rows: {}", table);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(n)
    }
}

const RUN_COLUMNS: &str = "run_id, created_at, task_type, domain, user_tier, policy_profile,
    alpha, beta, gamma, delta, total_energy, policy_pass,
    failed_gates, cost, latency, safety, true_cost";

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRow> {
    Ok(RunRow {
        run_id: row.get(0)?,
        created_at: parse_ts(1, &row.get::<_, String>(1)?)?,
        task_type: row.get(2)?,
        domain: row.get(3)?,
        user_tier: row.get(4)?,
        policy_profile: row.get(5)?,
        alpha: row.get(6)?,
        beta: row.get(7)?,
        gamma: row.get(8)?,
        delta: row.get(9)?,
        total_energy: row.get(10)?,
        policy_pass: row.get(11)?,
        failed_gates: parse_json_col(row.get(12)?),
        cost: parse_json_col(row.get(13)?),
        latency: parse_json_col(row.get(14)?),
        safety: parse_json_col(row.get(15)?),
        true_cost: parse_json_col(row.get(16)?),
    })
}

fn probe(conn: &Connection, sql: &str, run_id: &str) -> anyhow::Result<bool> {
    let hit = conn
        .query_row(sql, params![run_id], |_| Ok(()))
        .optional()
        .with_context(|| format!("existence probe for {}", run_id))?;
    Ok(hit.is_some())
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json_col(v: &Option<Value>) -> anyhow::Result<Option<String>> {
    v.as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context("serialize opaque column")
}

/// Opaque columns are written by [`json_col`]; anything else comes back as a plain string.
fn parse_json_col(s: Option<String>) -> Option<Value> {
    s.map(|s| match serde_json::from_str::<Value>(&s) {
        Ok(v) => v,
        Err(_) => Value::String(s),
    })
}
