use super::identity;
use super::locator::{discover_summaries, sidecar, SidecarKind};
use super::{evidence, read_json, run_record, sensitivity, spans, LoadOutcome};
use crate::config::{BackfillConfig, TxScope};
use crate::model::RunSummary;
use crate::storage::Store;
use rusqlite::{Connection, Transaction};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub inserted: usize,
    pub skipped: usize,
    pub absent: usize,
}

impl KindCounts {
    fn record(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Inserted(_) => self.inserted += 1,
            LoadOutcome::Skipped => self.skipped += 1,
            LoadOutcome::Absent => self.absent += 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    pub trace_dir: PathBuf,
    pub tx_scope: TxScope,
    pub dry_run: bool,
    pub summaries_found: usize,
    pub runs: KindCounts,
    /// Counted per sidecar, not per span row.
    pub spans: KindCounts,
    pub span_rows: usize,
    pub sensitivity: KindCounts,
    pub evidence: KindCounts,
    pub committed: bool,
}

/// Discovers every summary under the configured root and loads each run.
///
/// With [`TxScope::Batch`] all writes share one transaction: any fatal error
/// rolls back the whole batch, including runs that loaded cleanly. With
/// [`TxScope::Run`] each summary commits on its own and the first failure
/// still aborts the batch, keeping the runs committed before it.
pub fn backfill(store: &Store, cfg: &BackfillConfig) -> anyhow::Result<BackfillReport> {
    let summaries = discover_summaries(cfg.trace_dir())?;
    tracing::info!(
        event = "backfill_start",
        trace_dir = %cfg.trace_dir().display(),
        summaries = summaries.len(),
        tx_scope = cfg.tx_scope.as_str(),
        dry_run = cfg.dry_run,
    );

    let mut report = BackfillReport {
        trace_dir: cfg.trace_dir().to_path_buf(),
        tx_scope: cfg.tx_scope,
        dry_run: cfg.dry_run,
        summaries_found: summaries.len(),
        ..Default::default()
    };

    let mut conn = store.lock()?;
    let result = match cfg.tx_scope {
        TxScope::Batch => run_batch(&mut conn, &summaries, cfg.dry_run, &mut report),
        TxScope::Run => run_per_summary(&mut conn, &summaries, cfg.dry_run, &mut report),
    };

    if let Err(e) = result {
        tracing::error!(event = "backfill_rolled_back", error = %format!("{:#}", e));
        return Err(e);
    }

    report.committed = !cfg.dry_run;
    tracing::info!(
        event = "backfill_complete",
        summaries = report.summaries_found,
        runs_inserted = report.runs.inserted,
        span_rows = report.span_rows,
        sensitivity_inserted = report.sensitivity.inserted,
        evidence_inserted = report.evidence.inserted,
        committed = report.committed,
    );
    Ok(report)
}

fn run_batch(
    conn: &mut Connection,
    summaries: &[PathBuf],
    dry_run: bool,
    report: &mut BackfillReport,
) -> anyhow::Result<()> {
    // Dropping `tx` on an error path rolls everything back.
    let tx = conn.transaction()?;
    for path in summaries {
        ingest_summary(&tx, path, report)?;
    }
    finish(tx, dry_run)
}

fn run_per_summary(
    conn: &mut Connection,
    summaries: &[PathBuf],
    dry_run: bool,
    report: &mut BackfillReport,
) -> anyhow::Result<()> {
    for path in summaries {
        let tx = conn.transaction()?;
        ingest_summary(&tx, path, report)?;
        finish(tx, dry_run)?;
    }
    Ok(())
}

fn finish(tx: Transaction<'_>, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        tx.rollback()?;
    } else {
        tx.commit()?;
    }
    Ok(())
}

/// Run record first: every sidecar row references it.
pub fn ingest_summary(
    conn: &Connection,
    summary_path: &Path,
    report: &mut BackfillReport,
) -> anyhow::Result<()> {
    let summary: RunSummary = read_json(summary_path)?;
    let declared = summary.declared_run_id();
    let id = identity::resolve(declared.as_deref(), summary_path);
    let run_id = id.run_id.as_str();

    report.runs.record(run_record::load(conn, &summary, &id)?);

    let span_outcome = spans::ingest(conn, run_id, &sidecar(summary_path, SidecarKind::Spans))?;
    if let LoadOutcome::Inserted(n) = span_outcome {
        report.span_rows += n;
    }
    report.spans.record(span_outcome);

    report.sensitivity.record(sensitivity::ingest(
        conn,
        run_id,
        &sidecar(summary_path, SidecarKind::Sensitivity),
    )?);

    report.evidence.record(evidence::ingest(
        conn,
        run_id,
        &sidecar(summary_path, SidecarKind::Bundle),
    )?);

    Ok(())
}
