use super::LoadOutcome;
use crate::errors::codes;
use crate::model::SpanRecord;
use crate::storage::rows::SpanRow;
use crate::storage::Store;
use anyhow::Context;
use rusqlite::Connection;
use std::io::BufRead;
use std::path::Path;

/// Parses a `.spans.jsonl` sidecar: one record per line, blank lines skipped.
pub fn read_spans(run_id: &str, path: &Path) -> anyhow::Result<Vec<SpanRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("{}: failed to open {}", codes::ARTIFACT_READ, path.display()))?;
    let reader = std::io::BufReader::new(file);

    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("{}: failed to read {}", codes::ARTIFACT_READ, path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let rec: SpanRecord = serde_json::from_str(line).with_context(|| {
            format!("{}: {} line {}", codes::SPAN_PARSE, path.display(), i + 1)
        })?;
        rows.push(to_row(run_id, rec));
    }
    Ok(rows)
}

fn to_row(run_id: &str, rec: SpanRecord) -> SpanRow {
    SpanRow {
        id: None,
        run_id: run_id.to_string(),
        operator: rec.operator,
        t_start: rec.t_start,
        t_end: rec.t_end,
        energy_before: rec.energy_before,
        energy_after: rec.energy_after,
        delta_e: rec.delta_e,
        state_before: rec.state_before,
        state_after: rec.state_after,
        state_diff_keys: rec.state_diff_keys,
        metrics: rec.metrics,
        warnings: rec.warnings,
        tags: rec.tags,
        attempt_index: rec.attempt_index,
    }
}

/// All-or-nothing per run: any existing span for `run_id` skips the whole sidecar,
/// so a partial earlier batch is never topped up.
pub fn ingest(conn: &Connection, run_id: &str, path: &Path) -> anyhow::Result<LoadOutcome> {
    if !path.is_file() {
        return Ok(LoadOutcome::Absent);
    }
    if Store::spans_exist(conn, run_id)? {
        tracing::info!(event = "spans_skipped", run_id = %run_id, reason = "exists");
        return Ok(LoadOutcome::Skipped);
    }

    let rows = read_spans(run_id, path)?;
    let n = Store::insert_spans(conn, &rows)?;
    tracing::info!(event = "spans_inserted", run_id = %run_id, count = n);
    Ok(LoadOutcome::Inserted(n))
}
