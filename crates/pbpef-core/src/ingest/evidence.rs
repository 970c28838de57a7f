use super::{read_json, LoadOutcome};
use crate::lookup::bool_at;
use crate::model::EvidenceArtifact;
use crate::storage::rows::EvidenceRow;
use crate::storage::Store;
use rusqlite::Connection;
use std::path::Path;

pub fn to_row(run_id: &str, bundle: EvidenceArtifact) -> EvidenceRow {
    let overall_pass = bundle
        .gates
        .as_ref()
        .and_then(|g| bool_at(g, &["overall_pass"]));
    EvidenceRow {
        run_id: run_id.to_string(),
        profile_id: bundle.profile_id,
        environment: bundle.environment,
        overall_pass,
        gates: bundle.gates,
        metrics: bundle.metrics,
        artifacts: bundle.artifacts,
        governance: bundle.governance,
        content_credentials: bundle.content_credentials,
    }
}

pub fn ingest(conn: &Connection, run_id: &str, path: &Path) -> anyhow::Result<LoadOutcome> {
    if !path.is_file() {
        return Ok(LoadOutcome::Absent);
    }
    if Store::evidence_exists(conn, run_id)? {
        tracing::info!(event = "evidence_skipped", run_id = %run_id, reason = "exists");
        return Ok(LoadOutcome::Skipped);
    }

    let bundle: EvidenceArtifact = read_json(path)?;
    let row = to_row(run_id, bundle);
    Store::insert_evidence(conn, &row)?;
    tracing::info!(
        event = "evidence_inserted",
        run_id = %run_id,
        overall_pass = ?row.overall_pass,
    );
    Ok(LoadOutcome::Inserted(1))
}
