use super::identity::RunIdentity;
use super::LoadOutcome;
use crate::model::RunSummary;
use crate::storage::rows::RunRow;
use crate::storage::Store;
use rusqlite::Connection;

/// Normalizes a parsed summary. Fails only when a mandatory score is missing.
pub fn to_row(summary: &RunSummary, identity: &RunIdentity) -> anyhow::Result<RunRow> {
    let scores = summary.scores()?;
    let gates = summary.policy_gates.as_ref();
    Ok(RunRow {
        run_id: identity.run_id.clone(),
        created_at: identity.created_at,
        task_type: summary.task_type.clone(),
        domain: summary.domain.clone(),
        user_tier: summary.user_tier.clone(),
        policy_profile: summary.policy_profile.clone(),
        alpha: scores.alpha,
        beta: scores.beta,
        gamma: scores.gamma,
        delta: scores.delta,
        total_energy: summary.total_energy(),
        policy_pass: gates.and_then(|g| g.policy_pass),
        failed_gates: gates.and_then(|g| g.failed_gates.clone()),
        cost: summary.cost.clone(),
        latency: summary.latency.clone(),
        safety: summary.safety.clone(),
        true_cost: summary.true_cost.clone(),
    })
}

/// Inserts the run iff no row with its id exists. An existing run is never updated.
pub fn load(
    conn: &Connection,
    summary: &RunSummary,
    identity: &RunIdentity,
) -> anyhow::Result<LoadOutcome> {
    if Store::run_exists(conn, &identity.run_id)? {
        tracing::info!(event = "run_skipped", run_id = %identity.run_id, reason = "exists");
        return Ok(LoadOutcome::Skipped);
    }

    let row = to_row(summary, identity)?;
    Store::insert_run(conn, &row)?;
    tracing::info!(
        event = "run_inserted",
        run_id = %row.run_id,
        created_at = %row.created_at,
    );
    Ok(LoadOutcome::Inserted(1))
}
