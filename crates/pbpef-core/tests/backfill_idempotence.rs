mod common;

use pbpef_core::config::StoreLocation;
use pbpef_core::{backfill, Store};
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

fn full_artifact_set(root: &Path) {
    for (i, stem) in ["run_20240101-000000_a", "run_20240102-000000_b"]
        .iter()
        .enumerate()
    {
        let dir = root.join(format!("batch{}", i));
        common::write_json(
            &dir.join(format!("{stem}.summary.json")),
            &json!({
                "task_type": "qa",
                "metrics": common::metrics(1.0, 2.0, 3.0, 4.0),
                "policy_gates": {"policy_pass": true, "failed_gates": []},
                "cost": {"usd": 0.5}
            }),
        );
        common::write_lines(
            &dir.join(format!("{stem}.spans.jsonl")),
            &[
                json!({"operator": "retrieve", "t_start": 0.0, "t_end": 0.4}),
                json!({"operator": "answer", "t_start": 0.4, "t_end": 1.2, "attempt_index": 0}),
            ],
        );
        common::write_json(
            &dir.join(format!("{stem}.sensitivity.json")),
            &json!({"prior": {"per_metric": {"beta": {"mu": 0.2, "var": 0.1}}}}),
        );
        common::write_json(
            &dir.join(format!("{stem}.bundle.json")),
            &json!({"profile_id": "default", "gates": {"overall_pass": true}}),
        );
    }
}

#[test]
fn second_pass_writes_nothing() -> anyhow::Result<()> {
    let dir = tempdir()?;
    full_artifact_set(dir.path());
    let store = common::store()?;
    let cfg = common::config(dir.path());

    let first = backfill(&store, &cfg)?;
    let after_first = common::counts(&store)?;
    assert_eq!(after_first, [2, 4, 2, 8, 2]);
    assert_eq!(first.runs.inserted, 2);
    assert_eq!(first.span_rows, 4);

    let second = backfill(&store, &cfg)?;
    assert_eq!(common::counts(&store)?, after_first);
    assert_eq!(second.runs.skipped, 2);
    assert_eq!(second.spans.skipped, 2);
    assert_eq!(second.sensitivity.skipped, 2);
    assert_eq!(second.evidence.skipped, 2);
    assert_eq!(second.runs.inserted + second.spans.inserted, 0);
    Ok(())
}

#[test]
fn idempotent_across_reopened_file_store() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let traces = dir.path().join("traces");
    full_artifact_set(&traces);
    let db = dir.path().join("db/pbpef.db");
    let cfg = common::config(&traces);

    for _ in 0..2 {
        let store = Store::connect(&StoreLocation::File(db.clone()))?;
        store.init_schema()?;
        backfill(&store, &cfg)?;
    }

    let store = Store::open(&db)?;
    assert_eq!(common::counts(&store)?, [2, 4, 2, 8, 2]);

    let runs = store.list_runs(50, 0)?;
    let ids: Vec<_> = runs.iter().map(|r| r.run_id.as_str()).collect();
    assert_eq!(ids, vec!["run_20240102-000000_b", "run_20240101-000000_a"]);
    Ok(())
}
