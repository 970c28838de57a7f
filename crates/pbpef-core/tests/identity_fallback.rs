mod common;

use chrono::{TimeZone, Utc};
use pbpef_core::backfill;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn run_id_and_created_at_come_from_the_file_name() -> anyhow::Result<()> {
    let dir = tempdir()?;
    common::write_json(
        &dir.path().join("nested/run_20240115-093000_abc.summary.json"),
        &json!({"metrics": common::metrics(1.0, 2.0, 3.0, 4.0)}),
    );

    let store = common::store()?;
    backfill(&store, &common::config(dir.path()))?;

    let run = store
        .get_run("run_20240115-093000_abc")?
        .expect("derived run id");
    assert_eq!(run.created_at, Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap());
    Ok(())
}

#[test]
fn embedded_run_id_keys_every_table() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    common::write_json(
        &root.join("run_20240201-000000_z.summary.json"),
        &json!({"run_id": "exp-42", "metrics": common::metrics(1.0, 2.0, 3.0, 4.0)}),
    );
    common::write_lines(
        &root.join("run_20240201-000000_z.spans.jsonl"),
        &[json!({"operator": "a", "t_start": 1})],
    );
    common::write_json(&root.join("run_20240201-000000_z.bundle.json"), &json!({}));

    let store = common::store()?;
    backfill(&store, &common::config(root))?;

    let run = store.get_run("exp-42")?.expect("declared id");
    assert_eq!(run.created_at, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    assert_eq!(store.list_spans("exp-42")?.len(), 1);
    assert!(store.get_evidence("exp-42")?.is_some());
    assert!(store.get_run("run_20240201-000000_z")?.is_none());
    Ok(())
}

#[test]
fn non_string_run_id_does_not_fail_the_batch() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    common::write_json(
        &root.join("run_20240115-093000_abc.summary.json"),
        &json!({"run_id": 42, "metrics": common::metrics(1.0, 2.0, 3.0, 4.0)}),
    );
    common::write_json(
        &root.join("run_20240116-093000_def.summary.json"),
        &json!({"run_id": {"id": "nested"}, "metrics": common::metrics(1.0, 2.0, 3.0, 4.0)}),
    );

    let store = common::store()?;
    let report = backfill(&store, &common::config(root))?;
    assert_eq!(report.runs.inserted, 2);

    let numeric = store.get_run("42")?.expect("numeric id rendered as text");
    assert_eq!(
        numeric.created_at,
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    );
    assert!(store.get_run("run_20240116-093000_def")?.is_some());
    Ok(())
}
