mod common;

use pbpef_core::backfill;
use pbpef_core::model::SensitivityMode;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn partial_artifact_set_loads_what_exists() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();

    common::write_json(
        &root.join("run_x_y.summary.json"),
        &json!({"run_id": "run_x_y", "metrics": common::metrics(1.0, 2.0, 3.0, 4.0)}),
    );
    common::write_lines(
        &root.join("run_x_y.spans.jsonl"),
        &[json!({"operator": "plan", "t_start": 0.0, "t_end": 1.0})],
    );
    common::write_json(
        &root.join("run_x_y.sensitivity.json"),
        &json!({"oat": {"per_metric": {"alpha": {"mu": 0.1, "var": 0.01}}}}),
    );

    let store = common::store()?;
    let report = backfill(&store, &common::config(root))?;

    assert_eq!(common::counts(&store)?, [1, 1, 1, 4, 0]);
    assert_eq!(report.summaries_found, 1);
    assert_eq!(report.evidence.absent, 1);
    assert!(report.committed);

    let run = store.get_run("run_x_y")?.expect("run stored");
    assert_eq!((run.alpha, run.beta, run.gamma, run.delta), (1.0, 2.0, 3.0, 4.0));

    let view = store.get_sensitivity("run_x_y")?;
    let summary = view.summary.expect("sensitivity summary");
    assert_eq!(summary.mode, SensitivityMode::Measured);
    assert!(summary.has_measured && !summary.has_prior && !summary.has_posterior);
    assert_eq!(summary.probes, 0);

    assert_eq!(view.metrics.len(), 4);
    for m in &view.metrics {
        let populated = [
            m.prior_mu,
            m.prior_var,
            m.oat_mu,
            m.oat_var,
            m.posterior_mu,
            m.posterior_var,
        ];
        if m.metric == "alpha" {
            assert_eq!(populated, [None, None, Some(0.1), Some(0.01), None, None]);
        } else {
            assert!(populated.iter().all(Option::is_none), "{} should be empty", m.metric);
        }
    }

    assert!(store.get_evidence("run_x_y")?.is_none());
    Ok(())
}

#[test]
fn evidence_bundle_round_trips() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    common::write_json(
        &root.join("run_e_1.summary.json"),
        &json!({"metrics": common::metrics(0.1, 0.2, 0.3, 0.4)}),
    );
    common::write_json(
        &root.join("run_e_1.bundle.json"),
        &json!({
            "profile_id": "soc2",
            "environment": "prod",
            "gates": {"overall_pass": false, "failed": ["latency"]},
            "governance": {"reviewer": "ops"}
        }),
    );

    let store = common::store()?;
    backfill(&store, &common::config(root))?;

    let ev = store.get_evidence("run_e_1")?.expect("bundle stored");
    assert_eq!(ev.profile_id.as_deref(), Some("soc2"));
    assert_eq!(ev.environment.as_deref(), Some("prod"));
    assert_eq!(ev.overall_pass, Some(false));
    assert_eq!(ev.gates, Some(json!({"overall_pass": false, "failed": ["latency"]})));
    assert_eq!(ev.governance, Some(json!({"reviewer": "ops"})));
    assert_eq!(ev.metrics, None);
    assert_eq!(ev.artifacts, None);
    Ok(())
}

#[test]
fn null_directional_recommendation_is_stored_as_nulls() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    common::write_json(
        &root.join("run_n_1.summary.json"),
        &json!({"metrics": common::metrics(1.0, 1.0, 1.0, 1.0)}),
    );
    common::write_json(
        &root.join("run_n_1.sensitivity.json"),
        &json!({
            "prior": {}, "oat": {"probes": [1, 2, 3]}, "posterior": {},
            "summary": {"priority_metric": "beta", "directional_recommendation": null},
            "sequence": [["alpha", "beta"]]
        }),
    );

    let store = common::store()?;
    backfill(&store, &common::config(root))?;

    let summary = store
        .get_sensitivity("run_n_1")?
        .summary
        .expect("summary row");
    assert_eq!(summary.mode, SensitivityMode::Hybrid);
    assert_eq!(summary.priority_metric.as_deref(), Some("beta"));
    assert_eq!(summary.recommendation_family, None);
    assert_eq!(summary.recommendation_direction, None);
    assert_eq!(summary.expected_delta, None);
    assert_eq!(summary.probes, 3);
    assert!(summary.seq_orders);
    assert!(!summary.interact);
    Ok(())
}

#[test]
fn explicit_meta_mode_is_stored() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    common::write_json(
        &root.join("run_m_1.summary.json"),
        &json!({"metrics": common::metrics(1.0, 1.0, 1.0, 1.0)}),
    );
    common::write_json(
        &root.join("run_m_1.sensitivity.json"),
        &json!({"meta": {"mode": "prior", "budget_used": 7}, "oat": {}, "prior": {}, "posterior": {}}),
    );

    let store = common::store()?;
    backfill(&store, &common::config(root))?;

    let summary = store.get_sensitivity("run_m_1")?.summary.expect("summary");
    assert_eq!(summary.mode, SensitivityMode::Prior);
    assert_eq!(summary.budget_used, 7.0);
    Ok(())
}
