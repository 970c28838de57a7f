#![allow(dead_code)]

use pbpef_core::{BackfillConfig, Store};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub fn store() -> anyhow::Result<Store> {
    let store = Store::memory()?;
    store.init_schema()?;
    Ok(store)
}

pub fn config(trace_dir: &Path) -> BackfillConfig {
    BackfillConfig::new(Some(":memory:".into()), Some(trace_dir.to_path_buf()))
        .expect("valid test config")
}

pub fn write_json(path: &Path, v: &Value) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, serde_json::to_string_pretty(v).expect("serialize fixture"))
        .expect("write fixture");
    path.to_path_buf()
}

pub fn write_lines(path: &Path, lines: &[Value]) -> PathBuf {
    let body: String = lines
        .iter()
        .map(|l| format!("{}\n", l))
        .collect();
    fs::write(path, body).expect("write fixture");
    path.to_path_buf()
}

pub fn counts(store: &Store) -> anyhow::Result<[i64; 5]> {
    Ok([
        store.count_rows("runs")?,
        store.count_rows("spans")?,
        store.count_rows("sensitivity_runs")?,
        store.count_rows("sensitivity_metrics")?,
        store.count_rows("evidence_bundles")?,
    ])
}

pub fn metrics(alpha: f64, beta: f64, gamma: f64, delta: f64) -> Value {
    serde_json::json!({"alpha": alpha, "beta": beta, "gamma": gamma, "delta": delta})
}
