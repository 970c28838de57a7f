//! Artifact discovery and the per-artifact loaders.

pub mod backfill;
pub mod evidence;
pub mod identity;
pub mod locator;
pub mod run_record;
pub mod sensitivity;
pub mod spans;

use crate::errors::codes;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

/// What a single loader did for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows written (for spans, the number of span rows).
    Inserted(usize),
    /// Data for this run already present; nothing written.
    Skipped,
    /// The optional sidecar does not exist.
    Absent,
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("{}: failed to read {}", codes::ARTIFACT_READ, path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{}: failed to parse {}", codes::ARTIFACT_PARSE, path.display()))
}
