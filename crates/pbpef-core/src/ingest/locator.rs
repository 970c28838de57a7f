use anyhow::Context;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

pub const SUMMARY_SUFFIX: &str = ".summary.json";

/// Optional artifacts that sit next to a run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarKind {
    Spans,
    Sensitivity,
    Bundle,
}

impl SidecarKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            SidecarKind::Spans => ".spans.jsonl",
            SidecarKind::Sensitivity => ".sensitivity.json",
            SidecarKind::Bundle => ".bundle.json",
        }
    }
}

impl FromStr for SidecarKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spans" => Ok(SidecarKind::Spans),
            "sensitivity" => Ok(SidecarKind::Sensitivity),
            "bundle" | "evidence" => Ok(SidecarKind::Bundle),
            other => anyhow::bail!("unknown sidecar kind: {}", other),
        }
    }
}

fn summary_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // run_<token>_<token>.summary.json
    RE.get_or_init(|| Regex::new(r"^run_.*_.*\.summary\.json$").expect("static regex"))
}

pub fn is_summary_name(name: &str) -> bool {
    summary_name_re().is_match(name)
}

/// Recursively finds summary artifacts under `root`, sorted ascending by path.
///
/// A missing root yields nothing.
pub fn discover_summaries(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if !root.is_dir() {
        tracing::warn!(event = "trace_dir_missing", root = %root.display());
        return Ok(found);
    }
    walk(root, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&path, out)?;
        } else if entry.file_name().to_str().is_some_and(is_summary_name) && path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Candidate sidecar location: the summary suffix of the file name (never the
/// directory) swapped for the kind's suffix. Existence is the caller's concern.
pub fn sidecar(summary: &Path, kind: SidecarKind) -> PathBuf {
    let name = summary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(SUMMARY_SUFFIX).unwrap_or(&name);
    summary.with_file_name(format!("{}{}", stem, kind.suffix()))
}
