use super::locator::SUMMARY_SUFFIX;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
}

/// Best-effort identity for a summary. Never fails.
///
/// `run_id` prefers the artifact's own value, then the file name minus the
/// summary suffix. `created_at` prefers a `run_<YYYYMMDD>-<HHMMSS>_` token in
/// the file name (UTC), then the file's modification time.
pub fn resolve(declared_run_id: Option<&str>, summary_path: &Path) -> RunIdentity {
    let name = summary_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let run_id = match declared_run_id.filter(|s| !s.is_empty()) {
        Some(id) => id.to_string(),
        None => name.strip_suffix(SUMMARY_SUFFIX).unwrap_or(&name).to_string(),
    };

    let created_at = timestamp_from_name(&name).unwrap_or_else(|| modified_at(summary_path));

    RunIdentity { run_id, created_at }
}

fn stamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"run_(\d{8}-\d{6})_").expect("static regex"))
}

/// The embedded date-time token, if present and a real calendar instant.
pub fn timestamp_from_name(name: &str) -> Option<DateTime<Utc>> {
    let token = stamp_re().captures(name)?.get(1)?.as_str();
    NaiveDateTime::parse_from_str(token, "%Y%m%d-%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn modified_at(path: &Path) -> DateTime<Utc> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t) => DateTime::<Utc>::from(t),
        Err(e) => {
            tracing::warn!(
                event = "mtime_unavailable",
                path = %path.display(),
                error = %e,
            );
            Utc::now()
        }
    }
}
