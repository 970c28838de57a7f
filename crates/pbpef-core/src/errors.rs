use std::fmt;

/// Raised before any artifact is touched when the process configuration is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Stable prefixes for fatal ingestion errors. Log scrapers key on these.
pub mod codes {
    pub const ARTIFACT_READ: &str = "E_ARTIFACT_READ";
    pub const ARTIFACT_PARSE: &str = "E_ARTIFACT_PARSE";
    pub const SUMMARY_METRIC_MISSING: &str = "E_SUMMARY_METRIC_MISSING";
    pub const SPAN_PARSE: &str = "E_SPAN_PARSE";
    pub const STORE_WRITE: &str = "E_STORE_WRITE";
}
