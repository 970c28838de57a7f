use crate::errors::ConfigError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_TRACE_DIR: &str = "TRACE_DIR";
pub const ENV_TX_SCOPE: &str = "PBPEF_TX_SCOPE";

/// Artifact root used when `TRACE_DIR` is not set, relative to the working directory.
pub const DEFAULT_TRACE_SUBDIR: &str = "traces";

/// How far a single store transaction reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxScope {
    /// One transaction for every run in the batch, committed once at the end.
    #[default]
    Batch,
    /// One transaction per summary artifact.
    Run,
}

impl TxScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxScope::Batch => "batch",
            TxScope::Run => "run",
        }
    }
}

impl FromStr for TxScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(TxScope::Batch),
            "run" | "per-run" | "per_run" => Ok(TxScope::Run),
            other => Err(ConfigError(format!(
                "unknown transaction scope '{}' (expected: batch, run)",
                other
            ))),
        }
    }
}

/// Where the relational store lives, resolved from the connection address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    /// Accepts `sqlite://<path>`, `sqlite:<path>`, `file:<path>`, a bare path, or `:memory:`.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);

        if rest.contains("://") {
            return Err(ConfigError(format!(
                "unsupported store address '{}': only sqlite locations are supported",
                url
            )));
        }
        if rest.is_empty() {
            return Err(ConfigError(format!("store address '{}' has no path", url)));
        }
        if rest == ":memory:" {
            return Ok(StoreLocation::Memory);
        }
        Ok(StoreLocation::File(PathBuf::from(rest)))
    }
}

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub database_url: String,
    pub trace_dir: PathBuf,
    pub tx_scope: TxScope,
    /// Parse and probe everything, then roll back instead of committing.
    pub dry_run: bool,
}

impl BackfillConfig {
    pub fn new(
        database_url: Option<String>,
        trace_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        // Reject unusable addresses here so nothing is discovered first.
        store_location_from(database_url.as_deref())?;
        let database_url = database_url.unwrap_or_default().trim().to_string();

        let trace_dir = match trace_dir.filter(|p| !p.as_os_str().is_empty()) {
            Some(p) => p,
            None => default_trace_dir()?,
        };

        Ok(Self {
            database_url,
            trace_dir,
            tx_scope: TxScope::default(),
            dry_run: false,
        })
    }

    pub fn with_tx_scope(mut self, scope: TxScope) -> Self {
        self.tx_scope = scope;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store_location(&self) -> Result<StoreLocation, ConfigError> {
        StoreLocation::parse(&self.database_url)
    }

    pub fn trace_dir(&self) -> &Path {
        &self.trace_dir
    }
}

/// Validates a store address as given on the command line or in `DATABASE_URL`.
/// Missing and blank values are both configuration errors.
pub fn store_location_from(url: Option<&str>) -> Result<StoreLocation, ConfigError> {
    let url = url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError(format!("{} not set", ENV_DATABASE_URL)))?;
    StoreLocation::parse(url)
}

fn default_trace_dir() -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir()
        .map_err(|e| ConfigError(format!("cannot resolve working directory: {}", e)))?;
    Ok(cwd.join(DEFAULT_TRACE_SUBDIR))
}
