use crate::cli::args::LogFormat;
use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG: &str = "PBPEF_LOG";

pub fn level_from_env() -> String {
    std::env::var(ENV_LOG)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Structured events go to stderr so stdout stays clean for reports.
pub fn init_logging(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .compact()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}
