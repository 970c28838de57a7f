use clap::{Parser, Subcommand, ValueEnum};
use pbpef_core::config::{ENV_DATABASE_URL, ENV_TRACE_DIR, ENV_TX_SCOPE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pbpef",
    version,
    about = "Backfill run telemetry artifacts (summaries, spans, sensitivity, evidence) into the PBPEF store"
)]
pub struct Cli {
    /// log output: json | text
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json, env = "PBPEF_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load every run found under the trace directory (idempotent)
    Backfill(BackfillArgs),
    /// List stored runs, most recent first
    Runs(RunsArgs),
    /// Print one stored run with its spans, sensitivity and evidence
    Show(ShowArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// Store address: sqlite://<path>, sqlite:<path>, a bare path, or :memory:
    #[arg(long, env = ENV_DATABASE_URL, hide_env_values = true)]
    pub database_url: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct BackfillArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Artifact root (default: ./traces)
    #[arg(long, env = ENV_TRACE_DIR)]
    pub trace_dir: Option<PathBuf>,

    /// transaction scope: batch | run
    #[arg(long, env = ENV_TX_SCOPE, default_value = "batch")]
    pub tx_scope: String,

    /// parse and probe everything, then roll back
    #[arg(long)]
    pub dry_run: bool,

    /// report format: text | json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunsArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long, default_value_t = 50)]
    pub limit: u32,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    pub run_id: String,

    /// run | trace | sensitivity | evidence | all
    #[arg(long, default_value = "all")]
    pub part: String,
}
