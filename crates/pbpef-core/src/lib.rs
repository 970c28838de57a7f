pub mod config;
pub mod errors;
pub mod ingest;
mod lenient;
pub mod lookup;
pub mod model;
pub mod storage;

pub use config::{BackfillConfig, TxScope};
pub use ingest::backfill::{backfill, BackfillReport};
pub use storage::Store;
