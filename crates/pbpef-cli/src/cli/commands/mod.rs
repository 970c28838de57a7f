use super::args::*;
use pbpef_core::config::store_location_from;
use pbpef_core::Store;

pub mod backfill;
pub mod runs;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const INGEST_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Backfill(args) => backfill::run(args),
        Command::Runs(args) => runs::list(args),
        Command::Show(args) => runs::show(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Opens the store named by `--database-url` / `DATABASE_URL` and ensures the tables exist.
pub(crate) fn open_store(args: &StoreArgs) -> anyhow::Result<Store> {
    let location = store_location_from(args.database_url.as_deref())?;
    let store = Store::connect(&location)?;
    store.init_schema()?;
    Ok(store)
}
