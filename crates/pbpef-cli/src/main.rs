use clap::Parser;

mod cli;
mod logging;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};
use pbpef_core::errors::ConfigError;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&logging::level_from_env(), cli.log_format);

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<ConfigError>() {
            Some(cfg_err) => {
                eprintln!("{}", cfg_err);
                exit_codes::CONFIG_ERROR
            }
            None => {
                eprintln!("fatal: {e:#}");
                exit_codes::INGEST_FAILED
            }
        },
    };
    std::process::exit(code);
}
