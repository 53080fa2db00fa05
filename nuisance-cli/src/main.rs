//! ## nuisance-cli
//! **Tenant and management front end for the nuisance reporting core**
//!
//! Loads `.env` and layered configuration, then runs one command against
//! the report store.

use std::process::ExitCode;

use clap::Parser;
use nuisance_telemetry::logging;

mod commands;

use commands::Cli;

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    logging::init();
    let cli = Cli::parse();

    match commands::run_command(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
