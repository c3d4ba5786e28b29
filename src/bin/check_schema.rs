//! Compares the schema snapshot against the live database.
//!
//! Exit status: 0 match, 1 drift, 2 configuration or snapshot problem,
//! 3 database error.

use std::process::ExitCode;

use log::error;
use pgdrift::{check::check_with_config, init_logging, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let config = Config::from_env();

    match check_with_config(&config).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
