//! Prints a full catalog report and writes Drizzle table definitions.

use std::process::ExitCode;

use log::error;
use pgdrift::{analyze::analyze_with_config, init_logging, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let config = Config::from_env();

    match analyze_with_config(&config).await {
        Ok(analysis) => {
            println!("{}", analysis.report());
            println!("Review the generated schema before replacing the application's schema module.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
