//! Regenerates the schema snapshot from the live database.

use std::process::ExitCode;

use log::error;
use pgdrift::{init_logging, snapshot::update_snapshot, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let config = Config::from_env();

    match update_snapshot(&config).await {
        Ok(schema) => {
            println!("Found {} tables in the database.", schema.len());
            println!("Updated schema file: {}", config.snapshot_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
