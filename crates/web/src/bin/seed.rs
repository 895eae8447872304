//! Loads the sample stations into the configured database. Safe to run more
//! than once.

use std::process::ExitCode;

use database::{DatabaseConnectionInfo, PgDatabase};
use stations::fixtures;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let Some(database_connection_info) = DatabaseConnectionInfo::from_env() else {
        log::error!("expected database connection info in env.");
        return ExitCode::FAILURE;
    };
    let database = match PgDatabase::connect(database_connection_info).await {
        Ok(database) => database,
        Err(why) => {
            log::error!("could not connect to database: {}", why);
            return ExitCode::FAILURE;
        }
    };

    match fixtures::seed(&database).await {
        Ok(report) => {
            log::info!(
                "seeding done: {} inserted, {} already present",
                report.inserted,
                report.skipped
            );
            ExitCode::SUCCESS
        }
        Err(why) => {
            log::error!("seeding failed: {}", why);
            ExitCode::FAILURE
        }
    }
}
