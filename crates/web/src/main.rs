use std::process::ExitCode;

use database::{DatabaseConnectionInfo, PgDatabase};
use stations::StationService;
use web::{start_web_server, WebConfig, WebState};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    // database
    let Some(database_connection_info) = DatabaseConnectionInfo::from_env() else {
        log::error!("expected database connection info in env (DATABASE_URL or DATABASE_USER, DATABASE_PASSWORD, DATABASE_HOST, DATABASE_PORT, DATABASE_NAME).");
        return ExitCode::FAILURE;
    };
    let database = match PgDatabase::connect(database_connection_info).await {
        Ok(database) => database,
        Err(why) => {
            log::error!("could not connect to database: {}", why);
            return ExitCode::FAILURE;
        }
    };

    // web server
    let state = WebState::new(StationService::new(database));
    if let Err(why) = start_web_server(WebConfig::from_env(), state).await {
        log::error!("web server stopped: {}", why);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
