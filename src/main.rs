//! HMS report service
//!
//! HTTP server for patient and doctor PDF reports.

use hms_reports::config::Config;
use hms_reports::{build_info, db, http};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hms_reports=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner("HTTP");

    let config = Config::from_env()?;
    eprintln!("Database path: {}", config.database_path.display());

    // Ensure data directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&config.database_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    eprintln!("Listening on http://{}", config.bind_addr);
    http::serve(&config, database).await?;

    Ok(())
}
