use std::process;

use tracing_subscriber::EnvFilter;
use user_directory::cleanup::TempFileCleaner;
use user_directory::config::Config;
use user_directory::server;
use user_directory::service::UserService;
use user_directory::store::{DEFAULT_SEED, UserStore};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // ADDR, DATABASE_URL, TEMP_DIR and CLEANUP_PATTERN are all optional.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            process::exit(1);
        }
    };

    if let Some(pattern) = &config.cleanup_pattern {
        match TempFileCleaner::new(&config.temp_dir).delete_temp_files(pattern) {
            Ok(report) if !report.is_clean() => {
                tracing::warn!(failed = report.failures.len(), "temp cleanup left entries behind")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("temp cleanup skipped: {e}"),
        }
    }

    let store = UserStore::with_seed(DEFAULT_SEED.iter().copied());
    let service = UserService::new(config.database_url.clone(), store);
    tracing::info!(
        db = service.db_location(),
        seeded = service.store().len(),
        "user service ready"
    );

    let srv = match server::init_server(config.addr) {
        Ok(srv) => srv,
        Err(e) => {
            tracing::error!("{e}");
            process::exit(1);
        }
    };
    server::run_server(srv, service);
}
