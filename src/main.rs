// ==========================================
// Estimate reconciliation engine - binary entry point
// ==========================================
// Thin wrapper: initialize logging, resolve the database path, bootstrap the
// schema. The engine itself is consumed as a library by the surrounding
// paperwork tracker.
// ==========================================

use estimate_recon::app::{get_default_db_path, AppState};

fn main() {
    estimate_recon::logging::init();

    tracing::info!("==================================================");
    tracing::info!("estimate reconciliation & validation engine");
    tracing::info!("version: {}", estimate_recon::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("using database: {}", db_path);

    match AppState::new(db_path) {
        Ok(state) => {
            tracing::info!("schema ready at {}", state.db_path);
        }
        Err(e) => {
            tracing::error!("initialization failed: {}", e);
            std::process::exit(1);
        }
    }
}
