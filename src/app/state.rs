// ==========================================
// Estimate reconciliation engine - application state
// ==========================================
// Wires repositories and the API over one shared connection, and resolves
// the default database location.
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::EstimateApi;
use crate::db;
use crate::repository::{
    ContractRepository, CostControlRepository, EstimateRepository, ReconciliationRepository,
    WorkVolumeRepository,
};

/// Application state: the API instance plus the shared resources behind it.
pub struct AppState {
    pub db_path: String,
    pub estimate_api: Arc<EstimateApi>,
}

impl AppState {
    /// Open the database, apply the unified PRAGMAs, bootstrap the schema,
    /// and build every repository over the same shared connection so the
    /// replace transactions serialize naturally.
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("initializing AppState, database: {}", db_path);

        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("cannot open database: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("cannot initialize schema: {}", e))?;

        match db::read_schema_version(&conn) {
            Ok(Some(v)) if v != db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    found = v,
                    expected = db::CURRENT_SCHEMA_VERSION,
                    "schema version differs from the one this build expects"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("cannot read schema version (continuing): {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        let estimate_repo = Arc::new(EstimateRepository::from_connection(conn.clone()));
        let work_volume_repo = Arc::new(WorkVolumeRepository::from_connection(conn.clone()));
        let reconciliation_repo = Arc::new(ReconciliationRepository::from_connection(conn.clone()));
        let cost_control_repo = Arc::new(CostControlRepository::from_connection(conn.clone()));
        let contract_repo = Arc::new(ContractRepository::from_connection(conn));

        let estimate_api = Arc::new(EstimateApi::new(
            estimate_repo,
            work_volume_repo,
            reconciliation_repo,
            cost_control_repo,
            contract_repo,
        ));

        Ok(Self {
            db_path,
            estimate_api,
        })
    }
}

/// Resolve the default database path.
///
/// An explicit ESTIMATE_RECON_DB_PATH wins (debugging, tests, CI); otherwise
/// the user data directory, with a dev-suffixed folder in debug builds so
/// development never touches production data.
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("ESTIMATE_RECON_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./estimate_recon.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("estimate-recon-dev");
        }
        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("estimate-recon");
        }
        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!("cannot create data directory {:?}: {}", path, e);
            return "./estimate_recon.db".to_string();
        }
        path = path.join("estimate_recon.db");
    }

    path.to_string_lossy().to_string()
}
