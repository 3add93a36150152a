// ==========================================
// Estimate reconciliation engine - application layer
// ==========================================
// Shared state wiring for the binary and embedding hosts.
// ==========================================

pub mod state;

// Re-export
pub use state::{get_default_db_path, AppState};
