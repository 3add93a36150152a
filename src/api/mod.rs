// ==========================================
// Estimate reconciliation engine - API layer
// ==========================================
// The only entry points that write derived data. Orchestration only:
// computation lives in the engine layer, persistence in the repositories.
// ==========================================

pub mod error;
pub mod estimate_api;

// Re-export core types
pub use error::{ApiError, ApiResult};
pub use estimate_api::EstimateApi;
