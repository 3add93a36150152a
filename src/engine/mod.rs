// ==========================================
// Estimate reconciliation engine - engine layer
// ==========================================
// Business rules. Engines are stateless: domain values in, domain values
// out. Repository access happens in the API layer.
// ==========================================

pub mod cost_control;
pub mod deviation;
pub mod matcher;
pub mod reconciliation;
pub mod rollup;
pub mod rules;

// Re-export core engines
pub use cost_control::CostControlRecorder;
pub use matcher::EstimateItemIndex;
pub use reconciliation::{ReconciliationEngine, ReconciliationOutcome};
pub use rollup::RollupAggregator;
