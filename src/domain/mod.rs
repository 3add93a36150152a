// ==========================================
// Estimate reconciliation engine - domain layer
// ==========================================
// Entities and closed status/type enums. No persistence, no business rules.
// ==========================================

pub mod contract;
pub mod cost_control;
pub mod estimate;
pub mod reconciliation;
pub mod types;
pub mod work_volume;

// Re-export core entities
pub use contract::{Contract, EstimateContractLink};
pub use cost_control::{CostControl, CostControlRequest};
pub use estimate::{Estimate, EstimateItem, SummaryTotals};
pub use reconciliation::{EstimateValidation, VolumeProjectMatch};
pub use work_volume::WorkVolume;
