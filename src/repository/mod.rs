// ==========================================
// Estimate reconciliation engine - repository layer
// ==========================================
// Data access only: no business logic, all queries parameterized.
// Each repository owns (or shares) a SQLite connection behind Arc<Mutex<..>>.
// ==========================================

pub mod contract_repo;
pub mod cost_control_repo;
pub mod error;
pub mod estimate_repo;
pub mod reconciliation_repo;
pub mod work_volume_repo;

// Re-export core repositories
pub use contract_repo::ContractRepository;
pub use cost_control_repo::CostControlRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use estimate_repo::EstimateRepository;
pub use reconciliation_repo::ReconciliationRepository;
pub use work_volume_repo::WorkVolumeRepository;
