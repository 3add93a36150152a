// ==========================================
// Construction paperwork tracker - estimate reconciliation core
// ==========================================
// Cross-checks estimate line items against the work-volume ledger, derives
// deviations and severity tiers, tracks planned-vs-actual cost history, and
// rolls child estimates up into summary totals.
// Stack: Rust + SQLite.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Database infrastructure (connection init / unified PRAGMAs / schema)
pub mod db;

// Logging
pub mod logging;

// API layer - request surface
pub mod api;

// Application layer - state wiring
pub mod app;

// ==========================================
// Core re-exports
// ==========================================

// Domain types
pub use domain::types::{
    CostControlStatus, EstimateType, MatchStatus, ValidationRule, ValidationStatus,
};

// Domain entities
pub use domain::{
    Contract, CostControl, CostControlRequest, Estimate, EstimateContractLink, EstimateItem,
    EstimateValidation, SummaryTotals, VolumeProjectMatch, WorkVolume,
};

// Engines
pub use engine::{CostControlRecorder, ReconciliationEngine, RollupAggregator};

// API
pub use api::{ApiError, ApiResult, EstimateApi};

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "estimate-recon";
