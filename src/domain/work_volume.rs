// ==========================================
// Estimate reconciliation engine - work volume ledger model
// ==========================================
// The bill-of-quantities ledger: planned vs actual work per project,
// authored independently of any estimate. Source of truth for what the
// project actually requires. Read-only for the engine.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkVolume {
    pub id: i64,
    pub project_id: i64,
    pub construct_id: Option<i64>, // structural element, used as an optional scope filter
    pub work_code: Option<String>,
    pub work_name: String,
    pub unit: Option<String>,

    pub planned_volume: f64,
    pub actual_volume: f64,
    pub planned_amount: Option<f64>, // planned cost, feeds the COST_RANGE rule when present
}
