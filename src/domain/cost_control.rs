// ==========================================
// Estimate reconciliation engine - cost control model
// ==========================================
// Append-only time series of planned-vs-actual cost snapshots per estimate.
// Prior rows are never touched by the engine.
// ==========================================

use crate::domain::types::CostControlStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostControl {
    pub id: i64, // 0 until persisted
    pub estimate_id: i64,
    pub contract_id: Option<i64>,
    pub control_date: NaiveDate,

    // ===== totals =====
    pub planned_amount: f64,
    pub actual_amount: f64,
    pub deviation_amount: f64,
    pub deviation_percentage: f64,

    // ===== component breakdown (planned / actual) =====
    pub materials_planned: Option<f64>,
    pub materials_actual: Option<f64>,
    pub labor_planned: Option<f64>,
    pub labor_actual: Option<f64>,
    pub equipment_planned: Option<f64>,
    pub equipment_actual: Option<f64>,
    pub related_costs_planned: Option<f64>,
    pub related_costs_actual: Option<f64>,

    pub status: CostControlStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Caller-supplied part of a cost control snapshot.
///
/// deviation_amount / deviation_percentage / status are always derived by the
/// engine; a caller cannot set them directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostControlRequest {
    pub contract_id: Option<i64>,
    pub control_date: NaiveDate,
    pub planned_amount: f64,
    #[serde(default)]
    pub actual_amount: f64,
    pub materials_planned: Option<f64>,
    pub materials_actual: Option<f64>,
    pub labor_planned: Option<f64>,
    pub labor_actual: Option<f64>,
    pub equipment_planned: Option<f64>,
    pub equipment_actual: Option<f64>,
    pub related_costs_planned: Option<f64>,
    pub related_costs_actual: Option<f64>,
    pub notes: Option<String>,
}
