// ==========================================
// Estimate reconciliation engine - cost control recorder
// ==========================================
// Derives the planned-vs-actual snapshot fields from a caller request.
// Append-only: every call produces a new row, history is never rewritten.
// ==========================================

use crate::domain::cost_control::{CostControl, CostControlRequest};
use crate::domain::types::CostControlStatus;
use crate::engine::deviation::deviation_percentage;
use chrono::Utc;

/// Cost-control severity tiers (fixed thresholds, independent of the
/// match-level table): |dev%| <= 5 normal, <= 10 warning, above critical.
pub fn classify_cost_deviation(pct: f64) -> CostControlStatus {
    let abs = pct.abs();
    if abs <= 5.0 {
        CostControlStatus::Normal
    } else if abs <= 10.0 {
        CostControlStatus::Warning
    } else {
        CostControlStatus::Critical
    }
}

// ==========================================
// CostControlRecorder
// ==========================================
pub struct CostControlRecorder {
    // Stateless engine; persistence handled by the caller.
}

impl CostControlRecorder {
    pub fn new() -> Self {
        Self {}
    }

    /// Build one snapshot row. The deviation fields and status are always
    /// derived here - a caller cannot supply them.
    pub fn build_snapshot(&self, estimate_id: i64, request: &CostControlRequest) -> CostControl {
        let deviation_amount = request.actual_amount - request.planned_amount;
        let pct = deviation_percentage(deviation_amount, request.planned_amount);

        CostControl {
            id: 0,
            estimate_id,
            contract_id: request.contract_id,
            control_date: request.control_date,
            planned_amount: request.planned_amount,
            actual_amount: request.actual_amount,
            deviation_amount,
            deviation_percentage: pct,
            materials_planned: request.materials_planned,
            materials_actual: request.materials_actual,
            labor_planned: request.labor_planned,
            labor_actual: request.labor_actual,
            equipment_planned: request.equipment_planned,
            equipment_actual: request.equipment_actual,
            related_costs_planned: request.related_costs_planned,
            related_costs_actual: request.related_costs_actual,
            status: classify_cost_deviation(pct),
            notes: request.notes.clone(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

impl Default for CostControlRecorder {
    fn default() -> Self {
        Self::new()
    }
}
