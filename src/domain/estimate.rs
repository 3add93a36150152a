// ==========================================
// Estimate reconciliation engine - estimate domain model
// ==========================================
// An estimate is a costed bill of works composed of free-text-named line
// items. The engine reads estimates and their items; it only ever writes the
// aggregate cost fields of a SUMMARY estimate (roll-up).
// ==========================================

use crate::domain::types::EstimateType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Estimate
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub id: i64,
    pub project_id: i64,
    pub estimate_type: EstimateType,
    pub number: String, // document number
    pub name: String,   // document title

    // ===== cost aggregates =====
    pub total_amount: f64,
    pub materials_cost: f64,
    pub labor_cost: f64,
    pub equipment_cost: f64,
    pub related_costs: f64,

    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

// ==========================================
// EstimateItem
// ==========================================
// Line item. work_name is free text authored independently of the work-volume
// ledger; many items may share a normalized name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateItem {
    pub id: i64,
    pub estimate_id: i64,
    pub work_name: String,
    pub quantity: f64,

    // ===== price breakdown (optional in source data) =====
    pub total_price: Option<f64>,
    pub materials_price: Option<f64>,
    pub labor_price: Option<f64>,
    pub equipment_price: Option<f64>,
}

/// Aggregate cost fields written back onto a SUMMARY estimate by the roll-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_amount: f64,
    pub materials_cost: f64,
    pub labor_cost: f64,
    pub equipment_cost: f64,
    pub related_costs: f64,
    pub child_count: usize,
}
