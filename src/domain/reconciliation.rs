// ==========================================
// Estimate reconciliation engine - derived reconciliation rows
// ==========================================
// Both tables are rebuilt wholesale on every recompute of an estimate: the
// stored set is always the complete current snapshot, never an accumulation
// across runs. Every computed field is engine-derived, never client-supplied.
// ==========================================

use crate::domain::types::{MatchStatus, ValidationRule, ValidationStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// VolumeProjectMatch
// ==========================================
// One row per work-volume ledger entry in scope: how the estimate's items
// cover that entry, and how far the covered quantity deviates from the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeProjectMatch {
    pub id: i64, // 0 until persisted
    pub project_id: i64,
    pub construct_id: Option<i64>,
    pub work_volume_id: i64,
    pub estimate_id: i64,
    pub work_code: Option<String>,
    pub work_name: String,

    // ===== volumes =====
    pub project_volume: f64,   // WorkVolume.planned_volume
    pub estimated_volume: f64, // summed over matching estimate items
    pub actual_volume: f64,    // WorkVolume.actual_volume

    // ===== deviations =====
    pub deviation_estimate: f64,
    pub deviation_actual: Option<f64>, // None when the reference volume is non-positive
    pub deviation_percentage: f64,

    pub status: MatchStatus,
    pub checked_date: NaiveDateTime,
}

// ==========================================
// EstimateValidation
// ==========================================
// Estimate-level verdict for one rule, synthesized from the match set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateValidation {
    pub id: i64, // 0 until persisted
    pub estimate_id: i64,
    pub validation_type: String, // "automatic" / "financial"
    pub rule: ValidationRule,
    pub status: ValidationStatus,
    pub description: Option<String>,
    pub expected_value: Option<String>,
    pub actual_value: Option<String>,
    pub deviation_percentage: Option<f64>,
    pub is_critical: bool,
    pub checked_date: NaiveDateTime,
}
