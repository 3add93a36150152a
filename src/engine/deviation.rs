// ==========================================
// Estimate reconciliation engine - deviation calculator & classifier
// ==========================================
// Deviation math against the ledger's planned volume, and the fixed
// match-level severity thresholds.
// ==========================================

use crate::domain::types::MatchStatus;

/// Assessed deviation of one ledger row against the estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeDeviation {
    pub deviation_estimate: f64,
    pub deviation_actual: Option<f64>,
    pub deviation_percentage: f64,
    pub status: MatchStatus,
}

/// Deviation as a percentage of the reference.
///
/// Zero by convention when the reference is non-positive: never divide by
/// zero or a negative plan.
pub fn deviation_percentage(deviation: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        deviation / reference * 100.0
    } else {
        0.0
    }
}

/// Match-level severity tiers (fixed thresholds).
///
/// 0 -> passed; (0, 10] absolute -> warning; above 10 -> failed.
/// Exactly 10% is a warning, not a failure.
pub fn classify_match(deviation_percentage: f64) -> MatchStatus {
    let abs = deviation_percentage.abs();
    if abs > 10.0 {
        MatchStatus::Failed
    } else if abs > 0.0 {
        MatchStatus::Warning
    } else {
        MatchStatus::Passed
    }
}

/// Full assessment of one ledger row.
///
/// deviation_actual tracks the ledger's own actual-vs-plan gap and is None
/// when the planned volume is non-positive (no meaningful reference).
pub fn assess_volume(
    project_volume: f64,
    estimated_volume: f64,
    actual_volume: f64,
) -> VolumeDeviation {
    let deviation_estimate = estimated_volume - project_volume;
    let pct = deviation_percentage(deviation_estimate, project_volume);
    let deviation_actual = if project_volume > 0.0 {
        Some(actual_volume - project_volume)
    } else {
        None
    };

    VolumeDeviation {
        deviation_estimate,
        deviation_actual,
        deviation_percentage: pct,
        status: classify_match(pct),
    }
}
