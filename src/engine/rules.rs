// ==========================================
// Estimate reconciliation engine - estimate-level rule generator
// ==========================================
// Runs after the full match set of an estimate is built. Synthesizes the
// summary verdicts stored in estimate_validation.
// ==========================================

use crate::domain::estimate::Estimate;
use crate::domain::reconciliation::{EstimateValidation, VolumeProjectMatch};
use crate::domain::types::{MatchStatus, ValidationRule, ValidationStatus};
use crate::domain::work_volume::WorkVolume;
use chrono::NaiveDateTime;

/// Cost deviation (%) above which the COST_RANGE rule fails outright.
pub const COST_RANGE_FAIL_PCT: f64 = 5.0;

/// VOLUME_MATCH verdict over the estimate's match set.
///
/// FAILED if any match failed, else NEEDS_REVIEW if any warning exists,
/// else PASSED. Always critical. An empty match set passes (nothing to
/// object to on an empty ledger).
pub fn volume_match_rule(
    estimate_id: i64,
    matches: &[VolumeProjectMatch],
    checked_date: NaiveDateTime,
) -> EstimateValidation {
    let total_matches = matches.len();
    let failed_matches = matches
        .iter()
        .filter(|m| m.status == MatchStatus::Failed)
        .count();
    let warning_matches = matches
        .iter()
        .filter(|m| m.status == MatchStatus::Warning)
        .count();

    let status = if failed_matches > 0 {
        ValidationStatus::Failed
    } else if warning_matches > 0 {
        ValidationStatus::NeedsReview
    } else {
        ValidationStatus::Passed
    };

    EstimateValidation {
        id: 0,
        estimate_id,
        validation_type: "automatic".to_string(),
        rule: ValidationRule::VolumeMatch,
        status,
        description: Some(format!(
            "Work volume check: {} positions checked, {} critical deviations.",
            total_matches, failed_matches
        )),
        expected_value: None,
        actual_value: None,
        deviation_percentage: None,
        is_critical: true,
        checked_date,
    }
}

/// COST_RANGE verdict comparing the estimate total against the ledger's
/// planned cost.
///
/// Emitted only when the ledger carries a positive planned cost sum; with no
/// reference the rule is omitted entirely. FAILED above +5%, NEEDS_REVIEW for
/// any positive overrun, PASSED at or under plan. Always critical.
pub fn cost_range_rule(
    estimate: &Estimate,
    work_volumes: &[WorkVolume],
    checked_date: NaiveDateTime,
) -> Option<EstimateValidation> {
    let total_project_cost: f64 = work_volumes
        .iter()
        .filter_map(|wv| wv.planned_amount)
        .sum();
    if total_project_cost <= 0.0 {
        return None;
    }

    let total_estimate_cost = estimate.total_amount;
    let cost_deviation = total_estimate_cost - total_project_cost;
    let cost_deviation_pct = cost_deviation / total_project_cost * 100.0;

    let status = if cost_deviation_pct > COST_RANGE_FAIL_PCT {
        ValidationStatus::Failed
    } else if cost_deviation_pct > 0.0 {
        ValidationStatus::NeedsReview
    } else {
        ValidationStatus::Passed
    };

    Some(EstimateValidation {
        id: 0,
        estimate_id: estimate.id,
        validation_type: "financial".to_string(),
        rule: ValidationRule::CostRange,
        status,
        description: Some(
            "Estimate cost compared against the planned cost of ledger works".to_string(),
        ),
        expected_value: Some(format!("{:.2}", total_project_cost)),
        actual_value: Some(format!("{:.2}", total_estimate_cost)),
        deviation_percentage: Some(cost_deviation_pct),
        is_critical: true,
        checked_date,
    })
}
