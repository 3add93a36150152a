// ==========================================
// Estimate reconciliation engine - recompute engine
// ==========================================
// Pure computation: estimate + items + ledger rows in, the complete new
// match and validation sets out. Persistence (the wholesale replace) is the
// caller's job; this engine holds no connection and no state.
// ==========================================

use crate::domain::estimate::{Estimate, EstimateItem};
use crate::domain::reconciliation::{EstimateValidation, VolumeProjectMatch};
use crate::domain::work_volume::WorkVolume;
use crate::engine::deviation::assess_volume;
use crate::engine::matcher::{estimated_volume_for, EstimateItemIndex};
use crate::engine::rules::{cost_range_rule, volume_match_rule};
use chrono::Utc;

/// Complete recompute result for one estimate.
pub struct ReconciliationOutcome {
    pub matches: Vec<VolumeProjectMatch>,
    pub validations: Vec<EstimateValidation>,
}

// ==========================================
// ReconciliationEngine
// ==========================================
pub struct ReconciliationEngine {
    // Stateless engine; repository access is handled by the caller.
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Rebuild the reconciliation snapshot of an estimate.
    ///
    /// work_volumes are the ledger rows already scoped to the estimate's
    /// project (and optional construct filter), in stable stored order.
    /// One match row is produced per ledger row; the rule set follows from
    /// the match set.
    pub fn reconcile(
        &self,
        estimate: &Estimate,
        items: &[EstimateItem],
        work_volumes: &[WorkVolume],
    ) -> ReconciliationOutcome {
        let checked_date = Utc::now().naive_utc();
        let index = EstimateItemIndex::build(items);

        tracing::debug!(
            estimate_id = estimate.id,
            items = items.len(),
            distinct_names = index.len(),
            ledger_rows = work_volumes.len(),
            "rebuilding reconciliation snapshot"
        );

        let mut matches = Vec::with_capacity(work_volumes.len());
        for wv in work_volumes {
            let estimated_volume = estimated_volume_for(&index, &wv.work_name);
            let deviation = assess_volume(wv.planned_volume, estimated_volume, wv.actual_volume);

            matches.push(VolumeProjectMatch {
                id: 0,
                project_id: estimate.project_id,
                construct_id: wv.construct_id,
                work_volume_id: wv.id,
                estimate_id: estimate.id,
                work_code: wv.work_code.clone(),
                work_name: wv.work_name.clone(),
                project_volume: wv.planned_volume,
                estimated_volume,
                actual_volume: wv.actual_volume,
                deviation_estimate: deviation.deviation_estimate,
                deviation_actual: deviation.deviation_actual,
                deviation_percentage: deviation.deviation_percentage,
                status: deviation.status,
                checked_date,
            });
        }

        let mut validations = vec![volume_match_rule(estimate.id, &matches, checked_date)];
        if let Some(cost_rule) = cost_range_rule(estimate, work_volumes, checked_date) {
            validations.push(cost_rule);
        }

        ReconciliationOutcome {
            matches,
            validations,
        }
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}
