// ==========================================
// Estimate reconciliation engine - estimate API
// ==========================================
// The request surface. Orchestrates repositories and stateless engines:
// every operation is one inbound call, no background work, no cross-request
// locking beyond the serialized shared connection.
// ==========================================

use std::sync::Arc;

use chrono::Utc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::contract::EstimateContractLink;
use crate::domain::cost_control::{CostControl, CostControlRequest};
use crate::domain::estimate::SummaryTotals;
use crate::domain::reconciliation::{EstimateValidation, VolumeProjectMatch};
use crate::domain::types::EstimateType;
use crate::engine::{CostControlRecorder, ReconciliationEngine, RollupAggregator};
use crate::repository::{
    ContractRepository, CostControlRepository, EstimateRepository, ReconciliationRepository,
    WorkVolumeRepository,
};

// ==========================================
// EstimateApi
// ==========================================
pub struct EstimateApi {
    estimate_repo: Arc<EstimateRepository>,
    work_volume_repo: Arc<WorkVolumeRepository>,
    reconciliation_repo: Arc<ReconciliationRepository>,
    cost_control_repo: Arc<CostControlRepository>,
    contract_repo: Arc<ContractRepository>,

    reconciliation_engine: ReconciliationEngine,
    cost_control_recorder: CostControlRecorder,
    rollup_aggregator: RollupAggregator,
}

impl EstimateApi {
    pub fn new(
        estimate_repo: Arc<EstimateRepository>,
        work_volume_repo: Arc<WorkVolumeRepository>,
        reconciliation_repo: Arc<ReconciliationRepository>,
        cost_control_repo: Arc<CostControlRepository>,
        contract_repo: Arc<ContractRepository>,
    ) -> Self {
        Self {
            estimate_repo,
            work_volume_repo,
            reconciliation_repo,
            cost_control_repo,
            contract_repo,
            reconciliation_engine: ReconciliationEngine::new(),
            cost_control_recorder: CostControlRecorder::new(),
            rollup_aggregator: RollupAggregator::new(),
        }
    }

    // ==========================================
    // Reconciliation
    // ==========================================

    /// Recompute the reconciliation snapshot of an estimate against the
    /// work-volume ledger, optionally scoped to one construct.
    ///
    /// Replace-not-append: the estimate's previous match and validation rows
    /// are purged and the new sets written in the same transaction. Safe to
    /// re-invoke; the end state is idempotent when retried serially.
    ///
    /// # Errors
    /// - `NotFound` if the estimate does not exist (checked before any
    ///   mutation)
    pub fn validate_volume(
        &self,
        estimate_id: i64,
        construct_id: Option<i64>,
    ) -> ApiResult<Vec<VolumeProjectMatch>> {
        let estimate = self
            .estimate_repo
            .find_by_id(estimate_id)?
            .ok_or_else(|| ApiError::NotFound(format!("estimate {} not found", estimate_id)))?;

        let items = self.estimate_repo.find_items(estimate_id)?;
        let work_volumes = self
            .work_volume_repo
            .find_by_project(estimate.project_id, construct_id)?;

        let outcome = self
            .reconciliation_engine
            .reconcile(&estimate, &items, &work_volumes);

        let persisted = self.reconciliation_repo.replace_results(
            estimate_id,
            &outcome.matches,
            &outcome.validations,
        )?;

        tracing::info!(
            estimate_id,
            matches = persisted.len(),
            rules = outcome.validations.len(),
            "reconciliation snapshot rebuilt"
        );

        Ok(persisted)
    }

    /// Rule verdicts of an estimate (current snapshot).
    pub fn get_validations(&self, estimate_id: i64) -> ApiResult<Vec<EstimateValidation>> {
        Ok(self.reconciliation_repo.find_validations(estimate_id)?)
    }

    /// All match rows of a project, across its estimates.
    pub fn get_volume_matches(&self, project_id: i64) -> ApiResult<Vec<VolumeProjectMatch>> {
        Ok(self.reconciliation_repo.find_matches_by_project(project_id)?)
    }

    // ==========================================
    // Cost control
    // ==========================================

    /// Append one planned-vs-actual cost snapshot to the estimate's history.
    ///
    /// Deviation fields and status are derived here; prior rows are
    /// untouched.
    pub fn record_cost_control(
        &self,
        estimate_id: i64,
        request: &CostControlRequest,
    ) -> ApiResult<CostControl> {
        self.require_estimate(estimate_id)?;

        let snapshot = self
            .cost_control_recorder
            .build_snapshot(estimate_id, request);
        let persisted = self.cost_control_repo.insert(&snapshot)?;

        tracing::info!(
            estimate_id,
            deviation_percentage = persisted.deviation_percentage,
            status = %persisted.status,
            "cost control snapshot recorded"
        );

        Ok(persisted)
    }

    /// Cost-control history of an estimate, most recent first.
    pub fn get_cost_controls(&self, estimate_id: i64) -> ApiResult<Vec<CostControl>> {
        Ok(self.cost_control_repo.find_by_estimate(estimate_id)?)
    }

    // ==========================================
    // Contract links
    // ==========================================

    /// Link an estimate to a contract.
    ///
    /// A primary link demotes every other link of the contract in the same
    /// transaction, keeping at most one primary per contract.
    pub fn link_contract(
        &self,
        estimate_id: i64,
        contract_id: i64,
        is_primary: bool,
        usage_type: Option<String>,
    ) -> ApiResult<EstimateContractLink> {
        self.require_estimate(estimate_id)?;
        self.contract_repo
            .find_by_id(contract_id)?
            .ok_or_else(|| ApiError::NotFound(format!("contract {} not found", contract_id)))?;

        let link = EstimateContractLink {
            id: 0,
            estimate_id,
            contract_id,
            is_primary,
            usage_type,
            created_at: Utc::now().naive_utc(),
        };
        let persisted = self.contract_repo.upsert_link(&link)?;

        tracing::info!(estimate_id, contract_id, is_primary, "contract link stored");
        Ok(persisted)
    }

    // ==========================================
    // Roll-up
    // ==========================================

    /// Recalculate a SUMMARY estimate from the active LOCAL/OBJECT estimates
    /// of its project, overwriting the summary's aggregate cost fields.
    ///
    /// # Errors
    /// - `NotFound` if the estimate does not exist
    /// - `InvalidState` if the estimate is not of SUMMARY type
    pub fn calculate_summary(&self, estimate_id: i64) -> ApiResult<SummaryTotals> {
        let estimate = self
            .estimate_repo
            .find_by_id(estimate_id)?
            .ok_or_else(|| ApiError::NotFound(format!("estimate {} not found", estimate_id)))?;

        if estimate.estimate_type != EstimateType::Summary {
            return Err(ApiError::InvalidState(format!(
                "estimate {} has type '{}', roll-up requires '{}'",
                estimate_id,
                estimate.estimate_type,
                EstimateType::Summary
            )));
        }

        // Children are LOCAL/OBJECT only, so the summary's own fields never
        // feed the sum.
        let children = self.estimate_repo.find_active_children(estimate.project_id)?;
        let totals = self.rollup_aggregator.summarize(&children);
        self.estimate_repo
            .update_summary_costs(estimate_id, &totals)?;

        tracing::info!(
            estimate_id,
            child_count = totals.child_count,
            total_amount = totals.total_amount,
            "summary estimate recalculated"
        );

        Ok(totals)
    }

    // ==========================================
    // Helpers
    // ==========================================

    fn require_estimate(&self, estimate_id: i64) -> ApiResult<()> {
        self.estimate_repo
            .find_by_id(estimate_id)?
            .ok_or_else(|| ApiError::NotFound(format!("estimate {} not found", estimate_id)))?;
        Ok(())
    }
}
