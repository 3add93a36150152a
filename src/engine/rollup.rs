// ==========================================
// Estimate reconciliation engine - roll-up aggregator
// ==========================================
// Sums the cost aggregates of active LOCAL/OBJECT child estimates into the
// totals written onto a SUMMARY estimate. The summary's own fields never
// participate in the sum.
// ==========================================

use crate::domain::estimate::{Estimate, SummaryTotals};

pub struct RollupAggregator {
    // Stateless engine; child selection and the overwrite are the caller's job.
}

impl RollupAggregator {
    pub fn new() -> Self {
        Self {}
    }

    /// Sum the aggregate cost fields across the given children.
    ///
    /// The caller passes active LOCAL/OBJECT estimates of the summary's
    /// project; this function only adds them up.
    pub fn summarize(&self, children: &[Estimate]) -> SummaryTotals {
        let mut totals = SummaryTotals {
            total_amount: 0.0,
            materials_cost: 0.0,
            labor_cost: 0.0,
            equipment_cost: 0.0,
            related_costs: 0.0,
            child_count: children.len(),
        };

        for child in children {
            totals.total_amount += child.total_amount;
            totals.materials_cost += child.materials_cost;
            totals.labor_cost += child.labor_cost;
            totals.equipment_cost += child.equipment_cost;
            totals.related_costs += child.related_costs;
        }

        totals
    }
}

impl Default for RollupAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::EstimateType;
    use chrono::Utc;

    fn child(total: f64, materials: f64, labor: f64) -> Estimate {
        Estimate {
            id: 0,
            project_id: 1,
            estimate_type: EstimateType::Local,
            number: "LS".to_string(),
            name: "child".to_string(),
            total_amount: total,
            materials_cost: materials,
            labor_cost: labor,
            equipment_cost: 0.0,
            related_costs: 0.0,
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_summarize_sums_each_component() {
        let aggregator = RollupAggregator::new();
        let totals = aggregator.summarize(&[
            child(1000.0, 400.0, 300.0),
            child(500.0, 100.0, 250.0),
        ]);
        assert_eq!(totals.total_amount, 1500.0);
        assert_eq!(totals.materials_cost, 500.0);
        assert_eq!(totals.labor_cost, 550.0);
        assert_eq!(totals.child_count, 2);
    }

    #[test]
    fn test_summarize_empty_children() {
        let aggregator = RollupAggregator::new();
        let totals = aggregator.summarize(&[]);
        assert_eq!(totals.total_amount, 0.0);
        assert_eq!(totals.child_count, 0);
    }
}
