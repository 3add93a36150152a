// ==========================================
// End-to-end API flow test
// ==========================================
// Drives one project through the whole surface: seed estimates and the
// work-volume ledger, reconcile, record cost control, link a contract, roll
// the summary up, and verify the stored state with a second raw connection.
// ==========================================


use chrono::NaiveDate;
use estimate_recon::domain::types::{
    CostControlStatus, EstimateType, MatchStatus, ValidationRule, ValidationStatus,
};
use estimate_recon::domain::CostControlRequest;
use test_helpers::{
    make_contract, make_estimate, make_work_volume, open_raw, seed_estimate_with_items, setup,
};

#[test]
fn test_full_project_flow() {
    let ctx = setup();
    let project_id = 7;

    // --- seed: two child estimates, one summary, a three-row ledger ---
    let local_id = seed_estimate_with_items(
        &ctx,
        project_id,
        2000.0,
        &[("Excavation works", 500.0), ("Concrete pouring", 120.0)],
    );
    let object_id = ctx
        .estimate_repo
        .insert(&{
            let mut e = make_estimate(project_id, EstimateType::Object, 1000.0);
            e.labor_cost = 1000.0;
            e
        })
        .unwrap();
    let summary_id = ctx
        .estimate_repo
        .insert(&make_estimate(project_id, EstimateType::Summary, 0.0))
        .unwrap();

    ctx.work_volume_repo
        .insert(&make_work_volume(
            project_id,
            "Excavation works",
            500.0,
            480.0,
            Some(1500.0),
        ))
        .unwrap();
    ctx.work_volume_repo
        .insert(&make_work_volume(
            project_id,
            "Concrete pouring",
            110.0,
            0.0,
            Some(500.0),
        ))
        .unwrap();
    ctx.work_volume_repo
        .insert(&make_work_volume(
            project_id,
            "Landscaping",
            50.0,
            0.0,
            None,
        ))
        .unwrap();

    // --- reconcile ---
    let matches = ctx.api.validate_volume(local_id, None).unwrap();
    assert_eq!(matches.len(), 3);

    // Excavation: 500 vs 500 -> passed; actual 480 vs plan 500 -> gap of -20.
    let excavation = &matches[0];
    assert_eq!(excavation.status, MatchStatus::Passed);
    assert_eq!(excavation.deviation_actual, Some(-20.0));

    // Concrete: 120 vs 110 -> +9.09% -> warning.
    let concrete = &matches[1];
    assert_eq!(concrete.status, MatchStatus::Warning);

    // Landscaping has no estimate counterpart -> -100% -> failed.
    let landscaping = &matches[2];
    assert_eq!(landscaping.estimated_volume, 0.0);
    assert_eq!(landscaping.status, MatchStatus::Failed);

    let validations = ctx.api.get_validations(local_id).unwrap();
    assert_eq!(validations.len(), 2);
    let volume_rule = validations
        .iter()
        .find(|v| v.rule == ValidationRule::VolumeMatch)
        .unwrap();
    assert_eq!(volume_rule.status, ValidationStatus::Failed);
    // Cost range: 2000 vs 2000 planned -> 0% -> passed.
    let cost_rule = validations
        .iter()
        .find(|v| v.rule == ValidationRule::CostRange)
        .unwrap();
    assert_eq!(cost_rule.status, ValidationStatus::Passed);

    // --- cost control ---
    let control = ctx
        .api
        .record_cost_control(
            local_id,
            &CostControlRequest {
                contract_id: None,
                control_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                planned_amount: 2000.0,
                actual_amount: 2150.0,
                materials_planned: None,
                materials_actual: None,
                labor_planned: None,
                labor_actual: None,
                equipment_planned: None,
                equipment_actual: None,
                related_costs_planned: None,
                related_costs_actual: None,
                notes: None,
            },
        )
        .unwrap();
    assert_eq!(control.deviation_percentage, 7.5);
    assert_eq!(control.status, CostControlStatus::Warning);

    // --- contract link ---
    let contract_id = ctx.contract_repo.insert(&make_contract("GC-42")).unwrap();
    let link = ctx
        .api
        .link_contract(local_id, contract_id, true, Some("general".to_string()))
        .unwrap();
    assert!(link.is_primary);

    // --- roll-up ---
    let totals = ctx.api.calculate_summary(summary_id).unwrap();
    assert_eq!(totals.child_count, 2);
    assert_eq!(totals.total_amount, 3000.0);
    assert_eq!(totals.labor_cost, 1000.0);
    assert!(object_id > 0);

    // --- verify through a second connection ---
    let raw = open_raw(&ctx);
    let match_count: i64 = raw
        .query_row(
            "SELECT COUNT(*) FROM volume_project_match WHERE estimate_id = ?1",
            [local_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(match_count, 3);

    let summary_total: f64 = raw
        .query_row(
            "SELECT total_amount FROM estimates WHERE id = ?1",
            [summary_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(summary_total, 3000.0);

    let primary_count: i64 = raw
        .query_row(
            "SELECT COUNT(*) FROM estimate_contract_link WHERE contract_id = ?1 AND is_primary = 1",
            [contract_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(primary_count, 1);
}
