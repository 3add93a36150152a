// ==========================================
// Cost control integration tests
// ==========================================
// Target: record_cost_control - derived deviation fields, severity tiers,
// and the append-only history.
// ==========================================


use chrono::NaiveDate;
use estimate_recon::api::ApiError;
use estimate_recon::domain::types::CostControlStatus;
use estimate_recon::domain::CostControlRequest;
use test_helpers::{seed_estimate_with_items, setup};

fn request(date: NaiveDate, planned: f64, actual: f64) -> CostControlRequest {
    CostControlRequest {
        contract_id: None,
        control_date: date,
        planned_amount: planned,
        actual_amount: actual,
        materials_planned: None,
        materials_actual: None,
        labor_planned: None,
        labor_actual: None,
        equipment_planned: None,
        equipment_actual: None,
        related_costs_planned: None,
        related_costs_actual: None,
        notes: None,
    }
}

#[test]
fn test_eight_percent_overrun_is_warning() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 1_000_000.0, &[]);
    let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

    let control = ctx
        .api
        .record_cost_control(estimate_id, &request(date, 1_000_000.0, 1_080_000.0))
        .unwrap();

    assert!(control.id > 0);
    assert_eq!(control.deviation_amount, 80_000.0);
    assert_eq!(control.deviation_percentage, 8.0);
    assert_eq!(control.status, CostControlStatus::Warning);
}

#[test]
fn test_severity_boundaries() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 0.0, &[]);
    let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

    // exactly 5% -> normal
    let c = ctx
        .api
        .record_cost_control(estimate_id, &request(date, 100.0, 105.0))
        .unwrap();
    assert_eq!(c.status, CostControlStatus::Normal);

    // exactly 10% -> warning
    let c = ctx
        .api
        .record_cost_control(estimate_id, &request(date, 100.0, 110.0))
        .unwrap();
    assert_eq!(c.status, CostControlStatus::Warning);

    // above 10% -> critical (undershoot counts by absolute value)
    let c = ctx
        .api
        .record_cost_control(estimate_id, &request(date, 100.0, 88.0))
        .unwrap();
    assert_eq!(c.deviation_percentage, -12.0);
    assert_eq!(c.status, CostControlStatus::Critical);
}

#[test]
fn test_history_is_append_only_and_date_ordered() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 0.0, &[]);

    let jan = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let feb = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
    let mar = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    ctx.api
        .record_cost_control(estimate_id, &request(feb, 1000.0, 1000.0))
        .unwrap();
    ctx.api
        .record_cost_control(estimate_id, &request(jan, 1000.0, 900.0))
        .unwrap();
    ctx.api
        .record_cost_control(estimate_id, &request(mar, 1000.0, 1200.0))
        .unwrap();

    let history = ctx.api.get_cost_controls(estimate_id).unwrap();
    assert_eq!(history.len(), 3);
    let dates: Vec<_> = history.iter().map(|c| c.control_date).collect();
    assert_eq!(dates, vec![mar, feb, jan]);

    // Earlier rows keep their derived values untouched.
    assert_eq!(history[2].deviation_amount, -100.0);
}

#[test]
fn test_zero_plan_zeroes_percentage() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 0.0, &[]);
    let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

    let control = ctx
        .api
        .record_cost_control(estimate_id, &request(date, 0.0, 500.0))
        .unwrap();
    assert_eq!(control.deviation_amount, 500.0);
    assert_eq!(control.deviation_percentage, 0.0);
    assert_eq!(control.status, CostControlStatus::Normal);
}

#[test]
fn test_missing_estimate_is_rejected() {
    let ctx = setup();
    let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    let result = ctx.api.record_cost_control(404, &request(date, 100.0, 100.0));
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_component_breakdown_is_stored() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 0.0, &[]);
    let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

    let mut req = request(date, 1000.0, 1020.0);
    req.materials_planned = Some(600.0);
    req.materials_actual = Some(630.0);
    req.labor_planned = Some(400.0);
    req.labor_actual = Some(390.0);
    req.notes = Some("monthly control".to_string());

    ctx.api.record_cost_control(estimate_id, &req).unwrap();

    let stored = &ctx.api.get_cost_controls(estimate_id).unwrap()[0];
    assert_eq!(stored.materials_planned, Some(600.0));
    assert_eq!(stored.materials_actual, Some(630.0));
    assert_eq!(stored.labor_actual, Some(390.0));
    assert_eq!(stored.equipment_planned, None);
    assert_eq!(stored.notes.as_deref(), Some("monthly control"));
}
