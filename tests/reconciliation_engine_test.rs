// ==========================================
// Reconciliation recompute integration tests
// ==========================================
// Target: validate_volume over a real database - matching, deviation
// classification, rule generation, and the wholesale-replace semantics.
// ==========================================


use estimate_recon::api::ApiError;
use estimate_recon::domain::types::{
    EstimateType, MatchStatus, ValidationRule, ValidationStatus,
};
use test_helpers::{make_estimate, make_work_volume, seed_estimate_with_items, setup};

#[test]
fn test_exact_match_passes() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 0.0, &[("Foundation works", 100.0)]);
    ctx.work_volume_repo
        .insert(&make_work_volume(1, "Foundation works", 100.0, 0.0, None))
        .unwrap();

    let matches = ctx.api.validate_volume(estimate_id, None).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].estimated_volume, 100.0);
    assert_eq!(matches[0].deviation_percentage, 0.0);
    assert_eq!(matches[0].status, MatchStatus::Passed);
    assert!(matches[0].id > 0);

    let validations = ctx.api.get_validations(estimate_id).unwrap();
    assert_eq!(validations.len(), 1);
    assert_eq!(validations[0].rule, ValidationRule::VolumeMatch);
    assert_eq!(validations[0].status, ValidationStatus::Passed);
    assert!(validations[0].is_critical);
}

#[test]
fn test_half_score_fuzzy_does_not_match() {
    // {concrete, works} vs {concrete, works, -, foundation} scores 2/4 = 0.5,
    // which is not strictly above the threshold.
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 0.0, &[("concrete works", 50.0)]);
    ctx.work_volume_repo
        .insert(&make_work_volume(
            1,
            "Concrete works - foundation",
            40.0,
            0.0,
            None,
        ))
        .unwrap();

    let matches = ctx.api.validate_volume(estimate_id, None).unwrap();

    assert_eq!(matches[0].estimated_volume, 0.0);
    assert_eq!(matches[0].deviation_percentage, -100.0);
    assert_eq!(matches[0].status, MatchStatus::Failed);

    let validations = ctx.api.get_validations(estimate_id).unwrap();
    assert_eq!(validations[0].status, ValidationStatus::Failed);
}

#[test]
fn test_name_collisions_aggregate_before_matching() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(
        &ctx,
        1,
        0.0,
        &[("Brickwork", 60.0), ("  BRICKWORK ", 40.0)],
    );
    ctx.work_volume_repo
        .insert(&make_work_volume(1, "Brickwork", 100.0, 0.0, None))
        .unwrap();

    let matches = ctx.api.validate_volume(estimate_id, None).unwrap();
    assert_eq!(matches[0].estimated_volume, 100.0);
    assert_eq!(matches[0].status, MatchStatus::Passed);
}

#[test]
fn test_exactly_ten_percent_is_warning() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 0.0, &[("Plastering", 110.0)]);
    ctx.work_volume_repo
        .insert(&make_work_volume(1, "Plastering", 100.0, 0.0, None))
        .unwrap();

    let matches = ctx.api.validate_volume(estimate_id, None).unwrap();
    assert_eq!(matches[0].deviation_percentage, 10.0);
    assert_eq!(matches[0].status, MatchStatus::Warning);

    let validations = ctx.api.get_validations(estimate_id).unwrap();
    assert_eq!(validations[0].status, ValidationStatus::NeedsReview);
}

#[test]
fn test_cost_range_rule_emitted_with_planned_amounts() {
    let ctx = setup();
    // estimate total 1060 vs ledger plan 1000 -> +6% -> FAILED
    let estimate_id = seed_estimate_with_items(&ctx, 1, 1060.0, &[("Painting", 10.0)]);
    ctx.work_volume_repo
        .insert(&make_work_volume(1, "Painting", 10.0, 0.0, Some(1000.0)))
        .unwrap();

    ctx.api.validate_volume(estimate_id, None).unwrap();

    let validations = ctx.api.get_validations(estimate_id).unwrap();
    assert_eq!(validations.len(), 2);
    let cost_rule = validations
        .iter()
        .find(|v| v.rule == ValidationRule::CostRange)
        .expect("cost rule missing");
    assert_eq!(cost_rule.status, ValidationStatus::Failed);
    assert_eq!(cost_rule.expected_value.as_deref(), Some("1000.00"));
    assert_eq!(cost_rule.actual_value.as_deref(), Some("1060.00"));
    assert!((cost_rule.deviation_percentage.unwrap() - 6.0).abs() < 1e-9);
}

#[test]
fn test_validate_is_idempotent_and_replaces_wholesale() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(
        &ctx,
        1,
        0.0,
        &[("Excavation", 200.0), ("Backfilling", 150.0)],
    );
    ctx.work_volume_repo
        .insert(&make_work_volume(1, "Excavation", 200.0, 50.0, None))
        .unwrap();
    ctx.work_volume_repo
        .insert(&make_work_volume(1, "Backfilling", 160.0, 0.0, None))
        .unwrap();

    let first = ctx.api.validate_volume(estimate_id, None).unwrap();
    let second = ctx.api.validate_volume(estimate_id, None).unwrap();

    // Computed fields are identical run to run (ids may differ).
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.work_volume_id, b.work_volume_id);
        assert_eq!(a.estimated_volume, b.estimated_volume);
        assert_eq!(a.deviation_estimate, b.deviation_estimate);
        assert_eq!(a.deviation_percentage, b.deviation_percentage);
        assert_eq!(a.status, b.status);
    }

    // The stored snapshot holds exactly one row set, not an accumulation.
    let stored = ctx.api.get_volume_matches(1).unwrap();
    assert_eq!(stored.len(), 2);
    let by_estimate = ctx
        .reconciliation_repo
        .find_matches_by_estimate(estimate_id)
        .unwrap();
    assert_eq!(by_estimate.len(), 2);
    let validations = ctx.api.get_validations(estimate_id).unwrap();
    assert_eq!(validations.len(), 1);
}

#[test]
fn test_construct_filter_scopes_and_replaces() {
    let ctx = setup();
    let estimate_id = seed_estimate_with_items(&ctx, 1, 0.0, &[("Roofing", 30.0)]);

    let mut wv1 = make_work_volume(1, "Roofing", 30.0, 0.0, None);
    wv1.construct_id = Some(10);
    ctx.work_volume_repo.insert(&wv1).unwrap();
    let mut wv2 = make_work_volume(1, "Cladding", 20.0, 0.0, None);
    wv2.construct_id = Some(20);
    ctx.work_volume_repo.insert(&wv2).unwrap();

    let scoped = ctx.api.validate_volume(estimate_id, Some(10)).unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].construct_id, Some(10));

    // A full-scope rerun replaces the scoped snapshot entirely.
    let full = ctx.api.validate_volume(estimate_id, None).unwrap();
    assert_eq!(full.len(), 2);
    assert_eq!(ctx.api.get_volume_matches(1).unwrap().len(), 2);
}

#[test]
fn test_missing_estimate_fails_before_mutation() {
    let ctx = setup();

    // Seed another estimate's snapshot to prove it survives the failed call.
    let other_id = seed_estimate_with_items(&ctx, 1, 0.0, &[("Paving", 5.0)]);
    ctx.work_volume_repo
        .insert(&make_work_volume(1, "Paving", 5.0, 0.0, None))
        .unwrap();
    ctx.api.validate_volume(other_id, None).unwrap();

    let result = ctx.api.validate_volume(9999, None);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert_eq!(ctx.api.get_volume_matches(1).unwrap().len(), 1);
}

#[test]
fn test_estimate_without_items_zeroes_every_match() {
    let ctx = setup();
    let estimate_id = ctx
        .estimate_repo
        .insert(&make_estimate(1, EstimateType::Local, 0.0))
        .unwrap();
    ctx.work_volume_repo
        .insert(&make_work_volume(1, "Windows installation", 12.0, 0.0, None))
        .unwrap();

    let matches = ctx.api.validate_volume(estimate_id, None).unwrap();
    assert_eq!(matches[0].estimated_volume, 0.0);
    assert_eq!(matches[0].status, MatchStatus::Failed);
}
