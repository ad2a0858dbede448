use super::*;
use chrono::NaiveDate;
use proptest::prelude::*;
use rl_analysis::{FeatureSet, SkillAnalysis, TopologyMetrics};
use rl_core::{Activity, ActivityId, DigitalTwin, TopologyConfig};

/// Features of an isolated, unremarkable activity.
fn quiet(id: &str) -> ActivityFeatures {
    let activity = Activity::new(id, id);
    let twin = DigitalTwin::build(std::slice::from_ref(&activity));
    let topology = TopologyMetrics::compute(&twin, &TopologyConfig::default());
    let reference = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let mut f = FeatureSet::compute(&twin, reference, &SkillAnalysis::default(), &topology)
        .features
        .remove(0);
    f.float_days = 10.0;
    f.float_score = 0.0;
    f.fte_ratio = 0.0;
    f
}

#[test]
fn test_quiet_activity_scores_zero() {
    let f = quiet("A");
    assert_eq!(RiskComponents::compute(&f), RiskComponents::default());
    assert_eq!(RuleBasedRiskModel::new().score(&f, &[]), 0.0);
}

#[test]
fn test_schedule_and_progress_components() {
    let mut f = quiet("A");
    f.delay_baseline_days = 15.0;
    f.progress_slip = 0.25;
    assert!((schedule_delay_score(&f) - 50.0).abs() < 1e-9);
    assert!((progress_slip_score(&f) - 25.0).abs() < 1e-9);

    f.delay_baseline_days = 90.0;
    assert_eq!(schedule_delay_score(&f), 100.0);
}

#[test]
fn test_risk_register_component() {
    let mut f = quiet("A");
    f.risk_probability = 0.4;
    f.risk_delay_impact_days = 15.0;
    f.expected_delay_days = 4.0;
    // 20 + 25 + 8
    assert!((risk_register_score(&f) - 53.0).abs() < 1e-9);

    f.expected_delay_days = 50.0;
    // expected part caps at 20
    assert!((risk_register_score(&f) - 65.0).abs() < 1e-9);
}

#[test]
fn test_float_criticality_bonus_on_critical_path() {
    let mut f = quiet("A");
    f.float_score = 0.5;
    assert!((float_criticality_score(&f) - 50.0).abs() < 1e-9);

    f.is_on_critical_path = true;
    assert!((float_criticality_score(&f) - 80.0).abs() < 1e-9);

    f.float_score = 1.0;
    assert_eq!(float_criticality_score(&f), 100.0);

    f.float_score = 0.1;
    assert!((float_criticality_score(&f) - 35.0).abs() < 1e-9);
}

#[test]
fn test_dependency_component() {
    let mut f = quiet("A");
    f.predecessor_count = 5;
    f.successor_count = 3;
    f.downstream_critical_depth = 1;
    assert_eq!(dependency_score(&f), 70.0);

    f.successor_count = 6;
    f.downstream_critical_depth = 4;
    assert_eq!(dependency_score(&f), 100.0);
}

#[test]
fn test_resource_overload_is_piecewise() {
    let mut f = quiet("A");
    let mut at = |ratio: f64| {
        f.fte_ratio = ratio;
        resource_overload_score(&f)
    };
    assert!((at(0.35) - 15.0).abs() < 1e-9);
    assert!((at(0.8) - 45.0).abs() < 1e-9);
    assert!((at(0.95) - 80.0).abs() < 1e-9);
    assert!((at(1.5) - 50.0).abs() < 1e-9);
    assert_eq!(at(3.0), 100.0);
    assert_eq!(at(0.0), 0.0);
}

#[test]
fn test_anomalies_score_full() {
    let mut f = quiet("A");
    f.zombie_task = true;
    assert_eq!(anomaly_score(&f), 100.0);
    f.zombie_task = false;
    f.resource_black_hole = true;
    assert_eq!(anomaly_score(&f), 100.0);
}

#[test]
fn test_weights_sum_to_one() {
    assert!((WEIGHTS.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    let full = RiskComponents {
        schedule_delay: 100.0,
        progress_slip: 100.0,
        risk_register: 100.0,
        float_criticality: 100.0,
        dependency: 100.0,
        resource_overload: 100.0,
        anomaly: 100.0,
    };
    assert!((full.weighted_score() - 100.0).abs() < 1e-9);
}

#[test]
fn test_single_activity_uses_raw_components() {
    let mut f = quiet("A");
    f.delay_baseline_days = 15.0;
    f.progress_slip = 0.5;
    // 0.25 * 50 + 0.25 * 50
    let expected = 25.0;
    let model = RuleBasedRiskModel::new();

    assert!((model.score(&f, std::slice::from_ref(&f)) - expected).abs() < 1e-9);
    assert!((model.score_population(std::slice::from_ref(&f))[0] - expected).abs() < 1e-9);
}

#[test]
fn test_population_normalization() {
    let mut hot = quiet("HOT");
    hot.delay_baseline_days = 3.0;
    hot.progress_slip = 0.1;
    let cold = quiet("COLD");
    let population = vec![hot.clone(), cold.clone()];
    let model = RuleBasedRiskModel::new();

    // Small raw values stretch to the top of the range.
    let scores = model.score_population(&population);
    assert!((scores[0] - 50.0).abs() < 1e-9);
    assert_eq!(scores[1], 0.0);

    assert!((model.score(&hot, &population) - scores[0]).abs() < 1e-12);
    assert_eq!(model.score(&cold, &population), scores[1]);
}

#[test]
fn test_identical_population_scores_zero() {
    let mut a = quiet("A");
    a.delay_baseline_days = 20.0;
    let mut b = a.clone();
    b.activity_id = ActivityId::new("B");

    let scores = RuleBasedRiskModel::new().score_population(&[a, b]);
    assert_eq!(scores, vec![0.0, 0.0]);
}

#[test]
fn test_scoring_is_idempotent() {
    let mut a = quiet("A");
    a.risk_probability = 0.7;
    a.fte_ratio = 1.2;
    let b = quiet("B");
    let population = vec![a, b];
    let model = RuleBasedRiskModel::new();

    assert_eq!(
        model.score_population(&population),
        model.score_population(&population)
    );
}

proptest! {
    #[test]
    fn prop_scores_stay_in_range(
        rows in prop::collection::vec(
            (0.0f64..60.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..3.0, 0usize..8, any::<bool>()),
            1..8,
        )
    ) {
        let population: Vec<ActivityFeatures> = rows
            .iter()
            .enumerate()
            .map(|(i, &(delay, slip, prob, fte, succ, zombie))| {
                let mut f = quiet(&format!("A{i}"));
                f.delay_baseline_days = delay;
                f.progress_slip = slip;
                f.risk_probability = prob;
                f.fte_ratio = fte;
                f.successor_count = succ;
                f.zombie_task = zombie;
                f
            })
            .collect();

        for score in RuleBasedRiskModel::new().score_population(&population) {
            prop_assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
        }
    }
}
