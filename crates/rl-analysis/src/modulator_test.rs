use super::*;
use crate::features::FeatureSet;
use crate::topology::TopologyMetrics;
use chrono::NaiveDate;
use rl_core::{DigitalTwin, TopologyConfig};

fn features_of(activity: &Activity) -> ActivityFeatures {
    let twin = DigitalTwin::build(std::slice::from_ref(activity));
    let reference = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let skill = SkillAnalysis::default();
    let topology = TopologyMetrics::compute(&twin, &TopologyConfig::default());
    FeatureSet::compute(&twin, reference, &skill, &topology)
        .features
        .remove(0)
}

#[test]
fn test_burnout_archetype_shifts_mode() {
    let mut a = Activity::new("A", "Task");
    a.planned_duration = Some(10.0);
    let features = features_of(&a);

    let params = modulate(
        &a,
        &features,
        &RiskArchetype::for_cluster(2),
        None,
        &SkillAnalysis::default(),
    );

    assert_eq!(params.base_duration, 10.0);
    assert!((params.mode() - 12.0).abs() < 1e-12);
    assert_eq!(params.variance_multiplier, 1.5);
    assert_eq!(params.failure_probability, 0.30);
}

#[test]
fn test_signals_combine_by_fixed_rules() {
    let mut a = Activity::new("A", "Task");
    a.baseline_duration = Some(10.0);
    a.planned_duration = Some(12.0);
    a.planned_cost = Some(10.0);
    a.actual_cost_to_date = Some(100.0);
    let features = features_of(&a);
    let topology = TopologyScore {
        betweenness: 0.0,
        eigenvector: 0.0,
        variance_multiplier: 1.25,
    };

    let params = modulate(
        &a,
        &features,
        &RiskArchetype::for_cluster(1),
        Some(&topology),
        &SkillAnalysis::default(),
    );

    // drift 0.2 + archetype 0.1
    assert!((params.mode_shift - 0.3).abs() < 1e-12);
    // skill 1.0 * topology 1.25 * archetype 1.2
    assert!((params.variance_multiplier - 1.5).abs() < 1e-12);
    // cost risk 0.3 beats archetype 0.15
    assert_eq!(params.failure_probability, 0.3);
    assert_eq!(params.base_duration, 12.0);
}

#[test]
fn test_neutral_parameters() {
    let p = SimulationParameters::neutral(4.0);
    assert_eq!(p.mode(), 4.0);
    assert_eq!(p.variance_multiplier, 1.0);
    assert_eq!(p.failure_probability, 0.0);
}
