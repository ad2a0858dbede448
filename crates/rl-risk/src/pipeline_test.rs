use super::*;
use crate::error::PredictorError;
use crate::predictor::PredictionMethod;

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn project() -> Vec<Activity> {
    let mut late = Activity::new("LATE", "Steel delivery");
    late.planned_start = Some(day(1));
    late.planned_finish = Some(day(21));
    late.baseline_finish = Some(day(11));
    late.planned_duration = Some(20.0);
    late.risk_probability = 0.6;
    late.risk_delay_impact_days = 10.0;
    late.on_critical_path = true;
    late.total_float = Some(0.0);

    let mut calm = Activity::new("CALM", "Site office");
    calm.planned_duration = Some(5.0);
    calm.total_float = Some(20.0);
    calm.percent_complete = 100.0;

    let mut next = Activity::new("NEXT", "Erection");
    next.planned_duration = Some(10.0);
    next.predecessors = vec!["LATE".to_string()];
    next.total_float = Some(3.0);

    vec![calm, late, next]
}

struct Fixed(f64);

impl RiskPredictor for Fixed {
    fn predict(&self, _features: &ActivityFeatures) -> PredictorResult<f64> {
        Ok(self.0)
    }
}

struct Broken;

impl RiskPredictor for Broken {
    fn predict(&self, _features: &ActivityFeatures) -> PredictorResult<f64> {
        Err(PredictorError::PredictionFailed {
            message: "no model".to_string(),
        })
    }
}

#[test]
fn test_risks_sorted_descending() {
    let risks =
        ProjectRisks::compute(&project(), &EngineConfig::default(), reference(), None).unwrap();

    assert_eq!(risks.len(), 3);
    assert!(risks
        .risks
        .windows(2)
        .all(|w| w[0].risk_score >= w[1].risk_score));
    assert_eq!(risks.risks[0].activity_id, "LATE");
    assert!(risks.warnings.is_empty());
}

#[test]
fn test_scores_bounded_and_labeled() {
    let risks =
        ProjectRisks::compute(&project(), &EngineConfig::default(), reference(), None).unwrap();

    for risk in &risks.risks {
        assert!((0.0..=100.0).contains(&risk.risk_score));
        assert_eq!(risk.risk_level, RiskLevel::from_score(risk.risk_score));
        assert_eq!(risk.risk_factors.prediction_method, PredictionMethod::Rule);
        assert_eq!(risk.features.activity_id, risk.activity_id);
    }

    let late = risks.get("LATE").unwrap();
    assert_eq!(late.name, "Steel delivery");
    assert!(late.on_critical_path);
    assert_eq!(late.risk_factors.critical_path, RiskLevel::High);
    // 10 days late with no float
    assert_eq!(late.risk_factors.delay, RiskLevel::High);
    assert!(late.topology.is_some());

    assert!(risks.get("MISSING").is_none());
}

#[test]
fn test_top_caps_at_population() {
    let risks =
        ProjectRisks::compute(&project(), &EngineConfig::default(), reference(), None).unwrap();

    assert_eq!(risks.top(2).len(), 2);
    assert_eq!(risks.top(2)[0].activity_id, risks.risks[0].activity_id);
    assert_eq!(risks.top(10).len(), 3);
    assert!(risks.top(0).is_empty());
}

#[test]
fn test_equal_scores_keep_input_order() {
    let activities = vec![
        Activity::new("B", "Second"),
        Activity::new("A", "First"),
        Activity::new("C", "Third"),
    ];
    let risks =
        ProjectRisks::compute(&activities, &EngineConfig::default(), reference(), None).unwrap();

    let order: Vec<&str> = risks.risks.iter().map(|r| r.activity_id.as_str()).collect();
    assert_eq!(order, vec!["B", "A", "C"]);
}

#[test]
fn test_ml_predictor_blends() {
    let mut config = EngineConfig::default();
    config.scoring.use_ml = true;
    config.scoring.ml_weight = 1.0;

    let predictor = Fixed(64.0);
    let risks =
        ProjectRisks::compute(&project(), &config, reference(), Some(&predictor)).unwrap();

    assert!(risks.risks.iter().all(|r| r.risk_score == 64.0));
    assert!(risks
        .risks
        .iter()
        .all(|r| r.risk_factors.prediction_method == PredictionMethod::Ml));
    assert_eq!(risks.risks[0].risk_level, RiskLevel::Medium);
}

#[test]
fn test_failing_predictor() {
    let mut config = EngineConfig::default();
    config.scoring.use_ml = true;

    let risks = ProjectRisks::compute(&project(), &config, reference(), Some(&Broken)).unwrap();
    assert!(risks
        .risks
        .iter()
        .all(|r| r.risk_factors.prediction_method == PredictionMethod::MlFallback));

    config.scoring.fallback_to_rule = false;
    let err = ProjectRisks::compute(&project(), &config, reference(), Some(&Broken)).unwrap_err();
    assert!(err.to_string().contains("[PE001]"));
}

#[test]
fn test_cycle_surfaces_as_warning() {
    let mut a = Activity::new("A", "Design");
    a.predecessors = vec!["B".to_string()];
    let mut b = Activity::new("B", "Review");
    b.predecessors = vec!["A".to_string()];

    let risks =
        ProjectRisks::compute(&[a, b], &EngineConfig::default(), reference(), None).unwrap();

    assert_eq!(risks.len(), 2);
    assert!(risks.warnings.iter().any(|w| w.contains("cycle")));
}

#[test]
fn test_empty_project() {
    let risks = ProjectRisks::compute(&[], &EngineConfig::default(), reference(), None).unwrap();
    assert!(risks.is_empty());
    assert_eq!(risks.high_risk_count(), 0);
}
