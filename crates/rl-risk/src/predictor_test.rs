use super::*;
use chrono::NaiveDate;
use rl_analysis::{FeatureSet, SkillAnalysis, TopologyMetrics};
use rl_core::{Activity, DigitalTwin, TopologyConfig};
use std::io::Write;

fn features() -> ActivityFeatures {
    let mut activity = Activity::new("A", "Excavation");
    activity.planned_duration = Some(10.0);
    let twin = DigitalTwin::build(std::slice::from_ref(&activity));
    let topology = TopologyMetrics::compute(&twin, &TopologyConfig::default());
    let reference = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let mut f = FeatureSet::compute(&twin, reference, &SkillAnalysis::default(), &topology)
        .features
        .remove(0);
    f.delay_baseline_days = 10.0;
    f
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
            message: "model not trained".to_string(),
        })
    }
}

fn scoring(use_ml: bool, ml_weight: f64, fallback_to_rule: bool) -> ScoringConfig {
    ScoringConfig {
        use_ml,
        ml_weight,
        fallback_to_rule,
    }
}

#[test]
fn test_resolve_without_prediction_is_rule() {
    let (score, method) = resolve_prediction(42.0, None, 0.5, true).unwrap();
    assert_eq!(score, 42.0);
    assert_eq!(method, PredictionMethod::Rule);
}

#[test]
fn test_resolve_blends_by_weight() {
    let (score, method) = resolve_prediction(40.0, Some(Ok(80.0)), 0.5, true).unwrap();
    assert!((score - 60.0).abs() < 1e-9);
    assert_eq!(method, PredictionMethod::Ensemble);

    let (score, method) = resolve_prediction(40.0, Some(Ok(150.0)), 1.0, true).unwrap();
    assert_eq!(score, 100.0);
    assert_eq!(method, PredictionMethod::Ml);

    let (score, method) = resolve_prediction(40.0, Some(Ok(80.0)), 0.0, true).unwrap();
    assert_eq!(score, 40.0);
    assert_eq!(method, PredictionMethod::Rule);
}

#[test]
fn test_resolve_failure_respects_fallback() {
    let failed = || {
        Some(Err(PredictorError::PredictionFailed {
            message: "boom".to_string(),
        }))
    };

    let (score, method) = resolve_prediction(33.0, failed(), 0.5, true).unwrap();
    assert_eq!(score, 33.0);
    assert_eq!(method, PredictionMethod::MlFallback);

    let err = resolve_prediction(33.0, failed(), 0.5, false).unwrap_err();
    assert!(err.to_string().contains("[PE001]"));
}

#[test]
fn test_method_names() {
    assert_eq!(PredictionMethod::MlFallback.to_string(), "ml_fallback");
    assert_eq!(
        serde_json::to_string(&PredictionMethod::Ensemble).unwrap(),
        "\"ensemble\""
    );
}

#[test]
fn test_hybrid_ignores_predictor_when_ml_disabled() {
    let predictor = Fixed(90.0);
    let model = HybridRiskModel::new(Some(&predictor), &scoring(false, 0.5, true));
    assert!(!model.is_ml_available());

    let (score, method) = model.predict(&features(), 20.0).unwrap();
    assert_eq!(score, 20.0);
    assert_eq!(method, PredictionMethod::Rule);
}

#[test]
fn test_hybrid_ensemble() {
    let predictor = Fixed(90.0);
    let model = HybridRiskModel::new(Some(&predictor), &scoring(true, 0.25, true));
    assert!(model.is_ml_available());

    let (score, method) = model.predict(&features(), 10.0).unwrap();
    assert!((score - 30.0).abs() < 1e-9);
    assert_eq!(method, PredictionMethod::Ensemble);
}

#[test]
fn test_hybrid_failing_predictor_falls_back() {
    let model = HybridRiskModel::new(Some(&Broken), &scoring(true, 0.5, true));
    let (score, method) = model.predict(&features(), 55.0).unwrap();
    assert_eq!(score, 55.0);
    assert_eq!(method, PredictionMethod::MlFallback);

    let strict = HybridRiskModel::new(Some(&Broken), &scoring(true, 0.5, false));
    assert!(strict.predict(&features(), 55.0).is_err());
}

#[test]
fn test_hybrid_rejects_non_finite_scores() {
    let predictor = Fixed(f64::NAN);
    let strict = HybridRiskModel::new(Some(&predictor), &scoring(true, 0.5, false));
    let err = strict.predict(&features(), 10.0).unwrap_err();
    assert!(matches!(err, PredictorError::NonFiniteScore { ref activity_id } if activity_id == "A"));

    let lenient = HybridRiskModel::new(Some(&predictor), &scoring(true, 0.5, true));
    let (score, method) = lenient.predict(&features(), 10.0).unwrap();
    assert_eq!(score, 10.0);
    assert_eq!(method, PredictionMethod::MlFallback);
}

#[test]
fn test_linear_predictor_scores_and_clamps() {
    let weights = BTreeMap::from([
        ("delay_baseline_days".to_string(), 2.0),
        ("is_on_critical_path".to_string(), 30.0),
    ]);
    let model = LinearRiskPredictor::new(5.0, weights).unwrap();
    // 5 + 2 * 10 + 30 * 0
    assert!((model.predict(&features()).unwrap() - 25.0).abs() < 1e-9);

    let steep = LinearRiskPredictor::new(
        0.0,
        BTreeMap::from([("delay_baseline_days".to_string(), 50.0)]),
    )
    .unwrap();
    assert_eq!(steep.predict(&features()).unwrap(), 100.0);
}

#[test]
fn test_every_model_feature_resolves() {
    let f = features();
    for name in MODEL_FEATURES {
        assert!(model_feature(&f, name).is_some(), "missing {name}");
    }
    assert!(model_feature(&f, "shoe_size").is_none());
}

#[test]
fn test_linear_predictor_rejects_unknown_feature() {
    let err = LinearRiskPredictor::new(
        0.0,
        BTreeMap::from([("shoe_size".to_string(), 1.0)]),
    )
    .unwrap_err();
    assert!(matches!(err, PredictorError::UnknownFeature { ref name } if name == "shoe_size"));
}

#[test]
fn test_linear_predictor_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "intercept": 1.0, "weights": {{ "delay_baseline_days": 1.5 }} }}"#
    )
    .unwrap();

    let model = LinearRiskPredictor::load(file.path()).unwrap();
    assert_eq!(model.intercept, 1.0);
    assert!((model.predict(&features()).unwrap() - 16.0).abs() < 1e-9);
}

#[test]
fn test_linear_predictor_load_errors() {
    let missing = LinearRiskPredictor::load(Path::new("/nonexistent/model.json")).unwrap_err();
    assert!(missing.to_string().contains("[PE004]"));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "weights": {{}}, "trees": 100 }}"#).unwrap();
    let err = LinearRiskPredictor::load(file.path()).unwrap_err();
    assert!(matches!(err, PredictorError::ModelLoad { .. }));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "weights": {{ "shoe_size": 1.0 }} }}"#).unwrap();
    let err = LinearRiskPredictor::load(file.path()).unwrap_err();
    assert!(matches!(err, PredictorError::UnknownFeature { .. }));
}
