use super::*;
use std::collections::BTreeMap;

fn forecast(p50: i64, p80: i64, mean: f64, std: f64, progress: f64) -> ForecastResult {
    ForecastResult {
        p50,
        p80,
        p90: p80 + 1,
        p95: p80 + 2,
        mean,
        std,
        min: 0.0,
        max: 0.0,
        current_progress_pct: progress,
        criticality_indices: BTreeMap::new(),
        num_simulations: 100,
        forensic_modulation_applied: false,
        warnings: Vec::new(),
        forensic_insights: None,
        explanation: None,
    }
}

#[test]
fn test_forecast_explanation_behind_baseline() {
    let explainer = Explainer::new().unwrap();
    let result = forecast(20, 28, 21.0, 4.0, 35.0);

    let explanation = explainer.explain_forecast(&result, Some(15), 2).unwrap();

    assert_eq!(
        explanation.plain_language,
        "Your project will most likely finish in 20 days (50% confidence). \
         This means there's a 50% chance you'll complete the project on or before day 20. \
         In the worst-case scenario (80% confidence), it could take up to 28 days, \
         which is 8 days longer than the most likely scenario. \
         This is 5 days later than your baseline of 15 days. \
         Current progress: 35.0% complete. \
         The significant difference between most likely and worst-case suggests high \
         uncertainty in the project schedule. \
         Consider reviewing high-risk activities to reduce this uncertainty."
    );
    assert_eq!(
        explanation.key_insights,
        vec![
            "Project is 5 days behind baseline schedule".to_string(),
            "Moderate schedule uncertainty - monitor high-risk activities".to_string(),
            "2 high-risk activities detected - review mitigation options".to_string(),
        ]
    );
    assert_eq!(explanation.confidence_intervals.uncertainty_range, 8);
    assert_eq!(
        explanation.confidence_intervals.uncertainty_level,
        UncertaintyLevel::High
    );
    assert_eq!(explanation.confidence_intervals.p50_ci_95.lower, 13);
    assert_eq!(explanation.confidence_intervals.p50_ci_95.upper, 28);
}

#[test]
fn test_forecast_explanation_tight_and_ahead() {
    let explainer = Explainer::new().unwrap();
    let result = forecast(10, 11, 10.0, 0.0, 0.0);

    let explanation = explainer.explain_forecast(&result, Some(11), 0).unwrap();

    assert!(explanation
        .plain_language
        .contains("This is 1 day ahead of your baseline of 11 days."));
    assert!(explanation
        .plain_language
        .ends_with("indicates relatively low schedule uncertainty."));
    assert!(!explanation.plain_language.contains("Current progress"));
    assert_eq!(explanation.confidence_intervals.p50_ci_95.lower, 8);
    assert_eq!(explanation.confidence_intervals.p50_ci_95.upper, 12);
    assert_eq!(
        explanation.key_insights,
        vec!["Project is 1 day ahead of baseline schedule".to_string()]
    );
}

#[test]
fn test_zero_baseline_is_ignored() {
    let explainer = Explainer::new().unwrap();
    let explanation = explainer
        .explain_forecast(&forecast(10, 14, 10.0, 1.0, 0.0), Some(0), 0)
        .unwrap();

    assert_eq!(explanation.baseline_days, None);
    assert!(!explanation.plain_language.contains("baseline"));
}

#[test]
fn test_risk_score_explanations() {
    let explainer = Explainer::new().unwrap();

    assert_eq!(
        explainer.explain_risk_score(82.345, "High").unwrap(),
        "This activity has a high risk score of 82.3/100. \
         This means it has a significant chance of causing project delays. \
         Immediate attention and mitigation actions are recommended."
    );
    assert!(explainer
        .explain_risk_score(50.0, "medium")
        .unwrap()
        .starts_with("This activity has a medium risk score of 50.0/100."));
    assert!(explainer
        .explain_risk_score(5.0, "low")
        .unwrap()
        .contains("currently on track"));
}
