//! Plain-language explanations of forecasts and risk scores.
//!
//! Sentences live in minijinja templates; numbers are formatted on the Rust
//! side so templates stay free of formatting logic. Rendered text is
//! whitespace-normalized, which lets the templates span several lines.

use crate::error::FcResult;
use crate::monte_carlo::ForecastResult;
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

const FORECAST_TEMPLATE: &str = r#"
Your project will most likely finish in {{ p50 }} days (50% confidence).
This means there's a 50% chance you'll complete the project on or before day {{ p50 }}.
{% if p80 > p50 %}
  In the worst-case scenario (80% confidence), it could take up to {{ p80 }} days,
  which is {{ p80 - p50 }} days longer than the most likely scenario.
{% endif %}
{% if baseline_days %}
  {% if p50 > baseline_days %}
    This is {{ p50 - baseline_days }} day{{ delay_suffix }} later than your baseline of {{ baseline_days }} days.
  {% elif p50 < baseline_days %}
    This is {{ baseline_days - p50 }} day{{ delay_suffix }} ahead of your baseline of {{ baseline_days }} days.
  {% else %}
    This matches your baseline of {{ baseline_days }} days.
  {% endif %}
{% endif %}
{% if has_progress %}Current progress: {{ progress }}% complete.{% endif %}
{% if p80 - p50 > 5 %}
  The significant difference between most likely and worst-case suggests high uncertainty in the project schedule.
  Consider reviewing high-risk activities to reduce this uncertainty.
{% elif p80 - p50 <= 2 %}
  The small difference between scenarios indicates relatively low schedule uncertainty.
{% endif %}
"#;

const RISK_TEMPLATE: &str = r#"
{% if level == "high" %}
  This activity has a high risk score of {{ score }}/100.
  This means it has a significant chance of causing project delays.
  Immediate attention and mitigation actions are recommended.
{% elif level == "medium" %}
  This activity has a medium risk score of {{ score }}/100.
  While not critical, it should be monitored closely.
  Consider preventive actions to avoid escalation.
{% else %}
  This activity has a low risk score of {{ score }}/100.
  It's currently on track, but continue monitoring as project conditions change.
{% endif %}
"#;

/// 95% interval around the mean finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: i64,
    pub upper: i64,
    pub interpretation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyLevel {
    Low,
    Medium,
    High,
}

impl UncertaintyLevel {
    /// Classify the P80 − P50 gap in days.
    pub fn from_range(range: i64) -> Self {
        if range > 5 {
            UncertaintyLevel::High
        } else if range > 2 {
            UncertaintyLevel::Medium
        } else {
            UncertaintyLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceSummary {
    pub p50_ci_95: ConfidenceInterval,
    pub uncertainty_range: i64,
    pub uncertainty_level: UncertaintyLevel,
}

/// Human-readable account of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastExplanation {
    pub plain_language: String,
    pub p50: i64,
    pub p80: i64,
    pub p90: i64,
    pub p95: i64,
    pub current_progress: f64,
    pub baseline_days: Option<i64>,
    pub confidence_intervals: ConfidenceSummary,
    pub key_insights: Vec<String>,
}

/// Renders explanations from the built-in templates.
pub struct Explainer {
    env: Environment<'static>,
}

impl Explainer {
    pub fn new() -> FcResult<Self> {
        let mut env = Environment::new();
        env.add_template("forecast", FORECAST_TEMPLATE)?;
        env.add_template("risk", RISK_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Explain a forecast, optionally against a baseline duration.
    ///
    /// `high_risk_activities` adds an insight when non-zero.
    pub fn explain_forecast(
        &self,
        forecast: &ForecastResult,
        baseline_days: Option<i64>,
        high_risk_activities: usize,
    ) -> FcResult<ForecastExplanation> {
        let baseline_days = baseline_days.filter(|d| *d != 0);
        let p50 = forecast.p50;
        let p80 = forecast.p80;
        let gap = baseline_days.map(|b| (p50 - b).abs()).unwrap_or(0);

        let rendered = self.env.get_template("forecast")?.render(context! {
            p50 => p50,
            p80 => p80,
            baseline_days => baseline_days,
            delay_suffix => plural_suffix(gap),
            has_progress => forecast.current_progress_pct > 0.0,
            progress => format!("{:.1}", forecast.current_progress_pct),
        })?;

        Ok(ForecastExplanation {
            plain_language: normalize_whitespace(&rendered),
            p50,
            p80,
            p90: forecast.p90,
            p95: forecast.p95,
            current_progress: forecast.current_progress_pct,
            baseline_days,
            confidence_intervals: confidence_summary(forecast),
            key_insights: key_insights(forecast, baseline_days, high_risk_activities),
        })
    }

    /// Explain a 0–100 risk score with its level (`high`, `medium`, `low`).
    pub fn explain_risk_score(&self, score: f64, level: &str) -> FcResult<String> {
        let rendered = self.env.get_template("risk")?.render(context! {
            score => format!("{:.1}", score),
            level => level.to_lowercase(),
        })?;
        Ok(normalize_whitespace(&rendered))
    }
}

fn confidence_summary(forecast: &ForecastResult) -> ConfidenceSummary {
    let (lower, upper) = if forecast.std > 0.0 {
        let lower = (forecast.mean - 1.96 * forecast.std).trunc().max(0.0) as i64;
        let upper = (forecast.mean + 1.96 * forecast.std).trunc() as i64;
        (lower, upper)
    } else {
        (forecast.p50 - 2, forecast.p50 + 2)
    };
    let range = forecast.p80 - forecast.p50;

    ConfidenceSummary {
        p50_ci_95: ConfidenceInterval {
            lower,
            upper,
            interpretation: format!(
                "95% confident that actual completion will be between {} and {} days",
                lower, upper
            ),
        },
        uncertainty_range: range,
        uncertainty_level: UncertaintyLevel::from_range(range),
    }
}

fn key_insights(
    forecast: &ForecastResult,
    baseline_days: Option<i64>,
    high_risk_activities: usize,
) -> Vec<String> {
    let mut insights = Vec::new();
    let p50 = forecast.p50;

    if let Some(baseline) = baseline_days {
        if p50 > baseline {
            let delay = p50 - baseline;
            insights.push(format!(
                "Project is {} day{} behind baseline schedule",
                delay,
                plural_suffix(delay)
            ));
        } else if p50 < baseline {
            let ahead = baseline - p50;
            insights.push(format!(
                "Project is {} day{} ahead of baseline schedule",
                ahead,
                plural_suffix(ahead)
            ));
        }
    }

    let uncertainty = forecast.p80 - p50;
    if uncertainty > 10 {
        insights.push("High schedule uncertainty - consider risk mitigation strategies".to_string());
    } else if uncertainty > 5 {
        insights.push("Moderate schedule uncertainty - monitor high-risk activities".to_string());
    }

    if high_risk_activities > 0 {
        insights.push(format!(
            "{} high-risk activities detected - review mitigation options",
            high_risk_activities
        ));
    }

    insights
}

fn plural_suffix(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "explain_test.rs"]
mod tests;
