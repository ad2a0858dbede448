//! Risks command implementation

use anyhow::{Context, Result};
use rl_risk::{ActivityRisk, LinearRiskPredictor, ProjectRisks, RiskPredictor};
use std::path::Path;

use crate::cli::{GlobalArgs, OutputFormat, RisksArgs};
use crate::commands::common::{fit, print_json, print_warnings, RunContext};

/// Execute the risks command
pub async fn execute(args: &RisksArgs, global: &GlobalArgs) -> Result<()> {
    let RunContext {
        activities,
        load_warnings,
        mut config,
        reference_date,
    } = RunContext::load(&args.file, global)?;
    print_warnings(&load_warnings);

    let model = match &args.model {
        Some(path) => Some(
            LinearRiskPredictor::load(Path::new(path)).context("Failed to load risk model")?,
        ),
        None => None,
    };
    // Supplying a model is an explicit request to use it.
    if model.is_some() {
        config.scoring.use_ml = true;
    }
    let predictor = model.as_ref().map(|m| m as &dyn RiskPredictor);

    let risks = ProjectRisks::compute(&activities, &config, reference_date, predictor)
        .context("Risk scoring failed")?;
    print_warnings(&risks.warnings);

    let shown = match args.top {
        Some(n) => risks.top(n),
        None => &risks.risks[..],
    };

    match args.output {
        OutputFormat::Json => print_json(&shown)?,
        OutputFormat::Table => print_table(shown, risks.len()),
    }

    Ok(())
}

fn print_table(risks: &[ActivityRisk], total: usize) {
    let id_width = risks
        .iter()
        .map(|r| r.activity_id.len())
        .max()
        .unwrap_or(2)
        .clamp(2, 16);
    let name_width = 28;

    println!(
        "{:<id_width$}  {:<name_width$}  {:>5}  {:<6}  {:<6}  {:<8}  {:<8}  {:<11}",
        "ID", "NAME", "SCORE", "LEVEL", "DELAY", "CRITICAL", "RESOURCE", "METHOD",
    );
    println!(
        "{:-<id_width$}  {:-<name_width$}  {:->5}  {:-<6}  {:-<6}  {:-<8}  {:-<8}  {:-<11}",
        "", "", "", "", "", "", "", "",
    );
    for risk in risks {
        let factors = &risk.risk_factors;
        println!(
            "{:<id_width$}  {:<name_width$}  {:>5.1}  {:<6}  {:<6}  {:<8}  {:<8}  {:<11}",
            fit(risk.activity_id.as_str(), id_width),
            fit(&risk.name, name_width),
            risk.risk_score,
            risk.risk_level.as_str(),
            factors.delay.as_str(),
            factors.critical_path.as_str(),
            factors.resource.as_str(),
            factors.prediction_method.as_str(),
        );
    }
    println!();
    println!("Showing {} of {} activities", risks.len(), total);
}
