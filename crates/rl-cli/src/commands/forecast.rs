//! Forecast command implementation

use anyhow::{bail, Result};
use rl_forecast::{baseline_critical_days, standard_forecast, Explainer, ForecastResult, ForensicForecast};
use rl_risk::ProjectRisks;

use crate::cli::{ForecastArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{fit, print_json, print_warnings, run_blocking, RunContext};

/// Criticality rows shown in the table view.
const CRITICAL_ROWS: usize = 10;

/// Execute the forecast command
pub async fn execute(args: &ForecastArgs, global: &GlobalArgs) -> Result<()> {
    let RunContext {
        activities,
        load_warnings,
        mut config,
        reference_date,
    } = RunContext::load(&args.file, global)?;
    print_warnings(&load_warnings);

    if let Some(simulations) = args.simulations {
        if simulations == 0 {
            bail!("--simulations must be at least 1");
        }
        config.forecast.simulations = simulations;
    }
    if args.seed.is_some() {
        config.forecast.seed = args.seed;
    }

    let standard = args.standard;
    let explain = args.explain;
    let timeout_secs = config.forecast.timeout_secs;

    let forecast = run_blocking(timeout_secs, move || -> Result<ForecastResult> {
        let mut forecast = if standard {
            standard_forecast(&activities, &config)
        } else {
            ForensicForecast::run(&activities, &config, reference_date).forecast
        };
        if explain {
            let risks = ProjectRisks::compute(&activities, &config, reference_date, None)?;
            let explanation = Explainer::new()?.explain_forecast(
                &forecast,
                baseline_critical_days(&activities),
                risks.high_risk_count(),
            )?;
            forecast.explanation = Some(explanation);
        }
        Ok(forecast)
    })
    .await??;

    print_warnings(&forecast.warnings);
    match args.output {
        OutputFormat::Json => print_json(&forecast)?,
        OutputFormat::Table => print_table(&forecast),
    }

    Ok(())
}

fn print_table(forecast: &ForecastResult) {
    let mode = if forecast.forensic_modulation_applied {
        "forensic"
    } else {
        "standard"
    };
    println!(
        "Forecast ({}, {} simulations)",
        mode, forecast.num_simulations
    );
    println!();
    println!("  {:<6} {:>6}", "P50", forecast.p50);
    println!("  {:<6} {:>6}", "P80", forecast.p80);
    println!("  {:<6} {:>6}", "P90", forecast.p90);
    println!("  {:<6} {:>6}", "P95", forecast.p95);
    println!(
        "  Mean {:.1} days (std {:.1}, range {:.1} - {:.1})",
        forecast.mean, forecast.std, forecast.min, forecast.max
    );
    println!("  Progress {:.1}%", forecast.current_progress_pct);

    if let Some(insights) = &forecast.forensic_insights {
        println!(
            "  Insights: {} drifting, {} skill bottlenecks, {} in high-risk clusters, {} bridge nodes",
            insights.drift_activities,
            insights.skill_bottlenecks,
            insights.high_risk_clusters,
            insights.bridge_nodes
        );
    }

    let critical = forecast.most_critical(CRITICAL_ROWS);
    if !critical.is_empty() {
        println!();
        println!("  {:<24} {:>11}", "ACTIVITY", "CRITICALITY");
        println!("  {:-<24} {:->11}", "", "");
        for (id, index) in critical {
            println!("  {:<24} {:>10.1}%", fit(id.as_str(), 24), index * 100.0);
        }
    }

    if let Some(explanation) = &forecast.explanation {
        println!();
        println!("{}", explanation.plain_language);
        for insight in &explanation.key_insights {
            println!("  - {}", insight);
        }
    }
}
