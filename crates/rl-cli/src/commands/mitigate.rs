//! Mitigate command implementation

use anyhow::{bail, Result};
use rl_forecast::{
    rank_mitigations, simulate_mitigation, ActivityChange, MitigationComparison, MitigationPlan,
};

use crate::cli::{GlobalArgs, MitigateArgs, OutputFormat};
use crate::commands::common::{fit, print_json, print_warnings, run_blocking, RunContext};

/// Execute the mitigate command
pub async fn execute(args: &MitigateArgs, global: &GlobalArgs) -> Result<()> {
    let RunContext {
        activities,
        load_warnings,
        config,
        ..
    } = RunContext::load(&args.file, global)?;
    print_warnings(&load_warnings);

    let change = change_from_args(args)?;
    let activity_id = args.activity.clone();
    let timeout_secs = config.forecast.timeout_secs;

    if change.is_empty() {
        let plan = run_blocking(timeout_secs, move || {
            rank_mitigations(&activities, &activity_id, &config)
        })
        .await??;
        print_warnings(&plan.baseline_forecast.warnings);
        match args.output {
            OutputFormat::Json => print_json(&plan)?,
            OutputFormat::Table => print_plan(&plan),
        }
    } else {
        let comparison = run_blocking(timeout_secs, move || {
            simulate_mitigation(&activities, &activity_id, &change, &config)
        })
        .await??;
        print_warnings(&comparison.original_forecast.warnings);
        match args.output {
            OutputFormat::Json => print_json(&comparison)?,
            OutputFormat::Table => print_comparison(&comparison),
        }
    }

    Ok(())
}

fn change_from_args(args: &MitigateArgs) -> Result<ActivityChange> {
    if let Some(duration) = args.duration {
        if !(duration.is_finite() && duration > 0.0) {
            bail!("--duration must be a positive number of days");
        }
    }
    if let Some(fraction) = args.reduce_risk {
        if !(0.0..=1.0).contains(&fraction) {
            bail!("--reduce-risk must be between 0 and 1");
        }
    }
    if let Some(fte) = args.fte {
        if !(fte.is_finite() && fte >= 0.0) {
            bail!("--fte must not be negative");
        }
    }
    Ok(ActivityChange {
        new_duration: args.duration,
        risk_reduction: args.reduce_risk,
        new_fte: args.fte,
        new_cost: args.cost,
    })
}

fn print_plan(plan: &MitigationPlan) {
    println!(
        "Mitigations for {} (baseline P50 {}, P80 {})",
        plan.activity_id, plan.baseline_forecast.p50, plan.baseline_forecast.p80
    );
    println!();
    println!(
        "  {:<4} {:<40} {:>5} {:>5} {:>7} {:>7} {:>8}",
        "RANK", "ACTION", "P50", "P80", "ΔP50", "ΔP80", "UTILITY"
    );
    println!(
        "  {:-<4} {:-<40} {:->5} {:->5} {:->7} {:->7} {:->8}",
        "", "", "", "", "", "", ""
    );
    for (rank, m) in plan.ranked_mitigations.iter().enumerate() {
        println!(
            "  {:<4} {:<40} {:>5} {:>5} {:>7.1} {:>7.1} {:>8.2}",
            rank + 1,
            fit(&m.action.description, 40),
            m.p50_new,
            m.p80_new,
            m.p50_improvement,
            m.p80_improvement,
            m.utility_score
        );
    }
    println!();
    println!("{} options evaluated", plan.total_options);
}

fn print_comparison(comparison: &MitigationComparison) {
    let before = &comparison.original_forecast;
    let after = &comparison.new_forecast;
    let gain = &comparison.improvement;
    println!("Mitigation of {}", comparison.activity_id);
    println!();
    println!("  {:<4} {:>8} {:>8} {:>8}", "", "BEFORE", "AFTER", "GAIN");
    println!(
        "  {:<4} {:>8} {:>8} {:>8}  ({:.1}%)",
        "P50", before.p50, after.p50, gain.p50_improvement, gain.p50_improvement_pct
    );
    println!(
        "  {:<4} {:>8} {:>8} {:>8}  ({:.1}%)",
        "P80", before.p80, after.p80, gain.p80_improvement, gain.p80_improvement_pct
    );
}
