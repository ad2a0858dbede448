//! Anomalies command implementation

use anyhow::Result;
use rl_analysis::AnomalyReport;

use crate::cli::{AnomaliesArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{print_json, print_warnings, RunContext};

/// Execute the anomalies command
pub async fn execute(args: &AnomaliesArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RunContext::load(&args.file, global)?;
    print_warnings(&ctx.load_warnings);

    let report = AnomalyReport::detect(&ctx.activities, ctx.reference_date);

    match args.output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &AnomalyReport) {
    if report.total_anomalies == 0 {
        println!("No anomalies found");
        return;
    }

    if !report.zombie_tasks.is_empty() {
        println!("Zombie tasks ({})", report.zombie_tasks.len());
        for zombie in &report.zombie_tasks {
            let ready = if zombie.predecessors_ready {
                "predecessors done"
            } else {
                "blocked"
            };
            println!(
                "  {} {}: planned start {}, {} days overdue, {}",
                zombie.activity_id, zombie.name, zombie.planned_start, zombie.days_overdue, ready
            );
            if let Some(note) = &zombie.note {
                println!("    {}", note);
            }
        }
    }

    if !report.black_holes.is_empty() {
        if !report.zombie_tasks.is_empty() {
            println!();
        }
        println!("Resource black holes ({})", report.black_holes.len());
        for hole in &report.black_holes {
            println!(
                "  {}: peak {:.2} of {:.2} FTE ({:.0}%) across {} activities",
                hole.resource_id,
                hole.max_overlap_fte,
                hole.max_fte,
                hole.max_overlap_utilization * 100.0,
                hole.activity_count
            );
            if let Some((from, to)) = hole.max_overlap_period {
                println!("    peak period {} .. {}", from, to);
            }
            for overlap in &hole.critical_overlaps {
                let ids: Vec<&str> = overlap.activities.iter().map(|id| id.as_str()).collect();
                println!(
                    "    critical work {} .. {} at {:.0}%: {}",
                    overlap.period.0,
                    overlap.period.1,
                    overlap.utilization * 100.0,
                    ids.join(", ")
                );
            }
        }
    }
}
