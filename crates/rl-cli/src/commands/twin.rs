//! Twin command implementation

use anyhow::Result;
use rl_core::{planned_durations, ActivityId, ActivityTiming, CriticalPathEngine, DigitalTwin};
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat, TwinArgs};
use crate::commands::common::{print_json, print_warnings, RunContext};

/// Graph status and deterministic schedule of a project.
#[derive(Debug, Serialize)]
struct TwinSummary {
    activity_count: usize,
    node_count: usize,
    edge_count: usize,
    has_cycles: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle_warning: Option<String>,
    processing_order: Vec<ActivityId>,
    project_finish: f64,
    critical_path: Vec<ActivityId>,
    timings: Vec<ActivityTiming>,
}

impl TwinSummary {
    fn build(twin: &DigitalTwin) -> Self {
        let activities = twin.activities();
        let cpm = CriticalPathEngine::new(twin).compute(&planned_durations(activities));
        let processing_order = twin
            .processing_order()
            .iter()
            .map(|&i| activities[i].id.clone())
            .collect();
        Self {
            activity_count: twin.len(),
            node_count: twin.node_count(),
            edge_count: twin.edge_count(),
            has_cycles: twin.has_cycles(),
            cycle_warning: twin.cycle_warning().map(String::from),
            processing_order,
            project_finish: cpm.project_finish,
            critical_path: cpm.critical_ids().into_iter().cloned().collect(),
            timings: cpm.timings,
        }
    }
}

/// Execute the twin command
pub async fn execute(args: &TwinArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RunContext::load(&args.file, global)?;
    print_warnings(&ctx.load_warnings);

    let summary = TwinSummary::build(&DigitalTwin::build(&ctx.activities));
    if let Some(warning) = &summary.cycle_warning {
        print_warnings(std::slice::from_ref(warning));
    }

    match args.output {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Table => print_table(&summary),
    }

    Ok(())
}

fn print_table(summary: &TwinSummary) {
    let phantoms = summary.node_count.saturating_sub(summary.activity_count);
    println!(
        "{} activities, {} dependencies, {} phantom nodes, {}",
        summary.activity_count,
        summary.edge_count,
        phantoms,
        if summary.has_cycles { "CYCLIC" } else { "acyclic" }
    );
    println!("Planned finish: {:.1} days", summary.project_finish);
    println!();

    let id_width = summary
        .timings
        .iter()
        .map(|t| t.activity_id.len())
        .max()
        .unwrap_or(2)
        .max(2);
    println!(
        "{:<id_width$}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
        "ID", "DURATION", "ES", "EF", "LS", "LF", "FLOAT"
    );
    println!(
        "{:-<id_width$}  {:->8}  {:->8}  {:->8}  {:->8}  {:->8}  {:->8}",
        "", "", "", "", "", "", ""
    );
    for timing in &summary.timings {
        let marker = if timing.critical { " *" } else { "" };
        println!(
            "{:<id_width$}  {:>8.1}  {:>8.1}  {:>8.1}  {:>8.1}  {:>8.1}  {:>8.1}{}",
            timing.activity_id.as_str(),
            timing.duration,
            timing.early_start,
            timing.early_finish,
            timing.late_start,
            timing.late_finish,
            timing.total_float,
            marker
        );
    }
    println!();
    let path: Vec<&str> = summary.critical_path.iter().map(|id| id.as_str()).collect();
    println!("Critical path: {}", path.join(" -> "));
}
