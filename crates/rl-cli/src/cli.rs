//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Riskline - Monte Carlo schedule forecasts and activity risk scores
#[derive(Parser, Debug)]
#[command(name = "rl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine config file (default: riskline.yml in the current directory)
    #[arg(short, long, global = true, env = "RISKLINE_CONFIG")]
    pub config: Option<String>,

    /// Status date for progress and anomaly checks (default: today)
    #[arg(short, long, global = true)]
    pub reference_date: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Monte Carlo completion forecast
    Forecast(ForecastArgs),

    /// Rank activities by risk score
    Risks(RisksArgs),

    /// Report zombie tasks and overloaded resources
    Anomalies(AnomaliesArgs),

    /// Rank or simulate mitigations for one activity
    Mitigate(MitigateArgs),

    /// Show dependency graph status and the planned critical path
    Twin(TwinArgs),

    /// Print the content hash used as cache key
    Hash(HashArgs),
}

/// Output formats shared by the reporting commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

/// Arguments for the forecast command
#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// JSON file with an array of activity records
    pub file: String,

    /// Override the number of simulation runs
    #[arg(short = 'n', long)]
    pub simulations: Option<usize>,

    /// Seed for a reproducible forecast
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip forensic modulation and sample from the risk register only
    #[arg(long)]
    pub standard: bool,

    /// Add a plain-language explanation
    #[arg(short, long)]
    pub explain: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the risks command
#[derive(Args, Debug)]
pub struct RisksArgs {
    /// JSON file with an array of activity records
    pub file: String,

    /// Show only the N riskiest activities
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Linear risk model (JSON) to blend with the rule score
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the anomalies command
#[derive(Args, Debug)]
pub struct AnomaliesArgs {
    /// JSON file with an array of activity records
    pub file: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the mitigate command
///
/// Without any change flags every candidate action is ranked; with one or
/// more of them that single change is simulated against the baseline.
#[derive(Args, Debug)]
pub struct MitigateArgs {
    /// JSON file with an array of activity records
    pub file: String,

    /// Activity to mitigate
    #[arg(short, long)]
    pub activity: String,

    /// New planned duration in days
    #[arg(long)]
    pub duration: Option<f64>,

    /// Fraction (0-1) by which to cut risk probability and impact
    #[arg(long)]
    pub reduce_risk: Option<f64>,

    /// New FTE allocation
    #[arg(long)]
    pub fte: Option<f64>,

    /// New planned cost
    #[arg(long)]
    pub cost: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the twin command
#[derive(Args, Debug)]
pub struct TwinArgs {
    /// JSON file with an array of activity records
    pub file: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the hash command
#[derive(Args, Debug)]
pub struct HashArgs {
    /// JSON file with an array of activity records
    pub file: String,

    /// Project id to include in the printed cache key
    #[arg(long, default_value = "default")]
    pub project_id: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
