//! Shared utilities for CLI commands

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use rl_core::{parse_date, Activity, CoreError, EngineConfig};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::cli::GlobalArgs;

/// Everything a command needs: validated activities, engine config and the
/// status date.
#[derive(Debug)]
pub(crate) struct RunContext {
    pub activities: Vec<Activity>,
    /// One entry per rejected input record
    pub load_warnings: Vec<String>,
    pub config: EngineConfig,
    pub reference_date: NaiveDate,
}

impl RunContext {
    /// Load the activity file and configuration named on the command line.
    pub(crate) fn load(file: &str, global: &GlobalArgs) -> Result<Self> {
        let config = load_config(global)?;
        let reference_date = reference_date(global)?;
        let (activities, load_warnings) = Activity::load_file(Path::new(file))
            .with_context(|| format!("Failed to load activities from {}", file))?;
        if activities.is_empty() && !load_warnings.is_empty() {
            bail!("No valid activities in {}", file);
        }
        log::debug!(
            "{} activities, reference date {}",
            activities.len(),
            reference_date
        );
        Ok(Self {
            activities,
            load_warnings,
            config,
            reference_date,
        })
    }
}

/// Config from `--config`, else `riskline.yml` in the current directory,
/// else defaults.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<EngineConfig> {
    if let Some(path) = &global.config {
        return EngineConfig::load(Path::new(path)).context("Failed to load configuration file");
    }
    match EngineConfig::load_from_dir(Path::new(".")) {
        Ok(config) => Ok(config),
        Err(CoreError::ConfigNotFound { .. }) => Ok(EngineConfig::default()),
        Err(e) => Err(e).context("Failed to load riskline.yml"),
    }
}

/// `--reference-date` if given, else today.
pub(crate) fn reference_date(global: &GlobalArgs) -> Result<NaiveDate> {
    match &global.reference_date {
        Some(raw) => parse_date(raw).ok_or_else(|| {
            anyhow!(
                "Invalid reference date '{}', expected YYYY-MM-DD or DD-MM-YYYY",
                raw
            )
        }),
        None => Ok(Local::now().date_naive()),
    }
}

/// Run CPU-bound engine work off the async runtime, bounded by the
/// configured timeout.
pub(crate) async fn run_blocking<T, F>(timeout_secs: Option<u64>, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);
    let joined = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), handle)
            .await
            .map_err(|_| anyhow!("Forecast did not finish within {}s", secs))?,
        None => handle.await,
    };
    joined.context("Engine task failed")
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Warnings go to stderr so JSON on stdout stays parseable.
pub(crate) fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

/// Truncate `s` to `width` characters, marking the cut with `~`.
pub(crate) fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
