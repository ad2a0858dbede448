//! Hash command implementation

use anyhow::{Context, Result};
use rl_core::CacheKey;

use crate::cli::{GlobalArgs, HashArgs};
use crate::commands::common::{print_warnings, RunContext};

/// Execute the hash command
///
/// Prints the three parts of the result-cache key, tab separated.
pub async fn execute(args: &HashArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RunContext::load(&args.file, global)?;
    print_warnings(&ctx.load_warnings);

    let key = CacheKey::for_activities(args.project_id.clone(), &ctx.activities)
        .context("Failed to hash activities")?;
    println!(
        "{}\t{}\t{}",
        key.project_id, key.activity_count, key.content_hash
    );
    Ok(())
}
