//! `liteci plan`: run the full pipeline and write the plan artifact.

use anyhow::Result;
use std::path::Path;

pub fn run(
    config_dir: &str,
    intent: &Path,
    output: &Path,
    env: Option<&str>,
    debug: bool,
) -> Result<()> {
    let plan = liteci_engine::compile_with_env(intent, config_dir, env)?;

    if debug {
        println!("{}", liteci_engine::debug_dump(&plan));
    }

    liteci_engine::write_plan(&plan, output)?;

    println!("✓ Plan generated with {} jobs", plan.jobs.len());
    println!("✓ Saved to: {}", output.display());
    Ok(())
}
