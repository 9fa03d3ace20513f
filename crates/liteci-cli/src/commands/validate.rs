//! `liteci validate`: check an intent without producing a plan.

use anyhow::Result;
use std::path::Path;

pub fn run(config_dir: &str, intent_path: &Path) -> Result<()> {
    let intent = liteci_loader::load_intent(intent_path)?;
    println!("✓ Intent parses");

    let normalized = liteci_core::normalize(intent)?;
    println!("✓ Intent is structurally valid");

    let registry = liteci_loader::load_compositions(config_dir)?;
    registry.validate_all(&normalized)?;
    println!(
        "✓ All {} components pass their composition schemas",
        normalized.components_by_name.len()
    );
    Ok(())
}
