//! `liteci component`: list components with their merged, expanded
//! properties across environments.

use anyhow::{anyhow, Result};
use std::path::Path;

use liteci_expand::{ComponentAnalyzer, ComponentMerged};

pub fn run(name: Option<&str>, intent_path: &Path, long: bool) -> Result<()> {
    let intent = liteci_loader::load_intent(intent_path)?;
    let normalized = liteci_core::normalize(intent)?;
    let analyzer = ComponentAnalyzer::new(&normalized);

    if let Some(name) = name {
        let component = analyzer
            .get_component(name)?
            .ok_or_else(|| anyhow!("component not found: {}", name))?;
        print_details(&component);
        return Ok(());
    }

    let components = analyzer.list_all()?;
    if components.is_empty() {
        println!("No components found");
        return Ok(());
    }

    println!("Components:");
    for component in &components {
        if long {
            print_details(component);
        } else {
            println!(
                "  {} (type: {}, domain: {}, enabled: {}, environments: {})",
                component.name,
                component.type_name,
                component.domain,
                component.enabled,
                component.instances.len()
            );
        }
    }

    if !long {
        println!("\nRun 'liteci component <name>' for detailed information");
    }
    Ok(())
}

fn print_details(component: &ComponentMerged) {
    println!("\n[Component] {}", component.name);
    println!("  Type:       {}", component.type_name);
    println!("  Domain:     {}", component.domain);
    println!("  Enabled:    {}", component.enabled);

    if !component.dependencies.is_empty() {
        println!("  Dependencies: {}", component.dependencies.join(", "));
    }

    println!("  Instances ({}):", component.instances.len());
    for instance in &component.instances {
        println!("    [{}] path={}", instance.environment, instance.path);
        if !instance.inputs.is_empty() {
            println!("      Inputs:");
            for (key, value) in &instance.inputs {
                println!("        {}: {}", key, value);
            }
        }
        if !instance.policies.is_empty() {
            println!("      Policies:");
            for (key, value) in &instance.policies {
                println!("        {}: {}", key, value);
            }
        }
    }
}
