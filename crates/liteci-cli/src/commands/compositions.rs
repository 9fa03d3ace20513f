//! `liteci compositions`: list loaded compositions and inspect their job
//! registries and schema surfaces.

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::BTreeMap;

use liteci_loader::Composition;

/// Metadata extracted from a composition for display.
struct CompositionInfo {
    name: String,
    registry_name: String,
    registry_description: String,
    default_job: String,
    jobs: Vec<JobLine>,
    required_fields: Vec<String>,
    supported_fields: BTreeMap<String, String>,
}

struct JobLine {
    name: String,
    description: String,
    scope: String,
    steps: usize,
    timeout: String,
}

pub fn run(config_dir: &str, name: Option<&str>, long: bool, expand_jobs: bool) -> Result<()> {
    let registry = liteci_loader::load_compositions(config_dir)?;

    if let Some(name) = name {
        let composition = registry
            .get(name)
            .ok_or_else(|| anyhow!("composition not found: {}", name))?;
        print_long(&extract_info(composition), expand_jobs, composition);
        return Ok(());
    }

    if long {
        for composition in registry.types.values() {
            print_long(&extract_info(composition), expand_jobs, composition);
        }
        return Ok(());
    }

    println!("Available Compositions:");
    for (name, composition) in &registry.types {
        let description = if composition.registry_description.is_empty() {
            composition
                .default_job()
                .map(|j| j.description.clone())
                .unwrap_or_default()
        } else {
            composition.registry_description.clone()
        };
        println!("  {:<20}  {}", name, description);
    }
    println!("\nRun 'liteci compositions <name>' for detailed information");
    Ok(())
}

fn extract_info(composition: &Composition) -> CompositionInfo {
    let jobs = composition
        .jobs
        .iter()
        .map(|job| JobLine {
            name: job.name.clone(),
            description: job.description.clone(),
            scope: job.labels.get("scope").cloned().unwrap_or_default(),
            steps: job.steps.len(),
            timeout: job.timeout.clone(),
        })
        .collect();

    let mut required_fields = Vec::new();
    if let Some(required) = composition.schema_document.get("required").and_then(Value::as_array) {
        for field in required {
            if let Some(field) = field.as_str() {
                required_fields.push(field.to_string());
            }
        }
    }

    let mut supported_fields = BTreeMap::new();
    if let Some(props) = composition
        .schema_document
        .get("properties")
        .and_then(Value::as_object)
    {
        for (field, schema) in props {
            let description = schema
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            supported_fields.insert(field.clone(), description.to_string());
        }
    }

    CompositionInfo {
        name: composition.name.clone(),
        registry_name: composition.registry_name.clone(),
        registry_description: composition.registry_description.clone(),
        default_job: composition
            .default_job()
            .map(|j| j.name.clone())
            .unwrap_or_default(),
        jobs,
        required_fields,
        supported_fields,
    }
}

fn print_long(info: &CompositionInfo, expand_jobs: bool, composition: &Composition) {
    println!("\nComposition: {}", info.name);

    println!("JobRegistry Binding:");
    if !info.registry_name.is_empty() {
        println!("  Registry Name: {}", info.registry_name);
    }
    if !info.registry_description.is_empty() {
        println!("  Registry Desc: {}", info.registry_description);
    }
    println!("  Default Job:   {}", info.default_job);
    println!("  Total Jobs:    {}\n", info.jobs.len());

    println!("Available Jobs:");
    for (i, job) in info.jobs.iter().enumerate() {
        let marker = if job.name == info.default_job { "★" } else { " " };
        let scope = if job.scope.is_empty() {
            String::new()
        } else {
            format!(" [{}]", job.scope)
        };
        println!("{} {}. {}{}", marker, i + 1, job.name, scope);
        if !job.description.is_empty() {
            println!("     Description: {}", job.description);
        }
        println!("     Steps: {} | Timeout: {}", job.steps, job.timeout);
    }

    if !expand_jobs {
        return;
    }

    if !info.required_fields.is_empty() {
        println!("\nRequired Fields:");
        for field in &info.required_fields {
            println!("  • {}", field);
        }
    }

    if !info.supported_fields.is_empty() {
        println!("\nSupported Input Fields:");
        for (field, description) in &info.supported_fields {
            if description.is_empty() {
                println!("  • {}", field);
            } else {
                println!("  • {:<20} - {}", field, description);
            }
        }
    }

    if let Some(job) = composition.default_job() {
        println!("\nJob Steps (for {} job):", job.name);
        for (i, step) in job.steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step.name);
            if !step.timeout.is_empty() {
                println!("     Timeout: {}", step.timeout);
            }
            if step.retry > 0 {
                println!("     Retry: {}", step.retry);
            }
            println!("     Command: {}", step.run);
        }
    }
}
