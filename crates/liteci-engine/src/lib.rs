//! The compile façade: the full six-stage pipeline behind one call.
//!
//! ```text
//! load → normalize → validate → expand → plan/bind → graph → render
//! ```
//!
//! Every stage is synchronous and fail-fast; the first error aborts the
//! run and nothing is written. [`compile`] returns the in-memory plan;
//! writing it is a separate step ([`write_plan`]) so that no artifact
//! exists on any failure path.

use std::collections::BTreeMap;
use std::path::Path;

use liteci_core::{Plan, Result};
use liteci_expand::Expander;
use liteci_loader::CompositionRegistry;
use liteci_planner::{CompositionBinding, JobGraph, JobPlanner};

pub use liteci_render::{debug_dump, write_plan};

/// Compile an intent against a compositions root into an ordered plan.
pub fn compile(intent_path: impl AsRef<Path>, compositions_root: &str) -> Result<Plan> {
    compile_with_env(intent_path, compositions_root, None)
}

/// Like [`compile`], but restricts expansion to one named environment.
pub fn compile_with_env(
    intent_path: impl AsRef<Path>,
    compositions_root: &str,
    environment: Option<&str>,
) -> Result<Plan> {
    let intent_path = intent_path.as_ref();

    tracing::info!(path = %intent_path.display(), "loading intent");
    let intent = liteci_loader::load_intent(intent_path)?;

    tracing::info!(root = %compositions_root, "loading compositions");
    let registry = liteci_loader::load_compositions(compositions_root)?;

    tracing::info!("normalizing intent");
    let normalized = liteci_core::normalize(intent)?;

    tracing::info!("validating components against composition schemas");
    registry.validate_all(&normalized)?;

    tracing::info!(environment = ?environment, "expanding environment × component");
    let instances = Expander::new(&normalized).expand_filtered(environment)?;

    tracing::info!("binding jobs and resolving dependencies");
    let mut planner = JobPlanner::new(bindings_for(&registry));
    let jobs = planner.plan_jobs(&instances)?;

    tracing::info!(jobs = jobs.len(), "ordering job graph");
    let graph = JobGraph::new(&jobs);
    graph.detect_cycles()?;
    let order = graph.topological_sort()?;

    tracing::info!("rendering plan");
    let plan = liteci_render::render_plan(
        &normalized.metadata,
        &jobs,
        &order,
        registry.job_bindings(),
    );
    Ok(plan)
}

fn bindings_for(registry: &CompositionRegistry) -> BTreeMap<String, CompositionBinding> {
    registry
        .types
        .iter()
        .map(|(name, comp)| {
            (
                name.clone(),
                CompositionBinding {
                    type_name: name.clone(),
                    default_job: comp.default_job().cloned(),
                },
            )
        })
        .collect()
}
