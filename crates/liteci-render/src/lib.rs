//! Plan assembly and serialization.
//!
//! The renderer turns ordered job instances into the final `Plan`
//! artifact and writes it to disk. The output format follows the file
//! extension: `.yaml`/`.yml` produce YAML, everything else JSON with
//! two-space indent.

use std::collections::BTreeMap;
use std::fs;
use std::fmt::Write as _;
use std::path::Path;

use liteci_core::{
    Error, JobInstance, Metadata, Plan, PlanJob, PlanSpec, Result, API_VERSION, WORKFLOW_KIND,
};

/// Assemble a plan from job instances in the given topological order.
///
/// `job_bindings` maps composition type to job registry name and is
/// emitted sorted under `spec.jobBindings`.
pub fn render_plan(
    metadata: &Metadata,
    jobs: &BTreeMap<String, JobInstance>,
    order: &[String],
    job_bindings: BTreeMap<String, String>,
) -> Plan {
    let mut plan_jobs = Vec::with_capacity(order.len());
    for job_id in order {
        let Some(job) = jobs.get(job_id) else {
            continue;
        };
        let registry_name = job_bindings
            .get(&job.composition)
            .cloned()
            .unwrap_or_default();

        plan_jobs.push(PlanJob {
            id: job.id.clone(),
            name: job.name.clone(),
            component: job.component.clone(),
            environment: job.environment.clone(),
            composition: job.composition.clone(),
            job_registry: registry_name,
            job: job.name.clone(),
            path: job.path.clone(),
            steps: job.steps.clone(),
            depends_on: job.depends_on.clone(),
            timeout: job.timeout.clone(),
            retries: job.retries,
            env: job.config.clone(),
            labels: job.labels.clone(),
            config: job.config.clone(),
        });
    }

    Plan {
        api_version: API_VERSION.to_string(),
        kind: WORKFLOW_KIND.to_string(),
        metadata: Metadata {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            namespace: String::new(),
        },
        spec: PlanSpec {
            job_bindings,
        },
        jobs: plan_jobs,
    }
}

/// Serialize a plan as pretty-printed JSON.
pub fn to_json(plan: &Plan) -> Result<String> {
    serde_json::to_string_pretty(plan).map_err(|source| Error::SerializeJson { source })
}

/// Serialize a plan as YAML.
pub fn to_yaml(plan: &Plan) -> Result<String> {
    serde_yaml::to_string(plan).map_err(|source| Error::SerializeYaml { source })
}

/// Write a plan to a file, choosing the format from the extension and
/// creating parent directories as needed.
pub fn write_plan(plan: &Plan, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|source| Error::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    let data = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => to_yaml(plan)?,
        _ => to_json(plan)?,
    };

    fs::write(path, data).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Compact textual summary of a plan, for debug output.
pub fn debug_dump(plan: &Plan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Plan: {} ({})",
        plan.metadata.name, plan.metadata.description
    );
    let _ = writeln!(out, "Jobs: {}\n", plan.jobs.len());

    for job in &plan.jobs {
        let _ = writeln!(out, "Job: {}", job.id);
        let _ = writeln!(out, "  Component: {}", job.component);
        let _ = writeln!(out, "  Environment: {}", job.environment);
        let _ = writeln!(out, "  Composition: {}", job.composition);
        let _ = writeln!(out, "  Steps: {}", job.steps.len());
        let _ = writeln!(out, "  DependsOn: {:?}\n", job.depends_on);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use liteci_core::RenderedStep;
    use serde_json::json;

    fn one_job() -> (BTreeMap<String, JobInstance>, Vec<String>) {
        let mut config = BTreeMap::new();
        config.insert("image".to_string(), json!("w:1"));
        let job = JobInstance {
            id: "web@prod.deploy".to_string(),
            name: "deploy".to_string(),
            component: "web".to_string(),
            environment: "prod".to_string(),
            composition: "helm".to_string(),
            path: "./".to_string(),
            steps: vec![RenderedStep {
                name: "upgrade".to_string(),
                run: "helm upgrade web".to_string(),
                ..Default::default()
            }],
            depends_on: Vec::new(),
            timeout: "10m".to_string(),
            retries: 1,
            config,
            labels: BTreeMap::new(),
        };
        let order = vec![job.id.clone()];
        let mut jobs = BTreeMap::new();
        jobs.insert(job.id.clone(), job);
        (jobs, order)
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "demo".to_string(),
            description: "demo intent".to_string(),
            namespace: "ignored".to_string(),
        }
    }

    #[test]
    fn plan_carries_fixed_header_and_bindings() {
        let (jobs, order) = one_job();
        let bindings = [("helm".to_string(), "helm-jobs".to_string())].into();
        let plan = render_plan(&metadata(), &jobs, &order, bindings);

        assert_eq!(plan.api_version, "sourceplane.io/v1");
        assert_eq!(plan.kind, "Workflow");
        assert_eq!(plan.metadata.name, "demo");
        assert_eq!(plan.spec.job_bindings["helm"], "helm-jobs");
        assert_eq!(plan.jobs[0].job_registry, "helm-jobs");
        assert_eq!(plan.jobs[0].env, plan.jobs[0].config);
    }

    #[test]
    fn jobs_follow_supplied_order() {
        let (mut jobs, _) = one_job();
        let mut second = jobs["web@prod.deploy"].clone();
        second.id = "api@prod.deploy".to_string();
        second.component = "api".to_string();
        jobs.insert(second.id.clone(), second);

        let order = vec!["web@prod.deploy".to_string(), "api@prod.deploy".to_string()];
        let plan = render_plan(&metadata(), &jobs, &order, BTreeMap::new());
        let ids: Vec<_> = plan.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["web@prod.deploy", "api@prod.deploy"]);
    }

    #[test]
    fn extension_selects_format() {
        let (jobs, order) = one_job();
        let plan = render_plan(&metadata(), &jobs, &order, BTreeMap::new());
        let tmp = tempfile::TempDir::new().unwrap();

        let yaml_path = tmp.path().join("plan.yaml");
        write_plan(&plan, &yaml_path).unwrap();
        let yaml = fs::read_to_string(&yaml_path).unwrap();
        assert!(yaml.contains("apiVersion: sourceplane.io/v1"));

        let json_path = tmp.path().join("plan.json");
        write_plan(&plan, &json_path).unwrap();
        let json = fs::read_to_string(&json_path).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.contains("  \"apiVersion\": \"sourceplane.io/v1\""));
    }

    #[test]
    fn parent_directories_are_created() {
        let (jobs, order) = one_job();
        let plan = render_plan(&metadata(), &jobs, &order, BTreeMap::new());
        let tmp = tempfile::TempDir::new().unwrap();

        let nested = tmp.path().join("out/deep/plan.json");
        write_plan(&plan, &nested).unwrap();
        assert!(nested.is_file());
    }

    #[test]
    fn json_round_trip_preserves_plan() {
        let (jobs, order) = one_job();
        let bindings = [("helm".to_string(), "helm-jobs".to_string())].into();
        let plan = render_plan(&metadata(), &jobs, &order, bindings);

        let reparsed: Plan = serde_json::from_str(&to_json(&plan).unwrap()).unwrap();
        assert_eq!(reparsed.jobs.len(), plan.jobs.len());
        assert_eq!(reparsed.jobs[0].id, plan.jobs[0].id);
        assert_eq!(reparsed.jobs[0].config, plan.jobs[0].config);
        assert_eq!(reparsed.spec.job_bindings, plan.spec.job_bindings);
    }

    #[test]
    fn debug_dump_lists_jobs() {
        let (jobs, order) = one_job();
        let plan = render_plan(&metadata(), &jobs, &order, BTreeMap::new());
        let dump = debug_dump(&plan);
        assert!(dump.contains("Jobs: 1"));
        assert!(dump.contains("Job: web@prod.deploy"));
    }
}
