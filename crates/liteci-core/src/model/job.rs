//! Job registry documents loaded from composition directories, and the
//! materialized job instances the planner produces from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A `job.yaml` document: the named jobs available for one component type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobRegistry {
    pub api_version: String,
    pub kind: String,
    pub metadata: super::intent::Metadata,
    pub jobs: Vec<JobSpec>,
}

/// A complete job specification with ordered steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSpec {
    pub name: String,
    pub description: String,
    pub timeout: String,
    pub retries: u32,
    pub steps: Vec<StepSpec>,
    pub inputs: BTreeMap<String, Value>,
    pub labels: BTreeMap<String, String>,
}

/// A single execution unit within a job. `run` is a template string with
/// `{{.Name}}`-style placeholders, rendered by the planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepSpec {
    pub name: String,
    pub run: String,
    pub timeout: String,
    pub retry: u32,
    /// `stop` or `continue`; unset means `stop` at execution time.
    pub on_failure: String,
}

/// A step with every template placeholder substituted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderedStep {
    pub name: String,
    pub run: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timeout: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub retry: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub on_failure: String,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// A materialized job for one component in one environment: a node of the
/// final DAG.
#[derive(Debug, Clone)]
pub struct JobInstance {
    /// `"{component}@{environment}.{jobName}"`, globally unique.
    pub id: String,
    pub name: String,
    pub component: String,
    pub environment: String,
    pub composition: String,
    pub path: String,
    pub steps: Vec<RenderedStep>,
    /// Job ids this instance must run after. De-duplicated and sorted.
    pub depends_on: Vec<String>,
    pub timeout: String,
    pub retries: u32,
    /// The component instance's merged inputs.
    pub config: BTreeMap<String, Value>,
    pub labels: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_parses_wire_format() {
        let yaml = r#"
apiVersion: sourceplane.io/v1
kind: JobRegistry
metadata:
  name: helm-jobs
  description: Helm deployment jobs
jobs:
  - name: deploy
    description: Deploy a chart
    timeout: 10m
    retries: 2
    steps:
      - name: upgrade
        run: "helm upgrade {{.Component}}"
        onFailure: continue
"#;
        let registry: JobRegistry = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(registry.kind, "JobRegistry");
        assert_eq!(registry.metadata.name, "helm-jobs");
        assert_eq!(registry.jobs.len(), 1);
        assert_eq!(registry.jobs[0].steps[0].on_failure, "continue");
        assert_eq!(registry.jobs[0].retries, 2);
    }

    #[test]
    fn rendered_step_omits_empty_fields() {
        let step = RenderedStep {
            name: "build".to_string(),
            run: "make".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(!json.contains("timeout"));
        assert!(!json.contains("retry"));
        assert!(!json.contains("onFailure"));
    }
}
