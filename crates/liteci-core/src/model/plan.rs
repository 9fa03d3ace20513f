//! The final plan artifact: an execution-ready workflow DAG.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::intent::Metadata;
use super::job::RenderedStep;

/// The serialized output of a planning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Plan {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: PlanSpec,
    /// Topologically ordered: every job appears after everything in its
    /// `dependsOn` list.
    pub jobs: Vec<PlanJob>,
}

/// Plan-level bindings: which job registry serves each composition type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanSpec {
    pub job_bindings: BTreeMap<String, String>,
}

/// The execution unit of the final plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanJob {
    pub id: String,
    pub name: String,
    pub component: String,
    pub environment: String,
    pub composition: String,
    /// Name of the job registry the bound job came from.
    pub job_registry: String,
    /// The specific job taken from the registry.
    pub job: String,
    pub path: String,
    pub steps: Vec<RenderedStep>,
    pub depends_on: Vec<String>,
    pub timeout: String,
    pub retries: u32,
    pub env: BTreeMap<String, Value>,
    pub labels: BTreeMap<String, String>,
    pub config: BTreeMap<String, Value>,
}
