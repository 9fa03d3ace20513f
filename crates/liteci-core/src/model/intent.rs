//! Intent document types: the user-authored declaration of desired
//! deployment, plus its canonical (normalized) form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Top-level declarative deployment document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Intent {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub groups: BTreeMap<String, Group>,
    pub environments: BTreeMap<String, Environment>,
    pub components: Vec<Component>,
}

/// Standard object metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub namespace: String,
}

/// A domain group: ownership defaults and policy constraints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub policies: BTreeMap<String, Value>,
    pub defaults: BTreeMap<String, Value>,
}

/// A runtime environment: which components it selects and what
/// configuration it injects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub selectors: Selectors,
    pub defaults: BTreeMap<String, Value>,
    pub policies: BTreeMap<String, Value>,
}

/// Selection of components and domains for an environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub components: Vec<String>,
    pub domains: Vec<String>,
}

/// Execution-agnostic component declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Component {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub domain: String,
    pub enabled: bool,
    /// Working-directory hint; resolved against group/environment defaults
    /// during expansion.
    pub path: String,
    pub inputs: BTreeMap<String, Value>,
    pub labels: BTreeMap<String, String>,
    pub depends_on: Vec<Dependency>,
}

impl Default for Component {
    fn default() -> Self {
        Self {
            name: String::new(),
            type_name: String::new(),
            domain: String::new(),
            enabled: true,
            path: String::new(),
            inputs: BTreeMap::new(),
            labels: BTreeMap::new(),
            depends_on: Vec::new(),
        }
    }
}

/// Inter-component execution constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependency {
    pub component: String,
    /// Empty means "same environment as the dependent"; normalized to the
    /// `__same__` sentinel and resolved during expansion.
    pub environment: String,
    /// `same-environment` or `cross-environment`.
    pub scope: String,
    /// `success`, `always`, or `failure`.
    pub condition: String,
}

/// A dependency with its target environment made concrete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub component: String,
    pub environment: String,
    pub scope: String,
    pub condition: String,
}

/// Canonical internal representation of an intent.
///
/// Produced by [`crate::normalize::normalize`]; downstream stages may
/// assume its invariants: names present and unique, dependency fields
/// defaulted, selector wildcards expanded, both indices in agreement.
#[derive(Debug, Clone, Default)]
pub struct NormalizedIntent {
    pub metadata: Metadata,
    pub groups: BTreeMap<String, Group>,
    pub environments: BTreeMap<String, Environment>,
    /// Primary store, keyed by component name.
    pub components_by_name: BTreeMap<String, Component>,
    /// Fast-lookup mirror of `components_by_name`.
    pub component_index: BTreeMap<String, Component>,
}
