//! The expanded form of a component: one instance per selected
//! (environment, component) pair, carrying fully merged configuration.

use serde_json::Value;
use std::collections::BTreeMap;

use super::intent::ResolvedDependency;

/// One materialization of a component for one environment.
///
/// `inputs` is the result of the merge precedence (environment < group <
/// component) with template interpolation applied; `policies` is the
/// group/environment policy union, carried but not enforced; `path` is the
/// resolved working directory.
#[derive(Debug, Clone)]
pub struct ComponentInstance {
    pub component: String,
    pub environment: String,
    pub type_name: String,
    pub domain: String,
    pub labels: BTreeMap<String, String>,
    pub inputs: BTreeMap<String, Value>,
    pub policies: BTreeMap<String, Value>,
    pub path: String,
    pub depends_on: Vec<ResolvedDependency>,
}
