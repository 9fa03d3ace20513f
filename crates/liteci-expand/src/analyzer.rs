//! Merged per-component views across environments, for listing and
//! inspection frontends.

use std::collections::BTreeMap;

use liteci_core::{ComponentInstance, NormalizedIntent, Result};

use crate::expander::Expander;

/// A component with its expanded instances collected across every
/// environment that selects it.
#[derive(Debug, Clone)]
pub struct ComponentMerged {
    pub name: String,
    pub type_name: String,
    pub domain: String,
    pub enabled: bool,
    pub instances: Vec<ComponentInstance>,
    /// Names of the components this one declares dependencies on.
    pub dependencies: Vec<String>,
}

/// Analysis over an expanded intent.
pub struct ComponentAnalyzer<'a> {
    normalized: &'a NormalizedIntent,
}

impl<'a> ComponentAnalyzer<'a> {
    pub fn new(normalized: &'a NormalizedIntent) -> Self {
        Self { normalized }
    }

    /// Expand all environments and regroup the instances by component.
    pub fn list_all(&self) -> Result<Vec<ComponentMerged>> {
        let instances = Expander::new(self.normalized).expand()?;

        let mut by_component: BTreeMap<String, Vec<ComponentInstance>> = BTreeMap::new();
        for env_instances in instances.into_values() {
            for inst in env_instances {
                by_component.entry(inst.component.clone()).or_default().push(inst);
            }
        }

        let mut result = Vec::new();
        for (name, comp) in &self.normalized.components_by_name {
            let instances = by_component.remove(name).unwrap_or_default();
            result.push(ComponentMerged {
                name: name.clone(),
                type_name: comp.type_name.clone(),
                domain: comp.domain.clone(),
                enabled: comp.enabled,
                dependencies: comp.depends_on.iter().map(|d| d.component.clone()).collect(),
                instances,
            });
        }
        Ok(result)
    }

    /// Merged view of a single component, if declared.
    pub fn get_component(&self, name: &str) -> Result<Option<ComponentMerged>> {
        Ok(self.list_all()?.into_iter().find(|c| c.name == name))
    }
}
