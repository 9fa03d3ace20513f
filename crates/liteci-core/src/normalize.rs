//! Intent canonicalization.
//!
//! The normalizer is the only stage permitted to apply defaults or
//! restructure references. It rejects structurally invalid intents,
//! defaults dependency fields, expands wildcard selectors in declaration
//! order, and builds the name indices every later stage assumes.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::intent::{Component, Intent, NormalizedIntent};

/// Sentinel written into a dependency whose target environment was left
/// empty; resolved to the dependent's environment during expansion.
pub const SAME_ENVIRONMENT: &str = "__same__";

/// Selector entry matching every declared component.
pub const WILDCARD: &str = "*";

const DEFAULT_SCOPE: &str = "same-environment";
const DEFAULT_CONDITION: &str = "success";

/// Transform a raw intent into canonical form.
pub fn normalize(intent: Intent) -> Result<NormalizedIntent> {
    if intent.metadata.name.is_empty() {
        return Err(Error::InvalidIntent {
            reason: "intent must have a name".to_string(),
        });
    }

    let mut components_by_name: BTreeMap<String, Component> = BTreeMap::new();
    let mut declared_order: Vec<String> = Vec::with_capacity(intent.components.len());

    for mut comp in intent.components {
        if comp.name.is_empty() {
            return Err(Error::InvalidIntent {
                reason: "component must have a name".to_string(),
            });
        }
        if comp.type_name.is_empty() {
            return Err(Error::InvalidIntent {
                reason: format!("component {} must have a type", comp.name),
            });
        }
        if !comp.domain.is_empty() && !intent.groups.contains_key(&comp.domain) {
            return Err(Error::InvalidIntent {
                reason: format!(
                    "component {} references unknown domain {}",
                    comp.name, comp.domain
                ),
            });
        }
        if components_by_name.contains_key(&comp.name) {
            return Err(Error::InvalidIntent {
                reason: format!("duplicate component name {}", comp.name),
            });
        }

        for dep in &mut comp.depends_on {
            if dep.environment.is_empty() {
                dep.environment = SAME_ENVIRONMENT.to_string();
            }
            if dep.scope.is_empty() {
                dep.scope = DEFAULT_SCOPE.to_string();
            }
            if dep.condition.is_empty() {
                dep.condition = DEFAULT_CONDITION.to_string();
            }
        }

        declared_order.push(comp.name.clone());
        components_by_name.insert(comp.name.clone(), comp);
    }

    let mut environments = intent.environments;
    for (env_name, env) in environments.iter_mut() {
        if env.selectors.components.iter().any(|c| c == WILDCARD) {
            env.selectors.components = declared_order.clone();
        }
        for selected in &env.selectors.components {
            if !components_by_name.contains_key(selected) {
                return Err(Error::InvalidIntent {
                    reason: format!(
                        "environment {} selects unknown component {}",
                        env_name, selected
                    ),
                });
            }
        }
    }

    let component_index = components_by_name.clone();

    Ok(NormalizedIntent {
        metadata: intent.metadata,
        groups: intent.groups,
        environments,
        components_by_name,
        component_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::intent::{Dependency, Environment, Group, Metadata, Selectors};

    fn component(name: &str, type_name: &str) -> Component {
        Component {
            name: name.to_string(),
            type_name: type_name.to_string(),
            ..Default::default()
        }
    }

    fn intent_with(components: Vec<Component>) -> Intent {
        Intent {
            metadata: Metadata {
                name: "demo".to_string(),
                ..Default::default()
            },
            components,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_unnamed_intent() {
        let err = normalize(Intent::default()).unwrap_err();
        assert!(err.to_string().contains("intent must have a name"));
    }

    #[test]
    fn rejects_component_without_type() {
        let intent = intent_with(vec![component("web", "")]);
        let err = normalize(intent).unwrap_err();
        assert!(err.to_string().contains("web must have a type"));
    }

    #[test]
    fn rejects_duplicate_component_names() {
        let intent = intent_with(vec![component("web", "helm"), component("web", "helm")]);
        let err = normalize(intent).unwrap_err();
        assert!(err.to_string().contains("duplicate component name web"));
    }

    #[test]
    fn rejects_unknown_domain() {
        let mut comp = component("web", "helm");
        comp.domain = "platform".to_string();
        let intent = intent_with(vec![comp]);
        let err = normalize(intent).unwrap_err();
        assert!(err.to_string().contains("unknown domain platform"));
    }

    #[test]
    fn accepts_declared_domain() {
        let mut comp = component("web", "helm");
        comp.domain = "platform".to_string();
        let mut intent = intent_with(vec![comp]);
        intent
            .groups
            .insert("platform".to_string(), Group::default());
        assert!(normalize(intent).is_ok());
    }

    #[test]
    fn defaults_dependency_fields() {
        let mut comp = component("web", "helm");
        comp.depends_on.push(Dependency {
            component: "db".to_string(),
            ..Default::default()
        });
        let intent = intent_with(vec![comp, component("db", "helm")]);

        let normalized = normalize(intent).unwrap();
        let dep = &normalized.components_by_name["web"].depends_on[0];
        assert_eq!(dep.environment, SAME_ENVIRONMENT);
        assert_eq!(dep.scope, "same-environment");
        assert_eq!(dep.condition, "success");
    }

    #[test]
    fn preserves_explicit_dependency_fields() {
        let mut comp = component("web", "helm");
        comp.depends_on.push(Dependency {
            component: "db".to_string(),
            environment: "shared".to_string(),
            scope: "cross-environment".to_string(),
            condition: "always".to_string(),
        });
        let mut intent = intent_with(vec![comp, component("db", "helm")]);
        intent
            .environments
            .insert("shared".to_string(), Environment::default());

        let normalized = normalize(intent).unwrap();
        let dep = &normalized.components_by_name["web"].depends_on[0];
        assert_eq!(dep.environment, "shared");
        assert_eq!(dep.scope, "cross-environment");
        assert_eq!(dep.condition, "always");
    }

    #[test]
    fn expands_wildcard_in_declaration_order() {
        let mut intent = intent_with(vec![
            component("zeta", "helm"),
            component("alpha", "helm"),
            component("mid", "helm"),
        ]);
        intent.environments.insert(
            "staging".to_string(),
            Environment {
                selectors: Selectors {
                    components: vec![WILDCARD.to_string()],
                    domains: Vec::new(),
                },
                ..Default::default()
            },
        );

        let normalized = normalize(intent).unwrap();
        assert_eq!(
            normalized.environments["staging"].selectors.components,
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn rejects_selector_of_unknown_component() {
        let mut intent = intent_with(vec![component("web", "helm")]);
        intent.environments.insert(
            "prod".to_string(),
            Environment {
                selectors: Selectors {
                    components: vec!["api".to_string()],
                    domains: Vec::new(),
                },
                ..Default::default()
            },
        );

        let err = normalize(intent).unwrap_err();
        assert!(err.to_string().contains("unknown component api"));
    }

    #[test]
    fn indices_agree() {
        let intent = intent_with(vec![component("web", "helm"), component("db", "postgres")]);
        let normalized = normalize(intent).unwrap();
        assert_eq!(
            normalized.components_by_name.len(),
            normalized.component_index.len()
        );
        for (name, comp) in &normalized.components_by_name {
            assert_eq!(normalized.component_index[name].type_name, comp.type_name);
        }
    }
}
