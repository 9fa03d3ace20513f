//! The expansion stage: selection, configuration merge, path resolution,
//! policy union, and dependency environment resolution.

use std::collections::BTreeMap;

use serde_json::Value;

use liteci_core::{
    ComponentInstance, Environment, NormalizedIntent, ResolvedDependency, Result,
    SAME_ENVIRONMENT,
};

use crate::interpolate;

const PATH_KEY: &str = "path";
const DEFAULT_PATH: &str = "./";

/// Materializes component instances for each environment.
pub struct Expander<'a> {
    normalized: &'a NormalizedIntent,
}

impl<'a> Expander<'a> {
    pub fn new(normalized: &'a NormalizedIntent) -> Self {
        Self { normalized }
    }

    /// Expand every environment.
    pub fn expand(&self) -> Result<BTreeMap<String, Vec<ComponentInstance>>> {
        self.expand_filtered(None)
    }

    /// Expand a single named environment, or all of them when `None`.
    pub fn expand_filtered(
        &self,
        environment: Option<&str>,
    ) -> Result<BTreeMap<String, Vec<ComponentInstance>>> {
        let mut result = BTreeMap::new();

        for (env_name, env) in &self.normalized.environments {
            if let Some(filter) = environment {
                if env_name != filter {
                    continue;
                }
            }

            let mut instances = Vec::new();
            // Selector order is selection order; wildcards were already
            // expanded to declaration order by the normalizer.
            for comp_name in &env.selectors.components {
                let Some(comp) = self.normalized.component_index.get(comp_name) else {
                    continue;
                };
                if !comp.enabled {
                    continue;
                }
                instances.push(self.instantiate(comp_name, env_name, env));
            }

            tracing::debug!(
                environment = %env_name,
                instances = instances.len(),
                "expanded environment"
            );
            result.insert(env_name.clone(), instances);
        }

        Ok(result)
    }

    fn instantiate(&self, comp_name: &str, env_name: &str, env: &Environment) -> ComponentInstance {
        let comp = &self.normalized.component_index[comp_name];

        let (mut inputs, path) = self.merge_inputs(comp_name, env);
        for value in inputs.values_mut() {
            if let Value::String(s) = value {
                *value = Value::String(interpolate::render(s, env_name, &comp.domain, comp_name));
            }
        }
        let path = interpolate::render(&path, env_name, &comp.domain, comp_name);

        ComponentInstance {
            component: comp_name.to_string(),
            environment: env_name.to_string(),
            type_name: comp.type_name.clone(),
            domain: comp.domain.clone(),
            labels: comp.labels.clone(),
            inputs,
            policies: self.resolve_policies(&comp.domain, env),
            path,
            depends_on: resolve_dependencies(comp, env_name),
        }
    }

    /// Apply the merge precedence: environment defaults, then group
    /// defaults, then component inputs, later layers overriding earlier
    /// ones key by key. A `path` key in the environment or group layer is
    /// set aside and joins the explicit path priority instead.
    fn merge_inputs(
        &self,
        comp_name: &str,
        env: &Environment,
    ) -> (BTreeMap<String, Value>, String) {
        let comp = &self.normalized.component_index[comp_name];
        let mut merged = BTreeMap::new();
        let mut env_path = String::new();
        let mut group_path = String::new();

        for (k, v) in &env.defaults {
            if k == PATH_KEY {
                if let Value::String(s) = v {
                    env_path = s.clone();
                }
                continue;
            }
            merged.insert(k.clone(), v.clone());
        }

        if !comp.domain.is_empty() {
            if let Some(group) = self.normalized.groups.get(&comp.domain) {
                for (k, v) in &group.defaults {
                    if k == PATH_KEY {
                        if let Value::String(s) = v {
                            group_path = s.clone();
                        }
                        continue;
                    }
                    merged.insert(k.clone(), v.clone());
                }
            }
        }

        for (k, v) in &comp.inputs {
            merged.insert(k.clone(), v.clone());
        }

        let path = if !comp.path.is_empty() {
            comp.path.clone()
        } else if !group_path.is_empty() {
            group_path
        } else if !env_path.is_empty() {
            env_path
        } else {
            DEFAULT_PATH.to_string()
        };

        (merged, path)
    }

    /// Group policies overridden by environment policies. Carried on the
    /// instance as constraints; never merged into inputs, never
    /// interpolated.
    fn resolve_policies(&self, domain: &str, env: &Environment) -> BTreeMap<String, Value> {
        let mut policies = BTreeMap::new();
        if !domain.is_empty() {
            if let Some(group) = self.normalized.groups.get(domain) {
                for (k, v) in &group.policies {
                    policies.insert(k.clone(), v.clone());
                }
            }
        }
        for (k, v) in &env.policies {
            policies.insert(k.clone(), v.clone());
        }
        policies
    }
}

fn resolve_dependencies(
    comp: &liteci_core::Component,
    env_name: &str,
) -> Vec<ResolvedDependency> {
    comp.depends_on
        .iter()
        .map(|dep| ResolvedDependency {
            component: dep.component.clone(),
            environment: if dep.environment == SAME_ENVIRONMENT {
                env_name.to_string()
            } else {
                dep.environment.clone()
            },
            scope: dep.scope.clone(),
            condition: dep.condition.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use liteci_core::{normalize, Component, Dependency, Group, Intent, Metadata, Selectors};
    use serde_json::json;

    fn base_intent() -> Intent {
        Intent {
            metadata: Metadata {
                name: "demo".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn env_selecting(components: &[&str]) -> Environment {
        Environment {
            selectors: Selectors {
                components: components.iter().map(|s| s.to_string()).collect(),
                domains: Vec::new(),
            },
            ..Default::default()
        }
    }

    fn expand_one(intent: Intent) -> BTreeMap<String, Vec<ComponentInstance>> {
        let normalized = normalize(intent).unwrap();
        Expander::new(&normalized).expand().unwrap()
    }

    #[test]
    fn component_inputs_win_over_group_and_environment() {
        let mut intent = base_intent();
        intent.groups.insert(
            "platform".to_string(),
            Group {
                defaults: [
                    ("replicas".to_string(), json!(2)),
                    ("region".to_string(), json!("us-west-2")),
                ]
                .into(),
                ..Default::default()
            },
        );
        let mut env = env_selecting(&["web"]);
        env.defaults.insert("replicas".to_string(), json!(10));
        env.defaults.insert("loglevel".to_string(), json!("warn"));
        intent.environments.insert("prod".to_string(), env);
        intent.components.push(Component {
            name: "web".to_string(),
            type_name: "helm".to_string(),
            domain: "platform".to_string(),
            inputs: [("replicas".to_string(), json!(5))].into(),
            ..Default::default()
        });

        let instances = expand_one(intent);
        let inst = &instances["prod"][0];
        assert_eq!(inst.inputs["replicas"], json!(5));
        assert_eq!(inst.inputs["region"], json!("us-west-2"));
        assert_eq!(inst.inputs["loglevel"], json!("warn"));
    }

    #[test]
    fn group_defaults_win_over_environment_defaults() {
        let mut intent = base_intent();
        intent.groups.insert(
            "platform".to_string(),
            Group {
                defaults: [("region".to_string(), json!("us-west-2"))].into(),
                ..Default::default()
            },
        );
        let mut env = env_selecting(&["web"]);
        env.defaults.insert("region".to_string(), json!("eu-central-1"));
        intent.environments.insert("prod".to_string(), env);
        intent.components.push(Component {
            name: "web".to_string(),
            type_name: "helm".to_string(),
            domain: "platform".to_string(),
            ..Default::default()
        });

        let instances = expand_one(intent);
        assert_eq!(instances["prod"][0].inputs["region"], json!("us-west-2"));
    }

    #[test]
    fn path_priority_is_component_then_group_then_environment() {
        let mut intent = base_intent();
        intent.groups.insert(
            "platform".to_string(),
            Group {
                defaults: [("path".to_string(), json!("group/dir"))].into(),
                ..Default::default()
            },
        );
        let mut env = env_selecting(&["a", "b", "c", "d"]);
        env.defaults.insert("path".to_string(), json!("env/dir"));
        intent.environments.insert("prod".to_string(), env);

        // a: explicit path wins over everything
        intent.components.push(Component {
            name: "a".to_string(),
            type_name: "helm".to_string(),
            domain: "platform".to_string(),
            path: "comp/dir".to_string(),
            ..Default::default()
        });
        // b: group default beats environment default
        intent.components.push(Component {
            name: "b".to_string(),
            type_name: "helm".to_string(),
            domain: "platform".to_string(),
            ..Default::default()
        });
        // c: environment default applies without a domain
        intent.components.push(Component {
            name: "c".to_string(),
            type_name: "helm".to_string(),
            ..Default::default()
        });
        intent.components.push(Component {
            name: "d".to_string(),
            type_name: "helm".to_string(),
            ..Default::default()
        });

        let mut no_path_env = env_selecting(&["d"]);
        no_path_env.defaults.clear();
        intent.environments.insert("bare".to_string(), no_path_env);

        let instances = expand_one(intent);
        let prod = &instances["prod"];
        assert_eq!(prod[0].path, "comp/dir");
        assert_eq!(prod[1].path, "group/dir");
        assert_eq!(prod[2].path, "env/dir");
        assert_eq!(instances["bare"][0].path, "./");
    }

    #[test]
    fn path_is_kept_out_of_inputs() {
        let mut intent = base_intent();
        let mut env = env_selecting(&["web"]);
        env.defaults.insert("path".to_string(), json!("env/dir"));
        intent.environments.insert("prod".to_string(), env);
        intent.components.push(Component {
            name: "web".to_string(),
            type_name: "helm".to_string(),
            ..Default::default()
        });

        let instances = expand_one(intent);
        assert!(!instances["prod"][0].inputs.contains_key("path"));
    }

    #[test]
    fn string_inputs_are_interpolated() {
        let mut intent = base_intent();
        intent.environments.insert("prod".to_string(), env_selecting(&["web"]));
        intent.groups.insert("platform".to_string(), Group::default());
        intent.components.push(Component {
            name: "web".to_string(),
            type_name: "helm".to_string(),
            domain: "platform".to_string(),
            inputs: [
                (
                    "release".to_string(),
                    json!("{{.component}}-{{.environment}}"),
                ),
                ("team".to_string(), json!("{{ .group }}")),
                ("leftover".to_string(), json!("x {{.unknown}} y")),
                ("count".to_string(), json!(3)),
            ]
            .into(),
            ..Default::default()
        });

        let instances = expand_one(intent);
        let inputs = &instances["prod"][0].inputs;
        assert_eq!(inputs["release"], json!("web-prod"));
        assert_eq!(inputs["team"], json!("platform"));
        assert_eq!(inputs["leftover"], json!("x  y"));
        assert_eq!(inputs["count"], json!(3));
    }

    #[test]
    fn disabled_components_produce_no_instances() {
        let mut intent = base_intent();
        intent.environments.insert("prod".to_string(), env_selecting(&["web", "db"]));
        intent.components.push(Component {
            name: "web".to_string(),
            type_name: "helm".to_string(),
            enabled: false,
            ..Default::default()
        });
        intent.components.push(Component {
            name: "db".to_string(),
            type_name: "helm".to_string(),
            ..Default::default()
        });

        let instances = expand_one(intent);
        assert_eq!(instances["prod"].len(), 1);
        assert_eq!(instances["prod"][0].component, "db");
    }

    #[test]
    fn policies_union_environment_over_group() {
        let mut intent = base_intent();
        intent.groups.insert(
            "platform".to_string(),
            Group {
                policies: [
                    ("approvals".to_string(), json!(1)),
                    ("window".to_string(), json!("weekdays")),
                ]
                .into(),
                ..Default::default()
            },
        );
        let mut env = env_selecting(&["web"]);
        env.policies.insert("approvals".to_string(), json!(2));
        intent.environments.insert("prod".to_string(), env);
        intent.components.push(Component {
            name: "web".to_string(),
            type_name: "helm".to_string(),
            domain: "platform".to_string(),
            ..Default::default()
        });

        let instances = expand_one(intent);
        let inst = &instances["prod"][0];
        assert_eq!(inst.policies["approvals"], json!(2));
        assert_eq!(inst.policies["window"], json!("weekdays"));
        assert!(!inst.inputs.contains_key("approvals"));
    }

    #[test]
    fn same_environment_dependencies_resolve_to_own_environment() {
        let mut intent = base_intent();
        intent
            .environments
            .insert("prod".to_string(), env_selecting(&["db", "web"]));
        intent.components.push(Component {
            name: "db".to_string(),
            type_name: "helm".to_string(),
            ..Default::default()
        });
        intent.components.push(Component {
            name: "web".to_string(),
            type_name: "helm".to_string(),
            depends_on: vec![
                Dependency {
                    component: "db".to_string(),
                    ..Default::default()
                },
                Dependency {
                    component: "db".to_string(),
                    environment: "shared".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });

        let instances = expand_one(intent);
        let web = &instances["prod"][1];
        assert_eq!(web.depends_on[0].environment, "prod");
        assert_eq!(web.depends_on[1].environment, "shared");
        assert_eq!(web.depends_on[0].condition, "success");
    }

    #[test]
    fn environment_filter_restricts_expansion() {
        let mut intent = base_intent();
        intent.environments.insert("prod".to_string(), env_selecting(&["web"]));
        intent
            .environments
            .insert("staging".to_string(), env_selecting(&["web"]));
        intent.components.push(Component {
            name: "web".to_string(),
            type_name: "helm".to_string(),
            ..Default::default()
        });

        let normalized = normalize(intent).unwrap();
        let expander = Expander::new(&normalized);

        let filtered = expander.expand_filtered(Some("staging")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("staging"));

        let unknown = expander.expand_filtered(Some("qa")).unwrap();
        assert!(unknown.is_empty());
    }

    #[test]
    fn selection_follows_selector_order() {
        let mut intent = base_intent();
        intent
            .environments
            .insert("prod".to_string(), env_selecting(&["zeta", "alpha"]));
        intent.components.push(Component {
            name: "alpha".to_string(),
            type_name: "helm".to_string(),
            ..Default::default()
        });
        intent.components.push(Component {
            name: "zeta".to_string(),
            type_name: "helm".to_string(),
            ..Default::default()
        });

        let instances = expand_one(intent);
        let names: Vec<_> = instances["prod"].iter().map(|i| i.component.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
