//! Job binding and dependency edge resolution.
//!
//! Each component instance is bound to its composition's default job, the
//! job's step templates are rendered against the instance's merged
//! configuration, and dependency edges between instances are turned into
//! edges between job ids.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use liteci_core::{ComponentInstance, Error, JobInstance, JobSpec, RenderedStep, Result, StepSpec};

use crate::template::Template;

/// The job material a composition contributes to planning: its default
/// job, if it has one.
#[derive(Debug, Clone)]
pub struct CompositionBinding {
    pub type_name: String,
    pub default_job: Option<JobSpec>,
}

/// Binds component instances to jobs and resolves inter-job edges.
pub struct JobPlanner {
    bindings: BTreeMap<String, CompositionBinding>,
    // Parsed templates, keyed "type:step". Private to one planning run.
    template_cache: HashMap<String, Template>,
}

impl JobPlanner {
    pub fn new(bindings: BTreeMap<String, CompositionBinding>) -> Self {
        Self {
            bindings,
            template_cache: HashMap::new(),
        }
    }

    /// Create job instances for every component instance and resolve
    /// their dependency edges.
    pub fn plan_jobs(
        &mut self,
        instances: &BTreeMap<String, Vec<ComponentInstance>>,
    ) -> Result<BTreeMap<String, JobInstance>> {
        let mut job_instances: BTreeMap<String, JobInstance> = BTreeMap::new();

        for (env_name, env_instances) in instances {
            for inst in env_instances {
                let binding =
                    self.bindings
                        .get(&inst.type_name)
                        .ok_or_else(|| Error::MissingDefaultJob {
                            type_name: inst.type_name.clone(),
                        })?;
                let job_spec = binding
                    .default_job
                    .clone()
                    .ok_or_else(|| Error::MissingDefaultJob {
                        type_name: inst.type_name.clone(),
                    })?;

                let job_id = format!("{}@{}.{}", inst.component, env_name, job_spec.name);
                let steps = self.render_steps(&job_spec.steps, inst)?;

                job_instances.insert(
                    job_id.clone(),
                    JobInstance {
                        id: job_id,
                        name: job_spec.name.clone(),
                        component: inst.component.clone(),
                        environment: env_name.clone(),
                        composition: inst.type_name.clone(),
                        path: inst.path.clone(),
                        steps,
                        depends_on: Vec::new(),
                        timeout: job_spec.timeout.clone(),
                        retries: job_spec.retries,
                        config: inst.inputs.clone(),
                        labels: inst.labels.clone(),
                    },
                );
            }
        }

        self.resolve_dependencies(&mut job_instances, instances)?;

        tracing::debug!(jobs = job_instances.len(), "planned job instances");
        Ok(job_instances)
    }

    fn render_steps(
        &mut self,
        steps: &[StepSpec],
        inst: &ComponentInstance,
    ) -> Result<Vec<RenderedStep>> {
        // Context: the planning builtins plus every merged input. Inputs
        // shadow builtins on key collision.
        let mut context: BTreeMap<String, Value> = BTreeMap::new();
        context.insert("Component".to_string(), Value::String(inst.component.clone()));
        context.insert(
            "Environment".to_string(),
            Value::String(inst.environment.clone()),
        );
        context.insert("Type".to_string(), Value::String(inst.type_name.clone()));
        for (k, v) in &inst.inputs {
            context.insert(k.clone(), v.clone());
        }

        let mut rendered = Vec::with_capacity(steps.len());
        for step in steps {
            let cache_key = format!("{}:{}", inst.type_name, step.name);
            if !self.template_cache.contains_key(&cache_key) {
                let parsed = Template::parse(&step.run).map_err(|detail| Error::TemplateParse {
                    step: step.name.clone(),
                    detail,
                })?;
                self.template_cache.insert(cache_key.clone(), parsed);
            }
            let template = &self.template_cache[&cache_key];

            let run = template
                .execute(&context)
                .map_err(|detail| Error::TemplateExec {
                    step: step.name.clone(),
                    detail,
                })?;

            rendered.push(RenderedStep {
                name: step.name.clone(),
                run,
                timeout: step.timeout.clone(),
                retry: step.retry,
                on_failure: step.on_failure.clone(),
            });
        }
        Ok(rendered)
    }

    /// Turn resolved component dependencies into job-id edges, then
    /// de-duplicate so the graph never sees a multiset.
    fn resolve_dependencies(
        &self,
        job_instances: &mut BTreeMap<String, JobInstance>,
        instances: &BTreeMap<String, Vec<ComponentInstance>>,
    ) -> Result<()> {
        let mut comp_to_jobs: HashMap<String, Vec<String>> = HashMap::new();
        for (job_id, job) in job_instances.iter() {
            let key = format!("{}@{}", job.component, job.environment);
            comp_to_jobs.entry(key).or_default().push(job_id.clone());
        }

        for (env_name, env_instances) in instances {
            for inst in env_instances {
                let key = format!("{}@{}", inst.component, env_name);
                let Some(my_jobs) = comp_to_jobs.get(&key).cloned() else {
                    continue;
                };

                for dep in &inst.depends_on {
                    let dep_key = format!("{}@{}", dep.component, dep.environment);
                    let dep_jobs =
                        comp_to_jobs
                            .get(&dep_key)
                            .ok_or_else(|| Error::MissingDependency {
                                dependent: key.clone(),
                                target: dep_key.clone(),
                            })?;

                    for my_job in &my_jobs {
                        let job = job_instances.get_mut(my_job).expect("job id from own map");
                        job.depends_on.extend(dep_jobs.iter().cloned());
                    }
                }
            }
        }

        for job in job_instances.values_mut() {
            job.depends_on.sort();
            job.depends_on.dedup();
        }

        Ok(())
    }
}
