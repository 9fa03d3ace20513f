//! Cycle detection and topological ordering over job instances.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use liteci_core::{Error, JobInstance, Result};

/// The DAG of job instances.
pub struct JobGraph<'a> {
    jobs: &'a BTreeMap<String, JobInstance>,
}

impl<'a> JobGraph<'a> {
    pub fn new(jobs: &'a BTreeMap<String, JobInstance>) -> Self {
        Self { jobs }
    }

    /// Depth-first cycle detection with a dual marking scheme: a node
    /// found on the current DFS stack closes a cycle. Dependency ids that
    /// match no job are skipped; the planner has already rejected them.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();

        for job_id in self.jobs.keys() {
            if !visited.contains(job_id.as_str()) {
                if let Some(offender) = self.cycle_dfs(job_id, &mut visited, &mut on_stack) {
                    return Err(Error::Cycle {
                        detail: format!("involving {}", offender),
                    });
                }
            }
        }
        Ok(())
    }

    fn cycle_dfs(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        on_stack: &mut HashSet<String>,
    ) -> Option<String> {
        visited.insert(node.to_string());
        on_stack.insert(node.to_string());

        if let Some(job) = self.jobs.get(node) {
            for dep in &job.depends_on {
                if !visited.contains(dep.as_str()) {
                    if let Some(offender) = self.cycle_dfs(dep, visited, on_stack) {
                        return Some(offender);
                    }
                } else if on_stack.contains(dep.as_str()) {
                    return Some(dep.clone());
                }
            }
        }

        on_stack.remove(node);
        None
    }

    /// Kahn's algorithm. Within one zero-in-degree batch, jobs are emitted
    /// in lexicographic id order so the plan is byte-stable across runs.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for job_id in self.jobs.keys() {
            in_degree.insert(job_id, 0);
            dependents.insert(job_id, Vec::new());
        }
        for (job_id, job) in self.jobs {
            for dep in &job.depends_on {
                if !self.jobs.contains_key(dep) {
                    continue;
                }
                dependents.get_mut(dep.as_str()).expect("known id").push(job_id);
                *in_degree.get_mut(job_id.as_str()).expect("known id") += 1;
            }
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut sorted = Vec::with_capacity(self.jobs.len());
        while let Some(current) = ready.pop_first() {
            sorted.push(current.to_string());
            for &dependent in &dependents[current] {
                let degree = in_degree.get_mut(dependent).expect("known id");
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if sorted.len() != self.jobs.len() {
            return Err(Error::Cycle {
                detail: format!(
                    "topological sort left {} jobs unprocessed",
                    self.jobs.len() - sorted.len()
                ),
            });
        }
        Ok(sorted)
    }
}
