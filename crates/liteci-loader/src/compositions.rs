//! Composition discovery and registry assembly.
//!
//! A composition is a directory containing a `job.yaml` (job registry) and
//! a `schema.yaml` (JSON Schema for the component's inputs); the directory
//! name is the composition name, matched against `component.type`.
//!
//! The root path may carry a glob wildcard (`*` or `**`): wildcard roots
//! are expanded and every match walked recursively; plain roots are
//! scanned one level deep, in immediate subdirectories only.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::Value;
use walkdir::WalkDir;

use liteci_core::{
    Component, Error, JobRegistry, JobSpec, NormalizedIntent, Result, JOB_REGISTRY_KIND,
};

use crate::schema;

const JOB_FILE: &str = "job.yaml";
const SCHEMA_FILE: &str = "schema.yaml";

/// One loaded composition: compiled schema plus its job registry.
#[derive(Debug)]
pub struct Composition {
    pub name: String,
    /// All jobs for this component type; the first entry is the default.
    pub jobs: Vec<JobSpec>,
    /// Lookup by job name into `jobs`.
    pub job_map: BTreeMap<String, usize>,
    pub schema: JSONSchema,
    /// The schema as parsed, kept for introspection frontends.
    pub schema_document: Value,
    pub registry_name: String,
    pub registry_description: String,
}

impl Composition {
    /// The job bound when no explicit selection is made.
    pub fn default_job(&self) -> Option<&JobSpec> {
        self.jobs.first()
    }

    /// Look up a job by name.
    pub fn job(&self, name: &str) -> Option<&JobSpec> {
        self.job_map.get(name).map(|&i| &self.jobs[i])
    }
}

/// All loaded compositions, keyed by composition name.
#[derive(Debug)]
pub struct CompositionRegistry {
    pub types: BTreeMap<String, Composition>,
}

impl CompositionRegistry {
    pub fn get(&self, type_name: &str) -> Option<&Composition> {
        self.types.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Composition type → job registry name, for the plan's `jobBindings`.
    pub fn job_bindings(&self) -> BTreeMap<String, String> {
        self.types
            .iter()
            .map(|(name, comp)| (name.clone(), comp.registry_name.clone()))
            .collect()
    }

    /// Validate a single component against its composition's schema.
    pub fn validate_component(&self, component: &Component) -> Result<()> {
        let composition =
            self.types
                .get(&component.type_name)
                .ok_or_else(|| Error::UnknownType {
                    component: component.name.clone(),
                    type_name: component.type_name.clone(),
                })?;
        schema::validate_component(&composition.schema, component)
    }

    /// Validate every component in a normalized intent, failing on the
    /// first violation.
    pub fn validate_all(&self, normalized: &NormalizedIntent) -> Result<()> {
        for component in normalized.components_by_name.values() {
            self.validate_component(component)?;
        }
        Ok(())
    }
}

/// Scan a compositions root and load every composition found.
pub fn load_compositions(root: &str) -> Result<CompositionRegistry> {
    let (job_files, schema_files) = discover(root)?;

    if job_files.is_empty() && schema_files.is_empty() {
        return Err(Error::EmptyCompositions {
            root: root.to_string(),
        });
    }

    for name in schema_files.keys() {
        if !job_files.contains_key(name) {
            return Err(Error::MissingSchema {
                composition: name.clone(),
                missing: JOB_FILE,
            });
        }
    }

    let mut types = BTreeMap::new();
    for (name, job_path) in &job_files {
        let schema_path = schema_files.get(name).ok_or_else(|| Error::MissingSchema {
            composition: name.clone(),
            missing: SCHEMA_FILE,
        })?;
        let composition = load_composition(name, job_path, schema_path)?;
        tracing::debug!(composition = %name, jobs = composition.jobs.len(), "loaded composition");
        types.insert(name.clone(), composition);
    }

    if types.is_empty() {
        return Err(Error::EmptyCompositions {
            root: root.to_string(),
        });
    }

    Ok(CompositionRegistry { types })
}

/// Map composition name → job.yaml path and composition name →
/// schema.yaml path under the given root.
fn discover(root: &str) -> Result<(BTreeMap<String, PathBuf>, BTreeMap<String, PathBuf>)> {
    let mut job_files = BTreeMap::new();
    let mut schema_files = BTreeMap::new();

    if root.contains('*') {
        let matches = glob::glob(root).map_err(|e| Error::Discover {
            root: root.to_string(),
            detail: e.to_string(),
        })?;

        let mut dirs = Vec::new();
        for entry in matches {
            let path = entry.map_err(|e| Error::Discover {
                root: root.to_string(),
                detail: e.to_string(),
            })?;
            if path.is_dir() {
                dirs.push(path);
            }
        }
        if dirs.is_empty() {
            return Err(Error::Discover {
                root: root.to_string(),
                detail: "glob pattern matched no directories".to_string(),
            });
        }

        for dir in dirs {
            for entry in WalkDir::new(&dir) {
                let entry = entry.map_err(|e| Error::Discover {
                    root: root.to_string(),
                    detail: e.to_string(),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let file_name = entry.file_name().to_string_lossy();
                if file_name != JOB_FILE && file_name != SCHEMA_FILE {
                    continue;
                }
                // The composition name is the directory that holds the pair.
                let Some(parent) = entry.path().parent().and_then(Path::file_name) else {
                    continue;
                };
                let name = parent.to_string_lossy().to_string();
                if file_name == JOB_FILE {
                    job_files.insert(name, entry.path().to_path_buf());
                } else {
                    schema_files.insert(name, entry.path().to_path_buf());
                }
            }
        }
    } else {
        let root_path = Path::new(root);
        if !root_path.is_dir() {
            return Err(Error::Discover {
                root: root.to_string(),
                detail: "config path is not a directory".to_string(),
            });
        }
        let entries = fs::read_dir(root_path).map_err(|source| Error::Read {
            path: root_path.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| Error::Read {
                path: root_path.to_path_buf(),
                source,
            })?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let job = dir.join(JOB_FILE);
            if job.is_file() {
                job_files.insert(name.clone(), job);
            }
            let schema_file = dir.join(SCHEMA_FILE);
            if schema_file.is_file() {
                schema_files.insert(name, schema_file);
            }
        }
    }

    Ok((job_files, schema_files))
}

fn load_composition(name: &str, job_path: &Path, schema_path: &Path) -> Result<Composition> {
    let job_data = fs::read_to_string(job_path).map_err(|source| Error::Read {
        path: job_path.to_path_buf(),
        source,
    })?;
    let registry: JobRegistry =
        serde_yaml::from_str(&job_data).map_err(|source| Error::Parse {
            path: job_path.to_path_buf(),
            source,
        })?;

    if !registry.kind.is_empty() && registry.kind != JOB_REGISTRY_KIND {
        tracing::warn!(
            composition = %name,
            kind = %registry.kind,
            "job registry has unexpected kind"
        );
    }
    if registry.jobs.is_empty() {
        return Err(Error::EmptyRegistry {
            composition: name.to_string(),
        });
    }

    let schema_data = fs::read_to_string(schema_path).map_err(|source| Error::Read {
        path: schema_path.to_path_buf(),
        source,
    })?;
    // YAML is a superset of JSON, so schema.yaml may hold either.
    let schema_value: Value =
        serde_yaml::from_str(&schema_data).map_err(|source| Error::Parse {
            path: schema_path.to_path_buf(),
            source,
        })?;
    let compiled = schema::compile(name, &schema_value)?;

    let mut job_map = BTreeMap::new();
    for (i, job) in registry.jobs.iter().enumerate() {
        if job_map.insert(job.name.clone(), i).is_some() {
            tracing::warn!(composition = %name, job = %job.name, "duplicate job name in registry");
        }
    }

    Ok(Composition {
        name: name.to_string(),
        jobs: registry.jobs,
        job_map,
        schema: compiled,
        schema_document: schema_value,
        registry_name: registry.metadata.name,
        registry_description: registry.metadata.description,
    })
}
