//! The error type shared by every pipeline stage.
//!
//! Each variant carries the identity of the offending object (file path,
//! component name, job id, or dependency edge) and, where one exists, the
//! upstream diagnostic as a `#[source]` cause. The pipeline is fail-fast:
//! the first error stops it, and no artifact is written.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the liteci crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Category of a pipeline error, independent of the carried detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File or directory could not be read.
    Read,
    /// Document could not be parsed or a schema could not be compiled.
    Parse,
    /// Structurally invalid intent rejected during normalization.
    InvalidIntent,
    /// A job registry declared no jobs.
    EmptyRegistry,
    /// A composition directory is missing one of its two files.
    MissingSchema,
    /// No compositions were found under the configured root.
    EmptyComposition,
    /// A component's type matches no loaded composition.
    UnknownType,
    /// A component failed its composition's JSON Schema.
    SchemaValidation,
    /// A step template could not be parsed.
    TemplateParse,
    /// A step template could not be executed against its context.
    TemplateExec,
    /// A composition has no default job to bind.
    MissingDefaultJob,
    /// A dependency edge points at a job that does not exist.
    MissingDependency,
    /// The job graph contains a cycle.
    Cycle,
    /// The plan could not be serialized.
    Serialize,
    /// The plan artifact could not be written.
    Write,
}

/// Error produced by the planner pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to scan compositions under {root}: {detail}")]
    Discover { root: String, detail: String },

    #[error("failed to compile schema for composition {composition}: {detail}")]
    SchemaCompile { composition: String, detail: String },

    #[error("invalid intent: {reason}")]
    InvalidIntent { reason: String },

    #[error("no jobs defined in job registry for composition {composition}")]
    EmptyRegistry { composition: String },

    #[error("composition {composition} is missing {missing}")]
    MissingSchema {
        composition: String,
        missing: &'static str,
    },

    #[error("no compositions found under {root}")]
    EmptyCompositions { root: String },

    #[error("component {component} has unknown type {type_name}")]
    UnknownType {
        component: String,
        type_name: String,
    },

    #[error("component {component} failed validation against type {type_name}: {detail}")]
    SchemaValidation {
        component: String,
        type_name: String,
        detail: String,
    },

    #[error("invalid template in step {step}: {detail}")]
    TemplateParse { step: String, detail: String },

    #[error("failed to execute template in step {step}: {detail}")]
    TemplateExec { step: String, detail: String },

    #[error("no default job defined for composition {type_name}")]
    MissingDefaultJob { type_name: String },

    #[error("dependency not found: {dependent} depends on {target}")]
    MissingDependency { dependent: String, target: String },

    #[error("cycle detected in job dependencies: {detail}")]
    Cycle { detail: String },

    #[error("failed to serialize plan")]
    SerializeJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize plan")]
    SerializeYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write plan to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Read { .. } | Error::Discover { .. } => ErrorKind::Read,
            Error::Parse { .. } | Error::SchemaCompile { .. } => ErrorKind::Parse,
            Error::InvalidIntent { .. } => ErrorKind::InvalidIntent,
            Error::EmptyRegistry { .. } => ErrorKind::EmptyRegistry,
            Error::MissingSchema { .. } => ErrorKind::MissingSchema,
            Error::EmptyCompositions { .. } => ErrorKind::EmptyComposition,
            Error::UnknownType { .. } => ErrorKind::UnknownType,
            Error::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            Error::TemplateParse { .. } => ErrorKind::TemplateParse,
            Error::TemplateExec { .. } => ErrorKind::TemplateExec,
            Error::MissingDefaultJob { .. } => ErrorKind::MissingDefaultJob,
            Error::MissingDependency { .. } => ErrorKind::MissingDependency,
            Error::Cycle { .. } => ErrorKind::Cycle,
            Error::SerializeJson { .. } | Error::SerializeYaml { .. } => ErrorKind::Serialize,
            Error::Write { .. } => ErrorKind::Write,
        }
    }
}
