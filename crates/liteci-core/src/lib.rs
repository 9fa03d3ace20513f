//! Core types for the liteci planner engine.
//!
//! This crate provides the shared data model used across all liteci crates:
//!
//! - **Intent types**: the user-authored declarative deployment document
//!   (`Intent`, `Component`, `Environment`, `Group`, `Dependency`)
//! - **Job types**: job registries loaded from composition directories
//!   (`JobRegistry`, `JobSpec`, `StepSpec`) and materialized job instances
//! - **Plan types**: the final serialized artifact (`Plan`, `PlanJob`)
//! - **Normalization**: canonicalization of a raw intent into
//!   `NormalizedIntent`, the form every downstream stage assumes
//! - **Errors**: the single `Error` enum shared by the whole pipeline

pub mod error;
pub mod model;
pub mod normalize;

pub use error::{Error, ErrorKind, Result};
pub use model::intent::{
    Component, Dependency, Environment, Group, Intent, Metadata, NormalizedIntent,
    ResolvedDependency, Selectors,
};
pub use model::instance::ComponentInstance;
pub use model::job::{JobInstance, JobRegistry, JobSpec, RenderedStep, StepSpec};
pub use model::plan::{Plan, PlanJob, PlanSpec};
pub use normalize::{normalize, SAME_ENVIRONMENT, WILDCARD};

/// API version stamped on every artifact this engine reads or writes.
pub const API_VERSION: &str = "sourceplane.io/v1";

/// Expected `kind` of a job registry document.
pub const JOB_REGISTRY_KIND: &str = "JobRegistry";

/// `kind` of the emitted plan artifact.
pub const WORKFLOW_KIND: &str = "Workflow";
