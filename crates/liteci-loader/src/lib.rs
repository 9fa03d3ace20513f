//! Loading of planner inputs from disk.
//!
//! Two entry points:
//!
//! - [`load_intent`] parses the user's intent YAML document
//! - [`load_compositions`] scans a compositions root into a
//!   [`CompositionRegistry`], compiling each composition's JSON Schema and
//!   job registry
//!
//! This is the only crate in the pipeline that touches the filesystem.

mod compositions;
mod schema;

pub use compositions::{load_compositions, Composition, CompositionRegistry};

use std::fs;
use std::path::Path;

use liteci_core::{Error, Intent, Result};

/// Load and parse an intent YAML file.
pub fn load_intent(path: impl AsRef<Path>) -> Result<Intent> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}
