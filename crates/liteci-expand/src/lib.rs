//! Environment × component expansion.
//!
//! For every environment, the [`Expander`] materializes one
//! [`liteci_core::ComponentInstance`] per selected, enabled component,
//! realizing the configuration precedence (environment < group <
//! component), the path priority, template interpolation over merged
//! inputs, the policy union, and dependency environment resolution.

mod analyzer;
mod expander;
mod interpolate;

pub use analyzer::{ComponentAnalyzer, ComponentMerged};
pub use expander::Expander;
pub use interpolate::render;
