//! Style, plot and normalization options.
//!
//! Options are attached to `type[.group[.label]]` paths in an [`OptionTree`] per
//! backend. Objects carrying an id may additionally have their own overrides. The
//! [`OptionsRegistry`] resolves both for a given object.

#[cfg(feature = "config")]
mod config;
mod registry;
mod tree;
mod value;

#[cfg(feature = "config")]
pub use config::{OptionsConfig, OptionsEntry};
pub use registry::OptionsRegistry;
pub use tree::{NodeOptions, OptionTree};
pub use value::{Cycle, NormMode, OptionGroup, OptionValue, Options};
