//! YAML options configuration.
//!
//! ```yaml
//! backend: scene
//! options:
//!   - path: Curve
//!     style: { color: ["#ff0000", "#00ff00"], line_width: 3 }
//!   - path: Curve.Sine
//!     norm: { axiswise: true }
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::registry::OptionsRegistry;
use super::value::{OptionGroup, OptionValue, Options};
use crate::container::SpecPath;
use crate::error::{Error, Result};

/// One `path` entry of an options file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsEntry {
    /// Dotted `type[.group[.label]]` path.
    pub path: String,

    /// Style options.
    #[serde(default)]
    pub style: BTreeMap<String, OptionValue>,

    /// Plot options.
    #[serde(default)]
    pub plot: BTreeMap<String, OptionValue>,

    /// Normalization options.
    #[serde(default)]
    pub norm: BTreeMap<String, OptionValue>,

    /// Only apply to objects carrying this id.
    #[serde(default)]
    pub id: Option<u64>,
}

/// An options file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Backend the options apply to.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Option entries, applied in order.
    #[serde(default)]
    pub options: Vec<OptionsEntry>,
}

fn default_backend() -> String {
    crate::scene::BACKEND.to_string()
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            options: Vec::new(),
        }
    }
}

impl OptionsConfig {
    /// Loads an options file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] for a missing file, [`Error::Io`] for any
    /// other read failure and [`Error::ConfigParse`] for invalid YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ConfigNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;

        Self::parse(&content)
    }

    /// Parses options from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Write every entry into `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptionSpec`] for an empty path.
    pub fn apply(&self, registry: &mut OptionsRegistry) -> Result<()> {
        for entry in &self.options {
            let path = SpecPath::parse(&entry.path);
            if path.is_empty() || path.len() > 3 {
                return Err(Error::InvalidOptionSpec(entry.path.clone()));
            }
            for (group, values) in [
                (OptionGroup::Style, &entry.style),
                (OptionGroup::Plot, &entry.plot),
                (OptionGroup::Norm, &entry.norm),
            ] {
                if values.is_empty() {
                    continue;
                }
                if group == OptionGroup::Norm {
                    for key in values.keys() {
                        if key != "axiswise" && key != "framewise" {
                            warn!(path = %path, key = %key, "ignoring unknown norm option");
                        }
                    }
                }
                let opts: Options = values.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                match entry.id {
                    Some(id) => registry.set_custom(&self.backend, id, path.clone(), group, &opts),
                    None => registry.set_options(&self.backend, path.clone(), group, &opts),
                }
            }
        }
        Ok(())
    }
}

impl OptionsRegistry {
    /// Build a registry from a YAML options string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or names an invalid path.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut registry = Self::new();
        OptionsConfig::parse(yaml)?.apply(&mut registry)?;
        Ok(registry)
    }

    /// Apply an options file on top of this registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or applied.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        OptionsConfig::load(path)?.apply(self)
    }
}
