//! The options lookup service.

use std::collections::BTreeMap;

use tracing::debug;

use super::tree::OptionTree;
use super::value::{OptionGroup, Options};
use crate::container::{SpecPath, Viewable};

/// Per-backend option trees with per-object overrides.
///
/// Every write bumps [`OptionsRegistry::version`]. Plots hold the registry behind an
/// `Arc` and only read from it.
#[derive(Debug, Clone, Default)]
pub struct OptionsRegistry {
    trees: BTreeMap<String, OptionTree>,
    custom: BTreeMap<(String, u64), OptionTree>,
    version: u64,
}

impl OptionsRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Merge `options` into the `group` options of `path` for `backend`.
    pub fn set_options(
        &mut self,
        backend: &str,
        path: impl Into<SpecPath>,
        group: OptionGroup,
        options: &Options,
    ) {
        let path = path.into();
        debug!(backend, %path, %group, count = options.len(), "setting options");
        self.trees
            .entry(backend.to_string())
            .or_default()
            .set(path, group, options);
        self.version += 1;
    }

    /// Builder form of [`OptionsRegistry::set_options`].
    #[must_use]
    pub fn with_options(
        mut self,
        backend: &str,
        path: impl Into<SpecPath>,
        group: OptionGroup,
        options: &Options,
    ) -> Self {
        self.set_options(backend, path, group, options);
        self
    }

    /// Merge overrides that only apply to objects carrying `id`.
    pub fn set_custom(
        &mut self,
        backend: &str,
        id: u64,
        path: impl Into<SpecPath>,
        group: OptionGroup,
        options: &Options,
    ) {
        let path = path.into();
        debug!(backend, id, %path, %group, "setting custom options");
        self.custom
            .entry((backend.to_string(), id))
            .or_default()
            .set(path, group, options);
        self.version += 1;
    }

    /// The shared tree of `backend`.
    #[must_use]
    pub fn tree(&self, backend: &str) -> Option<&OptionTree> {
        self.trees.get(backend)
    }

    /// The tree seen by objects carrying `id`: the backend tree with the object's
    /// overrides merged over it.
    #[must_use]
    pub fn custom_tree(&self, backend: &str, id: Option<u64>) -> OptionTree {
        let base = self.trees.get(backend).cloned().unwrap_or_default();
        match id.and_then(|id| self.custom.get(&(backend.to_string(), id))) {
            Some(custom) => base.overlaid(custom),
            None => base,
        }
    }

    /// Resolve the `group` options of an object with identity `spec` and id `id`.
    #[must_use]
    pub fn lookup(
        &self,
        backend: &str,
        spec: &SpecPath,
        id: Option<u64>,
        group: OptionGroup,
    ) -> Options {
        let mut out = self
            .trees
            .get(backend)
            .map(|t| t.lookup(spec, group))
            .unwrap_or_default();
        if let Some(custom) = id.and_then(|id| self.custom.get(&(backend.to_string(), id))) {
            out.merge(&custom.lookup(spec, group));
        }
        out
    }

    /// Resolve the `group` options of `obj`.
    #[must_use]
    pub fn lookup_options(&self, backend: &str, obj: &Viewable, group: OptionGroup) -> Options {
        self.lookup(backend, &obj.spec(), obj.object_id(), group)
    }
}
