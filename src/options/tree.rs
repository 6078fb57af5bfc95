//! Option trees keyed by type/group/label paths.

use std::collections::BTreeMap;

use super::value::{OptionGroup, Options};
use crate::container::SpecPath;

/// Options of one tree node, per option group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOptions {
    style: Options,
    plot: Options,
    norm: Options,
}

impl NodeOptions {
    /// Options of `group`.
    #[must_use]
    pub fn get(&self, group: OptionGroup) -> &Options {
        match group {
            OptionGroup::Style => &self.style,
            OptionGroup::Plot => &self.plot,
            OptionGroup::Norm => &self.norm,
        }
    }

    fn get_mut(&mut self, group: OptionGroup) -> &mut Options {
        match group {
            OptionGroup::Style => &mut self.style,
            OptionGroup::Plot => &mut self.plot,
            OptionGroup::Norm => &mut self.norm,
        }
    }
}

/// Options attached to spec paths.
///
/// Looking up an object merges the options of every prefix of its identity, from the
/// root path to the full `type.group.label` path, so the most specific path wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionTree {
    nodes: BTreeMap<SpecPath, NodeOptions>,
}

impl OptionTree {
    /// Empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `options` into the `group` options of `path`.
    pub fn set(&mut self, path: SpecPath, group: OptionGroup, options: &Options) {
        self.nodes
            .entry(path)
            .or_default()
            .get_mut(group)
            .merge(options);
    }

    /// Options stored exactly at `path`.
    #[must_use]
    pub fn get(&self, path: &SpecPath, group: OptionGroup) -> Option<&Options> {
        self.nodes.get(path).map(|n| n.get(group))
    }

    /// Options applying to an object with identity `spec`.
    #[must_use]
    pub fn lookup(&self, spec: &SpecPath, group: OptionGroup) -> Options {
        let mut out = Options::new();
        for n in 0..=spec.len().min(3) {
            if let Some(node) = self.nodes.get(&spec.truncate(n)) {
                out.merge(node.get(group));
            }
        }
        out
    }

    /// Non-empty `(path, options)` entries of `group`, least specific first.
    #[must_use]
    pub fn entries(&self, group: OptionGroup) -> Vec<(&SpecPath, &Options)> {
        let mut entries: Vec<_> = self
            .nodes
            .iter()
            .map(|(path, node)| (path, node.get(group)))
            .filter(|(_, opts)| !opts.is_empty())
            .collect();
        entries.sort_by_key(|(path, _)| path.len());
        entries
    }

    /// `self` with every node of `other` merged over it.
    #[must_use]
    pub fn overlaid(&self, other: &OptionTree) -> Self {
        let mut out = self.clone();
        for (path, node) in &other.nodes {
            for group in OptionGroup::ALL {
                if !node.get(group).is_empty() {
                    out.set(path.clone(), group, node.get(group));
                }
            }
        }
        out
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_most_specific_wins() {
        let mut tree = OptionTree::new();
        tree.set(
            SpecPath::parse("Curve"),
            OptionGroup::Style,
            &Options::new().with("color", "red").with("line_width", 2),
        );
        tree.set(
            SpecPath::parse("Curve.Curve.A"),
            OptionGroup::Style,
            &Options::new().with("color", "blue"),
        );

        let a = tree.lookup(&SpecPath::identity("Curve", "Curve", "A"), OptionGroup::Style);
        assert_eq!(a.get_str("color"), Some("blue"));
        assert_eq!(a.get_f64("line_width"), Some(2.0));

        let b = tree.lookup(&SpecPath::identity("Curve", "Curve", "B"), OptionGroup::Style);
        assert_eq!(b.get_str("color"), Some("red"));
        assert!(tree
            .lookup(&SpecPath::identity("Image", "Image", ""), OptionGroup::Style)
            .is_empty());
    }

    #[test]
    fn test_entries_ordered_by_specificity() {
        let mut tree = OptionTree::new();
        let norm = Options::new().with("axiswise", true);
        tree.set(SpecPath::parse("Curve.Sine.A"), OptionGroup::Norm, &norm);
        tree.set(SpecPath::parse("Curve"), OptionGroup::Norm, &norm);
        tree.set(SpecPath::parse("Image"), OptionGroup::Style, &norm);
        let lens: Vec<_> = tree
            .entries(OptionGroup::Norm)
            .iter()
            .map(|(p, _)| p.len())
            .collect();
        assert_eq!(lens, vec![1, 3]);
    }

    #[test]
    fn test_overlaid() {
        let mut base = OptionTree::new();
        base.set(SpecPath::parse("Curve"), OptionGroup::Plot, &Options::new().with("show_title", true));
        let mut custom = OptionTree::new();
        custom.set(SpecPath::parse("Curve"), OptionGroup::Plot, &Options::new().with("show_title", false));
        let merged = base.overlaid(&custom);
        assert_eq!(
            merged.lookup(&SpecPath::parse("Curve.Curve"), OptionGroup::Plot).get_bool("show_title"),
            Some(false)
        );
    }
}
