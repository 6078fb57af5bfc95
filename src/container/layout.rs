//! Layouts: grid arrangements of independent objects.

use std::collections::BTreeMap;

use super::dimension::Dimension;
use super::key::{FrameKey, KeyValue};
use super::spec::sanitize_identifier;
use super::viewable::Viewable;

/// Default number of grid columns.
pub const DEFAULT_COLS: usize = 4;

/// A collection of named objects laid out on a grid in scanline order.
///
/// A layout with key dimensions is indexed: its items are addressed by key values
/// instead of `(group, label)` paths.
#[derive(Debug, Clone)]
pub struct Layout {
    kdims: Vec<Dimension>,
    items: Vec<(FrameKey, Viewable)>,
    cols: usize,
    group: Option<String>,
    label: String,
    id: Option<u64>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    /// An empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kdims: Vec::new(),
            items: Vec::new(),
            cols: DEFAULT_COLS,
            group: None,
            label: String::new(),
            id: None,
        }
    }

    /// An empty layout indexed by `kdims`.
    #[must_use]
    pub fn indexed<D: Into<Dimension>>(kdims: impl IntoIterator<Item = D>) -> Self {
        Self {
            kdims: kdims.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    /// Add an item keyed by its group and label; nested plain layouts are flattened.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<Viewable>) -> Self {
        match item.into() {
            Viewable::Layout(nested) if !nested.is_indexed() => {
                for (_, inner) in nested.items {
                    self = self.with_item(inner);
                }
            }
            item => {
                let mut parts = vec![KeyValue::Str(sanitize_identifier(item.group_name()))];
                let label = sanitize_identifier(item.label_name());
                if !label.is_empty() {
                    parts.push(KeyValue::Str(label));
                }
                let base = FrameKey::new(parts);
                let mut key = base.clone();
                let mut n = 1usize;
                while self.items.iter().any(|(k, _)| *k == key) {
                    n += 1;
                    key = base.clone();
                    key.push(n.to_string());
                }
                self.items.push((key, item));
            }
        }
        self
    }

    /// Add an item at an explicit key.
    #[must_use]
    pub fn with_keyed(mut self, key: impl Into<FrameKey>, item: impl Into<Viewable>) -> Self {
        self.insert(key.into(), item.into());
        self
    }

    /// Insert or replace the item at `key`.
    pub fn insert(&mut self, key: FrameKey, item: Viewable) {
        if let Some(slot) = self.items.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = item;
        } else {
            self.items.push((key, item));
        }
    }

    /// Set the number of grid columns (at least one).
    #[must_use]
    pub fn cols(mut self, cols: usize) -> Self {
        self.cols = cols.max(1);
        self
    }

    /// Set the group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the object id.
    #[must_use]
    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether the layout is keyed by dimensions.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        !self.kdims.is_empty()
    }

    /// Type name used in spec paths.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        if self.is_indexed() {
            "IndexedLayout"
        } else {
            "Layout"
        }
    }

    /// Key dimensions (empty for a plain layout).
    #[must_use]
    pub fn kdims(&self) -> &[Dimension] {
        &self.kdims
    }

    /// `(key, item)` pairs in scanline order.
    #[must_use]
    pub fn items(&self) -> &[(FrameKey, Viewable)] {
        &self.items
    }

    /// Item at `key`.
    #[must_use]
    pub fn get(&self, key: &FrameKey) -> Option<&Viewable> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Grid `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        let n = self.items.len();
        if n == 0 {
            return (0, 0);
        }
        let cols = self.cols.min(n);
        (n.div_ceil(cols), cols)
    }

    /// Items keyed by `(row, col)` grid coordinate.
    #[must_use]
    pub fn grid_items(&self) -> BTreeMap<(usize, usize), (&FrameKey, &Viewable)> {
        let (_, cols) = self.shape();
        self.items
            .iter()
            .enumerate()
            .map(|(i, (k, v))| ((i / cols, i % cols), (k, v)))
            .collect()
    }

    /// Group; defaults to the type name.
    #[must_use]
    pub fn group_name(&self) -> &str {
        self.group.as_deref().unwrap_or_else(|| self.type_name())
    }

    /// Label.
    #[must_use]
    pub fn label_name(&self) -> &str {
        &self.label
    }

    /// Object id.
    #[must_use]
    pub fn object_id(&self) -> Option<u64> {
        self.id
    }

    /// A layout with the same dimensions and metadata but no items.
    #[must_use]
    pub fn clone_empty(&self) -> Self {
        Self {
            kdims: self.kdims.clone(),
            items: Vec::new(),
            cols: self.cols,
            group: self.group.clone(),
            label: self.label.clone(),
            id: self.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Element;

    fn curve(label: &str) -> Element {
        Element::curve(&[0.0, 1.0], &[0.0, 1.0]).label(label)
    }

    #[test]
    fn test_shape_and_grid() {
        let layout = (0..5).fold(Layout::new().cols(2), |l, i| l.with_item(curve(&i.to_string())));
        assert_eq!(layout.shape(), (3, 2));
        let grid = layout.grid_items();
        assert_eq!(grid.len(), 5);
        assert!(grid.contains_key(&(2, 0)));
        assert!(!grid.contains_key(&(2, 1)));
    }

    #[test]
    fn test_shape_fewer_items_than_cols() {
        let layout = Layout::new().with_item(curve("a")).with_item(curve("b"));
        assert_eq!(layout.shape(), (1, 2));
        assert_eq!(Layout::new().shape(), (0, 0));
    }

    #[test]
    fn test_flatten_nested() {
        let inner = Layout::new().with_item(curve("a")).with_item(curve("b"));
        let layout = Layout::new().with_item(inner).with_item(curve("c"));
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.type_name(), "Layout");
    }

    #[test]
    fn test_clone_empty_keeps_metadata() {
        let layout = Layout::new().cols(3).label("Grid").with_item(curve("a"));
        let empty = layout.clone_empty();
        assert!(empty.is_empty());
        assert_eq!(empty.label_name(), "Grid");
    }
}
