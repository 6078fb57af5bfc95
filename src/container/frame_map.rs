//! Frame maps: collections of viewable objects indexed by frame keys.

use super::dimension::Dimension;
use super::key::{FrameKey, KeyValue};
use super::viewable::{ViewType, Viewable};

/// Name of the implicit dimension used to wrap a bare object into a one-frame map.
pub const DEFAULT_FRAME_DIM: &str = "Frame";

/// An indexed collection of objects over one or more key dimensions.
///
/// Keys are kept in insertion order unless the map is sortable (the default), in
/// which case they are kept in ascending key order.
#[derive(Debug, Clone)]
pub struct FrameMap {
    kdims: Vec<Dimension>,
    data: Vec<(FrameKey, Viewable)>,
    group: Option<String>,
    label: String,
    id: Option<u64>,
    sort: bool,
}

impl FrameMap {
    /// Create an empty map over `kdims`.
    #[must_use]
    pub fn new<D: Into<Dimension>>(kdims: impl IntoIterator<Item = D>) -> Self {
        Self {
            kdims: kdims.into_iter().map(Into::into).collect(),
            data: Vec::new(),
            group: None,
            label: String::new(),
            id: None,
            sort: true,
        }
    }

    /// Wrap a single object as a one-frame map keyed by the implicit `Frame` dimension.
    ///
    /// The map inherits the object's id so per-object options keep applying.
    #[must_use]
    pub fn single(obj: Viewable) -> Self {
        let id = obj.object_id();
        let mut map = Self::new([DEFAULT_FRAME_DIM]).with_item(FrameKey::index(0), obj);
        map.id = id;
        map
    }

    /// Keep keys in insertion order (`false`) or ascending order (`true`).
    #[must_use]
    pub fn sorted(mut self, sort: bool) -> Self {
        self.sort = sort;
        if sort {
            self.data.sort_by(|a, b| a.0.cmp(&b.0));
        }
        self
    }

    /// Add an item.
    #[must_use]
    pub fn with_item(mut self, key: impl Into<FrameKey>, value: impl Into<Viewable>) -> Self {
        self.insert(key.into(), value.into());
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

    /// Insert or replace the item at `key`.
    pub fn insert(&mut self, key: FrameKey, value: Viewable) {
        if let Some(slot) = self.data.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else if self.sort {
            let pos = self.data.partition_point(|(k, _)| *k < key);
            self.data.insert(pos, (key, value));
        } else {
            self.data.push((key, value));
        }
    }

    /// Key dimensions.
    #[must_use]
    pub fn kdims(&self) -> &[Dimension] {
        &self.kdims
    }

    /// Names of the key dimensions.
    #[must_use]
    pub fn kdim_names(&self) -> Vec<&str> {
        self.kdims.iter().map(Dimension::name).collect()
    }

    /// Number of key dimensions.
    #[must_use]
    pub fn ndims(&self) -> usize {
        self.kdims.len()
    }

    /// Whether keys are kept sorted.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sort
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the map has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &FrameKey> + '_ {
        self.data.iter().map(|(k, _)| k)
    }

    /// Values in key order.
    pub fn values(&self) -> impl Iterator<Item = &Viewable> + '_ {
        self.data.iter().map(|(_, v)| v)
    }

    /// `(key, value)` pairs in order.
    #[must_use]
    pub fn items(&self) -> &[(FrameKey, Viewable)] {
        &self.data
    }

    /// Value at `key`.
    #[must_use]
    pub fn get(&self, key: &FrameKey) -> Option<&Viewable> {
        self.data.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &FrameKey) -> bool {
        self.get(key).is_some()
    }

    /// Value at position `i`.
    #[must_use]
    pub fn nth(&self, i: usize) -> Option<&Viewable> {
        self.data.get(i).map(|(_, v)| v)
    }

    /// Key at position `i`.
    #[must_use]
    pub fn nth_key(&self, i: usize) -> Option<&FrameKey> {
        self.data.get(i).map(|(k, _)| k)
    }

    /// Last value.
    #[must_use]
    pub fn last(&self) -> Option<&Viewable> {
        self.data.last().map(|(_, v)| v)
    }

    /// Type of the values held (taken from the last value).
    #[must_use]
    pub fn value_type(&self) -> Option<ViewType> {
        self.last().map(Viewable::view_type)
    }

    /// Group; defaults to the map's type name.
    #[must_use]
    pub fn group_name(&self) -> &str {
        self.group.as_deref().unwrap_or("FrameMap")
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

    /// A map with the same dimensions and metadata holding `items`.
    #[must_use]
    pub fn clone_with(&self, items: Vec<(FrameKey, Viewable)>) -> Self {
        Self {
            kdims: self.kdims.clone(),
            data: items,
            group: self.group.clone(),
            label: self.label.clone(),
            id: self.id,
            sort: self.sort,
        }
    }

    /// Select frames by dimension value.
    ///
    /// Constraints on dimensions the map does not have are ignored. When every key
    /// dimension is constrained the single matching value is returned, or `None` if
    /// there is none; otherwise the matching sub-map is returned (possibly empty).
    #[must_use]
    pub fn select(&self, constraints: &[(String, KeyValue)]) -> Option<Viewable> {
        let relevant: Vec<(usize, &KeyValue)> = constraints
            .iter()
            .filter_map(|(name, value)| {
                self.kdims
                    .iter()
                    .position(|d| d.name() == name)
                    .map(|i| (i, value))
            })
            .collect();

        let matches = |key: &FrameKey| {
            relevant
                .iter()
                .all(|(i, value)| key.get(*i).is_some_and(|k| k == *value))
        };

        let full = !self.kdims.is_empty()
            && (0..self.kdims.len()).all(|i| relevant.iter().any(|(j, _)| *j == i));
        if full {
            return self
                .data
                .iter()
                .find(|(k, _)| matches(k))
                .map(|(_, v)| v.clone());
        }

        let items = self
            .data
            .iter()
            .filter(|(k, _)| matches(k))
            .cloned()
            .collect();
        Some(Viewable::Map(self.clone_with(items)))
    }

    /// Split a map of overlays into one map per layer key.
    ///
    /// Returns `None` when the values are not overlays. Layer keys appear in order
    /// of first occurrence across frames.
    #[must_use]
    pub fn split_overlays(&self) -> Option<(Vec<FrameKey>, Vec<FrameMap>)> {
        if !matches!(
            self.value_type(),
            Some(ViewType::Overlay | ViewType::IndexedOverlay)
        ) {
            return None;
        }

        let mut layer_keys: Vec<FrameKey> = Vec::new();
        let mut layer_items: Vec<Vec<(FrameKey, Viewable)>> = Vec::new();
        for (frame_key, value) in &self.data {
            let Viewable::Overlay(overlay) = value else {
                continue;
            };
            for (layer_key, layer) in overlay.layers() {
                let pos = match layer_keys.iter().position(|k| k == layer_key) {
                    Some(pos) => pos,
                    None => {
                        layer_keys.push(layer_key.clone());
                        layer_items.push(Vec::new());
                        layer_keys.len() - 1
                    }
                };
                layer_items[pos].push((frame_key.clone(), layer.clone()));
            }
        }

        let maps = layer_items
            .into_iter()
            .map(|items| {
                let mut map = self.clone_with(items);
                map.id = map.last().and_then(Viewable::object_id).or(self.id);
                map
            })
            .collect();
        Some((layer_keys, maps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Element, Overlay};
    use crate::key;

    fn curve(offset: f32) -> Element {
        Element::curve(&[0.0, 1.0], &[offset, offset + 1.0])
    }

    #[test]
    fn test_sorted_insert() {
        let map = FrameMap::new(["t"])
            .with_item(key![2], curve(2.0))
            .with_item(key![0], curve(0.0))
            .with_item(key![1], curve(1.0));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![key![0], key![1], key![2]]);
    }

    #[test]
    fn test_insertion_order_when_unsorted() {
        let map = FrameMap::new(["t"])
            .sorted(false)
            .with_item(key![2], curve(2.0))
            .with_item(key![0], curve(0.0));
        assert_eq!(map.nth_key(0), Some(&key![2]));
    }

    #[test]
    fn test_single_wraps_with_frame_dim() {
        let map = FrameMap::single(curve(0.0).id(7).into());
        assert_eq!(map.kdim_names(), vec![DEFAULT_FRAME_DIM]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.object_id(), Some(7));
    }

    #[test]
    fn test_select_full_and_partial() {
        let map = FrameMap::new(["a", "b"])
            .with_item(key![0, 0], curve(0.0))
            .with_item(key![0, 1], curve(1.0))
            .with_item(key![1, 0], curve(2.0));

        let single = map
            .select(&[("a".into(), KeyValue::Int(0)), ("b".into(), KeyValue::Int(1))])
            .unwrap();
        assert!(single.as_element().is_some());

        assert!(map
            .select(&[("a".into(), KeyValue::Int(5)), ("b".into(), KeyValue::Int(5))])
            .is_none());

        let partial = map.select(&[("a".into(), KeyValue::Int(0))]).unwrap();
        assert_eq!(partial.as_map().map(FrameMap::len), Some(2));

        let ignored = map.select(&[("zzz".into(), KeyValue::Int(0))]).unwrap();
        assert_eq!(ignored.as_map().map(FrameMap::len), Some(3));
    }

    #[test]
    fn test_split_overlays() {
        let frame = |o: f32| {
            Overlay::new()
                .with_layer(curve(o).label("A"))
                .with_layer(curve(o).label("B"))
        };
        let map = FrameMap::new(["t"])
            .with_item(key![0], frame(0.0))
            .with_item(key![1], frame(1.0));
        let (keys, maps) = map.split_overlays().unwrap();
        assert_eq!(keys, vec![key!["Curve", "A"], key!["Curve", "B"]]);
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].len(), 2);
        assert!(FrameMap::new(["t"]).with_item(key![0], curve(0.0)).split_overlays().is_none());
    }
}
