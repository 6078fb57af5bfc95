//! Overlays: layers composited into one visual.

use super::dimension::Dimension;
use super::key::{FrameKey, KeyValue};
use super::spec::sanitize_identifier;
use super::viewable::Viewable;

/// Whether an overlay's layers are an unordered set or keyed by dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Layers keyed by `(group, label)` in the order they were added.
    Unordered,
    /// Layers keyed by values of the overlay's key dimensions.
    Indexed,
}

/// Multiple layers drawn into one set of axes.
#[derive(Debug, Clone)]
pub struct Overlay {
    kind: OverlayKind,
    kdims: Vec<Dimension>,
    layers: Vec<(FrameKey, Viewable)>,
    group: Option<String>,
    label: String,
    id: Option<u64>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay {
    /// An empty unordered overlay.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: OverlayKind::Unordered,
            kdims: Vec::new(),
            layers: Vec::new(),
            group: None,
            label: String::new(),
            id: None,
        }
    }

    /// An empty overlay keyed by `kdims`.
    #[must_use]
    pub fn indexed<D: Into<Dimension>>(kdims: impl IntoIterator<Item = D>) -> Self {
        Self {
            kind: OverlayKind::Indexed,
            kdims: kdims.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    /// Add a layer to an unordered overlay, keyed by its group and label.
    ///
    /// Nested unordered overlays are flattened. Duplicate keys get a roman numeral
    /// suffix (`II`, `III`, ...).
    #[must_use]
    pub fn with_layer(mut self, layer: impl Into<Viewable>) -> Self {
        self.push_layer(layer.into());
        self
    }

    /// Add a layer at `key` of an indexed overlay.
    #[must_use]
    pub fn with_item(mut self, key: impl Into<FrameKey>, layer: impl Into<Viewable>) -> Self {
        let key = key.into();
        let layer = layer.into();
        if let Some(slot) = self.layers.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = layer;
        } else {
            self.layers.push((key, layer));
        }
        self
    }

    fn push_layer(&mut self, layer: Viewable) {
        if let Viewable::Overlay(nested) = layer {
            if nested.kind == OverlayKind::Unordered {
                for (_, inner) in nested.layers {
                    self.push_layer(inner);
                }
                return;
            }
            self.push_keyed(Viewable::Overlay(nested));
        } else {
            self.push_keyed(layer);
        }
    }

    fn push_keyed(&mut self, layer: Viewable) {
        let mut parts = vec![KeyValue::Str(sanitize_identifier(layer.group_name()))];
        let label = sanitize_identifier(layer.label_name());
        if !label.is_empty() {
            parts.push(KeyValue::Str(label));
        }
        let base = FrameKey::new(parts);
        let mut key = base.clone();
        let mut n = 1;
        while self.layers.iter().any(|(k, _)| *k == key) {
            n += 1;
            key = base.clone();
            key.push(roman(n));
        }
        self.layers.push((key, layer));
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

    /// Whether the layers are unordered or indexed.
    #[must_use]
    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    /// Type name used in spec paths.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            OverlayKind::Unordered => "Overlay",
            OverlayKind::Indexed => "IndexedOverlay",
        }
    }

    /// Key dimensions of an indexed overlay (empty when unordered).
    #[must_use]
    pub fn kdims(&self) -> &[Dimension] {
        &self.kdims
    }

    /// `(key, layer)` pairs in layer order.
    #[must_use]
    pub fn layers(&self) -> &[(FrameKey, Viewable)] {
        &self.layers
    }

    /// Layer keys.
    pub fn keys(&self) -> impl Iterator<Item = &FrameKey> + '_ {
        self.layers.iter().map(|(k, _)| k)
    }

    /// Layer at `key`.
    #[must_use]
    pub fn get(&self, key: &FrameKey) -> Option<&Viewable> {
        self.layers.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether there are no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
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

    /// An overlay with the same kind and metadata holding `layers`.
    #[must_use]
    pub fn clone_with(&self, layers: Vec<(FrameKey, Viewable)>) -> Self {
        Self {
            kind: self.kind,
            kdims: self.kdims.clone(),
            layers,
            group: self.group.clone(),
            label: self.label.clone(),
            id: self.id,
        }
    }
}

fn roman(mut n: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, glyph) in TABLE {
        while n >= value {
            out.push_str(glyph);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Element;
    use crate::key;

    #[test]
    fn test_layer_keys() {
        let o = Overlay::new()
            .with_layer(Element::curve(&[0.0], &[0.0]).label("A"))
            .with_layer(Element::scatter(&[0.0], &[0.0]).group("Data"));
        let keys: Vec<_> = o.keys().cloned().collect();
        assert_eq!(keys, vec![key!["Curve", "A"], key!["Data"]]);
    }

    #[test]
    fn test_duplicate_keys_numbered() {
        let c = Element::curve(&[0.0], &[0.0]);
        let o = Overlay::new()
            .with_layer(c.clone())
            .with_layer(c.clone())
            .with_layer(c);
        let keys: Vec<_> = o.keys().cloned().collect();
        assert_eq!(keys, vec![key!["Curve"], key!["Curve", "II"], key!["Curve", "III"]]);
    }

    #[test]
    fn test_nested_overlays_flatten() {
        let inner = Overlay::new()
            .with_layer(Element::curve(&[0.0], &[0.0]).label("A"))
            .with_layer(Element::curve(&[0.0], &[0.0]).label("B"));
        let o = Overlay::new()
            .with_layer(inner)
            .with_layer(Element::curve(&[0.0], &[0.0]).label("C"));
        assert_eq!(o.len(), 3);
    }

    #[test]
    fn test_indexed_overlay() {
        let o = Overlay::indexed(["freq"])
            .with_item(key![1], Element::curve(&[0.0], &[1.0]))
            .with_item(key![2], Element::curve(&[0.0], &[2.0]));
        assert_eq!(o.kind(), OverlayKind::Indexed);
        assert_eq!(o.type_name(), "IndexedOverlay");
        assert!(o.get(&key![2]).is_some());
    }

    #[test]
    fn test_roman() {
        assert_eq!(roman(4), "IV");
        assert_eq!(roman(14), "XIV");
    }
}
