//! The viewable object tree and its traversal.

use std::fmt;

use super::dimension::Dimension;
use super::element::{Element, ElementKind};
use super::extents::Extents;
use super::frame_map::FrameMap;
use super::key::FrameKey;
use super::layout::Layout;
use super::overlay::{Overlay, OverlayKind};
use super::spec::SpecPath;

/// Any object that can be displayed.
#[derive(Debug, Clone)]
pub enum Viewable {
    /// A single element.
    Element(Element),
    /// Layers drawn into one set of axes.
    Overlay(Overlay),
    /// A frame-indexed collection.
    Map(FrameMap),
    /// A grid of independent objects.
    Layout(Layout),
    /// Placeholder for an empty grid cell.
    Empty,
}

/// Type tag of a [`Viewable`], used as the plot registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewType {
    /// An element of the given kind.
    Element(ElementKind),
    /// Unordered overlay.
    Overlay,
    /// Overlay keyed by dimensions.
    IndexedOverlay,
    /// Frame-indexed collection.
    Map,
    /// Plain layout.
    Layout,
    /// Layout keyed by dimensions.
    IndexedLayout,
    /// Empty placeholder.
    Empty,
}

impl ViewType {
    /// Type name used in spec paths and error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ViewType::Element(kind) => kind.name(),
            ViewType::Overlay => "Overlay",
            ViewType::IndexedOverlay => "IndexedOverlay",
            ViewType::Map => "FrameMap",
            ViewType::Layout => "Layout",
            ViewType::IndexedLayout => "IndexedLayout",
            ViewType::Empty => "Empty",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path of keys from the traversal root to a node.
pub type TreePath = Vec<FrameKey>;

impl Viewable {
    /// Type tag.
    #[must_use]
    pub fn view_type(&self) -> ViewType {
        match self {
            Viewable::Element(e) => ViewType::Element(e.kind().clone()),
            Viewable::Overlay(o) => match o.kind() {
                OverlayKind::Unordered => ViewType::Overlay,
                OverlayKind::Indexed => ViewType::IndexedOverlay,
            },
            Viewable::Map(_) => ViewType::Map,
            Viewable::Layout(l) if l.is_indexed() => ViewType::IndexedLayout,
            Viewable::Layout(_) => ViewType::Layout,
            Viewable::Empty => ViewType::Empty,
        }
    }

    /// Type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Viewable::Element(e) => e.type_name(),
            Viewable::Overlay(o) => o.type_name(),
            Viewable::Map(_) => "FrameMap",
            Viewable::Layout(l) => l.type_name(),
            Viewable::Empty => "Empty",
        }
    }

    /// Group; defaults to the type name.
    #[must_use]
    pub fn group_name(&self) -> &str {
        match self {
            Viewable::Element(e) => e.group_name(),
            Viewable::Overlay(o) => o.group_name(),
            Viewable::Map(m) => m.group_name(),
            Viewable::Layout(l) => l.group_name(),
            Viewable::Empty => "Empty",
        }
    }

    /// Label.
    #[must_use]
    pub fn label_name(&self) -> &str {
        match self {
            Viewable::Element(e) => e.label_name(),
            Viewable::Overlay(o) => o.label_name(),
            Viewable::Map(m) => m.label_name(),
            Viewable::Layout(l) => l.label_name(),
            Viewable::Empty => "",
        }
    }

    /// Object id used for per-object option overrides.
    #[must_use]
    pub fn object_id(&self) -> Option<u64> {
        match self {
            Viewable::Element(e) => e.object_id(),
            Viewable::Overlay(o) => o.object_id(),
            Viewable::Map(m) => m.object_id(),
            Viewable::Layout(l) => l.object_id(),
            Viewable::Empty => None,
        }
    }

    /// Sanitized `(type, group, label)` identity.
    #[must_use]
    pub fn spec(&self) -> SpecPath {
        SpecPath::identity(self.type_name(), self.group_name(), self.label_name())
    }

    /// The element, if this is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Viewable::Element(e) => Some(e),
            _ => None,
        }
    }

    /// The overlay, if this is one.
    #[must_use]
    pub fn as_overlay(&self) -> Option<&Overlay> {
        match self {
            Viewable::Overlay(o) => Some(o),
            _ => None,
        }
    }

    /// The frame map, if this is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&FrameMap> {
        match self {
            Viewable::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The layout, if this is one.
    #[must_use]
    pub fn as_layout(&self) -> Option<&Layout> {
        match self {
            Viewable::Layout(l) => Some(l),
            _ => None,
        }
    }

    /// Whether this is an overlay of either kind.
    #[must_use]
    pub fn is_overlay(&self) -> bool {
        matches!(self, Viewable::Overlay(_))
    }

    /// Whether this is an annotation element.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        matches!(self, Viewable::Element(e) if e.kind().is_annotation())
    }

    /// Dimensions of the object: an element's own dimensions, or the key
    /// dimensions of an indexed overlay followed by those of its first layer.
    #[must_use]
    pub fn dimensions(&self) -> Vec<Dimension> {
        match self {
            Viewable::Element(e) => e.dimensions().cloned().collect(),
            Viewable::Overlay(o) => {
                let mut dims = o.kdims().to_vec();
                if let Some((_, first)) = o.layers().first() {
                    dims.extend(first.dimensions());
                }
                dims
            }
            Viewable::Map(m) => {
                let mut dims = m.kdims().to_vec();
                if let Some(last) = m.last() {
                    dims.extend(last.dimensions());
                }
                dims
            }
            Viewable::Layout(l) => l.kdims().to_vec(),
            Viewable::Empty => Vec::new(),
        }
    }

    /// Key dimensions through which frames of this object can be selected.
    #[must_use]
    pub fn frame_dimensions(&self) -> &[Dimension] {
        match self {
            Viewable::Map(m) => m.kdims(),
            _ => &[],
        }
    }

    /// Number of frame dimensions (zero unless this is a frame map).
    #[must_use]
    pub fn ndims(&self) -> usize {
        self.frame_dimensions().len()
    }

    /// `(min, max)` of the dimension at position `i` over every element in the tree.
    #[must_use]
    pub fn range_at(&self, i: usize) -> (f32, f32) {
        match self {
            Viewable::Element(e) => e.range_at(i),
            _ => self
                .elements()
                .into_iter()
                .map(|e| e.range_at(i))
                .fold((f32::NAN, f32::NAN), |acc, r| {
                    (
                        super::extents::nan_min(acc.0, r.0),
                        super::extents::nan_max(acc.1, r.1),
                    )
                }),
        }
    }

    /// Declared extents, unioned over every element in the tree.
    #[must_use]
    pub fn declared_extents(&self) -> Extents {
        match self {
            Viewable::Element(e) => e.declared_extents(),
            _ => self
                .elements()
                .into_iter()
                .map(Element::declared_extents)
                .fold(Extents::undefined(2), |acc, e| acc.union(&e)),
        }
    }

    /// Depth-first pre-order traversal of the tree, yielding each node with its path.
    #[must_use]
    pub fn traverse(&self) -> Traversal<'_> {
        Traversal {
            stack: vec![(Vec::new(), self)],
        }
    }

    /// Every element in the tree in traversal order.
    #[must_use]
    pub fn elements(&self) -> Vec<&Element> {
        self.traverse()
            .filter_map(|(_, node)| node.as_element())
            .collect()
    }

    /// Elements whose identity starts with `spec`.
    #[must_use]
    pub fn elements_matching(&self, spec: &SpecPath) -> Vec<&Element> {
        self.traverse()
            .filter_map(|(_, node)| node.as_element())
            .filter(|e| spec.is_prefix_of(&e.spec()))
            .collect()
    }

    fn children(&self) -> &[(FrameKey, Viewable)] {
        match self {
            Viewable::Overlay(o) => o.layers(),
            Viewable::Map(m) => m.items(),
            Viewable::Layout(l) => l.items(),
            Viewable::Element(_) | Viewable::Empty => &[],
        }
    }
}

/// Restartable depth-first iterator over `(path, node)` pairs.
///
/// Cloning the iterator restarts from the cloned position.
#[derive(Debug, Clone)]
pub struct Traversal<'a> {
    stack: Vec<(TreePath, &'a Viewable)>,
}

impl<'a> Iterator for Traversal<'a> {
    type Item = (TreePath, &'a Viewable);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        for (key, child) in node.children().iter().rev() {
            let mut child_path = path.clone();
            child_path.push(key.clone());
            self.stack.push((child_path, child));
        }
        Some((path, node))
    }
}

impl From<Element> for Viewable {
    fn from(e: Element) -> Self {
        Viewable::Element(e)
    }
}

impl From<Overlay> for Viewable {
    fn from(o: Overlay) -> Self {
        Viewable::Overlay(o)
    }
}

impl From<FrameMap> for Viewable {
    fn from(m: FrameMap) -> Self {
        Viewable::Map(m)
    }
}

impl From<Layout> for Viewable {
    fn from(l: Layout) -> Self {
        Viewable::Layout(l)
    }
}
