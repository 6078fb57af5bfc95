//! Dimensioned data containers.
//!
//! Elements are the leaves. [`FrameMap`] indexes objects by [`FrameKey`],
//! [`Overlay`] layers them into one set of axes and [`Layout`] arranges them on a
//! grid. [`Viewable`] ties the tree together and provides traversal.

mod dimension;
mod element;
mod extents;
mod frame_map;
mod key;
mod layout;
mod overlay;
mod spec;
mod traversal;
mod viewable;

pub use dimension::{Dimension, ValueFormatter};
pub use element::{Element, ElementKind};
pub use extents::Extents;
pub use frame_map::{FrameMap, DEFAULT_FRAME_DIM};
pub use key::{FrameKey, KeyValue};
pub use layout::{Layout, DEFAULT_COLS};
pub use overlay::{Overlay, OverlayKind};
pub use spec::{sanitize_identifier, SpecPath};
pub use traversal::{unique_dimkeys, uniform};
pub use viewable::{Traversal, TreePath, ViewType, Viewable};

pub(crate) use element::column_range;
pub(crate) use extents::{nan_max, nan_min};
