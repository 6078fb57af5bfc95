//! # Trueno-Plot
//!
//! Backend-agnostic plotting core for dimensioned data.
//!
//! Objects to display form a tree of [`container::Element`]s, overlays, frame maps
//! and layouts. A plot addresses each frame of that tree by a [`container::FrameKey`],
//! computes the numeric ranges of its normalization groups so that axes stay stable
//! across frames, and hands frames, ranges, extents, styles and z-orders to a
//! rendering backend.
//!
//! ## Features
//!
//! - **Frame keys**: uniform and non-uniform key spaces over nested frame maps
//! - **Normalization**: per-group ranges computed across the whole map or per frame
//! - **Composition**: overlay layers share axes, style cycles and z-order; layouts
//!   arrange independent sub-plots on a grid
//! - **Options service**: hierarchical style, plot and norm options, loadable from YAML
//! - **Scene backend**: a display-list renderer producing backend-neutral figures
//!
//! ## Quick Start
//!
//! ```rust
//! use trueno_plot::prelude::*;
//!
//! let overlay = Overlay::new()
//!     .with_layer(Element::curve(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]))
//!     .with_layer(Element::scatter(&[0.5, 1.5], &[2.0, 3.0]));
//!
//! let state = SceneRenderer::new().render(overlay, None)?;
//! let figure = state.as_figure().expect("overlays render to one figure");
//! assert_eq!(figure.glyphs().len(), 2);
//! # Ok::<(), trueno_plot::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `config` (default): load options registries from YAML
//! - `parallel`: parallel SIMD reductions in trueno

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// RGBA colors and the default color cycle.
pub mod color;

/// The viewable object tree: elements, overlays, frame maps and layouts.
pub mod container;

/// Hierarchical style, plot and normalization options.
pub mod options;

// ============================================================================
// Plotting Modules
// ============================================================================

/// Operations collapsing overlay layers before display.
pub mod compositor;

/// Backend-independent plots: frame keys, ranges, extents and sub-plots.
pub mod plotting;

/// Display-list rendering backend.
pub mod scene;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-plot operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use trueno_plot::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::Rgba;
    pub use crate::compositor::{Compositor, CompositorRule, RuleCompositor};
    pub use crate::container::{
        Dimension, Element, ElementKind, Extents, FrameKey, FrameMap, KeyValue, Layout, Overlay,
        Viewable,
    };
    pub use crate::error::{Error, Result};
    pub use crate::key;
    pub use crate::options::{Cycle, OptionGroup, Options, OptionsRegistry};
    pub use crate::plotting::{Dimensioned, Plot, PlotArgs, RangeMap};
    pub use crate::scene::{Figure, GridFigure, SceneRenderer, SceneState};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
