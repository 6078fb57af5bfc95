//! Display-list rendering backend.
//!
//! Plots render into backend-neutral [`Figure`]s holding [`Glyph`]s backed by
//! named data columns. Layouts produce a [`GridFigure`]; overlaid plots hand their
//! glyphs to the parent figure.
//!
//! # Example
//!
//! ```
//! use trueno_plot::container::Element;
//! use trueno_plot::scene::SceneRenderer;
//!
//! let curve = Element::curve(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]);
//! let state = SceneRenderer::new().render(curve, None).unwrap();
//! let figure = state.as_figure().unwrap();
//! assert_eq!(figure.y_range(), (0.0, 4.0));
//! ```

mod element;
mod figure;
mod glyph;
mod layout;
mod overlay;
mod renderer;

/// Backend name under which scene options and plot classes are registered.
pub const BACKEND: &str = "scene";

pub use element::ElementPlot;
pub use figure::{Figure, GridCell, GridFigure, SceneHandle, SceneState};
pub use glyph::{Column, ColumnSource, Glyph, GlyphKind};
pub use layout::LayoutPlot;
pub use overlay::OverlayPlot;
pub use renderer::{default_options, default_registry, AnyPlot, SceneRenderer};
