//! Backend-agnostic plotting core.
//!
//! Every plot is a [`Dimensioned`] object addressing frames by [`FrameKey`] and
//! computing [`RangeMap`]s over its normalization groups. Element, overlay and
//! layout plots hold the logic shared by all backends; backends provide the
//! [`Plot`] rendering surface and register their classes in a [`PlotRegistry`].
//!
//! [`FrameKey`]: crate::container::FrameKey

mod element;
mod layout;
mod overlay;
mod plot;
mod ranges;
mod registry;

pub use element::GenericElementPlot;
pub use layout::{GenericCompositePlot, GenericLayoutPlot};
pub use overlay::{layer_sort, GenericOverlayPlot};
pub use plot::{Dimensioned, DimensionedPlot, Plot, PlotArgs, PlotParams, Projection};
pub use ranges::{
    match_spec, max_extents, max_range, DimRanges, Extents, FrameRanges, Range, RangeMap,
};
pub use registry::{
    PlotBuilder, PlotClass, PlotContext, PlotEntry, PlotRegistry, PlotRole, PlotSelector,
    SelectorFn, Subplot,
};
