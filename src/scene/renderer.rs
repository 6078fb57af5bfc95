//! Plot dispatch and the default scene renderer.

use std::sync::Arc;

use tracing::{debug, info};

use super::element::ElementPlot;
use super::figure::{Figure, SceneHandle, SceneState};
use super::glyph::GlyphKind;
use super::layout::LayoutPlot;
use super::overlay::OverlayPlot;
use super::BACKEND;
use crate::color::DEFAULT_COLORS;
use crate::compositor::{Compositor, Passthrough};
use crate::container::{ElementKind, FrameKey, ViewType, Viewable};
use crate::error::Result;
use crate::options::{Cycle, OptionGroup, Options, OptionsRegistry};
use crate::plotting::{
    Dimensioned, DimensionedPlot, Extents, Plot, PlotArgs, PlotClass, PlotContext, PlotParams,
    PlotRegistry, PlotRole, RangeMap, Subplot,
};

/// Marker shapes cycled through by scatter layers.
const MARKERS: [&str; 5] = ["circle", "square", "triangle", "diamond", "inverted_triangle"];

/// Parameters understood by every scene plot besides [`PlotParams::NAMES`].
const SCENE_PARAMS: [&str; 3] = ["bgcolor", "xlog", "ylog"];

/// Any scene plot.
#[derive(Debug)]
pub enum AnyPlot {
    /// A single element or map of elements.
    Element(ElementPlot),
    /// An overlay.
    Overlay(OverlayPlot),
    /// A layout.
    Layout(LayoutPlot),
}

impl AnyPlot {
    /// Draw the last frame, sharing axis ranges with matching figures in `shared`.
    ///
    /// # Errors
    ///
    /// Propagates initialization errors of the wrapped plot.
    pub fn initialize_with(&mut self, ranges: Option<&RangeMap>, shared: &[Figure]) -> Result<SceneState> {
        match self {
            AnyPlot::Element(p) => p.initialize_with(ranges, shared),
            AnyPlot::Overlay(p) => p.initialize_with(ranges, shared),
            AnyPlot::Layout(p) => p.initialize_with(ranges, shared),
        }
    }

    /// Draw order of the plot's first glyph.
    #[must_use]
    pub fn zorder(&self) -> usize {
        match self {
            AnyPlot::Element(p) => p.zorder(),
            AnyPlot::Overlay(p) => p.zorder(),
            AnyPlot::Layout(_) => 0,
        }
    }

    /// The element plot, if this is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&ElementPlot> {
        match self {
            AnyPlot::Element(p) => Some(p),
            _ => None,
        }
    }

    /// The overlay plot, if this is one.
    #[must_use]
    pub fn as_overlay(&self) -> Option<&OverlayPlot> {
        match self {
            AnyPlot::Overlay(p) => Some(p),
            _ => None,
        }
    }

    /// The layout plot, if this is one.
    #[must_use]
    pub fn as_layout(&self) -> Option<&LayoutPlot> {
        match self {
            AnyPlot::Layout(p) => Some(p),
            _ => None,
        }
    }
}

impl Dimensioned for AnyPlot {
    fn base(&self) -> &DimensionedPlot {
        match self {
            AnyPlot::Element(p) => p.base(),
            AnyPlot::Overlay(p) => p.base(),
            AnyPlot::Layout(p) => p.base(),
        }
    }

    fn base_mut(&mut self) -> &mut DimensionedPlot {
        match self {
            AnyPlot::Element(p) => p.base_mut(),
            AnyPlot::Overlay(p) => p.base_mut(),
            AnyPlot::Layout(p) => p.base_mut(),
        }
    }

    fn get_frame(&self, key: &FrameKey) -> Option<Viewable> {
        match self {
            AnyPlot::Element(p) => p.get_frame(key),
            AnyPlot::Overlay(p) => p.get_frame(key),
            AnyPlot::Layout(p) => p.get_frame(key),
        }
    }

    fn format_title(&self, key: &FrameKey) -> Option<String> {
        match self {
            AnyPlot::Element(p) => p.format_title(key),
            AnyPlot::Overlay(p) => p.format_title(key),
            AnyPlot::Layout(p) => p.format_title(key),
        }
    }
}

impl Plot for AnyPlot {
    type State = SceneState;
    type Handle = SceneHandle;

    fn initialize_plot(&mut self, ranges: Option<&RangeMap>) -> Result<SceneState> {
        self.initialize_with(ranges, &[])
    }

    fn state(&self) -> Result<SceneState> {
        match self {
            AnyPlot::Element(p) => p.state(),
            AnyPlot::Overlay(p) => p.state(),
            AnyPlot::Layout(p) => p.state(),
        }
    }

    fn frame_count(&self) -> Result<usize> {
        Ok(self.base().len())
    }

    fn update_frame(&mut self, key: &FrameKey, ranges: Option<&RangeMap>) -> Result<()> {
        match self {
            AnyPlot::Element(p) => p.update_frame(key, ranges),
            AnyPlot::Overlay(p) => p.update_frame(key, ranges),
            AnyPlot::Layout(p) => p.update_frame(key, ranges),
        }
    }

    fn handle(&self, name: &str) -> Option<&SceneHandle> {
        match self {
            AnyPlot::Element(p) => p.handle(name),
            AnyPlot::Overlay(p) => p.handle(name),
            AnyPlot::Layout(p) => p.handle(name),
        }
    }
}

impl Subplot for AnyPlot {
    fn apply_ranges(&self) -> bool {
        self.base().params().apply_ranges
    }

    fn layer_extents(&self, layer: &Viewable, ranges: &RangeMap) -> Extents {
        match self {
            AnyPlot::Element(p) => p.extents(layer, ranges),
            AnyPlot::Overlay(p) => p.extents(layer, ranges),
            AnyPlot::Layout(_) => Extents::undefined(2),
        }
    }

    fn zorder_span(&self) -> usize {
        match self {
            AnyPlot::Overlay(p) => p.len(),
            _ => 1,
        }
    }
}

fn build_element(obj: Viewable, args: PlotArgs, ctx: &PlotContext<AnyPlot>) -> Result<AnyPlot> {
    ElementPlot::new(obj, args, ctx).map(AnyPlot::Element)
}

fn build_overlay(obj: Viewable, args: PlotArgs, ctx: &PlotContext<AnyPlot>) -> Result<AnyPlot> {
    OverlayPlot::new(obj, args, ctx).map(AnyPlot::Overlay)
}

fn build_layout(obj: Viewable, args: PlotArgs, ctx: &PlotContext<AnyPlot>) -> Result<AnyPlot> {
    LayoutPlot::new(obj, args, ctx).map(AnyPlot::Layout)
}

/// Style options registered by default.
///
/// Curves, scatters and polygons cycle through [`DEFAULT_COLORS`]; scatters also
/// cycle marker shapes and curves get a line width of 2.
#[must_use]
pub fn default_options() -> OptionsRegistry {
    let colors = Cycle::new(DEFAULT_COLORS);
    OptionsRegistry::new()
        .with_options(
            BACKEND,
            "Curve",
            OptionGroup::Style,
            &Options::new().with("color", colors.clone()).with("line_width", 2),
        )
        .with_options(
            BACKEND,
            "Scatter",
            OptionGroup::Style,
            &Options::new()
                .with("color", colors.clone())
                .with("marker", Cycle::new(MARKERS)),
        )
        .with_options(
            BACKEND,
            "Polygons",
            OptionGroup::Style,
            &Options::new().with("color", colors),
        )
}

/// Plot classes registered by default, one per displayable type.
#[must_use]
pub fn default_registry() -> PlotRegistry<AnyPlot> {
    let mut registry = PlotRegistry::new();
    let params: Vec<&str> = PlotParams::NAMES.iter().chain(&SCENE_PARAMS).copied().collect();

    let element_classes: [(&str, GlyphKind, &[ElementKind]); 7] = [
        ("CurvePlot", GlyphKind::Line, &[ElementKind::Curve]),
        ("PointPlot", GlyphKind::Marker, &[ElementKind::Points, ElementKind::Scatter]),
        (
            "RasterPlot",
            GlyphKind::Image,
            &[ElementKind::Image, ElementKind::Raster],
        ),
        ("RGBPlot", GlyphKind::RgbaImage, &[ElementKind::Rgb]),
        (
            "PathPlot",
            GlyphKind::MultiLine,
            &[
                ElementKind::Path,
                ElementKind::Contours,
                ElementKind::Box,
                ElementKind::Bounds,
                ElementKind::Ellipse,
            ],
        ),
        ("PolygonPlot", GlyphKind::Patches, &[ElementKind::Polygons]),
        ("TextPlot", GlyphKind::Text, &[ElementKind::Text]),
    ];
    for (name, glyph, kinds) in element_classes {
        let class = PlotClass::new(name, PlotRole::Element, build_element)
            .style_opts(&glyph.style_options())
            .params(&params);
        for kind in kinds {
            registry.register(BACKEND, ViewType::Element(kind.clone()), class.clone());
        }
    }

    let mut error_params = params.clone();
    error_params.push("horizontal");
    registry.register(
        BACKEND,
        ViewType::Element(ElementKind::ErrorBars),
        PlotClass::new("ErrorPlot", PlotRole::Element, build_element)
            .style_opts(&GlyphKind::Segments.style_options())
            .params(&error_params),
    );

    let overlay = PlotClass::new("OverlayPlot", PlotRole::Overlay, build_overlay).params(&params);
    registry.register(BACKEND, ViewType::Overlay, overlay.clone());
    registry.register(BACKEND, ViewType::IndexedOverlay, overlay);

    let layout = PlotClass::new("LayoutPlot", PlotRole::Composite, build_layout).params(&params);
    registry.register(BACKEND, ViewType::Layout, layout.clone());
    registry.register(BACKEND, ViewType::IndexedLayout, layout);
    registry
}

/// Dispatches objects to scene plots and renders them.
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    options: Arc<OptionsRegistry>,
    registry: Arc<PlotRegistry<AnyPlot>>,
    compositor: Arc<dyn Compositor>,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer {
    /// A renderer with the default options and plot classes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Arc::new(default_options()),
            registry: Arc::new(default_registry()),
            compositor: Arc::new(Passthrough),
        }
    }

    /// Use `options` instead of the defaults.
    #[must_use]
    pub fn with_options(mut self, options: OptionsRegistry) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Use `registry` instead of the default plot classes.
    #[must_use]
    pub fn with_registry(mut self, registry: PlotRegistry<AnyPlot>) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Collapse overlays with `compositor`.
    #[must_use]
    pub fn with_compositor(mut self, compositor: Arc<dyn Compositor>) -> Self {
        self.compositor = compositor;
        self
    }

    /// The options service.
    #[must_use]
    pub fn options(&self) -> &OptionsRegistry {
        &self.options
    }

    /// Context handed to every plot built by this renderer.
    #[must_use]
    pub fn context(&self) -> PlotContext<AnyPlot> {
        PlotContext::new(BACKEND, Arc::clone(&self.options), Arc::clone(&self.registry))
            .with_compositor(Arc::clone(&self.compositor))
    }

    /// Build the top-level plot of `obj`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnregisteredPlotType`] when `obj` or any nested
    /// object has no plot class, and layout errors for invalid layouts.
    pub fn plot(&self, obj: impl Into<Viewable>) -> Result<AnyPlot> {
        let obj = obj.into();
        debug!(view_type = %obj.view_type(), "building plot");
        self.context().build(obj, PlotArgs::default())
    }

    /// Render `obj` at `key`, or at its last frame.
    ///
    /// # Errors
    ///
    /// Propagates plot construction and drawing errors.
    pub fn render(&self, obj: impl Into<Viewable>, key: Option<&FrameKey>) -> Result<SceneState> {
        let mut plot = self.plot(obj)?;
        let state = plot.initialize_plot(None)?;
        let Some(key) = key else {
            return Ok(state);
        };
        plot.update_frame(key, None)?;
        plot.state()
    }

    /// Render every frame of `obj` in key order.
    ///
    /// # Errors
    ///
    /// Propagates plot construction and drawing errors.
    pub fn frames(&self, obj: impl Into<Viewable>) -> Result<Vec<SceneState>> {
        let mut plot = self.plot(obj)?;
        let keys = plot.base().keys().to_vec();
        let states = keys
            .iter()
            .map(|key| plot.update(key))
            .collect::<Result<Vec<_>>>()?;
        info!(frames = states.len(), "rendered frames");
        Ok(states)
    }

    /// Plot options of `obj` with its size scaled to `percent_size` percent.
    ///
    /// Maps are sized by their last frame.
    #[must_use]
    pub fn plot_options(&self, obj: &Viewable, percent_size: u32) -> Options {
        let sample = match obj {
            Viewable::Map(map) => map.last().unwrap_or(obj),
            other => other,
        };
        let opts = self.options.lookup_options(BACKEND, sample, OptionGroup::Plot);
        let params = PlotParams::from_options(&opts);
        let factor = f64::from(percent_size) / 100.0;
        let scale = |v: u32| (f64::from(v) * factor).round() as i64;
        opts.with("width", scale(params.width))
            .with("height", scale(params.height))
    }

    /// Display size `(width, height)` of an initialized plot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotInitialized`] before the plot is drawn.
    pub fn get_size(&self, plot: &AnyPlot) -> Result<(u32, u32)> {
        plot.state().map(|state| state.size())
    }
}
