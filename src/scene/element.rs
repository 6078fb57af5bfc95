//! Scene plots of single elements: one glyph per plot.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::figure::{init_figure, stored_figure, Figure, SceneHandle, SceneState};
use super::glyph::{ColumnSource, Glyph, GlyphKind};
use super::renderer::AnyPlot;
use crate::container::{Element, FrameKey, Viewable};
use crate::error::{Error, Result};
use crate::options::OptionGroup;
use crate::plotting::{
    Dimensioned, DimensionedPlot, Extents, GenericElementPlot, Plot, PlotArgs, PlotContext,
    RangeMap,
};

/// Draws one element, or a map of elements, as a single glyph.
#[derive(Debug, Clone)]
pub struct ElementPlot {
    generic: GenericElementPlot,
    kind: GlyphKind,
    horizontal: bool,
    handles: BTreeMap<String, SceneHandle>,
}

impl ElementPlot {
    /// A plot of `obj`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredPlotType`] when the element has no glyph.
    pub fn new(obj: Viewable, args: PlotArgs, ctx: &PlotContext<AnyPlot>) -> Result<Self> {
        let generic = GenericElementPlot::new(obj, args, &ctx.backend, ctx.options.clone());
        let last = generic.map().last();
        let kind = last
            .and_then(Viewable::as_element)
            .and_then(|e| GlyphKind::for_element(e.kind()))
            .ok_or_else(|| Error::UnregisteredPlotType {
                backend: ctx.backend.clone(),
                view_type: last.map_or("Empty", Viewable::type_name).to_string(),
            })?;
        let horizontal = generic
            .base()
            .params()
            .extra
            .get_bool("horizontal")
            .unwrap_or(false);
        debug!(?kind, frames = generic.base().len(), "created element plot");
        Ok(Self {
            generic,
            kind,
            horizontal,
            handles: BTreeMap::new(),
        })
    }

    /// Backend-independent state.
    #[must_use]
    pub fn generic(&self) -> &GenericElementPlot {
        &self.generic
    }

    /// Glyph kind drawn by this plot.
    #[must_use]
    pub fn kind(&self) -> GlyphKind {
        self.kind
    }

    /// Draw order of the glyph.
    #[must_use]
    pub fn zorder(&self) -> usize {
        self.generic.zorder()
    }

    /// Ranges at `key` on top of `ranges`, or of the parent's ranges for `key`.
    fn frame_ranges(&self, key: &FrameKey, ranges: Option<&RangeMap>) -> RangeMap {
        let inherited = ranges
            .cloned()
            .or_else(|| self.generic.parent_ranges().and_then(|r| r.get(key)).cloned());
        let obj = Viewable::Map(self.generic.map().clone());
        self.compute_ranges(&obj, Some(key), inherited.as_ref())
    }

    /// Extents of `view` under `ranges`; text has none.
    #[must_use]
    pub fn extents(&self, view: &Viewable, ranges: &RangeMap) -> Extents {
        if self.kind == GlyphKind::Text {
            return Extents::undefined(2);
        }
        let dim_ranges = view.as_element().map(|e| ranges.match_spec(e));
        self.generic.get_extents(view, dim_ranges.as_ref())
    }

    fn glyph_for(&self, element: &Element) -> Glyph {
        let source = ColumnSource::from_element(element, self.kind, self.horizontal);
        Glyph::new(self.kind, source)
            .style(&self.generic.resolved_style())
            .zorder(self.generic.zorder())
            .label(element.label_name())
    }

    fn is_framewise(&self, view: &Viewable) -> bool {
        self.generic
            .base()
            .lookup_options(view, OptionGroup::Norm)
            .get_bool("framewise")
            .unwrap_or(false)
    }

    fn stored_glyph(&self) -> Result<&Glyph> {
        match self.handles.get("glyph") {
            Some(SceneHandle::Glyph(g)) => Ok(g),
            _ => Err(Error::NotInitialized("glyph")),
        }
    }

    /// Draw the last frame, sharing axis ranges with matching figures in `shared`.
    ///
    /// Overlaid plots contribute their glyph to the parent's figure instead of
    /// creating one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] when the plot has no frames.
    pub fn initialize_with(
        &mut self,
        ranges: Option<&RangeMap>,
        shared: &[Figure],
    ) -> Result<SceneState> {
        let key = self
            .generic
            .base()
            .keys()
            .last()
            .cloned()
            .ok_or(Error::NotInitialized("frames"))?;
        let view = self
            .generic
            .map()
            .last()
            .cloned()
            .ok_or(Error::NotInitialized("frames"))?;
        let element = view.as_element().ok_or(Error::NotInitialized("element"))?;
        let ranges = self.frame_ranges(&key, ranges);
        let glyph = self.glyph_for(element);
        self.handles
            .insert("glyph".to_string(), SceneHandle::Glyph(glyph.clone()));
        self.generic.base_mut().set_drawn(true);

        if self.generic.overlaid() > 0 {
            return Ok(SceneState::Layers(vec![glyph]));
        }
        let extents = self.extents(&view, &ranges);
        let mut figure = init_figure(&self.generic, &key, &view, &extents, shared);
        figure.add_glyph(glyph);
        self.handles
            .insert("plot".to_string(), SceneHandle::Figure(figure.clone()));
        Ok(SceneState::Figure(figure))
    }
}

impl Dimensioned for ElementPlot {
    fn base(&self) -> &DimensionedPlot {
        self.generic.base()
    }

    fn base_mut(&mut self) -> &mut DimensionedPlot {
        self.generic.base_mut()
    }

    fn get_frame(&self, key: &FrameKey) -> Option<Viewable> {
        self.generic.get_frame(key)
    }

    fn format_title(&self, key: &FrameKey) -> Option<String> {
        self.generic.format_title(key)
    }
}

impl Plot for ElementPlot {
    type State = SceneState;
    type Handle = SceneHandle;

    fn initialize_plot(&mut self, ranges: Option<&RangeMap>) -> Result<SceneState> {
        self.initialize_with(ranges, &[])
    }

    fn state(&self) -> Result<SceneState> {
        if !self.base().drawn() {
            return Err(Error::NotInitialized("plot"));
        }
        if self.generic.overlaid() > 0 {
            return Ok(SceneState::Layers(vec![self.stored_glyph()?.clone()]));
        }
        stored_figure(&self.handles).cloned().map(SceneState::Figure)
    }

    fn frame_count(&self) -> Result<usize> {
        Ok(self.base().len())
    }

    /// Replace the glyph data with the frame at `key`; a missing frame hides the glyph.
    fn update_frame(&mut self, key: &FrameKey, ranges: Option<&RangeMap>) -> Result<()> {
        let mut glyph = self.stored_glyph()?.clone();
        let frame = self.generic.get_frame(key);
        let mut figure = if self.generic.overlaid() > 0 {
            None
        } else {
            Some(stored_figure(&self.handles)?.clone())
        };

        match frame.as_ref().and_then(|f| f.as_element().map(|e| (f, e))) {
            Some((view, element)) => {
                glyph.update_source(ColumnSource::from_element(element, self.kind, self.horizontal));
                glyph.set_visible(true);
                if let Some(figure) = figure.as_mut() {
                    if self.base().params().show_title {
                        figure.set_title(self.generic.format_title(key).unwrap_or_default());
                    }
                    if self.is_framewise(view) {
                        let ranges = self.frame_ranges(key, ranges);
                        let extents = self.extents(view, &ranges);
                        figure.set_ranges(extents.axis(0), extents.axis(1));
                    }
                }
            }
            None => {
                trace!(%key, "no frame, hiding glyph");
                glyph.set_visible(false);
            }
        }

        if let Some(mut figure) = figure {
            figure.set_glyphs(vec![glyph.clone()]);
            self.handles
                .insert("plot".to_string(), SceneHandle::Figure(figure));
        }
        self.handles
            .insert("glyph".to_string(), SceneHandle::Glyph(glyph));
        Ok(())
    }

    fn handle(&self, name: &str) -> Option<&SceneHandle> {
        self.handles.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::FrameMap;
    use crate::key;
    use crate::options::Options;
    use crate::scene::SceneRenderer;

    fn build(obj: impl Into<Viewable>, args: PlotArgs) -> Result<ElementPlot> {
        let ctx = SceneRenderer::new().context();
        ElementPlot::new(obj.into(), args, &ctx)
    }

    fn frames() -> FrameMap {
        FrameMap::new(["t"])
            .with_item(key![0], Element::curve(&[0.0, 1.0], &[0.0, 1.0]))
            .with_item(key![1], Element::curve(&[0.0, 1.0], &[5.0, 6.0]))
    }

    #[test]
    fn test_initialize_builds_figure() {
        let mut plot = build(Element::curve(&[0.0, 2.0], &[1.0, 3.0]), PlotArgs::default()).unwrap();
        let state = plot.initialize_plot(None).unwrap();
        let fig = state.as_figure().unwrap();
        assert_eq!(fig.x_range(), (0.0, 2.0));
        assert_eq!(fig.y_range(), (1.0, 3.0));
        assert_eq!(fig.x_label(), Some("x"));
        assert_eq!(fig.y_label(), Some("y"));
        assert_eq!(fig.glyphs().len(), 1);
        assert!(plot.handle("plot").is_some());
        assert!(matches!(plot.handle("glyph"), Some(SceneHandle::Glyph(_))));
    }

    #[test]
    fn test_state_before_initialize() {
        let plot = build(Element::curve(&[0.0], &[0.0]), PlotArgs::default()).unwrap();
        assert!(matches!(plot.state(), Err(Error::NotInitialized(_))));
    }

    #[test]
    fn test_tables_have_no_glyph() {
        let err = build(Element::table(vec![("a", vec![1.0])]), PlotArgs::default()).unwrap_err();
        assert!(matches!(err, Error::UnregisteredPlotType { ref view_type, .. } if view_type == "Table"));
    }

    #[test]
    fn test_update_replaces_data_and_title() {
        let mut plot = build(frames(), PlotArgs::default()).unwrap();
        assert_eq!(plot.frame_count().unwrap(), 2);
        let state = plot.update(&key![0]).unwrap();
        let fig = state.as_figure().unwrap();
        assert_eq!(fig.title_text(), "t: 0");
        assert_eq!(fig.glyphs()[0].source().values("y"), Some(&[0.0_f32, 1.0][..]));
        // mapwise normalization spans both frames
        assert_eq!(fig.y_range(), (0.0, 6.0));
    }

    #[test]
    fn test_framewise_update_refreshes_ranges() {
        let mut reg = crate::scene::default_options();
        reg.set_options("scene", "Curve", OptionGroup::Norm, &Options::new().with("framewise", true));
        let ctx = SceneRenderer::new().with_options(reg).context();
        let mut plot = ElementPlot::new(frames().into(), PlotArgs::default(), &ctx).unwrap();
        let state = plot.update(&key![1]).unwrap();
        assert_eq!(state.as_figure().unwrap().y_range(), (5.0, 6.0));
    }

    #[test]
    fn test_missing_frame_hides_glyph() {
        let mut plot = build(frames(), PlotArgs::default()).unwrap();
        plot.initialize_plot(None).unwrap();
        plot.update_frame(&key![7], None).unwrap();
        let Some(SceneHandle::Glyph(glyph)) = plot.handle("glyph") else {
            panic!("no glyph");
        };
        assert!(!glyph.is_visible());
    }

    #[test]
    fn test_overlaid_plot_returns_layers() {
        let args = PlotArgs {
            overlaid: 1,
            zorder: 3,
            ..PlotArgs::default()
        };
        let mut plot = build(Element::scatter(&[0.0], &[1.0]), args).unwrap();
        let SceneState::Layers(glyphs) = plot.initialize_plot(None).unwrap() else {
            panic!("expected layers");
        };
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].draw_order(), 3);
        assert_eq!(glyphs[0].kind(), GlyphKind::Marker);
        assert!(plot.handle("plot").is_none());
    }

    #[test]
    fn test_text_has_no_extents() {
        let plot = build(Element::text(1.0, 2.0, "hi"), PlotArgs::default()).unwrap();
        let view = Viewable::from(Element::text(1.0, 2.0, "hi"));
        assert!(plot.extents(&view, &RangeMap::new()).is_undefined());
    }

    #[test]
    fn test_horizontal_error_bars() {
        let args = PlotArgs {
            params: Options::new().with("horizontal", true),
            ..PlotArgs::default()
        };
        let bars = Element::error_bars(&[1.0], &[2.0], &[0.5], &[0.5]);
        let mut plot = build(bars, args).unwrap();
        let state = plot.initialize_plot(None).unwrap();
        let glyph = &state.as_figure().unwrap().glyphs()[0];
        assert_eq!(glyph.kind(), GlyphKind::Segments);
        assert_eq!(glyph.source().nested("xs"), Some(&[vec![0.5_f32, 1.5]][..]));
        assert_eq!(glyph.source().nested("ys"), Some(&[vec![2.0_f32, 2.0]][..]));
    }
}
