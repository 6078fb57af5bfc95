//! Scene plots of overlays: layers draw into one shared figure.

use std::collections::BTreeMap;

use tracing::debug;

use super::figure::{init_figure, stored_figure, Figure, SceneHandle, SceneState};
use super::glyph::Glyph;
use super::renderer::AnyPlot;
use crate::container::{FrameKey, Viewable};
use crate::error::{Error, Result};
use crate::options::OptionGroup;
use crate::plotting::{
    Dimensioned, DimensionedPlot, Extents, GenericOverlayPlot, Plot, PlotArgs, PlotContext,
    RangeMap,
};

/// Draws every layer of an overlay into a single figure, ordered by z-order.
#[derive(Debug)]
pub struct OverlayPlot {
    generic: GenericOverlayPlot<AnyPlot>,
    handles: BTreeMap<String, SceneHandle>,
}

impl OverlayPlot {
    /// A plot of `obj` with one sub-plot per layer.
    ///
    /// # Errors
    ///
    /// Propagates sub-plot construction and compositor errors.
    pub fn new(obj: Viewable, args: PlotArgs, ctx: &PlotContext<AnyPlot>) -> Result<Self> {
        Ok(Self {
            generic: GenericOverlayPlot::new(obj, args, ctx)?,
            handles: BTreeMap::new(),
        })
    }

    /// Backend-independent state.
    #[must_use]
    pub fn generic(&self) -> &GenericOverlayPlot<AnyPlot> {
        &self.generic
    }

    /// Number of layer sub-plots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.generic.subplots().len()
    }

    /// Whether the overlay has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generic.subplots().is_empty()
    }

    /// Draw order of the first layer.
    #[must_use]
    pub fn zorder(&self) -> usize {
        self.generic.element().zorder()
    }

    /// Extents of `overlay`: the union over its layers.
    #[must_use]
    pub fn extents(&self, overlay: &Viewable, ranges: &RangeMap) -> Extents {
        self.generic.get_extents(overlay, ranges)
    }

    fn frame_ranges(&self, key: &FrameKey, ranges: Option<&RangeMap>) -> RangeMap {
        let element = self.generic.element();
        let inherited = ranges
            .cloned()
            .or_else(|| element.parent_ranges().and_then(|r| r.get(key)).cloned());
        let obj = Viewable::Map(element.map().clone());
        self.compute_ranges(&obj, Some(key), inherited.as_ref())
    }

    /// Current glyphs of every layer in draw order.
    fn layer_glyphs(&self) -> Result<Vec<Glyph>> {
        let mut glyphs = Vec::new();
        for (_, subplot) in self.generic.subplots() {
            glyphs.extend(subplot.state()?.into_glyphs());
        }
        glyphs.sort_by_key(Glyph::draw_order);
        Ok(glyphs)
    }

    /// Draw the last frame of every layer into one figure.
    ///
    /// Nested overlays hand their glyphs to the parent instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] when the overlay has no frames, and
    /// propagates layer errors.
    pub fn initialize_with(
        &mut self,
        ranges: Option<&RangeMap>,
        shared: &[Figure],
    ) -> Result<SceneState> {
        let key = self
            .base()
            .keys()
            .last()
            .cloned()
            .ok_or(Error::NotInitialized("frames"))?;
        let ranges = self.frame_ranges(&key, ranges);

        let mut glyphs = Vec::new();
        for (_, subplot) in self.generic.subplots_mut() {
            glyphs.extend(subplot.initialize_with(Some(&ranges), &[])?.into_glyphs());
        }
        glyphs.sort_by_key(Glyph::draw_order);
        self.base_mut().set_drawn(true);
        debug!(layers = glyphs.len(), %key, "initialized overlay");

        let element = self.generic.element();
        if element.overlaid() > 0 {
            return Ok(SceneState::Layers(glyphs));
        }
        let view = element
            .get_frame(&key)
            .or_else(|| element.map().last().cloned())
            .ok_or(Error::NotInitialized("frames"))?;
        let extents = self.extents(&view, &ranges);
        let mut figure = init_figure(element, &key, &view, &extents, shared);
        figure.set_glyphs(glyphs);
        self.handles
            .insert("plot".to_string(), SceneHandle::Figure(figure.clone()));
        Ok(SceneState::Figure(figure))
    }
}

impl Dimensioned for OverlayPlot {
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

impl Plot for OverlayPlot {
    type State = SceneState;
    type Handle = SceneHandle;

    fn initialize_plot(&mut self, ranges: Option<&RangeMap>) -> Result<SceneState> {
        self.initialize_with(ranges, &[])
    }

    fn state(&self) -> Result<SceneState> {
        if !self.base().drawn() {
            return Err(Error::NotInitialized("plot"));
        }
        if self.generic.element().overlaid() > 0 {
            return self.layer_glyphs().map(SceneState::Layers);
        }
        stored_figure(&self.handles).cloned().map(SceneState::Figure)
    }

    fn frame_count(&self) -> Result<usize> {
        Ok(self.base().len())
    }

    fn update_frame(&mut self, key: &FrameKey, ranges: Option<&RangeMap>) -> Result<()> {
        let frame_ranges = self.frame_ranges(key, ranges);
        for (_, subplot) in self.generic.subplots_mut() {
            subplot.update_frame(key, Some(&frame_ranges))?;
        }
        if self.generic.element().overlaid() > 0 {
            return Ok(());
        }

        let mut figure = stored_figure(&self.handles)?.clone();
        figure.set_glyphs(self.layer_glyphs()?);
        if self.base().params().show_title {
            figure.set_title(self.format_title(key).unwrap_or_default());
        }
        if let Some(view) = self.get_frame(key) {
            let framewise = self
                .base()
                .lookup_options(&view, OptionGroup::Norm)
                .get_bool("framewise")
                .unwrap_or(false);
            if framewise {
                let extents = self.extents(&view, &frame_ranges);
                figure.set_ranges(extents.axis(0), extents.axis(1));
            }
        }
        self.handles
            .insert("plot".to_string(), SceneHandle::Figure(figure));
        Ok(())
    }

    fn handle(&self, name: &str) -> Option<&SceneHandle> {
        self.handles.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Element, FrameMap, Overlay};
    use crate::key;
    use crate::plotting::Subplot;
    use crate::scene::{GlyphKind, SceneRenderer};

    fn build(obj: impl Into<Viewable>) -> OverlayPlot {
        let ctx = SceneRenderer::new().context();
        OverlayPlot::new(obj.into(), PlotArgs::default(), &ctx).unwrap()
    }

    fn overlay(shift: f32) -> Overlay {
        Overlay::new()
            .with_layer(Element::curve(&[0.0, 1.0], &[shift, shift + 1.0]))
            .with_layer(Element::scatter(&[-1.0, 2.0], &[shift, shift + 4.0]))
    }

    #[test]
    fn test_layers_share_one_figure() {
        let mut plot = build(overlay(0.0));
        assert_eq!(plot.len(), 2);
        let state = plot.initialize_plot(None).unwrap();
        let fig = state.as_figure().unwrap();
        let kinds: Vec<GlyphKind> = fig.glyphs().iter().map(Glyph::kind).collect();
        assert_eq!(kinds, vec![GlyphKind::Line, GlyphKind::Marker]);
        assert_eq!(fig.x_range(), (-1.0, 2.0));
        assert_eq!(fig.y_range(), (0.0, 4.0));
    }

    #[test]
    fn test_update_fans_out_to_layers() {
        let map = FrameMap::new(["t"])
            .with_item(key![0], overlay(0.0))
            .with_item(key![1], overlay(10.0));
        let mut plot = build(map);
        let state = plot.update(&key![0]).unwrap();
        let fig = state.as_figure().unwrap();
        assert_eq!(fig.glyphs()[0].source().values("y"), Some(&[0.0_f32, 1.0][..]));
        assert_eq!(fig.title_text(), "t: 0");

        let state = plot.update(&key![1]).unwrap();
        let fig = state.as_figure().unwrap();
        assert_eq!(fig.glyphs()[0].source().values("y"), Some(&[10.0_f32, 11.0][..]));
        assert_eq!(fig.y_range(), (0.0, 14.0));
    }

    #[test]
    fn test_missing_layer_hidden() {
        let map = FrameMap::new(["t"])
            .with_item(key![0], overlay(0.0))
            .with_item(
                key![1],
                Overlay::new().with_layer(Element::curve(&[0.0, 1.0], &[2.0, 3.0])),
            );
        let mut plot = build(map);
        plot.update(&key![0]).unwrap();
        let state = plot.update(&key![1]).unwrap();
        let fig = state.as_figure().unwrap();
        let visible: Vec<bool> = fig.glyphs().iter().map(Glyph::is_visible).collect();
        assert_eq!(visible, vec![true, false]);
    }

    #[test]
    fn test_nested_overlays_take_contiguous_zorders() {
        let indexed = Overlay::indexed(["i"])
            .with_item(key![0], overlay(0.0))
            .with_item(key![1], overlay(5.0));
        let mut plot = build(indexed);

        let spans: Vec<usize> = plot
            .generic()
            .subplots()
            .iter()
            .map(|(_, p)| p.zorder_span())
            .collect();
        assert_eq!(spans, vec![2, 2]);
        for (_, child) in plot.generic().subplots() {
            assert_eq!(child.as_overlay().unwrap().generic().element().overlaid(), 2);
        }

        let state = plot.initialize_plot(None).unwrap();
        let fig = state.as_figure().unwrap();
        let zorders: Vec<usize> = fig.glyphs().iter().map(Glyph::draw_order).collect();
        assert_eq!(zorders, vec![0, 1, 2, 3]);
    }
}
