//! Scene plots of layouts: a grid of independent figures.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::figure::{Figure, GridFigure, SceneHandle, SceneState};
use super::renderer::AnyPlot;
use crate::container::{FrameKey, Viewable};
use crate::error::{Error, Result};
use crate::plotting::{
    Dimensioned, DimensionedPlot, FrameRanges, GenericLayoutPlot, Plot, PlotArgs, PlotContext,
    RangeMap,
};

/// Draws each occupied cell of a layout as its own figure.
#[derive(Debug)]
pub struct LayoutPlot {
    generic: GenericLayoutPlot,
    subplots: Vec<((usize, usize), AnyPlot)>,
    handles: BTreeMap<String, SceneHandle>,
}

impl LayoutPlot {
    /// A plot of the layout `obj` with one sub-plot per occupied cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayoutRoot`] or [`Error::EmptyLayout`] for bad roots,
    /// and propagates sub-plot construction errors.
    pub fn new(obj: Viewable, args: PlotArgs, ctx: &PlotContext<AnyPlot>) -> Result<Self> {
        let generic = GenericLayoutPlot::new(obj, args, &ctx.backend, ctx.options.clone())?;
        let layout = generic.layout();
        let obj = Viewable::Layout(layout.clone());
        let base = generic.base();

        let mapwise = generic.compute_ranges(&obj, None, None);
        let frame_ranges: FrameRanges = base
            .keys()
            .iter()
            .map(|key| (key.clone(), generic.compute_ranges(&obj, Some(key), Some(&mapwise))))
            .collect();

        let numbered = generic.coords().len() > 1;
        let mut subplots = Vec::new();
        for (coord, (path, item)) in layout.grid_items() {
            let empty = match item {
                Viewable::Empty => true,
                Viewable::Map(map) => map.is_empty(),
                _ => false,
            };
            if empty {
                warn!(%path, ?coord, "skipping empty layout cell");
                continue;
            }
            let layout_dimensions = layout.is_indexed().then(|| {
                layout
                    .kdims()
                    .iter()
                    .cloned()
                    .zip(path.values().iter().cloned())
                    .collect()
            });
            let args = PlotArgs {
                keys: Some(base.keys().to_vec()),
                dimensions: Some(base.dimensions().to_vec()),
                layout_dimensions,
                uniform: base.uniform(),
                subplot: true,
                ranges: Some(frame_ranges.clone()),
                layout_num: if numbered { subplots.len() + 1 } else { 0 },
                ..PlotArgs::default()
            };
            subplots.push((coord, ctx.build(item.clone(), args)?));
        }
        debug!(cells = subplots.len(), "created layout subplots");

        Ok(Self {
            generic,
            subplots,
            handles: BTreeMap::new(),
        })
    }

    /// Backend-independent state.
    #[must_use]
    pub fn generic(&self) -> &GenericLayoutPlot {
        &self.generic
    }

    /// Sub-plots keyed by grid coordinate, in scanline order.
    #[must_use]
    pub fn subplots(&self) -> &[((usize, usize), AnyPlot)] {
        &self.subplots
    }

    fn layout_ranges(&self, key: &FrameKey, ranges: Option<&RangeMap>) -> RangeMap {
        let obj = Viewable::Layout(self.generic.layout().clone());
        self.compute_ranges(&obj, Some(key), ranges)
    }

    fn empty_grid(&self, key: &FrameKey) -> GridFigure {
        let (rows, cols) = self.generic.shape();
        let title = if self.base().params().show_title {
            self.format_title(key).unwrap_or_default()
        } else {
            String::new()
        };
        GridFigure::new(rows, cols).title(title)
    }

    /// Cells from the current state of every sub-plot.
    fn collect_grid(&self, key: &FrameKey) -> Result<GridFigure> {
        let mut grid = self.empty_grid(key);
        for (coord, subplot) in &self.subplots {
            if let Some(cell) = subplot.state()?.into_cell() {
                grid.insert(*coord, cell);
            }
        }
        Ok(grid)
    }

    /// Draw the last frame of every cell; cells share axis ranges with earlier
    /// cells whose axis labels match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] when the layout has no frames, and
    /// propagates cell errors.
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
        let ranges = self.layout_ranges(&key, ranges);
        let mut grid = self.empty_grid(&key);

        let mut figures: Vec<Figure> = shared.to_vec();
        for (coord, subplot) in &mut self.subplots {
            let state = subplot.initialize_with(Some(&ranges), &figures)?;
            if let Some(figure) = state.as_figure() {
                figures.push(figure.clone());
            }
            if let Some(cell) = state.into_cell() {
                grid.insert(*coord, cell);
            }
        }
        self.base_mut().set_drawn(true);
        self.handles
            .insert("plot".to_string(), SceneHandle::Grid(grid.clone()));
        Ok(SceneState::Grid(grid))
    }
}

impl Dimensioned for LayoutPlot {
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

impl Plot for LayoutPlot {
    type State = SceneState;
    type Handle = SceneHandle;

    fn initialize_plot(&mut self, ranges: Option<&RangeMap>) -> Result<SceneState> {
        self.initialize_with(ranges, &[])
    }

    fn state(&self) -> Result<SceneState> {
        match self.handles.get("plot") {
            Some(SceneHandle::Grid(grid)) if self.base().drawn() => Ok(SceneState::Grid(grid.clone())),
            _ => Err(Error::NotInitialized("plot")),
        }
    }

    fn frame_count(&self) -> Result<usize> {
        Ok(self.base().len())
    }

    fn update_frame(&mut self, key: &FrameKey, ranges: Option<&RangeMap>) -> Result<()> {
        let ranges = self.layout_ranges(key, ranges);
        for (_, subplot) in &mut self.subplots {
            subplot.update_frame(key, Some(&ranges))?;
        }
        let grid = self.collect_grid(key)?;
        self.handles
            .insert("plot".to_string(), SceneHandle::Grid(grid));
        Ok(())
    }

    fn handle(&self, name: &str) -> Option<&SceneHandle> {
        self.handles.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Element, FrameMap, Layout};
    use crate::key;
    use crate::scene::SceneRenderer;

    fn build(obj: impl Into<Viewable>) -> Result<LayoutPlot> {
        let ctx = SceneRenderer::new().context();
        LayoutPlot::new(obj.into(), PlotArgs::default(), &ctx)
    }

    fn timeline(shift: f32) -> FrameMap {
        FrameMap::new(["t"])
            .with_item(key![0], Element::curve(&[0.0, 1.0], &[shift, shift + 1.0]))
            .with_item(key![1], Element::curve(&[0.0, 2.0], &[shift, shift + 2.0]))
    }

    #[test]
    fn test_grid_has_one_figure_per_cell() {
        let layout = Layout::new()
            .with_item(Element::curve(&[0.0, 1.0], &[0.0, 1.0]))
            .with_item(Element::scatter(&[0.0, 1.0], &[0.0, 1.0]))
            .with_item(Element::image(
                crate::container::Extents::planar(0.0, 0.0, 1.0, 1.0),
                1,
                1,
                &[0.5],
            ));
        let mut plot = build(layout).unwrap();
        assert_eq!(plot.subplots().len(), 3);
        let state = plot.initialize_plot(None).unwrap();
        let grid = state.as_grid().unwrap();
        assert_eq!(grid.shape(), (1, 3));
        assert_eq!(grid.len(), 3);
        assert!(grid.figure(0, 2).is_some());
    }

    #[test]
    fn test_matching_axes_share_ranges() {
        let layout = Layout::new()
            .with_item(Element::curve(&[0.0, 1.0], &[0.0, 1.0]))
            .with_item(Element::curve(&[5.0, 9.0], &[0.0, 1.0]));
        let mut plot = build(layout).unwrap();
        let state = plot.initialize_plot(None).unwrap();
        let grid = state.as_grid().unwrap();
        let first = grid.figure(0, 0).unwrap();
        let second = grid.figure(0, 1).unwrap();
        assert_eq!(second.x_range(), first.x_range());
    }

    #[test]
    fn test_update_each_cell() {
        let layout = Layout::new().with_item(timeline(0.0)).with_item(timeline(10.0));
        let mut plot = build(layout).unwrap();
        assert_eq!(plot.frame_count().unwrap(), 2);
        plot.update(&key![1]).unwrap();
        let state = plot.update(&key![0]).unwrap();
        let grid = state.as_grid().unwrap();
        let right = grid.figure(0, 1).unwrap();
        assert_eq!(right.glyphs()[0].source().values("y"), Some(&[10.0_f32, 11.0][..]));
    }

    #[test]
    fn test_empty_cell_beside_drawable_cell() {
        let layout = Layout::new()
            .with_item(FrameMap::new(["t"]))
            .with_item(Element::curve(&[0.0, 1.0], &[2.0, 3.0]));
        let mut plot = build(layout).unwrap();
        assert_eq!(plot.subplots().len(), 1);
        assert_eq!(plot.frame_count().unwrap(), 1);

        let state = plot.initialize_plot(None).unwrap();
        let grid = state.as_grid().unwrap();
        assert_eq!(grid.len(), 1);
        assert!(grid.figure(0, 0).is_none());
        assert_eq!(grid.figure(0, 1).unwrap().y_range(), (2.0, 3.0));
    }

    #[test]
    fn test_invalid_roots() {
        assert!(matches!(build(Layout::new()), Err(Error::EmptyLayout)));
        assert!(matches!(
            build(Element::curve(&[0.0], &[0.0])),
            Err(Error::InvalidLayoutRoot(_))
        ));
    }
}
