//! Plots arranging independent sub-plots on a grid.

use std::sync::Arc;

use tracing::{debug, trace};

use super::plot::{fill_title, join_titles, Dimensioned, DimensionedPlot, PlotArgs, PlotParams};
use crate::container::{uniform, unique_dimkeys, FrameKey, KeyValue, Layout, Viewable};
use crate::error::{Error, Result};
use crate::options::{OptionGroup, OptionsRegistry};

/// Backend-independent part of any plot of a layout.
#[derive(Debug, Clone)]
pub struct GenericCompositePlot {
    base: DimensionedPlot,
    layout: Layout,
}

impl GenericCompositePlot {
    /// A composite plot of `layout` over the key space of `base`.
    #[must_use]
    pub fn new(base: DimensionedPlot, layout: Layout) -> Self {
        Self { base, layout }
    }

    /// The displayed layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Index into each item's own keys used by non-uniform plots.
    fn nth_frame(&self, key: &FrameKey) -> usize {
        match key.get(0) {
            Some(KeyValue::Int(i)) if *i >= 0 => *i as usize,
            _ => self.base.frame_index(key).unwrap_or(0),
        }
    }

    /// Dimension values selecting the frame of `item` at `key`.
    fn item_constraints(&self, item: &Viewable, key: &FrameKey) -> Vec<(String, KeyValue)> {
        let item_dims = item.frame_dimensions();
        if self.base.uniform() {
            self.base
                .dimensions()
                .iter()
                .zip(key.values())
                .filter(|(d, _)| item_dims.contains(*d))
                .map(|(d, v)| (d.name().to_string(), v.clone()))
                .collect()
        } else {
            let Some(map) = item.as_map() else {
                return Vec::new();
            };
            let n = self.nth_frame(key).min(map.len().saturating_sub(1));
            match map.nth_key(n) {
                Some(nth) => item_dims
                    .iter()
                    .zip(nth.values())
                    .map(|(d, v)| (d.name().to_string(), v.clone()))
                    .collect(),
                None => Vec::new(),
            }
        }
    }

    /// A copy of the layout holding, for each item, its frame at `key`.
    ///
    /// Items with no frame at `key` are left out.
    #[must_use]
    pub fn get_frame(&self, key: &FrameKey) -> Option<Viewable> {
        let mut frame = self.layout.clone_empty();
        for (path, item) in self.layout.items() {
            let constraints = self.item_constraints(item, key);
            if constraints.is_empty() {
                frame.insert(path.clone(), item.clone());
                continue;
            }
            match item.as_map().and_then(|m| m.select(&constraints)) {
                Some(Viewable::Map(sub)) if sub.is_empty() => {
                    trace!(%path, %key, "no frame for layout item");
                }
                Some(obj) => frame.insert(path.clone(), obj),
                None => trace!(%path, %key, "no frame for layout item"),
            }
        }
        Some(Viewable::Layout(frame))
    }

    /// Title from the layout's identity, followed by dimension values three per line.
    #[must_use]
    pub fn format_title(&self, key: &FrameKey) -> Option<String> {
        let dim_title = self.base.frame_title(key, 3);
        let title = fill_title(
            &self.base.params().title_format,
            self.layout.type_name(),
            self.layout.group_name(),
            self.layout.label_name(),
        );
        Some(join_titles(&title, &dim_title))
    }
}

impl Dimensioned for GenericCompositePlot {
    fn base(&self) -> &DimensionedPlot {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DimensionedPlot {
        &mut self.base
    }

    fn get_frame(&self, key: &FrameKey) -> Option<Viewable> {
        GenericCompositePlot::get_frame(self, key)
    }

    fn format_title(&self, key: &FrameKey) -> Option<String> {
        GenericCompositePlot::format_title(self, key)
    }
}

/// Backend-independent part of a layout plot: the grid shape and the shared key
/// space of every item.
#[derive(Debug, Clone)]
pub struct GenericLayoutPlot {
    composite: GenericCompositePlot,
    rows: usize,
    cols: usize,
    coords: Vec<(usize, usize)>,
}

impl GenericLayoutPlot {
    /// A plot of `obj`, which must be a non-empty layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayoutRoot`] for anything but a layout and
    /// [`Error::EmptyLayout`] for a layout with no items.
    pub fn new(
        obj: Viewable,
        args: PlotArgs,
        backend: &str,
        options: Arc<OptionsRegistry>,
    ) -> Result<Self> {
        let layout = match obj {
            Viewable::Layout(layout) => layout,
            other => return Err(Error::InvalidLayoutRoot(other.type_name().to_string())),
        };
        if layout.is_empty() {
            return Err(Error::EmptyLayout);
        }

        let (rows, cols) = layout.shape();
        let coords = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .collect();

        let obj = Viewable::Layout(layout.clone());
        let (dimensions, keys) = unique_dimkeys(&obj);
        let plot_opts = options.lookup_options(backend, &obj, OptionGroup::Plot);
        let args = PlotArgs {
            uniform: uniform(&obj),
            ..args
        };
        let base = DimensionedPlot::new(backend, options, keys, dimensions)
            .with_params(PlotParams::from_options(&plot_opts))
            .with_args(&args);
        debug!(rows, cols, frames = base.len(), uniform = base.uniform(), "created layout plot");

        Ok(Self {
            composite: GenericCompositePlot::new(base, layout),
            rows,
            cols,
            coords,
        })
    }

    /// The composite plot state.
    #[must_use]
    pub fn composite(&self) -> &GenericCompositePlot {
        &self.composite
    }

    /// The displayed layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        self.composite.layout()
    }

    /// Grid `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Every grid coordinate in scanline order.
    #[must_use]
    pub fn coords(&self) -> &[(usize, usize)] {
        &self.coords
    }
}

impl Dimensioned for GenericLayoutPlot {
    fn base(&self) -> &DimensionedPlot {
        self.composite.base()
    }

    fn base_mut(&mut self) -> &mut DimensionedPlot {
        self.composite.base_mut()
    }

    fn get_frame(&self, key: &FrameKey) -> Option<Viewable> {
        self.composite.get_frame(key)
    }

    fn format_title(&self, key: &FrameKey) -> Option<String> {
        self.composite.format_title(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Element, FrameMap};
    use crate::key;
    use crate::options::Options;

    fn plot(obj: impl Into<Viewable>) -> Result<GenericLayoutPlot> {
        GenericLayoutPlot::new(obj.into(), PlotArgs::default(), "scene", Arc::new(OptionsRegistry::new()))
    }

    fn curve(y: f32) -> Element {
        Element::curve(&[0.0, 1.0], &[y, y + 1.0])
    }

    fn timeline(dim: &str, keys: &[i32]) -> FrameMap {
        keys.iter()
            .fold(FrameMap::new([dim]), |m, k| m.with_item(key![*k], curve(*k as f32)))
    }

    #[test]
    fn test_rejects_invalid_roots() {
        assert!(matches!(plot(Layout::new()), Err(Error::EmptyLayout)));
        let err = plot(curve(0.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidLayoutRoot(ref t) if t == "Curve"));
    }

    #[test]
    fn test_shape_and_coords() {
        let layout = (0..5).fold(Layout::new(), |l, i| l.with_item(curve(i as f32)));
        let p = plot(layout).unwrap();
        assert_eq!(p.shape(), (2, 4));
        assert_eq!(p.coords().len(), 8);
        assert_eq!(p.coords()[5], (1, 1));
        assert_eq!(p.base().len(), 1);
    }

    #[test]
    fn test_uniform_frame_selects_each_item() {
        let layout = Layout::new()
            .with_item(timeline("t", &[0, 1]))
            .with_item(timeline("t", &[0, 1]))
            .with_item(curve(9.0));
        let p = plot(layout).unwrap();
        assert!(p.base().uniform());
        assert_eq!(p.base().keys(), &[key![0], key![1]]);

        let frame = p.get_frame(&key![1]).unwrap();
        let frame = frame.as_layout().unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.items()[0].1.range_at(1), (1.0, 2.0));
        assert_eq!(frame.items()[2].1.range_at(1), (9.0, 10.0));
    }

    #[test]
    fn test_item_without_frame_is_omitted() {
        let layout = Layout::new()
            .with_item(timeline("t", &[0, 1]))
            .with_item(timeline("t", &[0]));
        let p = plot(layout).unwrap();
        let frame = p.get_frame(&key![1]).unwrap();
        assert_eq!(frame.as_layout().unwrap().len(), 1);
        let frame = p.get_frame(&key![0]).unwrap();
        assert_eq!(frame.as_layout().unwrap().len(), 2);
    }

    #[test]
    fn test_non_uniform_frames_by_position() {
        let layout = Layout::new()
            .with_item(timeline("t", &[0, 1, 2]))
            .with_item(timeline("s", &[10, 20]));
        let p = plot(layout).unwrap();
        assert!(!p.base().uniform());

        let frame = p.get_frame(&key![2]).unwrap();
        let items = frame.as_layout().unwrap().items();
        assert_eq!(items[0].1.range_at(1), (2.0, 3.0));
        assert_eq!(items[1].1.range_at(1), (20.0, 21.0));
    }

    #[test]
    fn test_layout_title() {
        let layout = Layout::new()
            .with_item(timeline("t", &[0, 1]))
            .group("Results")
            .label("Run");
        let p = plot(layout).unwrap();
        assert_eq!(p.format_title(&key![1]).as_deref(), Some("Run Results\nt: 1"));

        let plain = plot(Layout::new().with_item(curve(0.0))).unwrap();
        assert_eq!(plain.format_title(&key![0]).as_deref(), Some(""));
    }

    #[test]
    fn test_plot_options_and_overrides() {
        let mut reg = OptionsRegistry::new();
        reg.set_options("scene", "Layout", OptionGroup::Plot, &Options::new().with("width", 800));
        let args = PlotArgs {
            params: Options::new().with("height", 200),
            ..PlotArgs::default()
        };
        let layout = Layout::new().with_item(curve(0.0));
        let p = GenericLayoutPlot::new(layout.into(), args, "scene", Arc::new(reg)).unwrap();
        assert_eq!((p.base().params().width, p.base().params().height), (800, 200));
    }
}
