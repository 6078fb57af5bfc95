//! Plots of a single, possibly frame-indexed, element.

use std::sync::Arc;

use tracing::trace;

use super::plot::{fill_title, join_titles, Dimensioned, DimensionedPlot, PlotArgs};
use super::ranges::{max_extents, DimRanges, Extents, FrameRanges};
use crate::container::{FrameKey, FrameMap, KeyValue, Viewable, DEFAULT_FRAME_DIM};
use crate::options::{OptionGroup, Options, OptionsRegistry};

/// Backend-independent part of an element plot.
///
/// Wraps the displayed object in a [`FrameMap`] and resolves keys to frames,
/// extents, axis labels and titles.
#[derive(Debug, Clone)]
pub struct GenericElementPlot {
    base: DimensionedPlot,
    map: FrameMap,
    style: Options,
    zorder: usize,
    cyclic_index: usize,
    overlaid: u8,
    ranges: Option<FrameRanges>,
}

impl GenericElementPlot {
    /// Wrap `obj`, resolving style and plot options of its last frame.
    #[must_use]
    pub fn new(
        obj: Viewable,
        args: PlotArgs,
        backend: &str,
        options: Arc<OptionsRegistry>,
    ) -> Self {
        let map = match obj {
            Viewable::Map(map) => map,
            other => FrameMap::single(other),
        };
        let last = map.last().cloned().unwrap_or(Viewable::Empty);
        let style = args
            .style
            .clone()
            .unwrap_or_else(|| options.lookup_options(backend, &last, OptionGroup::Style));
        let plot_opts = options.lookup_options(backend, &last, OptionGroup::Plot);

        let dimensions = args.dimensions.clone().unwrap_or_else(|| map.kdims().to_vec());
        let keys = match &args.keys {
            Some(keys) if !keys.is_empty() => keys.clone(),
            _ => map.keys().cloned().collect(),
        };
        let mut base = DimensionedPlot::new(backend, options, keys, dimensions).with_args(&args);
        base.params_mut().apply(&plot_opts);

        Self {
            base,
            map,
            style,
            zorder: args.zorder,
            cyclic_index: args.cyclic_index,
            overlaid: args.overlaid,
            ranges: args.ranges,
        }
    }

    /// The wrapped frame map.
    #[must_use]
    pub fn map(&self) -> &FrameMap {
        &self.map
    }

    /// Replace the wrapped frame map.
    pub fn set_map(&mut self, map: FrameMap) {
        self.map = map;
    }

    /// Style options, cycles included.
    #[must_use]
    pub fn style(&self) -> &Options {
        &self.style
    }

    /// Style options with every cycle resolved at the cyclic index.
    #[must_use]
    pub fn resolved_style(&self) -> Options {
        self.style.resolve(self.cyclic_index)
    }

    /// Draw order.
    #[must_use]
    pub fn zorder(&self) -> usize {
        self.zorder
    }

    /// Position within the style group.
    #[must_use]
    pub fn cyclic_index(&self) -> usize {
        self.cyclic_index
    }

    /// 0 when not overlaid, 1 inside an unordered overlay, 2 inside an indexed overlay.
    #[must_use]
    pub fn overlaid(&self) -> u8 {
        self.overlaid
    }

    /// Range maps supplied by the parent plot.
    #[must_use]
    pub fn parent_ranges(&self) -> Option<&FrameRanges> {
        self.ranges.as_ref()
    }

    /// Constraints selecting the frame at `key`.
    fn frame_constraints(&self, key: &FrameKey) -> Vec<(String, KeyValue)> {
        let kdims = self.map.kdim_names();
        let dims: Vec<&str> = if self.base.dimensions().is_empty() {
            kdims.clone()
        } else {
            self.base.dimensions().iter().map(|d| d.name()).collect()
        };
        if kdims == [DEFAULT_FRAME_DIM] && kdims != dims {
            return vec![(DEFAULT_FRAME_DIM.to_string(), KeyValue::Int(0))];
        }
        kdims
            .iter()
            .filter_map(|d| {
                let i = dims.iter().position(|x| x == d)?;
                key.get(i).map(|v| ((*d).to_string(), v.clone()))
            })
            .collect()
    }

    /// Select the frame at `key`.
    ///
    /// Uniform plots match `key` positionally against the plot dimensions. Otherwise
    /// a bare index picks the frame at that position, clamped to the last frame, and
    /// any other key is matched against the map's own key dimensions.
    #[must_use]
    pub fn get_frame(&self, key: &FrameKey) -> Option<Viewable> {
        let constraints = if self.base.uniform() {
            self.frame_constraints(key)
        } else if let Some(i) = key.as_index() {
            return self.map.nth(i.min(self.map.len().saturating_sub(1))).cloned();
        } else {
            self.map
                .kdims()
                .iter()
                .zip(key.values())
                .map(|(d, v)| (d.name().to_string(), v.clone()))
                .collect()
        };
        trace!(%key, ?constraints, "selecting frame");
        match self.map.select(&constraints)? {
            Viewable::Map(sub) => sub.last().cloned(),
            other => Some(other),
        }
    }

    /// Axis extents of `view`.
    ///
    /// Bounds come from `ranges` (or the view's own data) and are overridden by
    /// declared extents wherever those are finite: the view's own when its group is
    /// normalized per frame, else the union over the whole map.
    #[must_use]
    pub fn get_extents(&self, view: &Viewable, ranges: Option<&DimRanges>) -> Extents {
        let params = self.base.params();
        let three_d = params.projection.is_3d();
        let ndims = if three_d { 3 } else { 2 };

        let mut range_bounds = [(f32::NAN, f32::NAN); 3];
        if params.apply_ranges {
            let dims = view.dimensions();
            for (axis, bounds) in range_bounds.iter_mut().enumerate().take(ndims) {
                let from_map = ranges
                    .filter(|r| !r.is_empty())
                    .and_then(|r| dims.get(axis).and_then(|d| r.get(d.name())));
                *bounds = from_map.copied().unwrap_or_else(|| view.range_at(axis));
            }
        }

        let declared = if params.apply_extents {
            let norm = self.base.lookup_options(view, OptionGroup::Norm);
            if norm.get_bool("framewise").unwrap_or(false) {
                view.declared_extents().with_ndims(ndims)
            } else {
                let extents: Vec<Extents> = Viewable::Map(self.map.clone())
                    .elements()
                    .into_iter()
                    .map(|e| e.declared_extents())
                    .collect();
                max_extents(&extents, three_d)
            }
        } else {
            Extents::undefined(ndims)
        };

        let pick = |ext: f32, fallback: f32| if ext.is_finite() { ext } else { fallback };
        let mut values = Vec::with_capacity(ndims * 2);
        for (axis, bounds) in range_bounds.iter().enumerate().take(ndims) {
            values.push(pick(declared.lower(axis), bounds.0));
        }
        for (axis, bounds) in range_bounds.iter().enumerate().take(ndims) {
            values.push(pick(declared.upper(axis), bounds.1));
        }
        Extents::from_slice(&values)
    }

    /// Axis labels derived from the dimensions of `view`, keeping labels already given.
    ///
    /// The z label is only derived for 3-D projections.
    #[must_use]
    pub fn axis_labels(
        &self,
        view: &Viewable,
        xlabel: Option<String>,
        ylabel: Option<String>,
        zlabel: Option<String>,
    ) -> (Option<String>, Option<String>, Option<String>) {
        let mut dims = view.dimensions();
        if let Viewable::Overlay(o) = view {
            dims.drain(..o.kdims().len().min(dims.len()));
        }
        let xlabel = xlabel.or_else(|| dims.first().map(ToString::to_string));
        let ylabel = ylabel.or_else(|| dims.get(1).map(ToString::to_string));
        let zlabel = if self.base.params().projection.is_3d() {
            zlabel.or_else(|| dims.get(2).map(ToString::to_string))
        } else {
            zlabel
        };
        (xlabel, ylabel, zlabel)
    }

    /// Title of the frame at `key`.
    #[must_use]
    pub fn format_title(&self, key: &FrameKey) -> Option<String> {
        let frame = self.get_frame(key)?;
        let title = if self.base.layout_dimensions().is_some() {
            String::new()
        } else {
            fill_title(
                &self.base.params().title_format,
                frame.type_name(),
                frame.group_name(),
                frame.label_name(),
            )
        };
        Some(join_titles(&title, &self.base.frame_title(key, 2)))
    }
}

impl Dimensioned for GenericElementPlot {
    fn base(&self) -> &DimensionedPlot {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DimensionedPlot {
        &mut self.base
    }

    fn get_frame(&self, key: &FrameKey) -> Option<Viewable> {
        GenericElementPlot::get_frame(self, key)
    }

    fn format_title(&self, key: &FrameKey) -> Option<String> {
        GenericElementPlot::format_title(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Dimension, Element, Overlay};
    use crate::key;
    use crate::plotting::{PlotParams, Projection};

    fn plot(obj: impl Into<Viewable>, args: PlotArgs) -> GenericElementPlot {
        GenericElementPlot::new(obj.into(), args, "scene", Arc::new(OptionsRegistry::new()))
    }

    fn sine_map() -> FrameMap {
        (0..3).fold(FrameMap::new([Dimension::new("phase")]), |m, i| {
            let y = i as f32;
            m.with_item(key![i], Element::curve(&[0.0, 1.0], &[y, y + 1.0]))
        })
    }

    #[test]
    fn test_bare_element_single_frame() {
        let curve = Element::curve(&[0.0, 1.0], &[2.0, 3.0]).label("A");
        let p = plot(curve, PlotArgs::default());
        assert_eq!(p.base().len(), 1);
        let frame = p.get_frame(&FrameKey::index(0)).unwrap();
        assert_eq!(frame.as_element().unwrap().label_name(), "A");
        assert_eq!(frame.as_element().unwrap().column("y"), Some(&[2.0, 3.0][..]));
    }

    #[test]
    fn test_uniform_frame_selection() {
        let p = plot(sine_map(), PlotArgs::default());
        let frame = p.get_frame(&key![2]).unwrap();
        assert_eq!(frame.range_at(1), (2.0, 3.0));
        assert!(p.get_frame(&key![7]).is_none());
    }

    #[test]
    fn test_uniform_selection_with_parent_dimensions() {
        let args = PlotArgs {
            dimensions: Some(vec![Dimension::new("other"), Dimension::new("phase")]),
            keys: Some(vec![key!["a", 1]]),
            ..PlotArgs::default()
        };
        let p = plot(sine_map(), args);
        let frame = p.get_frame(&key!["a", 1]).unwrap();
        assert_eq!(frame.range_at(1), (1.0, 2.0));
    }

    #[test]
    fn test_frame_dimension_falls_back_to_first_frame() {
        let args = PlotArgs {
            dimensions: Some(vec![Dimension::new("t")]),
            keys: Some(vec![key![0], key![1]]),
            ..PlotArgs::default()
        };
        let p = plot(Element::curve(&[0.0], &[1.0]), args);
        assert!(p.get_frame(&key![1]).is_some());
    }

    #[test]
    fn test_non_uniform_index_clamped() {
        let args = PlotArgs {
            uniform: false,
            ..PlotArgs::default()
        };
        let p = plot(sine_map(), args);
        let frame = p.get_frame(&FrameKey::index(10)).unwrap();
        assert_eq!(frame.range_at(1), (2.0, 3.0));
    }

    #[test]
    fn test_extents_from_ranges_and_declared() {
        let curve = Element::curve(&[0.0, 1.0], &[0.0, 1.0]);
        let p = plot(curve.clone(), PlotArgs::default());
        let view: Viewable = curve.clone().into();
        assert_eq!(p.get_extents(&view, None).as_slice(), &[0.0, 0.0, 1.0, 1.0]);

        let ranges = DimRanges::from([("x".into(), (-5.0, 5.0)), ("y".into(), (-1.0, 2.0))]);
        assert_eq!(p.get_extents(&view, Some(&ranges)).as_slice(), &[-5.0, -1.0, 5.0, 2.0]);

        let declared = curve.extents(Extents::planar(f32::NAN, -10.0, f32::NAN, 10.0));
        let p = plot(declared.clone(), PlotArgs::default());
        let view: Viewable = declared.into();
        assert_eq!(p.get_extents(&view, Some(&ranges)).as_slice(), &[-5.0, -10.0, 5.0, 10.0]);
    }

    #[test]
    fn test_extents_disabled() {
        let curve = Element::curve(&[0.0, 1.0], &[0.0, 1.0]);
        let mut p = plot(curve.clone(), PlotArgs::default());
        p.base_mut().params_mut().apply_ranges = false;
        assert!(p.get_extents(&curve.into(), None).is_undefined());
    }

    #[test]
    fn test_axis_labels() {
        let curve = Element::curve(&[0.0], &[0.0])
            .kdims([Dimension::new("Time").unit("s")])
            .vdims(["Amplitude"]);
        let p = plot(curve.clone(), PlotArgs::default());
        let (x, y, z) = p.axis_labels(&curve.into(), None, Some("given".into()), None);
        assert_eq!(x.as_deref(), Some("Time (s)"));
        assert_eq!(y.as_deref(), Some("given"));
        assert!(z.is_none());

        let overlay: Viewable = Overlay::indexed(["k"])
            .with_item(key![0], Element::curve(&[0.0], &[0.0]))
            .into();
        let (x, _, _) = p.axis_labels(&overlay, None, None, None);
        assert_eq!(x.as_deref(), Some("x"));
    }

    #[test]
    fn test_format_title() {
        let points = Element::points(&[0.0], &[0.0]).group("Curve").label("Y");
        let p = plot(points, PlotArgs::default());
        assert_eq!(p.format_title(&FrameKey::index(0)).as_deref(), Some("Y Curve"));
    }

    #[test]
    fn test_format_title_with_dimensions() {
        let p = plot(sine_map(), PlotArgs::default());
        assert_eq!(p.format_title(&key![1]).as_deref(), Some("phase: 1"));
        assert!(p.format_title(&key![9]).is_none());
    }

    #[test]
    fn test_three_d_extents() {
        let el = Element::new(crate::container::ElementKind::Other("Surface".into()))
            .kdims(["x", "y"])
            .vdims(["z"])
            .data(vec![vec![0.0, 1.0], vec![0.0, 2.0], vec![0.0, 3.0]]);
        let mut p = plot(el.clone(), PlotArgs::default());
        *p.base_mut().params_mut() = PlotParams {
            projection: Projection::ThreeD,
            ..PlotParams::default()
        };
        assert_eq!(
            p.get_extents(&el.into(), None).as_slice(),
            &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]
        );
    }
}
