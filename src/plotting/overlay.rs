//! Plots of overlays: one sub-plot per layer, with shared style groups and z-order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::element::GenericElementPlot;
use super::plot::{Dimensioned, DimensionedPlot, PlotArgs};
use super::ranges::{max_extents, Extents, FrameRanges, RangeMap};
use super::registry::{PlotContext, Subplot};
use crate::compositor::CollapseMode;
use crate::container::{
    FrameKey, FrameMap, KeyValue, Overlay, OverlayKind, ViewType, Viewable, DEFAULT_FRAME_DIM,
};
use crate::error::Result;
use crate::options::OptionGroup;

/// Style identity of a layer: its type, plus group and label inside indexed
/// overlays, followed by the layer key.
fn layer_spec(overlay: &Overlay, key: &FrameKey, layer: &Viewable) -> FrameKey {
    let prefix = match overlay.kind() {
        OverlayKind::Unordered => vec![KeyValue::Str(layer.type_name().to_string())],
        OverlayKind::Indexed => vec![
            KeyValue::Str(layer.type_name().to_string()),
            KeyValue::Str(layer.group_name().to_string()),
            KeyValue::Str(layer.label_name().to_string()),
        ],
    };
    FrameKey::new(prefix).concat(key)
}

/// Order of layer identities across all frames of `map`.
///
/// A layer is placed after every layer that precedes it in some frame. Layers at
/// the same depth are sorted; layers caught in a cycle are appended sorted.
#[must_use]
pub fn layer_sort(map: &FrameMap) -> Vec<FrameKey> {
    let mut predecessors: BTreeMap<FrameKey, BTreeSet<FrameKey>> = BTreeMap::new();
    for value in map.values() {
        let Viewable::Overlay(overlay) = value else {
            continue;
        };
        let specs: Vec<FrameKey> = overlay
            .layers()
            .iter()
            .map(|(key, layer)| layer_spec(overlay, key, layer))
            .collect();
        for (i, spec) in specs.iter().enumerate() {
            let preds = predecessors.entry(spec.clone()).or_default();
            if let Some(prev) = i.checked_sub(1).map(|j| &specs[j]) {
                if prev != spec {
                    preds.insert(prev.clone());
                }
            }
        }
    }

    let mut ordering = Vec::with_capacity(predecessors.len());
    while !predecessors.is_empty() {
        let level: Vec<FrameKey> = predecessors
            .iter()
            .filter(|(_, preds)| preds.iter().all(|p| !predecessors.contains_key(p)))
            .map(|(k, _)| k.clone())
            .collect();
        if level.is_empty() {
            ordering.extend(predecessors.into_keys());
            break;
        }
        for key in &level {
            predecessors.remove(key);
        }
        ordering.extend(level);
    }
    ordering
}

/// Backend-independent part of an overlay plot.
///
/// Collapses the wrapped map with the context's compositor, then creates one
/// sub-plot per layer identity.
#[derive(Debug)]
pub struct GenericOverlayPlot<P> {
    element: GenericElementPlot,
    subplots: Vec<(FrameKey, P)>,
}

impl<P: Subplot> GenericOverlayPlot<P> {
    /// Wrap `obj`, collapse it and build the layer sub-plots.
    ///
    /// # Errors
    ///
    /// Propagates compositor failures and [`crate::Error::UnregisteredPlotType`]
    /// for layers without a plotting class.
    pub fn new(obj: Viewable, args: PlotArgs, ctx: &PlotContext<P>) -> Result<Self> {
        let ranges = args.ranges.clone();
        let mut element = GenericElementPlot::new(obj, args, &ctx.backend, ctx.options.clone());

        let collapsed = ctx.compositor.collapse(element.map().clone(), CollapseMode::Data)?;
        element.set_map(collapsed);
        let mut plot = Self {
            element,
            subplots: Vec::new(),
        };
        let displayed = plot.apply_compositor(ranges.as_ref(), ctx)?;
        plot.element.set_map(displayed);
        plot.subplots = plot.create_subplots(ranges.as_ref(), ctx)?;
        debug!(layers = plot.subplots.len(), "created overlay plot");
        Ok(plot)
    }

    /// Collapse the wrapped map in display mode with per-frame ranges.
    ///
    /// Parent ranges are reused when the map is sliceable from the parent keys;
    /// otherwise ranges are computed across the map and refined per frame.
    fn apply_compositor(&self, ranges: Option<&FrameRanges>, ctx: &PlotContext<P>) -> Result<FrameMap> {
        let map = self.element.map();
        let base = self.element.base();
        let default_dim = map.ndims() == 1 && map.kdim_names()[0] != DEFAULT_FRAME_DIM;
        let obj = Viewable::Map(map.clone());

        let mut frame_keys = Vec::new();
        let mut frame_ranges = Vec::new();
        match ranges {
            Some(parent) if !base.is_empty() && !base.dimensions().is_empty() && !default_dim => {
                let dim_inds: Vec<usize> = map
                    .kdims()
                    .iter()
                    .filter_map(|d| base.dimensions().iter().position(|pd| pd.name() == d.name()))
                    .collect();
                for key in base.keys() {
                    let sliced = FrameKey::new(
                        dim_inds.iter().filter_map(|&i| key.get(i).cloned()).collect(),
                    );
                    if map.contains_key(&sliced) {
                        frame_ranges.push(self.compute_ranges(&obj, Some(key), parent.get(key)));
                        frame_keys.push(sliced);
                    }
                }
            }
            _ => {
                let mapwise = self.compute_ranges(&obj, None, None);
                for key in map.keys() {
                    frame_ranges.push(self.compute_ranges(&obj, Some(key), Some(&mapwise)));
                    frame_keys.push(key.clone());
                }
            }
        }

        ctx.compositor.collapse(
            map.clone(),
            CollapseMode::Display {
                ranges: &frame_ranges,
                keys: &frame_keys,
            },
        )
    }

    /// One sub-plot per layer identity, with style cycling and z-order assigned.
    fn create_subplots(
        &self,
        ranges: Option<&FrameRanges>,
        ctx: &PlotContext<P>,
    ) -> Result<Vec<(FrameKey, P)>> {
        let map = self.element.map();
        let Some((keys, vmaps)) = map.split_overlays() else {
            return Ok(Vec::new());
        };
        let base = self.element.base();
        let params = base.params();
        let length = params.style_grouping;
        let ordering = layer_sort(map);
        let unordered = map.value_type() == Some(ViewType::Overlay);
        let overlaid = if unordered { 1 } else { 2 };

        let style_key = |key: &FrameKey, vmap: &FrameMap| {
            let last = vmap.last().cloned().unwrap_or(Viewable::Empty);
            let prefix = if unordered {
                vec![KeyValue::Str(last.type_name().to_string())]
            } else {
                vec![
                    KeyValue::Str(last.type_name().to_string()),
                    KeyValue::Str(last.group_name().to_string()),
                    KeyValue::Str(last.label_name().to_string()),
                ]
            };
            FrameKey::new(prefix).concat(key)
        };

        let mut map_lengths: BTreeMap<FrameKey, usize> = BTreeMap::new();
        for (key, vmap) in keys.iter().zip(&vmaps) {
            *map_lengths.entry(style_key(key, vmap).truncate(length)).or_default() += 1;
        }

        let mut zoffset = 0;
        let mut group_counter: BTreeMap<FrameKey, usize> = BTreeMap::new();
        let mut subplots = Vec::with_capacity(keys.len());
        for (key, vmap) in keys.into_iter().zip(vmaps) {
            let spec = style_key(&key, &vmap);
            let group_key = spec.truncate(length);
            let zorder = ordering.iter().position(|k| *k == spec).unwrap_or(ordering.len()) + zoffset;
            let counter = group_counter.entry(group_key.clone()).or_default();
            let cyclic_index = *counter;
            *counter += 1;
            let group_length = map_lengths.get(&group_key).copied().unwrap_or(1);

            let last = vmap.last().cloned().unwrap_or(Viewable::Empty);
            let style = base
                .lookup_options(&last, OptionGroup::Style)
                .max_cycles(group_length);
            let args = PlotArgs {
                keys: Some(base.keys().to_vec()),
                dimensions: Some(base.dimensions().to_vec()),
                layout_dimensions: base.layout_dimensions().map(<[_]>::to_vec),
                uniform: base.uniform(),
                subplot: true,
                ranges: ranges.cloned(),
                style: Some(style),
                cyclic_index,
                zorder: self.element.zorder() + zorder,
                overlaid,
                show_title: Some(params.show_title),
                show_legend: Some(params.show_legend),
                layout_num: base.layout_num(),
                ..PlotArgs::default()
            };
            let subplot = ctx.build(Viewable::Map(vmap), args)?;
            zoffset += subplot.zorder_span().saturating_sub(1);
            subplots.push((key, subplot));
        }
        Ok(subplots)
    }

    /// Union of the extents of every layer whose sub-plot applies ranges.
    ///
    /// Annotations and layers missing from `overlay` take no part.
    #[must_use]
    pub fn get_extents(&self, overlay: &Viewable, ranges: &RangeMap) -> Extents {
        let three_d = self.element.base().params().projection.is_3d();
        let Some(overlay) = overlay.as_overlay() else {
            return Extents::undefined(if three_d { 3 } else { 2 });
        };
        let extents: Vec<Extents> = self
            .subplots
            .iter()
            .filter(|(_, subplot)| subplot.apply_ranges())
            .filter_map(|(key, subplot)| {
                let layer = overlay.get(key)?;
                (!layer.is_annotation()).then(|| subplot.layer_extents(layer, ranges))
            })
            .collect();
        max_extents(&extents, three_d)
    }
}

impl<P> GenericOverlayPlot<P> {
    /// The element-level state of the overlay.
    #[must_use]
    pub fn element(&self) -> &GenericElementPlot {
        &self.element
    }

    /// Mutable element-level state.
    pub fn element_mut(&mut self) -> &mut GenericElementPlot {
        &mut self.element
    }

    /// Sub-plots keyed by layer key, in layer order.
    #[must_use]
    pub fn subplots(&self) -> &[(FrameKey, P)] {
        &self.subplots
    }

    /// Mutable sub-plots.
    pub fn subplots_mut(&mut self) -> &mut [(FrameKey, P)] {
        &mut self.subplots
    }

    /// Sub-plot of the layer at `key`.
    #[must_use]
    pub fn subplot(&self, key: &FrameKey) -> Option<&P> {
        self.subplots.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    /// Overlays leave axis labels to their layers.
    #[must_use]
    pub fn axis_labels(
        &self,
        xlabel: Option<String>,
        ylabel: Option<String>,
        zlabel: Option<String>,
    ) -> (Option<String>, Option<String>, Option<String>) {
        (xlabel, ylabel, zlabel)
    }
}

impl<P> Dimensioned for GenericOverlayPlot<P> {
    fn base(&self) -> &DimensionedPlot {
        self.element.base()
    }

    fn base_mut(&mut self) -> &mut DimensionedPlot {
        self.element.base_mut()
    }

    fn get_frame(&self, key: &FrameKey) -> Option<Viewable> {
        self.element.get_frame(key)
    }

    fn format_title(&self, key: &FrameKey) -> Option<String> {
        self.element.format_title(key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::compositor::{CompositorRule, RuleCompositor};
    use crate::container::{Element, ElementKind, SpecPath};
    use crate::key;
    use crate::options::{Cycle, Options, OptionsRegistry};
    use crate::plotting::registry::{PlotClass, PlotRegistry, PlotRole};
    use crate::plotting::ranges::match_spec;
    use crate::Error;

    #[derive(Debug)]
    struct Layer(GenericElementPlot);

    impl Subplot for Layer {
        fn apply_ranges(&self) -> bool {
            self.0.base().params().apply_ranges
        }

        fn layer_extents(&self, layer: &Viewable, ranges: &RangeMap) -> Extents {
            let dim_ranges = match_spec(&layer.spec(), ranges);
            self.0.get_extents(layer, Some(&dim_ranges))
        }
    }

    fn build_layer(obj: Viewable, args: PlotArgs, ctx: &PlotContext<Layer>) -> Result<Layer> {
        Ok(Layer(GenericElementPlot::new(obj, args, &ctx.backend, ctx.options.clone())))
    }

    fn context(options: OptionsRegistry) -> PlotContext<Layer> {
        let mut reg = PlotRegistry::new();
        for kind in [ElementKind::Curve, ElementKind::Scatter, ElementKind::Text] {
            reg.register(
                "scene",
                ViewType::Element(kind),
                PlotClass::new("LayerPlot", PlotRole::Element, build_layer),
            );
        }
        PlotContext::new("scene", Arc::new(options), Arc::new(reg))
    }

    fn three_layers() -> Overlay {
        Overlay::new()
            .with_layer(Element::curve(&[0.0, 1.0], &[0.0, 1.0]).label("A"))
            .with_layer(Element::curve(&[0.0, 2.0], &[0.0, 4.0]).label("B"))
            .with_layer(Element::scatter(&[-1.0], &[0.5]))
    }

    #[test]
    fn test_style_groups_cycle() {
        let mut options = OptionsRegistry::new();
        options.set_options(
            "scene",
            "Curve",
            OptionGroup::Style,
            &Options::new().with("color", Cycle::new(["red", "green", "blue"])),
        );
        let ctx = context(options);
        let plot = GenericOverlayPlot::new(three_layers().into(), PlotArgs::default(), &ctx).unwrap();
        let subplots = plot.subplots();
        assert_eq!(subplots.len(), 3);

        let a = &subplots[0].1 .0;
        let b = &subplots[1].1 .0;
        let s = &subplots[2].1 .0;
        assert_eq!((a.cyclic_index(), b.cyclic_index(), s.cyclic_index()), (0, 1, 0));
        assert_eq!(a.overlaid(), 1);
        assert_eq!(a.resolved_style().get_str("color"), Some("red"));
        assert_eq!(b.resolved_style().get_str("color"), Some("green"));
        assert_eq!(a.style().get("color").and_then(|c| c.as_cycle()).map(Cycle::len), Some(2));
    }

    #[test]
    fn test_zorder_unique_and_ordered() {
        let ctx = context(OptionsRegistry::new());
        let plot = GenericOverlayPlot::new(three_layers().into(), PlotArgs::default(), &ctx).unwrap();
        let zorders: Vec<usize> = plot.subplots().iter().map(|(_, p)| p.0.zorder()).collect();
        let unique: BTreeSet<usize> = zorders.iter().copied().collect();
        assert_eq!(unique.len(), zorders.len());
        let order = layer_sort(plot.element().map());
        assert_eq!(order.len(), 3);
        for (key, p) in plot.subplots() {
            let layer = plot.element().map().last().and_then(Viewable::as_overlay).unwrap();
            let spec = layer_spec(layer, key, layer.get(key).unwrap());
            assert_eq!(order.iter().position(|k| *k == spec), Some(p.0.zorder()));
        }
    }

    #[test]
    fn test_layer_sort_respects_frame_order() {
        let map = FrameMap::new(["t"])
            .with_item(
                key![0],
                Overlay::new()
                    .with_layer(Element::scatter(&[0.0], &[0.0]))
                    .with_layer(Element::curve(&[0.0], &[0.0])),
            )
            .with_item(
                key![1],
                Overlay::new()
                    .with_layer(Element::curve(&[0.0], &[0.0]))
                    .with_layer(Element::text(0.0, 0.0, "t")),
            );
        let order = layer_sort(&map);
        let names: Vec<String> = order.iter().map(|k| k.get(0).unwrap().to_string()).collect();
        assert_eq!(names, vec!["Scatter", "Curve", "Text"]);
    }

    #[test]
    fn test_extents_union_of_layers() {
        let ctx = context(OptionsRegistry::new());
        let overlay: Viewable = three_layers()
            .with_layer(Element::text(100.0, 100.0, "note"))
            .into();
        let plot = GenericOverlayPlot::new(overlay.clone(), PlotArgs::default(), &ctx).unwrap();
        let extents = plot.get_extents(&overlay, &RangeMap::new());
        assert_eq!(extents.as_slice(), &[-1.0, 0.0, 2.0, 4.0]);

        let mut ranges = RangeMap::new();
        ranges.insert(
            SpecPath::parse("Curve"),
            [("x".to_string(), (-10.0, 10.0)), ("y".to_string(), (-3.0, 3.0))].into(),
        );
        let extents = plot.get_extents(&overlay, &ranges);
        assert_eq!(extents.as_slice(), &[-10.0, -3.0, 10.0, 3.0]);
    }

    #[test]
    fn test_compositor_collapses_layers() {
        let rule = CompositorRule::data(
            vec![ElementKind::Curve, ElementKind::Curve],
            "Pair",
            |els, _| Ok(els[0].clone()),
        );
        let ctx = context(OptionsRegistry::new())
            .with_compositor(Arc::new(RuleCompositor::new().with_rule(rule)));
        let plot = GenericOverlayPlot::new(three_layers().into(), PlotArgs::default(), &ctx).unwrap();
        assert_eq!(plot.subplots().len(), 2);
        assert_eq!(plot.subplots()[0].0, key!["Pair", "A"]);
    }

    #[test]
    fn test_unregistered_layer_type() {
        let ctx = context(OptionsRegistry::new());
        let overlay = Overlay::new().with_layer(Element::points(&[0.0], &[0.0]));
        let err = GenericOverlayPlot::new(overlay.into(), PlotArgs::default(), &ctx).unwrap_err();
        assert!(matches!(err, Error::UnregisteredPlotType { ref view_type, .. } if view_type == "Points"));
    }

    #[test]
    fn test_axis_labels_pass_through() {
        let ctx = context(OptionsRegistry::new());
        let plot = GenericOverlayPlot::new(three_layers().into(), PlotArgs::default(), &ctx).unwrap();
        assert_eq!(plot.axis_labels(Some("x".into()), None, None), (Some("x".into()), None, None));
    }
}
