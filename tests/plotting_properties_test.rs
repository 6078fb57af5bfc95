//! Behavioral properties of the plotting core.
//!
//! Run: cargo test --test plotting_properties_test

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::sync::Arc;

use approx::assert_relative_eq;
use proptest::prelude::*;

use trueno_plot::container::{SpecPath, Viewable};
use trueno_plot::plotting::{
    max_extents, DimensionedPlot, GenericElementPlot, GenericLayoutPlot, RangeMap,
};
use trueno_plot::prelude::*;
use trueno_plot::scene::BACKEND;

fn timeline(dim: &str, keys: &[i64]) -> FrameMap {
    keys.iter().fold(FrameMap::new([dim]), |m, &k| {
        let y = k as f32;
        m.with_item(key![k], Element::curve(&[0.0, 1.0], &[y, y + 1.0]))
    })
}

// ============================================================================
// Frame keys
// ============================================================================

#[test]
fn test_bare_element_is_single_frame() {
    let curve = Element::curve(&[0.0, 1.0, 2.0], &[3.0, 4.0, 5.0]);
    let plot = GenericElementPlot::new(
        curve.into(),
        PlotArgs::default(),
        BACKEND,
        Arc::new(OptionsRegistry::new()),
    );
    assert_eq!(plot.base().len(), 1);

    let frame = plot.get_frame(&key![0]).unwrap();
    let element = frame.as_element().unwrap();
    assert_eq!(element.column("y").unwrap(), &[3.0, 4.0, 5.0]);

    let any = SceneRenderer::new()
        .plot(Element::curve(&[0.0], &[0.0]))
        .unwrap();
    assert_eq!(any.frame_count().unwrap(), 1);
}

#[test]
fn test_update_every_key() {
    let map = timeline("t", &[3, 5, 8, 13]);
    let mut plot = SceneRenderer::new().plot(map).unwrap();
    assert_eq!(plot.frame_count().unwrap(), 4);
    for key in plot.base().keys().to_vec() {
        let state = plot.update(&key).unwrap();
        assert!(state.as_figure().is_some());
    }
}

#[test]
fn test_abstract_base_is_not_implemented() {
    let mut base = DimensionedPlot::new(BACKEND, Arc::new(OptionsRegistry::new()), vec![], vec![]);
    assert!(matches!(base.initialize_plot(None), Err(Error::NotImplemented(_))));
    assert!(matches!(base.state(), Err(Error::NotImplemented(_))));
}

// ============================================================================
// Overlays
// ============================================================================

#[test]
fn test_same_group_layers_cycle_style() {
    let overlay = Overlay::new()
        .with_layer(Element::curve(&[0.0, 1.0], &[0.0, 1.0]).label("A"))
        .with_layer(Element::curve(&[0.0, 1.0], &[1.0, 2.0]).label("B"));
    let plot = SceneRenderer::new().plot(overlay).unwrap();
    let overlay = plot.as_overlay().unwrap();

    let indices: Vec<usize> = overlay
        .generic()
        .subplots()
        .iter()
        .map(|(_, p)| p.as_element().unwrap().generic().cyclic_index())
        .collect();
    assert_eq!(indices, vec![0, 1]);

    let colors: Vec<Option<String>> = overlay
        .generic()
        .subplots()
        .iter()
        .map(|(_, p)| {
            let style = p.as_element().unwrap().generic().resolved_style();
            style.get_str("color").map(str::to_string)
        })
        .collect();
    assert_eq!(
        colors,
        vec![Some("#30a2da".to_string()), Some("#fc4f30".to_string())]
    );
}

#[test]
fn test_overlay_extents_union() {
    let overlay = Overlay::new()
        .with_layer(
            Element::curve(&[0.2, 0.8], &[0.2, 0.8]).extents(Extents::planar(0.0, 0.0, 1.0, 1.0)),
        )
        .with_layer(
            Element::scatter(&[-0.5], &[2.5]).extents(Extents::planar(-1.0, 2.0, 0.0, 3.0)),
        );
    let state = SceneRenderer::new().render(overlay, None).unwrap();
    let figure = state.as_figure().unwrap();
    assert_eq!(figure.x_range(), (-1.0, 1.0));
    assert_eq!(figure.y_range(), (0.0, 3.0));

    let union = max_extents(
        &[
            Extents::planar(0.0, 0.0, 1.0, 1.0),
            Extents::planar(-1.0, 2.0, 0.0, 3.0),
        ],
        false,
    );
    assert_eq!(union.as_slice(), &[-1.0, 0.0, 1.0, 3.0]);
}

// ============================================================================
// Titles
// ============================================================================

#[test]
fn test_title_from_label_and_group() {
    let scatter = Element::scatter(&[0.0], &[0.0]).group("Curve").label("Y");
    let plot = GenericElementPlot::new(
        scatter.into(),
        PlotArgs::default(),
        BACKEND,
        Arc::new(OptionsRegistry::new()),
    );
    assert_eq!(plot.format_title(&key![0]).as_deref(), Some("Y Curve"));
}

// ============================================================================
// Layouts
// ============================================================================

#[test]
fn test_layout_omits_children_without_frame() {
    let layout = Layout::new()
        .with_item(timeline("t", &[0, 1]))
        .with_item(timeline("t", &[2, 3]));
    let plot = GenericLayoutPlot::new(
        layout.into(),
        PlotArgs::default(),
        BACKEND,
        Arc::new(OptionsRegistry::new()),
    )
    .unwrap();
    assert_eq!(plot.base().len(), 4);
    for k in 0..4_i64 {
        let frame = plot.get_frame(&key![k]).unwrap();
        assert_eq!(frame.as_layout().unwrap().len(), 1, "key {k}");
    }
}

#[test]
fn test_layout_renders_nested_overlay() {
    let overlay = Overlay::new()
        .with_layer(Element::curve(&[0.0, 1.0], &[0.0, 1.0]))
        .with_layer(Element::text(0.5, 0.5, "peak"));
    let layout = Layout::new()
        .with_item(overlay)
        .with_item(Element::scatter(&[0.0], &[1.0]));
    let state = SceneRenderer::new().render(layout, None).unwrap();
    let grid = state.as_grid().unwrap();
    assert_eq!(grid.figure(0, 0).unwrap().glyphs().len(), 2);
    assert_eq!(grid.figure(0, 1).unwrap().glyphs().len(), 1);
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn test_range_without_finite_data_is_nan() {
    let group = SpecPath::from("Curve");
    let blank = Element::curve(&[0.0, 1.0], &[f32::NAN, f32::NAN]);
    let mut ranges = RangeMap::new();
    DimensionedPlot::compute_group_range(group.clone(), &[&blank], &mut ranges);

    let dims = ranges.get(&group).unwrap();
    let (lo, hi) = dims["y"];
    assert!(lo.is_nan() && hi.is_nan());
    assert_eq!(dims["x"], (0.0, 1.0));

    assert!(max_extents(&Vec::<Extents>::new(), false).is_undefined());
}

#[test]
fn test_layout_with_empty_map_still_renders() {
    let layout = Layout::new()
        .with_item(FrameMap::new(["t"]))
        .with_item(Element::curve(&[0.0, 1.0], &[0.0, 1.0]));
    let state = SceneRenderer::new().render(layout, None).unwrap();
    let grid = state.as_grid().unwrap();
    assert_eq!(grid.len(), 1);
}

#[test]
fn test_inherited_ranges_not_mutated() {
    let map = timeline("t", &[0, 1, 2]);
    let plot = SceneRenderer::new().plot(map.clone()).unwrap();
    let obj = Viewable::Map(map);
    let inherited = RangeMap::new();
    let ranges = plot.compute_ranges(&obj, None, Some(&inherited));
    assert!(inherited.is_empty());
    let y = ranges.match_spec(obj.elements()[0]);
    assert_relative_eq!(y["y"].0, 0.0);
    assert_relative_eq!(y["y"].1, 3.0);
}

proptest! {
    #[test]
    fn prop_frame_count_matches_keys(n in 1usize..12) {
        let keys: Vec<i64> = (0..n as i64).map(|k| k * 2).collect();
        let mut plot = SceneRenderer::new().plot(timeline("t", &keys)).unwrap();
        prop_assert_eq!(plot.frame_count().unwrap(), n);
        for k in &keys {
            prop_assert!(plot.update(&key![*k]).is_ok());
        }
    }

    #[test]
    fn prop_compute_ranges_idempotent(ys in prop::collection::vec(-1e3f32..1e3, 2..40)) {
        let xs: Vec<f32> = (0..ys.len()).map(|i| i as f32).collect();
        let map = FrameMap::new(["t"])
            .with_item(key![0], Element::curve(&xs, &ys))
            .with_item(key![1], Element::scatter(&xs, &ys));
        let plot = SceneRenderer::new().plot(map.clone()).unwrap();
        let obj = Viewable::Map(map);
        let first = plot.compute_ranges(&obj, Some(&key![0]), None);
        let second = plot.compute_ranges(&obj, Some(&key![0]), None);
        prop_assert_eq!(first.clone(), second);
        let again = plot.compute_ranges(&obj, Some(&key![0]), Some(&first));
        prop_assert_eq!(first, again);
    }

    #[test]
    fn prop_range_union_monotonic(
        ys in prop::collection::vec(-1e3f32..1e3, 1..20),
        extra in prop::collection::vec(-1e4f32..1e4, 1..20),
    ) {
        let xs: Vec<f32> = (0..ys.len()).map(|i| i as f32).collect();
        let xe: Vec<f32> = (0..extra.len()).map(|i| i as f32).collect();
        let a = Element::curve(&xs, &ys);
        let b = Element::curve(&xe, &extra);
        let group = SpecPath::from("Curve");

        let mut narrow = RangeMap::new();
        DimensionedPlot::compute_group_range(group.clone(), &[&a], &mut narrow);
        let mut wide = RangeMap::new();
        DimensionedPlot::compute_group_range(group.clone(), &[&a, &b], &mut wide);

        let (lo, hi) = narrow.get(&group).unwrap()["y"];
        let (wlo, whi) = wide.get(&group).unwrap()["y"];
        prop_assert!(wlo <= lo);
        prop_assert!(whi >= hi);
    }
}
