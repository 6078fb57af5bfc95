//! The plot contract and the dimensioned plot base.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, trace};

use super::ranges::{max_range, DimRanges, FrameRanges, Range, RangeMap};
use crate::container::{Dimension, Element, FrameKey, KeyValue, SpecPath, Viewable};
use crate::error::{Error, Result};
use crate::options::{NormMode, OptionGroup, Options, OptionsRegistry};

/// Axis projection of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Two axes.
    #[default]
    Flat,
    /// Three axes.
    ThreeD,
}

impl Projection {
    /// Whether this is a 3-D projection.
    #[must_use]
    pub fn is_3d(self) -> bool {
        self == Projection::ThreeD
    }
}

/// Plot-level parameters, resolved from `plot` options.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotParams {
    /// Whether to display the title.
    pub show_title: bool,
    /// Title template with `{label}`, `{group}` and `{type}` placeholders.
    pub title_format: String,
    /// Whether to compute ranges at this level of nesting.
    pub normalize: bool,
    /// Axis projection.
    pub projection: Projection,
    /// Whether to derive plot bounds from the data.
    pub apply_ranges: bool,
    /// Whether to apply extents declared on elements.
    pub apply_extents: bool,
    /// Number of identity components used to group overlay layers for styling.
    pub style_grouping: usize,
    /// Whether to show a legend.
    pub show_legend: bool,
    /// Figure width in pixels.
    pub width: u32,
    /// Figure height in pixels.
    pub height: u32,
    /// Plot options not understood here, kept for the backend.
    pub extra: Options,
}

impl Default for PlotParams {
    fn default() -> Self {
        Self {
            show_title: true,
            title_format: "{label} {group}".to_string(),
            normalize: true,
            projection: Projection::Flat,
            apply_ranges: true,
            apply_extents: true,
            style_grouping: 2,
            show_legend: false,
            width: 300,
            height: 300,
            extra: Options::new(),
        }
    }
}

impl PlotParams {
    /// Names of the parameters every plot understands.
    pub const NAMES: [&'static str; 10] = [
        "show_title",
        "title_format",
        "normalize",
        "projection",
        "apply_ranges",
        "apply_extents",
        "style_grouping",
        "show_legend",
        "width",
        "height",
    ];

    /// Apply `plot` options over the current values.
    pub fn apply(&mut self, opts: &Options) {
        for (name, value) in opts.iter() {
            match name {
                "show_title" => self.show_title = value.as_bool().unwrap_or(self.show_title),
                "title_format" => {
                    if let Some(s) = value.as_str() {
                        self.title_format = s.to_string();
                    }
                }
                "normalize" => self.normalize = value.as_bool().unwrap_or(self.normalize),
                "projection" => {
                    self.projection = match value.as_str() {
                        Some("3d") => Projection::ThreeD,
                        _ => Projection::Flat,
                    };
                }
                "apply_ranges" => self.apply_ranges = value.as_bool().unwrap_or(self.apply_ranges),
                "apply_extents" => {
                    self.apply_extents = value.as_bool().unwrap_or(self.apply_extents);
                }
                "style_grouping" => {
                    if let Some(n) = value.as_f64() {
                        self.style_grouping = (n as usize).clamp(1, 3);
                    }
                }
                "show_legend" => self.show_legend = value.as_bool().unwrap_or(self.show_legend),
                "width" => {
                    if let Some(n) = value.as_f64() {
                        self.width = n as u32;
                    }
                }
                "height" => {
                    if let Some(n) = value.as_f64() {
                        self.height = n as u32;
                    }
                }
                other => self.extra.set(other, value.clone()),
            }
        }
    }

    /// Defaults with `opts` applied.
    #[must_use]
    pub fn from_options(opts: &Options) -> Self {
        let mut params = Self::default();
        params.apply(opts);
        params
    }
}

/// Arguments a parent plot passes to the sub-plots it creates.
#[derive(Debug, Clone)]
pub struct PlotArgs {
    /// Frame keys of the parent; defaults to the object's own keys.
    pub keys: Option<Vec<FrameKey>>,
    /// Dimensions of the parent's key space; defaults to the object's key dimensions.
    pub dimensions: Option<Vec<Dimension>>,
    /// Dimension values of an indexed layout cell.
    pub layout_dimensions: Option<Vec<(Dimension, KeyValue)>>,
    /// Whether all children share one key space.
    pub uniform: bool,
    /// Whether the plot is embedded in another plot.
    pub subplot: bool,
    /// Range maps computed by the parent for each frame key.
    pub ranges: Option<FrameRanges>,
    /// Style options; looked up from the registry when absent.
    pub style: Option<Options>,
    /// Position within the style group.
    pub cyclic_index: usize,
    /// Draw order.
    pub zorder: usize,
    /// 0 when not overlaid, 1 inside an unordered overlay, 2 inside an indexed overlay.
    pub overlaid: u8,
    /// Overrides `show_title`.
    pub show_title: Option<bool>,
    /// Overrides `show_legend`.
    pub show_legend: Option<bool>,
    /// Position of the plot within its layout.
    pub layout_num: usize,
    /// Plot options applied over those resolved from the registry.
    pub params: Options,
}

impl Default for PlotArgs {
    fn default() -> Self {
        Self {
            keys: None,
            dimensions: None,
            layout_dimensions: None,
            uniform: true,
            subplot: false,
            ranges: None,
            style: None,
            cyclic_index: 0,
            zorder: 0,
            overlaid: 0,
            show_title: None,
            show_legend: None,
            layout_num: 0,
            params: Options::new(),
        }
    }
}

/// State shared by every dimensioned plot: frame keys, dimensions, flags and the
/// options service.
#[derive(Debug, Clone)]
pub struct DimensionedPlot {
    keys: Vec<FrameKey>,
    dimensions: Vec<Dimension>,
    layout_dimensions: Option<Vec<(Dimension, KeyValue)>>,
    uniform: bool,
    subplot: bool,
    drawn: bool,
    layout_num: usize,
    params: PlotParams,
    backend: String,
    options: Arc<OptionsRegistry>,
}

impl DimensionedPlot {
    /// A plot over `keys` and `dimensions`.
    #[must_use]
    pub fn new(
        backend: impl Into<String>,
        options: Arc<OptionsRegistry>,
        keys: Vec<FrameKey>,
        dimensions: Vec<Dimension>,
    ) -> Self {
        Self {
            keys,
            dimensions,
            layout_dimensions: None,
            uniform: true,
            subplot: false,
            drawn: false,
            layout_num: 0,
            params: PlotParams::default(),
            backend: backend.into(),
            options,
        }
    }

    /// Take flags and overrides from parent-supplied arguments.
    #[must_use]
    pub fn with_args(mut self, args: &PlotArgs) -> Self {
        self.layout_dimensions.clone_from(&args.layout_dimensions);
        self.uniform = args.uniform;
        self.subplot = args.subplot;
        self.layout_num = args.layout_num;
        self.params.apply(&args.params);
        if let Some(show) = args.show_title {
            self.params.show_title = show;
        }
        if let Some(show) = args.show_legend {
            self.params.show_legend = show;
        }
        self
    }

    /// Replace the parameters.
    #[must_use]
    pub fn with_params(mut self, params: PlotParams) -> Self {
        self.params = params;
        self
    }

    /// Frame keys.
    #[must_use]
    pub fn keys(&self) -> &[FrameKey] {
        &self.keys
    }

    /// Dimensions of the key space.
    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Dimension values of an indexed layout cell.
    #[must_use]
    pub fn layout_dimensions(&self) -> Option<&[(Dimension, KeyValue)]> {
        self.layout_dimensions.as_deref()
    }

    /// Whether all children share one key space.
    #[must_use]
    pub fn uniform(&self) -> bool {
        self.uniform
    }

    /// Whether this plot is embedded in another.
    #[must_use]
    pub fn subplot(&self) -> bool {
        self.subplot
    }

    /// Whether the plot has been drawn.
    #[must_use]
    pub fn drawn(&self) -> bool {
        self.drawn
    }

    /// Mark the plot as drawn.
    pub fn set_drawn(&mut self, drawn: bool) {
        self.drawn = drawn;
    }

    /// Position within the owning layout.
    #[must_use]
    pub fn layout_num(&self) -> usize {
        self.layout_num
    }

    /// Plot parameters.
    #[must_use]
    pub fn params(&self) -> &PlotParams {
        &self.params
    }

    /// Mutable plot parameters.
    pub fn params_mut(&mut self) -> &mut PlotParams {
        &mut self.params
    }

    /// Backend name.
    #[must_use]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// The options service.
    #[must_use]
    pub fn options(&self) -> &Arc<OptionsRegistry> {
        &self.options
    }

    /// Number of frame keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether there are no frame keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position of `key` among the frame keys.
    #[must_use]
    pub fn frame_index(&self, key: &FrameKey) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Resolve the `group` options of `obj` under this plot's backend.
    #[must_use]
    pub fn lookup_options(&self, obj: &Viewable, group: OptionGroup) -> Options {
        self.options.lookup_options(&self.backend, obj, group)
    }

    /// Normalization settings of every normalization group reachable in `obj`.
    ///
    /// Elements are grouped by id, ids in ascending order with id-less elements first.
    /// For each id, norm entries of the object's option tree are applied from least
    /// to most specific path. Identities matched by no entry default to shared ranges.
    #[must_use]
    pub fn norm_opts(&self, obj: &Viewable) -> BTreeMap<SpecPath, NormMode> {
        let specs: BTreeSet<(Option<u64>, SpecPath)> = obj
            .elements()
            .into_iter()
            .map(|e| (e.object_id(), e.spec()))
            .collect();

        let mut norm_opts = BTreeMap::new();
        let mut ids: Vec<Option<u64>> = specs.iter().map(|(id, _)| *id).collect();
        ids.dedup();
        for id in ids {
            let group_specs: Vec<&SpecPath> = specs
                .iter()
                .filter(|(i, _)| *i == id)
                .map(|(_, s)| s)
                .collect();
            let tree = self.options.custom_tree(&self.backend, id);
            for (path, opts) in tree.entries(OptionGroup::Norm) {
                let applies = group_specs.iter().any(|spec| path.applies_to(spec));
                if applies && (opts.contains("axiswise") || opts.contains("framewise")) {
                    norm_opts.insert(path.clone(), NormMode::from_options(opts));
                }
            }
        }

        for (_, spec) in &specs {
            let covered = (1..=3).any(|n| n <= spec.len() && norm_opts.contains_key(&spec.truncate(n)));
            if !covered {
                norm_opts.insert(spec.clone(), NormMode::default());
            }
        }
        norm_opts
    }

    /// Accumulate the ranges of every dimension of `elements` into `group`.
    ///
    /// Tables and annotations take no part.
    pub fn compute_group_range(group: SpecPath, elements: &[&Element], ranges: &mut RangeMap) {
        let mut collected: BTreeMap<String, Vec<Range>> = BTreeMap::new();
        for el in elements {
            if el.kind().is_table() || el.kind().is_annotation() {
                continue;
            }
            for (i, dim) in el.dimensions().enumerate() {
                collected
                    .entry(dim.name().to_string())
                    .or_default()
                    .push(el.range_at(i));
            }
        }
        let group_ranges: DimRanges = collected
            .into_iter()
            .map(|(name, rs)| (name, max_range(&rs)))
            .collect();
        trace!(%group, dims = group_ranges.len(), "computed group ranges");
        ranges.insert(group, group_ranges);
    }

    /// Dimension values of `key` formatted `group_size` per line.
    ///
    /// Empty for non-uniform plots, single-frame plots and sub-plots, unless the plot
    /// sits in an indexed layout cell.
    #[must_use]
    pub fn frame_title(&self, key: &FrameKey, group_size: usize) -> String {
        let labels: Vec<String> = if let Some(layout_dims) = &self.layout_dimensions {
            layout_dims
                .iter()
                .map(|(dim, value)| dim.pprint_value_string(value))
                .collect()
        } else if !self.uniform || self.len() == 1 || self.subplot {
            return String::new();
        } else {
            self.dimensions
                .iter()
                .zip(key.values())
                .map(|(dim, value)| dim.pprint_value_string(value))
                .collect()
        };
        labels
            .chunks(group_size.max(1))
            .map(|chunk| chunk.join(", "))
            .filter(|g| !g.is_empty())
            .collect::<Vec<_>>()
            .join("\n ")
    }

    /// Selected `group` options of every element in `obj`, keyed by identity.
    #[must_use]
    pub fn deep_options(
        &self,
        obj: &Viewable,
        group: OptionGroup,
        names: &[&str],
    ) -> BTreeMap<SpecPath, Options> {
        obj.elements()
            .into_iter()
            .map(|e| {
                let opts = self
                    .options
                    .lookup(&self.backend, &e.spec(), e.object_id(), group)
                    .filtered(names);
                (e.spec(), opts)
            })
            .collect()
    }
}

/// Merge a template title with a dimension title.
pub(crate) fn join_titles(title: &str, dim_title: &str) -> String {
    if title.trim().is_empty() {
        dim_title.to_string()
    } else if dim_title.trim().is_empty() {
        title.to_string()
    } else {
        format!("{title}\n{dim_title}")
    }
}

/// Fill the `{label}`, `{group}` and `{type}` placeholders of a title template.
///
/// The group is left out when it merely repeats the type name.
pub(crate) fn fill_title(template: &str, type_name: &str, group: &str, label: &str) -> String {
    let group = if group == type_name { "" } else { group };
    template
        .replace("{label}", label)
        .replace("{group}", group)
        .replace("{type}", type_name)
        .trim()
        .to_string()
}

/// Plots with a frame-indexed key space.
pub trait Dimensioned {
    /// Shared plot state.
    fn base(&self) -> &DimensionedPlot;

    /// Mutable shared plot state.
    fn base_mut(&mut self) -> &mut DimensionedPlot;

    /// The object to display at `key`; `None` when there is nothing to draw.
    fn get_frame(&self, _key: &FrameKey) -> Option<Viewable> {
        None
    }

    /// Title of the frame at `key`; `None` when there is no frame.
    fn format_title(&self, _key: &FrameKey) -> Option<String> {
        None
    }

    /// Compute ranges per normalization group of `obj`, on top of `inherited`.
    ///
    /// Groups already present in `inherited` are kept as they are. Groups normalized
    /// across frames take every matching element of `obj`; per-frame groups take the
    /// elements of the frame at `key` and are skipped without a key.
    fn compute_ranges(
        &self,
        obj: &Viewable,
        key: Option<&FrameKey>,
        inherited: Option<&RangeMap>,
    ) -> RangeMap {
        let base = self.base();
        let elements = obj.elements();
        if !base.params().normalize || elements.iter().all(|e| e.kind().is_table()) {
            return RangeMap::new();
        }

        let mut ranges = inherited.cloned().unwrap_or_default();
        let norm_opts = base.norm_opts(obj);
        let frame = if norm_opts.values().any(|m| m.framewise) {
            key.and_then(|k| self.get_frame(k))
        } else {
            None
        };
        let is_map = matches!(obj, Viewable::Map(_));

        for (group, mode) in norm_opts {
            if ranges.contains(&group) {
                continue;
            }
            let group_elements = if !mode.framewise {
                obj.elements_matching(&group)
            } else if let Some(frame) = &frame {
                frame.elements_matching(&group)
            } else {
                trace!(%group, "no frame for per-frame group");
                continue;
            };
            if !mode.axiswise || ((!mode.framewise || group_elements.len() == 1) && is_map) {
                DimensionedPlot::compute_group_range(group, &group_elements, &mut ranges);
            }
        }
        debug!(groups = ranges.len(), key = ?key, "computed ranges");
        ranges
    }
}

/// The surface a renderer depends on.
pub trait Plot: Dimensioned {
    /// Render state produced by the backend.
    type State;
    /// Backend render handle.
    type Handle;

    /// Allocate and return the initial render state.
    fn initialize_plot(&mut self, _ranges: Option<&RangeMap>) -> Result<Self::State> {
        Err(Error::NotImplemented("initialize_plot"))
    }

    /// Current render state.
    fn state(&self) -> Result<Self::State> {
        Err(Error::NotImplemented("state"))
    }

    /// Number of addressable frames.
    fn frame_count(&self) -> Result<usize> {
        Err(Error::NotImplemented("frame_count"))
    }

    /// Apply the frame at `key` to the render state.
    fn update_frame(&mut self, _key: &FrameKey, _ranges: Option<&RangeMap>) -> Result<()> {
        Err(Error::NotImplemented("update_frame"))
    }

    /// Render handle registered under `name`.
    fn handle(&self, _name: &str) -> Option<&Self::Handle> {
        None
    }

    /// Bring the plot to frame `key` and return the render state.
    ///
    /// The first call initializes the plot. A single-frame plot asked for its first
    /// frame returns the initial state directly.
    fn update(&mut self, key: &FrameKey) -> Result<Self::State> {
        let count = self.frame_count()?;
        let first = self.base().keys().first() == Some(key) || key.as_index() == Some(0);
        if !self.base().drawn() {
            let state = self.initialize_plot(None)?;
            self.base_mut().set_drawn(true);
            if count == 1 && first {
                return Ok(state);
            }
        }
        self.update_frame(key, None)?;
        self.state()
    }
}

impl Dimensioned for DimensionedPlot {
    fn base(&self) -> &DimensionedPlot {
        self
    }

    fn base_mut(&mut self) -> &mut DimensionedPlot {
        self
    }
}

impl Plot for DimensionedPlot {
    type State = ();
    type Handle = ();

    fn frame_count(&self) -> Result<usize> {
        Ok(self.len())
    }
}
