//! Figures: the render state of the scene backend.

use std::collections::BTreeMap;

use super::glyph::Glyph;
use crate::color::Rgba;
use crate::container::{FrameKey, Viewable};
use crate::error::{Error, Result};
use crate::plotting::{Dimensioned, Extents, GenericElementPlot, Range};

/// A set of axes holding glyphs in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    title: String,
    x_label: Option<String>,
    y_label: Option<String>,
    x_range: Range,
    y_range: Range,
    x_log: bool,
    y_log: bool,
    width: u32,
    height: u32,
    background: Rgba,
    show_legend: bool,
    glyphs: Vec<Glyph>,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(300, 300)
    }
}

impl Figure {
    /// An empty figure of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            title: String::new(),
            x_label: None,
            y_label: None,
            x_range: (f32::NAN, f32::NAN),
            y_range: (f32::NAN, f32::NAN),
            x_log: false,
            y_log: false,
            width,
            height,
            background: Rgba::WHITE,
            show_legend: false,
            glyphs: Vec::new(),
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the axis labels.
    #[must_use]
    pub fn labels(mut self, x: Option<String>, y: Option<String>) -> Self {
        self.x_label = x;
        self.y_label = y;
        self
    }

    /// Set the axis ranges.
    #[must_use]
    pub fn ranges(mut self, x: Range, y: Range) -> Self {
        self.x_range = x;
        self.y_range = y;
        self
    }

    /// Use logarithmic axes.
    #[must_use]
    pub fn log_axes(mut self, x: bool, y: bool) -> Self {
        self.x_log = x;
        self.y_log = y;
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Show a legend of labelled glyphs.
    #[must_use]
    pub fn legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    /// Add a glyph after every glyph with the same or a lower draw order.
    pub fn add_glyph(&mut self, glyph: Glyph) {
        let pos = self
            .glyphs
            .partition_point(|g| g.draw_order() <= glyph.draw_order());
        self.glyphs.insert(pos, glyph);
    }

    /// Replace all glyphs.
    pub fn set_glyphs(&mut self, glyphs: Vec<Glyph>) {
        self.glyphs.clear();
        for glyph in glyphs {
            self.add_glyph(glyph);
        }
    }

    /// Replace the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replace the axis ranges.
    pub fn set_ranges(&mut self, x: Range, y: Range) {
        self.x_range = x;
        self.y_range = y;
    }

    /// Title.
    #[must_use]
    pub fn title_text(&self) -> &str {
        &self.title
    }

    /// X axis label.
    #[must_use]
    pub fn x_label(&self) -> Option<&str> {
        self.x_label.as_deref()
    }

    /// Y axis label.
    #[must_use]
    pub fn y_label(&self) -> Option<&str> {
        self.y_label.as_deref()
    }

    /// X axis range.
    #[must_use]
    pub fn x_range(&self) -> Range {
        self.x_range
    }

    /// Y axis range.
    #[must_use]
    pub fn y_range(&self) -> Range {
        self.y_range
    }

    /// Whether the axes are logarithmic.
    #[must_use]
    pub fn is_log(&self) -> (bool, bool) {
        (self.x_log, self.y_log)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Background color.
    #[must_use]
    pub fn background_color(&self) -> Rgba {
        self.background
    }

    /// Glyphs in draw order.
    #[must_use]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Labels of visible, labelled glyphs when the legend is shown.
    #[must_use]
    pub fn legend_entries(&self) -> Vec<&str> {
        if !self.show_legend {
            return Vec::new();
        }
        self.glyphs
            .iter()
            .filter(|g| g.is_visible() && !g.legend_label().is_empty())
            .map(Glyph::legend_label)
            .collect()
    }
}

impl batuta_common::display::WithDimensions for Figure {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// A cell of a [`GridFigure`].
#[derive(Debug, Clone, PartialEq)]
pub enum GridCell {
    /// A single set of axes.
    Figure(Figure),
    /// A nested grid.
    Grid(GridFigure),
}

impl GridCell {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            GridCell::Figure(f) => f.width(),
            GridCell::Grid(g) => g.width(),
        }
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        match self {
            GridCell::Figure(f) => f.height(),
            GridCell::Grid(g) => g.height(),
        }
    }
}

/// Figures arranged on a grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFigure {
    title: String,
    rows: usize,
    cols: usize,
    cells: BTreeMap<(usize, usize), GridCell>,
}

impl GridFigure {
    /// An empty `rows x cols` grid.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            title: String::new(),
            rows,
            cols,
            cells: BTreeMap::new(),
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Place `cell` at `(row, col)`.
    pub fn insert(&mut self, coord: (usize, usize), cell: GridCell) {
        self.cells.insert(coord, cell);
    }

    /// Title.
    #[must_use]
    pub fn title_text(&self) -> &str {
        &self.title
    }

    /// Grid `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Cell at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.cells.get(&(row, col))
    }

    /// Figure at `(row, col)`, if the cell holds one.
    #[must_use]
    pub fn figure(&self, row: usize, col: usize) -> Option<&Figure> {
        match self.cells.get(&(row, col))? {
            GridCell::Figure(f) => Some(f),
            GridCell::Grid(_) => None,
        }
    }

    /// Occupied cells in scanline order.
    pub fn cells(&self) -> impl Iterator<Item = (&(usize, usize), &GridCell)> + '_ {
        self.cells.iter()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Width of the widest row.
    #[must_use]
    pub fn width(&self) -> u32 {
        (0..self.rows)
            .map(|r| {
                self.cells
                    .range((r, 0)..(r + 1, 0))
                    .map(|(_, c)| c.width())
                    .sum::<u32>()
            })
            .max()
            .unwrap_or(0)
    }

    /// Sum of the tallest cell of each row.
    #[must_use]
    pub fn height(&self) -> u32 {
        (0..self.rows)
            .map(|r| {
                self.cells
                    .range((r, 0)..(r + 1, 0))
                    .map(|(_, c)| c.height())
                    .max()
                    .unwrap_or(0)
            })
            .sum()
    }
}

/// Render state returned by scene plots.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneState {
    /// A standalone figure.
    Figure(Figure),
    /// A grid of figures.
    Grid(GridFigure),
    /// Glyphs an overlaid plot contributes to its parent's figure.
    Layers(Vec<Glyph>),
}

impl SceneState {
    /// The figure, if this is one.
    #[must_use]
    pub fn as_figure(&self) -> Option<&Figure> {
        match self {
            SceneState::Figure(f) => Some(f),
            _ => None,
        }
    }

    /// The grid, if this is one.
    #[must_use]
    pub fn as_grid(&self) -> Option<&GridFigure> {
        match self {
            SceneState::Grid(g) => Some(g),
            _ => None,
        }
    }

    /// Display size `(width, height)` in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        match self {
            SceneState::Figure(f) => (f.width(), f.height()),
            SceneState::Grid(g) => (g.width(), g.height()),
            SceneState::Layers(_) => (0, 0),
        }
    }

    /// Glyphs contributed to a parent figure.
    #[must_use]
    pub fn into_glyphs(self) -> Vec<Glyph> {
        match self {
            SceneState::Figure(f) => f.glyphs,
            SceneState::Layers(glyphs) => glyphs,
            SceneState::Grid(_) => Vec::new(),
        }
    }

    /// As a grid cell; `None` for bare layers.
    #[must_use]
    pub fn into_cell(self) -> Option<GridCell> {
        match self {
            SceneState::Figure(f) => Some(GridCell::Figure(f)),
            SceneState::Grid(g) => Some(GridCell::Grid(g)),
            SceneState::Layers(_) => None,
        }
    }
}

/// Render handles a scene plot exposes by name.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneHandle {
    /// The plot's figure (`"plot"`).
    Figure(Figure),
    /// The plot's glyph (`"glyph"`).
    Glyph(Glyph),
    /// The plot's grid (`"plot"` of layout plots).
    Grid(GridFigure),
}

/// Build the figure of `plot` at `key` for `view`, with bounds from `extents`.
///
/// Axis ranges are taken from any figure in `shared` whose axis label matches.
pub(crate) fn init_figure(
    plot: &GenericElementPlot,
    key: &FrameKey,
    view: &Viewable,
    extents: &Extents,
    shared: &[Figure],
) -> Figure {
    let params = plot.base().params();
    let title = if params.show_title {
        plot.format_title(key).unwrap_or_default()
    } else {
        String::new()
    };
    let (x_label, y_label, _) = plot.axis_labels(view, None, None, None);

    let mut x_range = None;
    let mut y_range = None;
    for fig in shared {
        if x_label.is_some() && fig.x_label() == x_label.as_deref() {
            x_range = Some(fig.x_range());
        }
        if y_label.is_some() && fig.x_label() == y_label.as_deref() {
            y_range = Some(fig.x_range());
        }
        if y_label.is_some() && fig.y_label() == y_label.as_deref() {
            y_range = Some(fig.y_range());
        }
        if x_label.is_some() && fig.y_label() == x_label.as_deref() {
            x_range = Some(fig.y_range());
        }
    }
    let x_range = x_range.unwrap_or_else(|| extents.axis(0));
    let y_range = y_range.unwrap_or_else(|| extents.axis(1));

    let background = params
        .extra
        .get("bgcolor")
        .and_then(|v| v.as_color())
        .unwrap_or(Rgba::WHITE);
    Figure::new(params.width, params.height)
        .title(title)
        .labels(x_label, y_label)
        .ranges(x_range, y_range)
        .log_axes(
            params.extra.get_bool("xlog").unwrap_or(false),
            params.extra.get_bool("ylog").unwrap_or(false),
        )
        .background(background)
        .legend(params.show_legend)
}

/// The figure stored under `"plot"` in `handles`.
pub(crate) fn stored_figure(handles: &BTreeMap<String, SceneHandle>) -> Result<&Figure> {
    match handles.get("plot") {
        Some(SceneHandle::Figure(f)) => Ok(f),
        _ => Err(Error::NotInitialized("plot")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::glyph::{ColumnSource, GlyphKind};
    use batuta_common::display::WithDimensions;

    fn glyph(z: usize, label: &str) -> Glyph {
        Glyph::new(GlyphKind::Line, ColumnSource::new()).zorder(z).label(label)
    }

    #[test]
    fn test_glyphs_kept_in_draw_order() {
        let mut fig = Figure::default();
        fig.add_glyph(glyph(2, "c"));
        fig.add_glyph(glyph(0, "a"));
        fig.add_glyph(glyph(1, "b"));
        let labels: Vec<&str> = fig.glyphs().iter().map(Glyph::legend_label).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_legend_entries() {
        let mut fig = Figure::default();
        fig.add_glyph(glyph(0, "a"));
        fig.add_glyph(glyph(1, ""));
        assert!(fig.legend_entries().is_empty());
        let fig = fig.legend(true);
        assert_eq!(fig.legend_entries(), vec!["a"]);
    }

    #[test]
    fn test_set_dimensions() {
        let mut fig = Figure::default();
        fig.set_dimensions(640, 480);
        assert_eq!((fig.width(), fig.height()), (640, 480));
    }

    #[test]
    fn test_grid_size() {
        let mut grid = GridFigure::new(2, 2);
        grid.insert((0, 0), GridCell::Figure(Figure::new(100, 50)));
        grid.insert((0, 1), GridCell::Figure(Figure::new(200, 80)));
        grid.insert((1, 0), GridCell::Figure(Figure::new(150, 60)));
        assert_eq!(grid.width(), 300);
        assert_eq!(grid.height(), 140);
        assert!(grid.figure(1, 1).is_none());
        assert_eq!(SceneState::Grid(grid).size(), (300, 140));
    }
}
