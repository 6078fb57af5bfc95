//! Glyphs and the columnar data sources they draw from.

use std::collections::BTreeMap;

use crate::color::Rgba;
use crate::container::{Element, ElementKind};
use crate::options::Options;

const LINE_PROPERTIES: [&str; 6] = [
    "line_width",
    "line_color",
    "line_alpha",
    "line_join",
    "line_cap",
    "line_dash",
];

const FILL_PROPERTIES: [&str; 2] = ["fill_color", "fill_alpha"];

const TEXT_PROPERTIES: [&str; 7] = [
    "text_font",
    "text_font_size",
    "text_font_style",
    "text_color",
    "text_alpha",
    "text_align",
    "text_baseline",
];

/// Visual primitive used to draw an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphKind {
    /// Connected line through `x`, `y`.
    Line,
    /// Markers at `x`, `y`.
    Marker,
    /// Scalar image with `x`, `y`, `dw`, `dh` placement.
    Image,
    /// Packed RGBA image with `x`, `y`, `dw`, `dh` placement.
    RgbaImage,
    /// Several polylines in `xs`, `ys`.
    MultiLine,
    /// Several filled polygons in `xs`, `ys`.
    Patches,
    /// Two-point segments in `xs`, `ys`.
    Segments,
    /// Text at `x`, `y`.
    Text,
}

impl GlyphKind {
    /// The glyph drawing elements of `kind`; `None` for kinds with no visual form.
    #[must_use]
    pub fn for_element(kind: &ElementKind) -> Option<Self> {
        match kind {
            ElementKind::Curve => Some(GlyphKind::Line),
            ElementKind::Scatter | ElementKind::Points => Some(GlyphKind::Marker),
            ElementKind::Image | ElementKind::Raster => Some(GlyphKind::Image),
            ElementKind::Rgb => Some(GlyphKind::RgbaImage),
            ElementKind::Path
            | ElementKind::Contours
            | ElementKind::Box
            | ElementKind::Bounds
            | ElementKind::Ellipse => Some(GlyphKind::MultiLine),
            ElementKind::Polygons => Some(GlyphKind::Patches),
            ElementKind::ErrorBars => Some(GlyphKind::Segments),
            ElementKind::Text => Some(GlyphKind::Text),
            ElementKind::Table | ElementKind::Other(_) => None,
        }
    }

    /// Style options the glyph understands.
    #[must_use]
    pub fn style_options(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        match self {
            GlyphKind::Marker => {
                names.extend(["marker", "color", "size"]);
                names.extend(LINE_PROPERTIES);
                names.extend(FILL_PROPERTIES);
            }
            GlyphKind::Line | GlyphKind::MultiLine | GlyphKind::Segments => {
                names.push("color");
                names.extend(LINE_PROPERTIES);
            }
            GlyphKind::Patches => {
                names.push("color");
                names.extend(LINE_PROPERTIES);
                names.extend(FILL_PROPERTIES);
            }
            GlyphKind::Image | GlyphKind::RgbaImage => names.push("palette"),
            GlyphKind::Text => names.extend(TEXT_PROPERTIES),
        }
        names
    }
}

/// One column of a [`ColumnSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Scalar values.
    Values(Vec<f32>),
    /// Packed RGBA values.
    Packed(Vec<u32>),
    /// One sequence per sub-path.
    Nested(Vec<Vec<f32>>),
    /// Text values.
    Text(Vec<String>),
}

impl Column {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Values(v) => v.len(),
            Column::Packed(v) => v.len(),
            Column::Nested(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Whether the column has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named data columns backing a glyph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSource {
    columns: BTreeMap<String, Column>,
}

impl ColumnSource {
    /// Empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column.
    #[must_use]
    pub fn with(mut self, name: &str, column: Column) -> Self {
        self.insert(name, column);
        self
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, name: &str, column: Column) {
        self.columns.insert(name.to_string(), column);
    }

    /// Replace every column present in `other`, keeping the rest.
    pub fn update(&mut self, other: ColumnSource) {
        self.columns.extend(other.columns);
    }

    /// Column `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Scalar column `name`.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&[f32]> {
        match self.columns.get(name)? {
            Column::Values(v) => Some(v),
            _ => None,
        }
    }

    /// Packed column `name`.
    #[must_use]
    pub fn packed(&self, name: &str) -> Option<&[u32]> {
        match self.columns.get(name)? {
            Column::Packed(v) => Some(v),
            _ => None,
        }
    }

    /// Nested column `name`.
    #[must_use]
    pub fn nested(&self, name: &str) -> Option<&[Vec<f32>]> {
        match self.columns.get(name)? {
            Column::Nested(v) => Some(v),
            _ => None,
        }
    }

    /// Column names.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the source has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build the source for drawing `element` with `kind`.
    ///
    /// Error bars become vertical segments unless `horizontal` is set.
    #[must_use]
    pub fn from_element(element: &Element, kind: GlyphKind, horizontal: bool) -> Self {
        let col = |i: usize| element.column_at(i).unwrap_or(&[]).to_vec();
        match kind {
            GlyphKind::Line | GlyphKind::Marker => Self::new()
                .with("x", Column::Values(col(0)))
                .with("y", Column::Values(col(1))),
            GlyphKind::Image => {
                let ext = element.declared_extents();
                let (l, r) = ext.axis(0);
                let (mut b, mut t) = ext.axis(1);
                if *element.kind() == ElementKind::Raster {
                    std::mem::swap(&mut b, &mut t);
                }
                image_placement(l, b, r, t).with("image", Column::Values(col(2)))
            }
            GlyphKind::RgbaImage => {
                let ext = element.declared_extents();
                let (l, r) = ext.axis(0);
                let (b, t) = ext.axis(1);
                let channels: Vec<Vec<f32>> = (2..element.dimensions().count()).map(col).collect();
                let alpha = |i: usize| channels.get(3).and_then(|c| c.get(i)).copied().unwrap_or(1.0);
                let channel = |c: usize, i: usize| {
                    channels.get(c).and_then(|v| v.get(i)).copied().unwrap_or(0.0)
                };
                let n = channels.first().map_or(0, Vec::len);
                let packed = (0..n)
                    .map(|i| Rgba::from_unit(channel(0, i), channel(1, i), channel(2, i), alpha(i)).to_u32())
                    .collect();
                image_placement(l, b, r, t).with("image", Column::Packed(packed))
            }
            GlyphKind::MultiLine | GlyphKind::Patches => {
                let (xs, ys) = split_paths(&col(0), &col(1));
                Self::new()
                    .with("xs", Column::Nested(xs))
                    .with("ys", Column::Nested(ys))
            }
            GlyphKind::Segments => {
                let (x, y, neg, pos) = (col(0), col(1), col(2), col(3));
                let mut xs = Vec::with_capacity(x.len());
                let mut ys = Vec::with_capacity(x.len());
                for i in 0..x.len().min(y.len()).min(neg.len()).min(pos.len()) {
                    if horizontal {
                        xs.push(vec![x[i] - neg[i], x[i] + pos[i]]);
                        ys.push(vec![y[i], y[i]]);
                    } else {
                        xs.push(vec![x[i], x[i]]);
                        ys.push(vec![y[i] - neg[i], y[i] + pos[i]]);
                    }
                }
                Self::new()
                    .with("xs", Column::Nested(xs))
                    .with("ys", Column::Nested(ys))
            }
            GlyphKind::Text => Self::new()
                .with("x", Column::Values(col(0)))
                .with("y", Column::Values(col(1)))
                .with(
                    "text",
                    Column::Text(element.text_content().map(str::to_string).into_iter().collect()),
                ),
        }
    }
}

fn image_placement(l: f32, b: f32, r: f32, t: f32) -> ColumnSource {
    ColumnSource::new()
        .with("x", Column::Values(vec![l]))
        .with("y", Column::Values(vec![b]))
        .with("dw", Column::Values(vec![r - l]))
        .with("dh", Column::Values(vec![t - b]))
}

/// Split `NaN`-separated coordinates into one sequence per sub-path.
fn split_paths(xs: &[f32], ys: &[f32]) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
    let mut out_x = vec![Vec::new()];
    let mut out_y = vec![Vec::new()];
    for (&x, &y) in xs.iter().zip(ys) {
        if x.is_nan() && y.is_nan() {
            out_x.push(Vec::new());
            out_y.push(Vec::new());
        } else if let (Some(px), Some(py)) = (out_x.last_mut(), out_y.last_mut()) {
            px.push(x);
            py.push(y);
        }
    }
    out_x.retain(|p| !p.is_empty());
    out_y.retain(|p| !p.is_empty());
    (out_x, out_y)
}

/// A drawable primitive with its data and resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    kind: GlyphKind,
    source: ColumnSource,
    style: Options,
    zorder: usize,
    label: String,
    visible: bool,
}

impl Glyph {
    /// A visible glyph of `kind` over `source`.
    #[must_use]
    pub fn new(kind: GlyphKind, source: ColumnSource) -> Self {
        Self {
            kind,
            source,
            style: Options::new(),
            zorder: 0,
            label: String::new(),
            visible: true,
        }
    }

    /// Set the style, keeping only options the glyph understands.
    #[must_use]
    pub fn style(mut self, style: &Options) -> Self {
        self.style = style.filtered(&self.kind.style_options());
        self
    }

    /// Set the draw order.
    #[must_use]
    pub fn zorder(mut self, zorder: usize) -> Self {
        self.zorder = zorder;
        self
    }

    /// Set the legend label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Glyph kind.
    #[must_use]
    pub fn kind(&self) -> GlyphKind {
        self.kind
    }

    /// Data source.
    #[must_use]
    pub fn source(&self) -> &ColumnSource {
        &self.source
    }

    /// Replace the columns present in `source`.
    pub fn update_source(&mut self, source: ColumnSource) {
        self.source.update(source);
    }

    /// Resolved style options.
    #[must_use]
    pub fn style_options(&self) -> &Options {
        &self.style
    }

    /// Resolved color, if any.
    #[must_use]
    pub fn color(&self) -> Option<Rgba> {
        self.style.get("color").and_then(|v| v.as_color())
    }

    /// Draw order.
    #[must_use]
    pub fn draw_order(&self) -> usize {
        self.zorder
    }

    /// Legend label.
    #[must_use]
    pub fn legend_label(&self) -> &str {
        &self.label
    }

    /// Whether the glyph is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the glyph.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Extents;

    #[test]
    fn test_paths_split_on_nan() {
        let el = Element::path(&[vec![(0.0, 0.0), (1.0, 1.0)], vec![(2.0, 2.0), (3.0, 1.0)]]);
        let src = ColumnSource::from_element(&el, GlyphKind::MultiLine, false);
        assert_eq!(src.nested("xs").unwrap(), &[vec![0.0_f32, 1.0], vec![2.0, 3.0]]);
        assert_eq!(src.nested("ys").unwrap().len(), 2);
    }

    #[test]
    fn test_error_bar_orientation() {
        let el = Element::error_bars(&[1.0], &[5.0], &[1.0], &[2.0]);
        let v = ColumnSource::from_element(&el, GlyphKind::Segments, false);
        assert_eq!(v.nested("xs").unwrap()[0], vec![1.0_f32, 1.0]);
        assert_eq!(v.nested("ys").unwrap()[0], vec![4.0_f32, 7.0]);
        let h = ColumnSource::from_element(&el, GlyphKind::Segments, true);
        assert_eq!(h.nested("xs").unwrap()[0], vec![0.0_f32, 3.0]);
        assert_eq!(h.nested("ys").unwrap()[0], vec![5.0_f32, 5.0]);
    }

    #[test]
    fn test_image_placement() {
        let img = Element::image(Extents::planar(0.0, 1.0, 4.0, 3.0), 2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let src = ColumnSource::from_element(&img, GlyphKind::Image, false);
        assert_eq!(src.values("dw"), Some(&[4.0][..]));
        assert_eq!(src.values("dh"), Some(&[2.0][..]));
        assert_eq!(src.values("image").map(<[f32]>::len), Some(4));

        let raster = Element::raster(2, 3, &[0.0; 6]);
        let src = ColumnSource::from_element(&raster, GlyphKind::Image, false);
        assert_eq!(src.values("y"), Some(&[2.0][..]));
        assert_eq!(src.values("dh"), Some(&[-2.0][..]));
    }

    #[test]
    fn test_rgb_packed() {
        let rgb = Element::rgb(
            Extents::planar(0.0, 0.0, 1.0, 1.0),
            1,
            1,
            &[vec![1.0], vec![0.0], vec![0.0]],
        );
        let src = ColumnSource::from_element(&rgb, GlyphKind::RgbaImage, false);
        assert_eq!(src.packed("image"), Some(&[Rgba::rgb(255, 0, 0).to_u32()][..]));
    }

    #[test]
    fn test_glyph_style_filtered() {
        let style = Options::new().with("color", "#30a2da").with("palette", "viridis");
        let glyph = Glyph::new(GlyphKind::Line, ColumnSource::new()).style(&style);
        assert!(glyph.style_options().contains("color"));
        assert!(!glyph.style_options().contains("palette"));
        assert_eq!(glyph.color(), Rgba::parse("#30a2da"));
    }

    #[test]
    fn test_for_element() {
        assert_eq!(GlyphKind::for_element(&ElementKind::Bounds), Some(GlyphKind::MultiLine));
        assert_eq!(GlyphKind::for_element(&ElementKind::Table), None);
    }
}
