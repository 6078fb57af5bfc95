//! Elements: the leaves of the container tree.
//!
//! An element stores its data column-wise, one column per key dimension followed
//! by one column per value dimension.

use std::fmt;

use trueno::Vector;

use super::dimension::Dimension;
use super::extents::Extents;
use super::spec::SpecPath;

/// Kind of visual element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// Connected line through `(x, y)` samples.
    Curve,
    /// Scatter of `(x, y)` samples with a dependent `y`.
    Scatter,
    /// Points in an independent `(x, y)` space.
    Points,
    /// Gridded image with continuous bounds.
    Image,
    /// Gridded array addressed by integer indices.
    Raster,
    /// Three or four channel image.
    Rgb,
    /// One or more polylines, sub-paths separated by `NaN`.
    Path,
    /// Iso-contour paths.
    Contours,
    /// Filled polygons.
    Polygons,
    /// Box annotation.
    Box,
    /// Bounds annotation.
    Bounds,
    /// Ellipse annotation.
    Ellipse,
    /// Error bars `(x, y, negative, positive)`.
    ErrorBars,
    /// Text annotation.
    Text,
    /// Tabular data without spatial ranges.
    Table,
    /// Any other user-defined element kind.
    Other(String),
}

impl ElementKind {
    /// Type name used in spec paths.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ElementKind::Curve => "Curve",
            ElementKind::Scatter => "Scatter",
            ElementKind::Points => "Points",
            ElementKind::Image => "Image",
            ElementKind::Raster => "Raster",
            ElementKind::Rgb => "RGB",
            ElementKind::Path => "Path",
            ElementKind::Contours => "Contours",
            ElementKind::Polygons => "Polygons",
            ElementKind::Box => "Box",
            ElementKind::Bounds => "Bounds",
            ElementKind::Ellipse => "Ellipse",
            ElementKind::ErrorBars => "ErrorBars",
            ElementKind::Text => "Text",
            ElementKind::Table => "Table",
            ElementKind::Other(name) => name,
        }
    }

    /// Annotations decorate a plot and take no part in ranges or extents.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        matches!(
            self,
            ElementKind::Text | ElementKind::Box | ElementKind::Bounds | ElementKind::Ellipse
        )
    }

    /// Table-like elements have no spatial ranges.
    #[must_use]
    pub fn is_table(&self) -> bool {
        matches!(self, ElementKind::Table)
    }

    /// Gridded kinds whose first two dimensions span the declared bounds.
    #[must_use]
    pub fn is_raster(&self) -> bool {
        matches!(self, ElementKind::Image | ElementKind::Raster | ElementKind::Rgb)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single visual object with typed dimensions and columnar data.
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    group: Option<String>,
    label: String,
    id: Option<u64>,
    kdims: Vec<Dimension>,
    vdims: Vec<Dimension>,
    columns: Vec<Vec<f32>>,
    extents: Extents,
    shape: Option<(usize, usize)>,
    text: Option<String>,
}

impl Element {
    /// Create an element of `kind` with no dimensions or data.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            group: None,
            label: String::new(),
            id: None,
            kdims: Vec::new(),
            vdims: Vec::new(),
            columns: Vec::new(),
            extents: Extents::undefined(2),
            shape: None,
            text: None,
        }
    }

    fn xy(kind: ElementKind, kdims: &[&str], vdims: &[&str], xs: &[f32], ys: &[f32]) -> Self {
        let n = xs.len().min(ys.len());
        Self::new(kind)
            .kdims(kdims.iter().copied())
            .vdims(vdims.iter().copied())
            .data(vec![xs[..n].to_vec(), ys[..n].to_vec()])
    }

    /// A curve through `(x, y)`.
    #[must_use]
    pub fn curve(xs: &[f32], ys: &[f32]) -> Self {
        Self::xy(ElementKind::Curve, &["x"], &["y"], xs, ys)
    }

    /// A scatter of `(x, y)`.
    #[must_use]
    pub fn scatter(xs: &[f32], ys: &[f32]) -> Self {
        Self::xy(ElementKind::Scatter, &["x"], &["y"], xs, ys)
    }

    /// Points in an `(x, y)` space.
    #[must_use]
    pub fn points(xs: &[f32], ys: &[f32]) -> Self {
        Self::xy(ElementKind::Points, &["x", "y"], &[], xs, ys)
    }

    fn paths(kind: ElementKind, paths: &[Vec<(f32, f32)>]) -> Self {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (i, path) in paths.iter().enumerate() {
            if i > 0 {
                xs.push(f32::NAN);
                ys.push(f32::NAN);
            }
            xs.extend(path.iter().map(|p| p.0));
            ys.extend(path.iter().map(|p| p.1));
        }
        Self::new(kind).kdims(["x", "y"]).data(vec![xs, ys])
    }

    /// One or more polylines.
    #[must_use]
    pub fn path(paths: &[Vec<(f32, f32)>]) -> Self {
        Self::paths(ElementKind::Path, paths)
    }

    /// One or more filled polygons.
    #[must_use]
    pub fn polygons(paths: &[Vec<(f32, f32)>]) -> Self {
        Self::paths(ElementKind::Polygons, paths)
    }

    /// Rectangular bounds annotation.
    #[must_use]
    pub fn bounds(l: f32, b: f32, r: f32, t: f32) -> Self {
        Self::paths(
            ElementKind::Bounds,
            &[vec![(l, b), (l, t), (r, t), (r, b), (l, b)]],
        )
        .extents(Extents::planar(l, b, r, t))
    }

    /// Error bars with symmetric or asymmetric errors.
    #[must_use]
    pub fn error_bars(xs: &[f32], ys: &[f32], neg: &[f32], pos: &[f32]) -> Self {
        let n = xs.len().min(ys.len()).min(neg.len()).min(pos.len());
        Self::new(ElementKind::ErrorBars)
            .kdims(["x"])
            .vdims(["y", "yerror_neg", "yerror_pos"])
            .data(vec![
                xs[..n].to_vec(),
                ys[..n].to_vec(),
                neg[..n].to_vec(),
                pos[..n].to_vec(),
            ])
    }

    fn grid_columns(bounds: Extents, rows: usize, cols: usize) -> (Vec<f32>, Vec<f32>) {
        let (l, r) = bounds.axis(0);
        let (b, t) = bounds.axis(1);
        let dx = (r - l) / cols.max(1) as f32;
        let dy = (t - b) / rows.max(1) as f32;
        let mut xs = Vec::with_capacity(rows * cols);
        let mut ys = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                xs.push(l + (j as f32 + 0.5) * dx);
                ys.push(t - (i as f32 + 0.5) * dy);
            }
        }
        (xs, ys)
    }

    /// An image over `bounds` with `rows x cols` values in row-major order, top row first.
    #[must_use]
    pub fn image(bounds: Extents, rows: usize, cols: usize, values: &[f32]) -> Self {
        let (xs, ys) = Self::grid_columns(bounds, rows, cols);
        let mut z = values.to_vec();
        z.resize(rows * cols, f32::NAN);
        let mut el = Self::new(ElementKind::Image)
            .kdims(["x", "y"])
            .vdims(["z"])
            .data(vec![xs, ys, z])
            .extents(bounds);
        el.shape = Some((rows, cols));
        el
    }

    /// A raster addressed by integer indices.
    #[must_use]
    pub fn raster(rows: usize, cols: usize, values: &[f32]) -> Self {
        let bounds = Extents::planar(0.0, 0.0, cols as f32, rows as f32);
        let mut el = Self::image(bounds, rows, cols, values);
        el.kind = ElementKind::Raster;
        el
    }

    /// A colour image from per-channel planes in `[0, 1]`.
    #[must_use]
    pub fn rgb(bounds: Extents, rows: usize, cols: usize, channels: &[Vec<f32>]) -> Self {
        let (xs, ys) = Self::grid_columns(bounds, rows, cols);
        let names = ["R", "G", "B", "A"];
        let mut columns = vec![xs, ys];
        for channel in channels.iter().take(4) {
            let mut c = channel.clone();
            c.resize(rows * cols, 0.0);
            columns.push(c);
        }
        let mut el = Self::new(ElementKind::Rgb)
            .kdims(["x", "y"])
            .vdims(names.iter().take(channels.len().min(4)).copied())
            .data(columns)
            .extents(bounds);
        el.shape = Some((rows, cols));
        el
    }

    /// A text annotation at `(x, y)`.
    #[must_use]
    pub fn text(x: f32, y: f32, text: impl Into<String>) -> Self {
        let mut el = Self::new(ElementKind::Text)
            .kdims(["x", "y"])
            .data(vec![vec![x], vec![y]]);
        el.text = Some(text.into());
        el
    }

    /// A table with named numeric columns.
    #[must_use]
    pub fn table(columns: Vec<(&str, Vec<f32>)>) -> Self {
        let (names, data): (Vec<&str>, Vec<Vec<f32>>) = columns.into_iter().unzip();
        Self::new(ElementKind::Table).vdims(names).data(data)
    }

    /// Set the key dimensions.
    #[must_use]
    pub fn kdims<D: Into<Dimension>>(mut self, dims: impl IntoIterator<Item = D>) -> Self {
        self.kdims = dims.into_iter().map(Into::into).collect();
        self
    }

    /// Set the value dimensions.
    #[must_use]
    pub fn vdims<D: Into<Dimension>>(mut self, dims: impl IntoIterator<Item = D>) -> Self {
        self.vdims = dims.into_iter().map(Into::into).collect();
        self
    }

    /// Set the data columns (key dimensions first).
    #[must_use]
    pub fn data(mut self, columns: Vec<Vec<f32>>) -> Self {
        self.columns = columns;
        self
    }

    /// Set the group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the object id used for per-object option overrides.
    #[must_use]
    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Declare explicit extents.
    #[must_use]
    pub fn extents(mut self, extents: Extents) -> Self {
        self.extents = extents;
        self
    }

    /// Element kind.
    #[must_use]
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.kind.name()
    }

    /// Group; defaults to the type name.
    #[must_use]
    pub fn group_name(&self) -> &str {
        self.group.as_deref().unwrap_or_else(|| self.kind.name())
    }

    /// Label.
    #[must_use]
    pub fn label_name(&self) -> &str {
        &self.label
    }

    /// Object id.
    #[must_use]
    pub fn object_id(&self) -> Option<u64> {
        self.id
    }

    /// Sanitized `(type, group, label)` identity.
    #[must_use]
    pub fn spec(&self) -> SpecPath {
        SpecPath::identity(self.type_name(), self.group_name(), &self.label)
    }

    /// Key dimensions.
    #[must_use]
    pub fn key_dimensions(&self) -> &[Dimension] {
        &self.kdims
    }

    /// Value dimensions.
    #[must_use]
    pub fn value_dimensions(&self) -> &[Dimension] {
        &self.vdims
    }

    /// All dimensions, key dimensions first.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> + '_ {
        self.kdims.iter().chain(self.vdims.iter())
    }

    /// Dimension at position `i`.
    #[must_use]
    pub fn dimension_at(&self, i: usize) -> Option<&Dimension> {
        self.dimensions().nth(i)
    }

    fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dimensions().position(|d| d.name() == name)
    }

    /// Data column for dimension `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f32]> {
        self.dimension_index(name)
            .and_then(|i| self.columns.get(i))
            .map(Vec::as_slice)
    }

    /// Data column at position `i`.
    #[must_use]
    pub fn column_at(&self, i: usize) -> Option<&[f32]> {
        self.columns.get(i).map(Vec::as_slice)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Whether the element holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared extents (`NaN` where undeclared).
    #[must_use]
    pub fn declared_extents(&self) -> Extents {
        self.extents
    }

    /// Grid shape `(rows, cols)` of raster kinds.
    #[must_use]
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.shape
    }

    /// Text of a text annotation.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// `(min, max)` of dimension `name`; `NaN` bounds when there is no finite data.
    ///
    /// A declared dimension range overrides the data range where finite.
    #[must_use]
    pub fn range(&self, name: &str) -> (f32, f32) {
        match self.dimension_index(name) {
            Some(i) => self.range_at(i),
            None => (f32::NAN, f32::NAN),
        }
    }

    /// `(min, max)` of the dimension at position `i`.
    #[must_use]
    pub fn range_at(&self, i: usize) -> (f32, f32) {
        let Some(dim) = self.dimension_at(i) else {
            return (f32::NAN, f32::NAN);
        };

        let data = if self.kind.is_raster() && i < 2 && !self.extents.is_undefined() {
            self.extents.axis(i)
        } else {
            self.columns.get(i).map_or((f32::NAN, f32::NAN), |c| column_range(c))
        };

        match dim.declared_range() {
            Some((lo, hi)) => (
                if lo.is_finite() { lo } else { data.0 },
                if hi.is_finite() { hi } else { data.1 },
            ),
            None => data,
        }
    }
}

/// SIMD `(min, max)` over the finite values of a column.
pub(crate) fn column_range(column: &[f32]) -> (f32, f32) {
    let finite: Vec<f32> = column.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return (f32::NAN, f32::NAN);
    }
    let vec = Vector::from_vec(finite);
    (vec.min().unwrap_or(f32::NAN), vec.max().unwrap_or(f32::NAN))
}
