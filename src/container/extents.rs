//! Bounding boxes of renderable objects.

/// Per-axis bounds in `(x0, y0, [z0,] x1, y1, [z1])` order.
///
/// Undefined bounds are `NaN`. Two-dimensional extents hold four values,
/// three-dimensional extents six.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    values: [f32; 6],
    ndims: usize,
}

impl Extents {
    /// Two-dimensional extents `(left, bottom, right, top)`.
    #[must_use]
    pub const fn planar(l: f32, b: f32, r: f32, t: f32) -> Self {
        Self {
            values: [l, b, r, t, f32::NAN, f32::NAN],
            ndims: 2,
        }
    }

    /// Three-dimensional extents.
    #[must_use]
    pub const fn volumetric(x0: f32, y0: f32, z0: f32, x1: f32, y1: f32, z1: f32) -> Self {
        Self {
            values: [x0, y0, z0, x1, y1, z1],
            ndims: 3,
        }
    }

    /// Fully undefined extents with `ndims` axes (2 or 3).
    #[must_use]
    pub const fn undefined(ndims: usize) -> Self {
        Self {
            values: [f32::NAN; 6],
            ndims: if ndims >= 3 { 3 } else { 2 },
        }
    }

    /// Build from a slice of 4 or 6 bounds; any other length yields undefined 2-D extents.
    #[must_use]
    pub fn from_slice(bounds: &[f32]) -> Self {
        match *bounds {
            [l, b, r, t] => Self::planar(l, b, r, t),
            [x0, y0, z0, x1, y1, z1] => Self::volumetric(x0, y0, z0, x1, y1, z1),
            _ => Self::undefined(2),
        }
    }

    /// Number of axes.
    #[must_use]
    pub const fn ndims(&self) -> usize {
        self.ndims
    }

    /// Bounds as a slice of length `2 * ndims`.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values[..self.ndims * 2]
    }

    /// Lower bound of `axis`.
    #[must_use]
    pub fn lower(&self, axis: usize) -> f32 {
        if axis < self.ndims {
            self.values[axis]
        } else {
            f32::NAN
        }
    }

    /// Upper bound of `axis`.
    #[must_use]
    pub fn upper(&self, axis: usize) -> f32 {
        if axis < self.ndims {
            self.values[self.ndims + axis]
        } else {
            f32::NAN
        }
    }

    /// `(lower, upper)` of `axis`.
    #[must_use]
    pub fn axis(&self, axis: usize) -> (f32, f32) {
        (self.lower(axis), self.upper(axis))
    }

    /// Whether every bound is `NaN`.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.as_slice().iter().all(|v| v.is_nan())
    }

    /// Re-shape to `ndims` axes, padding with `NaN`.
    #[must_use]
    pub fn with_ndims(&self, ndims: usize) -> Self {
        let mut out = Self::undefined(ndims);
        for axis in 0..out.ndims.min(self.ndims) {
            out.values[axis] = self.lower(axis);
            out.values[out.ndims + axis] = self.upper(axis);
        }
        out
    }

    /// Widest finite bound per axis of `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Extents) -> Self {
        let ndims = self.ndims.max(other.ndims);
        let mut out = Self::undefined(ndims);
        for axis in 0..ndims {
            out.values[axis] = nan_min(self.lower(axis), other.lower(axis));
            out.values[ndims + axis] = nan_max(self.upper(axis), other.upper(axis));
        }
        out
    }
}

impl Default for Extents {
    fn default() -> Self {
        Self::undefined(2)
    }
}

pub(crate) fn nan_min(a: f32, b: f32) -> f32 {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => a.min(b),
        (true, false) => a,
        (false, true) => b,
        (false, false) => f32::NAN,
    }
}

pub(crate) fn nan_max(a: f32, b: f32) -> f32 {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => a.max(b),
        (true, false) => a,
        (false, true) => b,
        (false, false) => f32::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_planar() {
        let a = Extents::planar(0.0, 0.0, 1.0, 1.0);
        let b = Extents::planar(-1.0, 2.0, 0.0, 3.0);
        assert_eq!(a.union(&b).as_slice(), &[-1.0, 0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_union_ignores_nan() {
        let a = Extents::planar(f32::NAN, 0.0, f32::NAN, 1.0);
        let b = Extents::planar(2.0, f32::NAN, 5.0, f32::NAN);
        assert_eq!(a.union(&b).as_slice(), &[2.0, 0.0, 5.0, 1.0]);
    }

    #[test]
    fn test_undefined() {
        let e = Extents::undefined(3);
        assert_eq!(e.as_slice().len(), 6);
        assert!(e.is_undefined());
        assert!(e.union(&Extents::undefined(3)).is_undefined());
    }

    #[test]
    fn test_with_ndims() {
        let e = Extents::planar(0.0, 1.0, 2.0, 3.0).with_ndims(3);
        assert_eq!(e.axis(0), (0.0, 2.0));
        assert_eq!(e.axis(1), (1.0, 3.0));
        assert!(e.lower(2).is_nan());
    }
}
