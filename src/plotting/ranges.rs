//! Range maps and extents aggregation.

use std::collections::BTreeMap;

use crate::container::{nan_max, nan_min, Element, FrameKey, SpecPath};

pub use crate::container::Extents;

/// `(min, max)` of one dimension; `NaN` bounds when undefined.
pub type Range = (f32, f32);

/// Ranges of one normalization group, keyed by dimension name.
pub type DimRanges = BTreeMap<String, Range>;

/// Range maps computed for each frame key.
pub type FrameRanges = BTreeMap<FrameKey, RangeMap>;

/// Dimension ranges per normalization group.
///
/// Groups already present are inherited and never recomputed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeMap(BTreeMap<SpecPath, DimRanges>);

impl RangeMap {
    /// Empty range map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranges of `group`.
    #[must_use]
    pub fn get(&self, group: &SpecPath) -> Option<&DimRanges> {
        self.0.get(group)
    }

    /// Whether `group` has ranges.
    #[must_use]
    pub fn contains(&self, group: &SpecPath) -> bool {
        self.0.contains_key(group)
    }

    /// Store the ranges of `group`.
    pub fn insert(&mut self, group: SpecPath, ranges: DimRanges) {
        self.0.insert(group, ranges);
    }

    /// `(group, ranges)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&SpecPath, &DimRanges)> + '_ {
        self.0.iter()
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no group has ranges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The ranges of the most specific group matching `element`.
    #[must_use]
    pub fn match_spec(&self, element: &Element) -> DimRanges {
        match_spec(&element.spec(), self)
    }
}

impl FromIterator<(SpecPath, DimRanges)> for RangeMap {
    fn from_iter<I: IntoIterator<Item = (SpecPath, DimRanges)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The ranges of the most specific group among the prefixes of `spec`, falling back to
/// the root group; empty when nothing matches.
#[must_use]
pub fn match_spec(spec: &SpecPath, ranges: &RangeMap) -> DimRanges {
    (0..=spec.len().min(3))
        .rev()
        .find_map(|n| ranges.get(&spec.truncate(n)))
        .cloned()
        .unwrap_or_default()
}

/// Union of ranges: the lowest finite lower bound and the highest finite upper bound.
#[must_use]
pub fn max_range<'a>(ranges: impl IntoIterator<Item = &'a Range>) -> Range {
    ranges
        .into_iter()
        .fold((f32::NAN, f32::NAN), |(lo, hi), (l, h)| {
            (nan_min(lo, *l), nan_max(hi, *h))
        })
}

/// Union of extents, as 3-D extents when `three_d` else 2-D.
#[must_use]
pub fn max_extents<'a>(extents: impl IntoIterator<Item = &'a Extents>, three_d: bool) -> Extents {
    let ndims = if three_d { 3 } else { 2 };
    extents
        .into_iter()
        .fold(Extents::undefined(ndims), |acc, e| acc.union(&e.with_ndims(ndims)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_range() {
        let r = max_range(&[(0.0, 1.0), (f32::NAN, 3.0), (-2.0, f32::NAN)]);
        assert_eq!(r, (-2.0, 3.0));
        let empty = max_range(&[]);
        assert!(empty.0.is_nan() && empty.1.is_nan());
    }

    #[test]
    fn test_max_extents() {
        let e = max_extents(
            &[
                Extents::planar(0.0, 0.0, 1.0, 1.0),
                Extents::planar(-1.0, 2.0, 0.0, 3.0),
            ],
            false,
        );
        assert_eq!(e.as_slice(), &[-1.0, 0.0, 1.0, 3.0]);
        assert_eq!(max_extents(&[Extents::planar(0.0, 0.0, 1.0, 1.0)], true).ndims(), 3);
    }

    #[test]
    fn test_match_spec_most_specific() {
        let mut ranges = RangeMap::new();
        ranges.insert(SpecPath::parse("Curve"), DimRanges::from([("y".into(), (0.0, 1.0))]));
        ranges.insert(
            SpecPath::parse("Curve.Curve.A"),
            DimRanges::from([("y".into(), (5.0, 6.0))]),
        );
        let a = Element::curve(&[0.0], &[0.0]).label("A");
        let b = Element::curve(&[0.0], &[0.0]).label("B");
        assert_eq!(ranges.match_spec(&a)["y"], (5.0, 6.0));
        assert_eq!(ranges.match_spec(&b)["y"], (0.0, 1.0));
        assert!(ranges.match_spec(&Element::scatter(&[0.0], &[0.0])).is_empty());
    }
}
