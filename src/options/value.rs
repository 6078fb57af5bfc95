//! Option values, cycles and option groups.

use std::collections::BTreeMap;
use std::fmt;

use crate::color::Rgba;

/// A single option value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config", serde(untagged))]
pub enum OptionValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value (colour names, markers, templates, ...).
    Str(String),
    /// A cycle of values picked by cyclic index.
    Cycle(Cycle),
}

impl OptionValue {
    /// Boolean view.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Int(i) => Some(*i as f64),
            OptionValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Colour view of a string value.
    #[must_use]
    pub fn as_color(&self) -> Option<Rgba> {
        self.as_str().and_then(Rgba::parse)
    }

    /// The cycle, if this is one.
    #[must_use]
    pub fn as_cycle(&self) -> Option<&Cycle> {
        match self {
            OptionValue::Cycle(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Float(v) => write!(f, "{v}"),
            OptionValue::Str(s) => f.write_str(s),
            OptionValue::Cycle(c) => write!(f, "Cycle({})", c.0.len()),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<i32> for OptionValue {
    fn from(i: i32) -> Self {
        OptionValue::Int(i64::from(i))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<Cycle> for OptionValue {
    fn from(c: Cycle) -> Self {
        OptionValue::Cycle(c)
    }
}

/// A bounded list of values from which layers of one style group pick in turn.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config", serde(transparent))]
pub struct Cycle(Vec<OptionValue>);

impl Cycle {
    /// Create a cycle.
    #[must_use]
    pub fn new<V: Into<OptionValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Values in order.
    #[must_use]
    pub fn values(&self) -> &[OptionValue] {
        &self.0
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the cycle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value picked by `index`, wrapping around.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&OptionValue> {
        if self.0.is_empty() {
            None
        } else {
            self.0.get(index % self.0.len())
        }
    }

    /// The first `n` values (at least one is kept).
    #[must_use]
    pub fn truncated(&self, n: usize) -> Self {
        Self(self.0.iter().take(n.max(1)).cloned().collect())
    }
}

/// The three option groups an object carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionGroup {
    /// Visual styling passed to the backend (colours, widths, markers).
    Style,
    /// Plot-level parameters (titles, sizes, flags).
    Plot,
    /// Normalization settings.
    Norm,
}

impl OptionGroup {
    /// All groups.
    pub const ALL: [OptionGroup; 3] = [OptionGroup::Style, OptionGroup::Plot, OptionGroup::Norm];

    /// Group name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OptionGroup::Style => "style",
            OptionGroup::Plot => "plot",
            OptionGroup::Norm => "norm",
        }
    }

    /// Parse a group name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "style" => Some(OptionGroup::Style),
            "plot" => Some(OptionGroup::Plot),
            "norm" => Some(OptionGroup::Norm),
            _ => None,
        }
    }
}

impl fmt::Display for OptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved set of named option values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Boolean value of `name`.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(OptionValue::as_bool)
    }

    /// Numeric value of `name`.
    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OptionValue::as_f64)
    }

    /// String value of `name`.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    /// Whether `name` is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Option names.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge `other` over `self`; values in `other` win.
    pub fn merge(&mut self, other: &Options) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    /// `self` with `other` merged over it.
    #[must_use]
    pub fn merged(mut self, other: &Options) -> Self {
        self.merge(other);
        self
    }

    /// Only the named options.
    #[must_use]
    pub fn filtered(&self, names: &[&str]) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|(k, _)| names.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Truncate every cycle to at most `n` values.
    #[must_use]
    pub fn max_cycles(&self, n: usize) -> Self {
        Self {
            values: self
                .values
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        OptionValue::Cycle(c) => OptionValue::Cycle(c.truncated(n)),
                        other => other.clone(),
                    };
                    (k.clone(), v)
                })
                .collect(),
        }
    }

    /// Replace every cycle with its value at `index`; empty cycles are dropped.
    #[must_use]
    pub fn resolve(&self, index: usize) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter_map(|(k, v)| match v {
                    OptionValue::Cycle(c) => c.get(index).map(|v| (k.clone(), v.clone())),
                    other => Some((k.clone(), other.clone())),
                })
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Normalization settings of one normalization group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormMode {
    /// Compute ranges independently per object instead of sharing them.
    pub axiswise: bool,
    /// Compute ranges per frame instead of across the whole key space.
    pub framewise: bool,
}

impl NormMode {
    /// Read `axiswise` and `framewise` from norm options, defaulting to `false`.
    #[must_use]
    pub fn from_options(opts: &Options) -> Self {
        Self {
            axiswise: opts.get_bool("axiswise").unwrap_or(false),
            framewise: opts.get_bool("framewise").unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        let c = Cycle::new(["a", "b"]);
        assert_eq!(c.get(3), Some(&OptionValue::from("b")));
        assert!(Cycle::default().get(0).is_none());
    }

    #[test]
    fn test_max_cycles_and_resolve() {
        let opts = Options::new()
            .with("color", Cycle::new(["#30a2da", "#fc4f30", "#e5ae38"]))
            .with("line_width", 2);
        let limited = opts.max_cycles(2);
        assert_eq!(limited.get("color").and_then(OptionValue::as_cycle).map(Cycle::len), Some(2));

        let resolved = limited.resolve(3);
        assert_eq!(resolved.get_str("color"), Some("#fc4f30"));
        assert_eq!(resolved.get_f64("line_width"), Some(2.0));
    }

    #[test]
    fn test_merge_overrides() {
        let base = Options::new().with("a", 1).with("b", 2);
        let merged = base.merged(&Options::new().with("b", 3));
        assert_eq!(merged.get_f64("a"), Some(1.0));
        assert_eq!(merged.get_f64("b"), Some(3.0));
    }

    #[test]
    fn test_norm_mode_defaults() {
        assert_eq!(NormMode::from_options(&Options::new()), NormMode::default());
        let n = NormMode::from_options(&Options::new().with("framewise", true));
        assert!(n.framewise && !n.axiswise);
    }

    #[test]
    fn test_group_names() {
        for g in OptionGroup::ALL {
            assert_eq!(OptionGroup::parse(g.name()), Some(g));
        }
        assert!(OptionGroup::parse("other").is_none());
    }
}
