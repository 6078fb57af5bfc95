//! Frame keys: tuples of coordinate values addressing one frame.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single coordinate value of a frame key.
#[derive(Debug, Clone)]
pub enum KeyValue {
    /// Integer coordinate (also used for bare frame indices).
    Int(i64),
    /// Floating point coordinate.
    Float(f64),
    /// Categorical coordinate.
    Str(String),
    /// Placeholder for a dimension the owning container does not vary over.
    Missing,
}

impl KeyValue {
    fn rank(&self) -> u8 {
        match self {
            KeyValue::Missing => 0,
            KeyValue::Int(_) | KeyValue::Float(_) => 1,
            KeyValue::Str(_) => 2,
        }
    }

    /// Numeric view of the value, if it has one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KeyValue::Int(i) => Some(*i as f64),
            KeyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view of the value, if it is categorical.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is the [`KeyValue::Missing`] placeholder.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, KeyValue::Missing)
    }
}

impl Ord for KeyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyValue::Int(a), KeyValue::Int(b)) => a.cmp(b),
            (KeyValue::Float(a), KeyValue::Float(b)) => a.total_cmp(b),
            (KeyValue::Int(a), KeyValue::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (KeyValue::Float(a), KeyValue::Int(b)) => {
                a.total_cmp(&(*b as f64)).then(Ordering::Greater)
            }
            (KeyValue::Str(a), KeyValue::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyValue {}

impl Hash for KeyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            KeyValue::Int(i) => i.hash(state),
            KeyValue::Float(f) => f.to_bits().hash(state),
            KeyValue::Str(s) => s.hash(state),
            KeyValue::Missing => {}
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(i) => write!(f, "{i}"),
            KeyValue::Float(v) => write!(f, "{v}"),
            KeyValue::Str(s) => f.write_str(s),
            KeyValue::Missing => f.write_str("None"),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        KeyValue::Int(v)
    }
}

impl From<i32> for KeyValue {
    fn from(v: i32) -> Self {
        KeyValue::Int(i64::from(v))
    }
}

impl From<usize> for KeyValue {
    fn from(v: usize) -> Self {
        KeyValue::Int(v as i64)
    }
}

impl From<f64> for KeyValue {
    fn from(v: f64) -> Self {
        KeyValue::Float(v)
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::Str(s.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(s: String) -> Self {
        KeyValue::Str(s)
    }
}

/// A tuple of coordinate values identifying one point in a key space.
///
/// Also used for any other ordered identity tuple (layer keys, style keys).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FrameKey(Vec<KeyValue>);

impl FrameKey {
    /// Create a key from its components.
    #[must_use]
    pub fn new(values: Vec<KeyValue>) -> Self {
        Self(values)
    }

    /// A bare frame index.
    #[must_use]
    pub fn index(n: usize) -> Self {
        Self(vec![KeyValue::from(n)])
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Components as a slice.
    #[must_use]
    pub fn values(&self) -> &[KeyValue] {
        &self.0
    }

    /// Component at `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&KeyValue> {
        self.0.get(i)
    }

    /// Interpret a single non-negative integer key as a frame index.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self.0.as_slice() {
            [KeyValue::Int(i)] if *i >= 0 => Some(*i as usize),
            _ => None,
        }
    }

    /// The first `n` components (or all of them if shorter).
    #[must_use]
    pub fn truncate(&self, n: usize) -> Self {
        Self(self.0.iter().take(n).cloned().collect())
    }

    /// Concatenate two keys.
    #[must_use]
    pub fn concat(&self, other: &FrameKey) -> Self {
        Self(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    /// Append a component.
    pub fn push(&mut self, value: impl Into<KeyValue>) {
        self.0.push(value.into());
    }
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str(")")
    }
}

impl From<Vec<KeyValue>> for FrameKey {
    fn from(values: Vec<KeyValue>) -> Self {
        Self(values)
    }
}

impl From<usize> for FrameKey {
    fn from(n: usize) -> Self {
        Self::index(n)
    }
}

impl From<KeyValue> for FrameKey {
    fn from(v: KeyValue) -> Self {
        Self(vec![v])
    }
}

impl FromIterator<KeyValue> for FrameKey {
    fn from_iter<I: IntoIterator<Item = KeyValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build a [`FrameKey`] from heterogeneous literals.
///
/// ```
/// use trueno_plot::key;
/// let k = key![1, "a", 0.5];
/// assert_eq!(k.len(), 3);
/// ```
#[macro_export]
macro_rules! key {
    ($($v:expr),* $(,)?) => {
        $crate::container::FrameKey::new(vec![$($crate::container::KeyValue::from($v)),*])
    };
}
