//! Named axes of variation.

use std::fmt;
use std::sync::Arc;

use super::key::KeyValue;

/// Formats a single dimension value for display.
pub type ValueFormatter = Arc<dyn Fn(&KeyValue) -> String + Send + Sync>;

/// A named axis of variation, optionally with a unit, a declared soft range and a
/// value formatter.
#[derive(Clone)]
pub struct Dimension {
    name: String,
    unit: Option<String>,
    range: Option<(f32, f32)>,
    formatter: Option<ValueFormatter>,
}

impl Dimension {
    /// Create a dimension with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: None,
            range: None,
            formatter: None,
        }
    }

    /// Set the unit.
    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Declare a range that overrides the data range where finite.
    #[must_use]
    pub fn range(mut self, lo: f32, hi: f32) -> Self {
        self.range = Some((lo, hi));
        self
    }

    /// Set a value formatter.
    #[must_use]
    pub fn formatter(mut self, f: impl Fn(&KeyValue) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    /// Dimension name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension unit, if any.
    #[must_use]
    pub fn unit_str(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Declared soft range, if any.
    #[must_use]
    pub fn declared_range(&self) -> Option<(f32, f32)> {
        self.range
    }

    /// Format one value of this dimension.
    #[must_use]
    pub fn pprint_value(&self, value: &KeyValue) -> String {
        match &self.formatter {
            Some(f) => f(value),
            None => value.to_string(),
        }
    }

    /// Format one value together with the dimension name and unit,
    /// e.g. `"Time: 0.5 s"`.
    #[must_use]
    pub fn pprint_value_string(&self, value: &KeyValue) -> String {
        let unit = self.unit.as_ref().map(|u| format!(" {u}")).unwrap_or_default();
        format!("{}: {}{}", self.name, self.pprint_value(value), unit)
    }
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dimension")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("range", &self.range)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(u) => write!(f, "{} ({u})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Dimension {}

impl From<&str> for Dimension {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Dimension {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
