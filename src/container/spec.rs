//! Type/group/label specification paths.
//!
//! Every object is identified by a `(type, group, label)` triple. Option lookup,
//! normalization groups and style groups all use prefixes of that triple.

use std::fmt;

/// A `type[.group[.label]]` path of one to three components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SpecPath(Vec<String>);

impl SpecPath {
    /// Build a path from components.
    #[must_use]
    pub fn new<S: Into<String>>(parts: impl IntoIterator<Item = S>) -> Self {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted path such as `"Curve.Sine"`.
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The full identity of an object with sanitized group and label.
    #[must_use]
    pub fn identity(type_name: &str, group: &str, label: &str) -> Self {
        Self(vec![
            type_name.to_string(),
            sanitize_identifier(group),
            sanitize_identifier(label),
        ])
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path is the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Components.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// The first `n` components.
    #[must_use]
    pub fn truncate(&self, n: usize) -> Self {
        Self(self.0.iter().take(n).cloned().collect())
    }

    /// Whether `self` is a prefix of `full`.
    #[must_use]
    pub fn is_prefix_of(&self, full: &SpecPath) -> bool {
        self.0.len() <= full.0.len() && self.0.iter().zip(&full.0).all(|(a, b)| a == b)
    }

    /// Whether `self` equals one of the 1, 2 or 3 component prefixes of `full`.
    #[must_use]
    pub fn applies_to(&self, full: &SpecPath) -> bool {
        (1..=3).any(|i| i <= full.len() && *self == full.truncate(i))
    }
}

impl fmt::Display for SpecPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for SpecPath {
    fn from(dotted: &str) -> Self {
        SpecPath::parse(dotted)
    }
}

/// Turn an arbitrary group or label string into an identifier usable as a path
/// component: whitespace runs become underscores, other punctuation is dropped.
#[must_use]
pub fn sanitize_identifier(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for ch in s.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !(ch.is_alphanumeric() || ch == '_') {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push('_');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted() {
        let p = SpecPath::parse("Curve.Sine Wave");
        assert_eq!(p.parts(), &["Curve".to_string(), "Sine Wave".to_string()]);
        assert!(SpecPath::parse("").is_empty());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_identifier("  Sine  Wave "), "Sine_Wave");
        assert_eq!(sanitize_identifier("a.b(c)"), "abc");
        assert_eq!(sanitize_identifier(""), "");
    }

    #[test]
    fn test_applies_to() {
        let full = SpecPath::identity("Curve", "Curve", "A");
        assert!(SpecPath::new(["Curve"]).applies_to(&full));
        assert!(SpecPath::new(["Curve", "Curve"]).applies_to(&full));
        assert!(full.applies_to(&full));
        assert!(!SpecPath::new(["Curve", "Other"]).applies_to(&full));
        assert!(!SpecPath::default().applies_to(&full));
    }

    #[test]
    fn test_prefix() {
        let full = SpecPath::identity("Image", "Image", "");
        assert!(SpecPath::default().is_prefix_of(&full));
        assert!(SpecPath::new(["Image"]).is_prefix_of(&full));
        assert!(!SpecPath::new(["Curve"]).is_prefix_of(&full));
    }
}
