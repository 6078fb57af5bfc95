//! Collapsing overlay layers into derived elements.
//!
//! Overlay plots collapse their frame map twice: once in [`CollapseMode::Data`]
//! before anything else, then in [`CollapseMode::Display`] with the range map of
//! every frame.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::container::{
    sanitize_identifier, Element, ElementKind, FrameKey, FrameMap, KeyValue, OverlayKind, Viewable,
};
use crate::error::Result;
use crate::plotting::RangeMap;

/// When a collapse runs.
#[derive(Debug, Clone, Copy)]
pub enum CollapseMode<'a> {
    /// Backend-independent merge of raw data.
    Data,
    /// Display-time merge given the range map of each frame.
    Display {
        /// Range map per frame, aligned with `keys`.
        ranges: &'a [RangeMap],
        /// Frame keys the ranges belong to.
        keys: &'a [FrameKey],
    },
}

impl CollapseMode<'_> {
    /// Range map of the frame at `key`, in display mode.
    #[must_use]
    pub fn ranges_for(&self, key: &FrameKey) -> Option<&RangeMap> {
        match self {
            CollapseMode::Data => None,
            CollapseMode::Display { ranges, keys } => keys
                .iter()
                .position(|k| k == key)
                .and_then(|i| ranges.get(i)),
        }
    }

    fn is_display(&self) -> bool {
        matches!(self, CollapseMode::Display { .. })
    }
}

/// Transforms a frame map of overlays into a map of the same general shape.
pub trait Compositor: Send + Sync + fmt::Debug {
    /// Collapse matching layers of every frame.
    fn collapse(&self, map: FrameMap, mode: CollapseMode<'_>) -> Result<FrameMap>;
}

/// A compositor that leaves every map unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Compositor for Passthrough {
    fn collapse(&self, map: FrameMap, _mode: CollapseMode<'_>) -> Result<FrameMap> {
        Ok(map)
    }
}

/// Operation producing one element from a run of matching layers.
pub type CompositorOp = Arc<dyn Fn(&[Element], Option<&RangeMap>) -> Result<Element> + Send + Sync>;

/// Replaces each run of consecutive layers whose kinds equal `pattern`.
#[derive(Clone)]
pub struct CompositorRule {
    pattern: Vec<ElementKind>,
    display: bool,
    group: String,
    operation: CompositorOp,
}

impl CompositorRule {
    /// A rule applied in data mode.
    #[must_use]
    pub fn data(
        pattern: Vec<ElementKind>,
        group: impl Into<String>,
        operation: impl Fn(&[Element], Option<&RangeMap>) -> Result<Element> + Send + Sync + 'static,
    ) -> Self {
        Self {
            pattern,
            display: false,
            group: group.into(),
            operation: Arc::new(operation),
        }
    }

    /// A rule applied in display mode; the operation receives the frame's ranges.
    #[must_use]
    pub fn display(
        pattern: Vec<ElementKind>,
        group: impl Into<String>,
        operation: impl Fn(&[Element], Option<&RangeMap>) -> Result<Element> + Send + Sync + 'static,
    ) -> Self {
        Self {
            display: true,
            ..Self::data(pattern, group, operation)
        }
    }

    /// Position of the first run matching the pattern at or after `start`.
    fn find_run(&self, layers: &[(FrameKey, Viewable)], start: usize) -> Option<usize> {
        let n = self.pattern.len();
        if n == 0 || layers.len() < n {
            return None;
        }
        (start..=layers.len() - n).find(|&i| {
            layers[i..i + n]
                .iter()
                .zip(&self.pattern)
                .all(|((_, layer), kind)| layer.as_element().is_some_and(|e| e.kind() == kind))
        })
    }
}

impl fmt::Debug for CompositorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositorRule")
            .field("pattern", &self.pattern)
            .field("display", &self.display)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

/// A compositor applying a list of rules in order.
#[derive(Debug, Clone, Default)]
pub struct RuleCompositor {
    rules: Vec<CompositorRule>,
}

impl RuleCompositor {
    /// A compositor without rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: CompositorRule) -> Self {
        self.rules.push(rule);
        self
    }

    fn apply(
        &self,
        rule: &CompositorRule,
        mut layers: Vec<(FrameKey, Viewable)>,
        ranges: Option<&RangeMap>,
    ) -> Result<Vec<(FrameKey, Viewable)>> {
        let mut start = 0;
        while let Some(pos) = rule.find_run(&layers, start) {
            let run: Vec<(FrameKey, Viewable)> =
                layers.drain(pos..pos + rule.pattern.len()).collect();
            let elements: Vec<Element> = run
                .into_iter()
                .filter_map(|(_, v)| match v {
                    Viewable::Element(e) => Some(e),
                    _ => None,
                })
                .collect();
            let label = elements.first().map(|e| e.label_name().to_string()).unwrap_or_default();
            let output = (rule.operation)(&elements, ranges)?.group(rule.group.clone()).label(label.clone());

            let mut key = FrameKey::new(vec![KeyValue::Str(sanitize_identifier(&rule.group))]);
            if !label.is_empty() {
                key.push(sanitize_identifier(&label));
            }
            layers.insert(pos, (key, Viewable::Element(output)));
            start = pos + 1;
        }
        Ok(layers)
    }
}

impl Compositor for RuleCompositor {
    fn collapse(&self, map: FrameMap, mode: CollapseMode<'_>) -> Result<FrameMap> {
        let rules: Vec<&CompositorRule> = self
            .rules
            .iter()
            .filter(|r| r.display == mode.is_display())
            .collect();
        if rules.is_empty() {
            return Ok(map);
        }

        let mut items = Vec::with_capacity(map.len());
        for (key, value) in map.items() {
            let collapsed = match value {
                Viewable::Overlay(overlay) if overlay.kind() == OverlayKind::Unordered => {
                    let mut layers = overlay.layers().to_vec();
                    for rule in &rules {
                        layers = self.apply(rule, layers, mode.ranges_for(key))?;
                    }
                    Viewable::Overlay(overlay.clone_with(layers))
                }
                other => other.clone(),
            };
            items.push((key.clone(), collapsed));
        }
        debug!(frames = items.len(), rules = rules.len(), "collapsed overlay layers");
        Ok(map.clone_with(items))
    }
}
