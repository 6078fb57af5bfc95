//! Dispatch from object types to plotting classes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::plot::PlotArgs;
use super::ranges::{Extents, RangeMap};
use crate::compositor::{Compositor, Passthrough};
use crate::container::{ViewType, Viewable};
use crate::error::{Error, Result};
use crate::options::{OptionValue, Options, OptionsRegistry};

/// What kind of object a plotting class draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotRole {
    /// A single element per frame.
    Element,
    /// An overlay of layers per frame.
    Overlay,
    /// A grid of independent plots.
    Composite,
}

/// Builds a plot for an object.
pub type PlotBuilder<P> = fn(Viewable, PlotArgs, &PlotContext<P>) -> Result<P>;

/// A registered plotting class.
pub struct PlotClass<P> {
    name: String,
    role: PlotRole,
    style_opts: Vec<String>,
    params: Vec<String>,
    build: PlotBuilder<P>,
}

impl<P> PlotClass<P> {
    /// A plotting class named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, role: PlotRole, build: PlotBuilder<P>) -> Self {
        Self {
            name: name.into(),
            role,
            style_opts: Vec::new(),
            params: Vec::new(),
            build,
        }
    }

    /// Declare the style options the class understands.
    #[must_use]
    pub fn style_opts(mut self, names: &[&str]) -> Self {
        self.style_opts = names.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Declare the plot parameters the class understands.
    #[must_use]
    pub fn params(mut self, names: &[&str]) -> Self {
        self.params = names.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role.
    #[must_use]
    pub fn role(&self) -> PlotRole {
        self.role
    }

    /// Declared style options.
    #[must_use]
    pub fn style_options(&self) -> &[String] {
        &self.style_opts
    }

    /// Declared plot parameters.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Build a plot of `obj`.
    pub fn build(&self, obj: Viewable, args: PlotArgs, ctx: &PlotContext<P>) -> Result<P> {
        debug!(class = %self.name, view = %obj.view_type(), "building plot");
        (self.build)(obj, args, ctx)
    }
}

impl<P> Clone for PlotClass<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            role: self.role,
            style_opts: self.style_opts.clone(),
            params: self.params.clone(),
            build: self.build,
        }
    }
}

impl<P> fmt::Debug for PlotClass<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotClass")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("style_opts", &self.style_opts)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Picks a selector key for an object.
pub type SelectorFn = Arc<dyn Fn(&Viewable) -> String + Send + Sync>;

/// Chooses between interchangeable plotting classes per object.
///
/// All candidates must declare the same style options and plot parameters so the
/// selector presents a single option interface.
pub struct PlotSelector<P> {
    selector: SelectorFn,
    classes: Vec<(String, PlotClass<P>)>,
    style_opts: Vec<String>,
    params: Vec<String>,
    overrides: Options,
}

impl<P> PlotSelector<P> {
    /// Create a selector over `classes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentSelector`] if the classes disagree on their
    /// plot parameters (compared as sets) or style options (compared in order).
    pub fn new(
        selector: impl Fn(&Viewable) -> String + Send + Sync + 'static,
        classes: Vec<(String, PlotClass<P>)>,
    ) -> Result<Self> {
        let param_sets: Vec<BTreeSet<&String>> =
            classes.iter().map(|(_, c)| c.params.iter().collect()).collect();
        if param_sets.iter().any(|s| Some(s) != param_sets.first()) {
            return Err(Error::InconsistentSelector("plot"));
        }
        // Style options must also agree on order; plot parameters only as a set.
        let styles: Vec<&Vec<String>> = classes.iter().map(|(_, c)| &c.style_opts).collect();
        if styles.iter().any(|s| Some(s) != styles.first()) {
            return Err(Error::InconsistentSelector("style"));
        }

        let style_opts = classes.first().map(|(_, c)| c.style_opts.clone()).unwrap_or_default();
        let params = classes.first().map(|(_, c)| c.params.clone()).unwrap_or_default();
        Ok(Self {
            selector: Arc::new(selector),
            classes,
            style_opts,
            params,
            overrides: Options::new(),
        })
    }

    /// Shared style options.
    #[must_use]
    pub fn style_options(&self) -> &[String] {
        &self.style_opts
    }

    /// Shared plot parameters.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// The class selected for `obj`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedSelectorKey`] when the selector returns an unknown key.
    pub fn select(&self, obj: &Viewable) -> Result<&PlotClass<P>> {
        let key = (self.selector)(obj);
        self.classes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| c)
            .ok_or_else(|| Error::UnresolvedSelectorKey {
                key,
                available: self
                    .classes
                    .iter()
                    .map(|(k, _)| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Set a declared plot parameter for every plot the selector builds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectorAttribute`] for names outside the declared parameters.
    pub fn set_param(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        if !self.params.iter().any(|p| p == name) {
            return Err(Error::SelectorAttribute(
                self.classes
                    .iter()
                    .map(|(_, c)| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ));
        }
        self.overrides.set(name, value);
        Ok(())
    }

    /// Build a plot of `obj` with the selected class.
    ///
    /// Frame maps are dispatched on their last frame. Parameters set with
    /// [`set_param`](Self::set_param) fill in values `args` leaves unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedSelectorKey`] when the selector returns an unknown
    /// key, and propagates construction errors.
    pub fn build(&self, obj: Viewable, mut args: PlotArgs, ctx: &PlotContext<P>) -> Result<P> {
        let class = match &obj {
            Viewable::Map(map) => self.select(map.last().unwrap_or(&Viewable::Empty))?,
            other => self.select(other)?,
        };
        args.params = self.overrides.clone().merged(&args.params);
        class.build(obj, args, ctx)
    }
}

impl<P> fmt::Debug for PlotSelector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotSelector")
            .field("classes", &self.classes)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

/// A registry entry.
pub enum PlotEntry<P> {
    /// A single class.
    Class(PlotClass<P>),
    /// A per-object choice between classes.
    Selector(PlotSelector<P>),
}

impl<P> fmt::Debug for PlotEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotEntry::Class(class) => f.debug_tuple("Class").field(class).finish(),
            PlotEntry::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
        }
    }
}

/// Plotting classes keyed by backend and object type.
pub struct PlotRegistry<P> {
    entries: BTreeMap<(String, ViewType), PlotEntry<P>>,
}

impl<P> Default for PlotRegistry<P> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<P> PlotRegistry<P> {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class` for `view_type` under `backend`.
    pub fn register(&mut self, backend: &str, view_type: ViewType, class: PlotClass<P>) {
        self.entries
            .insert((backend.to_string(), view_type), PlotEntry::Class(class));
    }

    /// Register a selector for `view_type` under `backend`.
    pub fn register_selector(&mut self, backend: &str, view_type: ViewType, selector: PlotSelector<P>) {
        self.entries
            .insert((backend.to_string(), view_type), PlotEntry::Selector(selector));
    }

    /// Whether anything is registered for `view_type` under `backend`.
    #[must_use]
    pub fn contains(&self, backend: &str, view_type: &ViewType) -> bool {
        self.entries.contains_key(&(backend.to_string(), view_type.clone()))
    }

    /// Entry registered for `view_type` under `backend`.
    #[must_use]
    pub fn entry(&self, backend: &str, view_type: &ViewType) -> Option<&PlotEntry<P>> {
        self.entries.get(&(backend.to_string(), view_type.clone()))
    }

    /// The type a plot of `obj` is chosen by: the value type of a frame map, or the
    /// object's own type.
    #[must_use]
    pub fn plot_type(obj: &Viewable) -> ViewType {
        match obj {
            Viewable::Map(map) => map.value_type().unwrap_or(ViewType::Empty),
            other => other.view_type(),
        }
    }

    /// The class that plots `obj` under `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredPlotType`] when nothing is registered, or a selector
    /// error when the selector fails.
    pub fn resolve(&self, backend: &str, obj: &Viewable) -> Result<&PlotClass<P>> {
        let view_type = Self::plot_type(obj);
        let last;
        let sample = match obj {
            Viewable::Map(map) => {
                last = map.last().cloned().unwrap_or(Viewable::Empty);
                &last
            }
            other => other,
        };
        match self.entry(backend, &view_type) {
            Some(PlotEntry::Class(class)) => Ok(class),
            Some(PlotEntry::Selector(selector)) => selector.select(sample),
            None => Err(Error::UnregisteredPlotType {
                backend: backend.to_string(),
                view_type: view_type.name().to_string(),
            }),
        }
    }
}

impl<P> fmt::Debug for PlotRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Everything a plot needs to build its sub-plots.
pub struct PlotContext<P> {
    /// Backend name.
    pub backend: String,
    /// Options service.
    pub options: Arc<OptionsRegistry>,
    /// Plotting classes.
    pub registry: Arc<PlotRegistry<P>>,
    /// Overlay compositor.
    pub compositor: Arc<dyn Compositor>,
}

impl<P> PlotContext<P> {
    /// A context with a pass-through compositor.
    #[must_use]
    pub fn new(
        backend: impl Into<String>,
        options: Arc<OptionsRegistry>,
        registry: Arc<PlotRegistry<P>>,
    ) -> Self {
        Self {
            backend: backend.into(),
            options,
            registry,
            compositor: Arc::new(Passthrough),
        }
    }

    /// Use `compositor` for overlays.
    #[must_use]
    pub fn with_compositor(mut self, compositor: Arc<dyn Compositor>) -> Self {
        self.compositor = compositor;
        self
    }

    /// Build a plot of `obj` with the registered class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredPlotType`] when no class is registered for `obj`.
    pub fn build(&self, obj: Viewable, args: PlotArgs) -> Result<P> {
        let view_type = PlotRegistry::<P>::plot_type(&obj);
        match self.registry.entry(&self.backend, &view_type) {
            Some(PlotEntry::Selector(selector)) => selector.build(obj, args, self),
            _ => {
                let class = self.registry.resolve(&self.backend, &obj)?;
                class.build(obj, args, self)
            }
        }
    }

    /// Role of the class that would plot `obj`.
    #[must_use]
    pub fn role_of(&self, obj: &Viewable) -> Option<PlotRole> {
        self.registry.resolve(&self.backend, obj).ok().map(PlotClass::role)
    }
}

impl<P> Clone for PlotContext<P> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            options: Arc::clone(&self.options),
            registry: Arc::clone(&self.registry),
            compositor: Arc::clone(&self.compositor),
        }
    }
}

impl<P> fmt::Debug for PlotContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotContext")
            .field("backend", &self.backend)
            .field("compositor", &self.compositor)
            .finish_non_exhaustive()
    }
}

/// A plot embedded in an overlay.
pub trait Subplot {
    /// Whether the plot derives its bounds from data.
    fn apply_ranges(&self) -> bool;

    /// Extents of `layer` given the overlay's range map.
    ///
    /// Element plots use the ranges of the layer's most specific normalization group;
    /// nested overlays receive the full map.
    fn layer_extents(&self, layer: &Viewable, ranges: &RangeMap) -> Extents;

    /// Number of z-order slots the plot occupies.
    fn zorder_span(&self) -> usize {
        1
    }
}

impl<S: Subplot + ?Sized> Subplot for Box<S> {
    fn apply_ranges(&self) -> bool {
        (**self).apply_ranges()
    }

    fn layer_extents(&self, layer: &Viewable, ranges: &RangeMap) -> Extents {
        (**self).layer_extents(layer, ranges)
    }

    fn zorder_span(&self) -> usize {
        (**self).zorder_span()
    }
}
