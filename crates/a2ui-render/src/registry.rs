#![forbid(unsafe_code)]

//! Type-tag to widget-factory lookup.
//!
//! A [`Registry`] is an explicit value: each renderer owns one, so two
//! renderers with different widget sets never interfere. Every registry
//! carries a fallback factory that builds the visible placeholder for a
//! `type` nobody registered.
//!
//! # Invariants
//!
//! 1. Each type tag maps to at most one factory at any given time; a later
//!    [`register`](Registry::register) replaces the earlier one.
//! 2. [`resolve`](Registry::resolve) always yields a factory.
//!
//! # Example
//!
//! ```
//! use a2ui_render::registry::Registry;
//! use a2ui_render::render::ResolvedComponent;
//!
//! let mut reg: Registry<String> =
//!     Registry::new(|c: &ResolvedComponent<'_>, _: Vec<String>| format!("?{}", c.kind()));
//! reg.register("text", |c: &ResolvedComponent<'_>, _: Vec<String>| c.id().to_string());
//!
//! assert!(reg.contains("text"));
//! assert!(!reg.contains("chart"));
//! ```

use ahash::AHashMap;

use crate::render::ResolvedComponent;

/// Builds a widget of type `W` from a resolved component and its already
/// built children.
pub trait WidgetFactory<W> {
    fn build(&self, component: &ResolvedComponent<'_>, children: Vec<W>) -> W;
}

impl<W, F> WidgetFactory<W> for F
where
    F: Fn(&ResolvedComponent<'_>, Vec<W>) -> W,
{
    fn build(&self, component: &ResolvedComponent<'_>, children: Vec<W>) -> W {
        self(component, children)
    }
}

/// Owned, type-erased factory.
pub type BoxedFactory<W> = Box<dyn WidgetFactory<W>>;

/// Mapping from component `type` to widget factory.
pub struct Registry<W> {
    factories: AHashMap<String, BoxedFactory<W>>,
    fallback: BoxedFactory<W>,
}

impl<W> Registry<W> {
    /// Empty registry that renders everything through `fallback`.
    pub fn new(fallback: impl WidgetFactory<W> + 'static) -> Self {
        Self {
            factories: AHashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Register `factory` for `kind`. Returns `true` if an earlier factory
    /// was replaced.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        factory: impl WidgetFactory<W> + 'static,
    ) -> bool {
        self.factories
            .insert(kind.into(), Box::new(factory))
            .is_some()
    }

    /// Register several factories at once; later entries win.
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, BoxedFactory<W>)>,
    {
        self.factories.extend(entries);
    }

    /// Remove the factory for `kind`. Returns `true` if one was present.
    pub fn unregister(&mut self, kind: &str) -> bool {
        self.factories.remove(kind).is_some()
    }

    /// Replace the fallback factory.
    pub fn set_fallback(&mut self, fallback: impl WidgetFactory<W> + 'static) {
        self.fallback = Box::new(fallback);
    }

    /// Factory registered for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&dyn WidgetFactory<W>> {
        self.factories.get(kind).map(|f| f.as_ref())
    }

    /// Factory for `kind`, falling back when unregistered. The flag is
    /// `true` when the fallback was used.
    #[must_use]
    pub fn resolve(&self, kind: &str) -> (&dyn WidgetFactory<W>, bool) {
        match self.factories.get(kind) {
            Some(factory) => (factory.as_ref(), false),
            None => (self.fallback.as_ref(), true),
        }
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered type tags, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl<W> std::fmt::Debug for Registry<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds())
            .finish_non_exhaustive()
    }
}
