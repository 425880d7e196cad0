#![forbid(unsafe_code)]

//! Content blueprints and the registry modals look them up in.
//!
//! A [`Blueprint`] is an inert description of modal content. Registering it
//! does not build anything; a modal instantiates a deep copy of the
//! blueprint on first open, so every instance gets its own element tree
//! with fresh identities.

use ahash::AHashMap;

use super::element::Element;

/// An inert description of modal content, instantiated per modal.
#[derive(Debug, Clone)]
pub struct Blueprint {
    root: Element,
}

impl Blueprint {
    /// Wrap an element tree as a blueprint.
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Shorthand for a blueprint containing a single text element.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Element::new("velum__text").text(text))
    }

    /// The blueprint's root element (not the copy an instance will get).
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Produce an independent element tree with fresh ids throughout.
    pub(crate) fn instantiate(&self) -> Element {
        self.root.deep_clone()
    }
}

/// Named blueprints available to [`Modal::new`](super::Modal::new).
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: AHashMap<String, Blueprint>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blueprint under `id`, replacing any previous one.
    pub fn register(&mut self, id: impl Into<String>, blueprint: Blueprint) {
        self.templates.insert(id.into(), blueprint);
    }

    /// Remove the blueprint registered under `id`, if any.
    pub fn unregister(&mut self, id: &str) -> Option<Blueprint> {
        self.templates.remove(id)
    }

    /// Look up a blueprint by id.
    pub fn get(&self, id: &str) -> Option<&Blueprint> {
        self.templates.get(id)
    }

    /// Whether a blueprint is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Number of registered blueprints.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_get() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.is_empty());
        registry.register("greeting", Blueprint::from_text("hi"));
        assert!(registry.contains("greeting"));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("greeting").is_some());
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn register_replaces() {
        let mut registry = TemplateRegistry::new();
        registry.register("t", Blueprint::from_text("one"));
        registry.register("t", Blueprint::from_text("two"));
        assert_eq!(registry.len(), 1);
        let root = registry.get("t").unwrap().root();
        assert_eq!(root.text.as_deref(), Some("two"));
    }

    #[test]
    fn unregister_returns_blueprint() {
        let mut registry = TemplateRegistry::new();
        registry.register("t", Blueprint::from_text("x"));
        assert!(registry.unregister("t").is_some());
        assert!(registry.unregister("t").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn instantiate_gets_fresh_ids() {
        let blueprint = Blueprint::from_text("content");
        let a = blueprint.instantiate();
        let b = blueprint.instantiate();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), blueprint.root().id());
        assert_eq!(a.text, b.text);
    }
}
