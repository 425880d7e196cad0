#![forbid(unsafe_code)]

//! The element tree a modal builds on first open.
//!
//! Elements are inert structure: an identity, an ordered class list,
//! optional text, and children. Rendering resolves the classes against the
//! host stylesheet; nothing here knows about colors.
//!
//! # Invariants
//!
//! - [`ElementId`]s are process-unique; two elements never share one.
//! - [`Element::deep_clone`] re-assigns ids at every level, so blueprint
//!   instantiations are fully independent.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique element ids.
static ELEMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identity of an element, stable for the element's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        Self(ELEMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// An ordered, deduplicated set of style class names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: Vec<String>,
}

impl ClassList {
    /// Create an empty class list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class; re-adding an existing class is a no-op.
    pub fn add(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.classes.iter().any(|c| *c == class) {
            self.classes.push(class);
        }
    }

    /// Remove a class if present.
    pub fn remove(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Whether the class is present.
    pub fn contains(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Iterate class names in application order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no classes are set.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// One node of the overlay structure.
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    /// Style classes, applied in order.
    pub classes: ClassList,
    /// Text content drawn inside this element, one line per `\n`.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element with a single class.
    pub fn new(class: impl Into<String>) -> Self {
        let mut classes = ClassList::new();
        classes.add(class);
        Self {
            id: ElementId::next(),
            classes,
            text: None,
            children: Vec::new(),
        }
    }

    /// Set text content (builder form).
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child (builder form).
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// This element's identity.
    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Copy the whole subtree with fresh ids at every level.
    pub fn deep_clone(&self) -> Self {
        Self {
            id: ElementId::next(),
            classes: self.classes.clone(),
            text: self.text.clone(),
            children: self.children.iter().map(Element::deep_clone).collect(),
        }
    }

    /// Depth-first search for the first descendant (or self) carrying `class`.
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        if self.classes.contains(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_class(class))
    }

    /// Mutable variant of [`find_by_class`](Self::find_by_class).
    pub fn find_by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        if self.classes.contains(class) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_by_class_mut(class))
    }

    /// Text content split into lines (empty when there is no text).
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.as_deref().unwrap_or("").lines()
    }
}
