#![forbid(unsafe_code)]

//! Footer content and the button registry.
//!
//! Footer content and buttons may be registered at any time, before or
//! after the modal is built. The footer element is rebuilt on the next
//! sync pass, and every pass places content before buttons regardless of
//! registration order.

use std::fmt;

use super::element::{ClassList, Element};

/// Class applied to every footer button element.
pub(crate) const CLASS_FOOTER_BUTTON: &str = "velum__btn";

/// A labelled footer button with an optional click callback.
pub struct FooterButton {
    label: String,
    classes: ClassList,
    on_click: Option<Box<dyn FnMut()>>,
}

impl FooterButton {
    /// Create a button with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            classes: ClassList::new(),
            on_click: None,
        }
    }

    /// Add an extra style class to the button.
    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.classes.add(class);
        self
    }

    /// Set the click callback.
    pub fn on_click(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_click = Some(Box::new(callback));
        self
    }

    /// The button label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the click callback, if one is set.
    pub(crate) fn click(&mut self) {
        if let Some(callback) = self.on_click.as_mut() {
            callback();
        }
    }

    fn element(&self) -> Element {
        let mut el = Element::new(CLASS_FOOTER_BUTTON).text(self.label.clone());
        for class in self.classes.iter() {
            el.classes.add(class);
        }
        el
    }
}

impl fmt::Debug for FooterButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FooterButton")
            .field("label", &self.label)
            .field("classes", &self.classes)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

/// Pending footer state, applied to the footer element on each sync pass.
#[derive(Debug, Default)]
pub(crate) struct FooterState {
    content: Option<String>,
    buttons: Vec<FooterButton>,
    dirty: bool,
}

impl FooterState {
    /// Replace the footer content text.
    pub(crate) fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
        self.dirty = true;
    }

    /// Append a button to the registry.
    pub(crate) fn add_button(&mut self, button: FooterButton) {
        self.buttons.push(button);
        self.dirty = true;
    }

    pub(crate) fn buttons_mut(&mut self) -> &mut [FooterButton] {
        &mut self.buttons
    }

    pub(crate) fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Rebuild the footer element's children if anything changed since the
    /// last pass. Content always precedes buttons.
    pub(crate) fn sync_into(&mut self, footer: &mut Element) {
        if !self.dirty {
            return;
        }
        footer.children.clear();
        if let Some(content) = &self.content {
            footer
                .children
                .push(Element::new("velum__footer-content").text(content.clone()));
        }
        for button in &self.buttons {
            footer.children.push(button.element());
        }
        self.dirty = false;
    }
}
