#![forbid(unsafe_code)]

//! Modal configuration: dismiss methods, destroy policy, extra classes,
//! template policy, positioning, and size constraints.

use bitflags::bitflags;
use thiserror::Error;
use velum_core::geometry::{Rect, Size};

bitflags! {
    /// Which dismiss affordances are active for a modal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DismissMethods: u8 {
        /// A close affordance inside the panel.
        const BUTTON = 1 << 0;
        /// Clicking the backdrop (outside the panel).
        const OVERLAY = 1 << 1;
        /// Pressing Escape while topmost.
        const ESCAPE = 1 << 2;
    }
}

impl Default for DismissMethods {
    fn default() -> Self {
        Self::all()
    }
}

/// What construction does when the template id resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTemplate {
    /// Log an error and yield an inert instance; `open()` on it is a
    /// logged no-op.
    #[default]
    LogOnly,
    /// Fail construction with [`ModalError::TemplateNotFound`].
    Fail,
}

/// Errors surfaced by modal construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModalError {
    /// No blueprint registered under the requested template id.
    #[error("template {id:?} does not exist")]
    TemplateNotFound { id: String },
}

/// Panel size constraints (min/max width/height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalSizeConstraints {
    pub min_width: Option<u16>,
    pub max_width: Option<u16>,
    pub min_height: Option<u16>,
    pub max_height: Option<u16>,
}

impl ModalSizeConstraints {
    /// No constraints in any dimension.
    pub const fn new() -> Self {
        Self {
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
        }
    }

    /// Set minimum width.
    pub fn min_width(mut self, value: u16) -> Self {
        self.min_width = Some(value);
        self
    }

    /// Set maximum width.
    pub fn max_width(mut self, value: u16) -> Self {
        self.max_width = Some(value);
        self
    }

    /// Set minimum height.
    pub fn min_height(mut self, value: u16) -> Self {
        self.min_height = Some(value);
        self
    }

    /// Set maximum height.
    pub fn max_height(mut self, value: u16) -> Self {
        self.max_height = Some(value);
        self
    }

    /// Clamp the given size to these constraints (but never exceed available).
    pub fn clamp(self, wanted: Size, available: Size) -> Size {
        let mut width = wanted.width.min(available.width);
        let mut height = wanted.height.min(available.height);

        if let Some(max_width) = self.max_width {
            width = width.min(max_width);
        }
        if let Some(max_height) = self.max_height {
            height = height.min(max_height);
        }
        if let Some(min_width) = self.min_width {
            width = width.max(min_width).min(available.width);
        }
        if let Some(min_height) = self.min_height {
            height = height.max(min_height).min(available.height);
        }

        Size::new(width, height)
    }
}

/// Panel positioning options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPosition {
    #[default]
    Center,
    CenterOffset {
        x: i16,
        y: i16,
    },
    TopCenter {
        margin: u16,
    },
    Custom {
        x: u16,
        y: u16,
    },
}

impl ModalPosition {
    /// Place a panel of `size` within `area`, clamped to stay inside.
    pub(crate) fn resolve(self, area: Rect, size: Size) -> Rect {
        let base_x = area.x as i32;
        let base_y = area.y as i32;
        let max_x = base_x + (area.width as i32 - size.width as i32);
        let max_y = base_y + (area.height as i32 - size.height as i32);

        let (mut x, mut y) = match self {
            Self::Center => (
                base_x + (area.width as i32 - size.width as i32) / 2,
                base_y + (area.height as i32 - size.height as i32) / 2,
            ),
            Self::CenterOffset { x, y } => (
                base_x + (area.width as i32 - size.width as i32) / 2 + x as i32,
                base_y + (area.height as i32 - size.height as i32) / 2 + y as i32,
            ),
            Self::TopCenter { margin } => (
                base_x + (area.width as i32 - size.width as i32) / 2,
                base_y + margin as i32,
            ),
            Self::Custom { x, y } => (x as i32, y as i32),
        };

        x = x.clamp(base_x, max_x.max(base_x));
        y = y.clamp(base_y, max_y.max(base_y));

        Rect::new(x as u16, y as u16, size.width, size.height)
    }
}

/// Modal configuration resolved at construction time.
///
/// Plain data; open/close hooks live on the [`Modal`](super::Modal) itself
/// so the config stays `Clone`.
#[derive(Debug, Clone)]
pub struct ModalConfig {
    /// Identifier of the content blueprint to instantiate.
    pub template_id: String,
    /// Whether a plain `close()` tears down the element tree.
    pub destroy_on_close: bool,
    /// Whether a footer region is built.
    pub footer: bool,
    /// Extra style classes applied to the panel.
    pub css_classes: Vec<String>,
    /// Active dismiss affordances.
    pub dismiss: DismissMethods,
    /// Behavior when the template id is unknown.
    pub missing_template: MissingTemplate,
    /// Panel placement.
    pub position: ModalPosition,
    /// Panel size constraints.
    pub size: ModalSizeConstraints,
}

impl ModalConfig {
    /// Defaults matching the classic modal: destroy on close, no footer,
    /// all dismiss methods enabled, lenient template policy.
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            destroy_on_close: true,
            footer: false,
            css_classes: Vec::new(),
            dismiss: DismissMethods::all(),
            missing_template: MissingTemplate::LogOnly,
            position: ModalPosition::Center,
            size: ModalSizeConstraints::new(),
        }
    }

    /// Set the destroy-on-close policy.
    pub fn destroy_on_close(mut self, destroy: bool) -> Self {
        self.destroy_on_close = destroy;
        self
    }

    /// Enable or disable the footer region.
    pub fn footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    /// Add an extra style class to the panel.
    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.css_classes.push(class.into());
        self
    }

    /// Replace the active dismiss-method set.
    pub fn dismiss(mut self, methods: DismissMethods) -> Self {
        self.dismiss = methods;
        self
    }

    /// Set the missing-template policy.
    pub fn missing_template(mut self, policy: MissingTemplate) -> Self {
        self.missing_template = policy;
        self
    }

    /// Set the panel position.
    pub fn position(mut self, position: ModalPosition) -> Self {
        self.position = position;
        self
    }

    /// Set the panel size constraints.
    pub fn size(mut self, size: ModalSizeConstraints) -> Self {
        self.size = size;
        self
    }
}
