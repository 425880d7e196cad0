#![forbid(unsafe_code)]

//! Template-driven modal overlays with stacking, animated transitions, and
//! a shared scroll lock.
//!
//! A [`Modal`] is constructed from a [`ModalConfig`] and a content
//! [`Blueprint`] looked up by id in a [`TemplateRegistry`]. Its element
//! tree is built lazily on first open and optionally torn down on close.
//! All instances cooperate through one [`OverlayContext`]: the ordered
//! stack of open modals (topmost gets the Escape key) and the global
//! scroll lock with scrollbar-gutter compensation.
//!
//! # Lifecycle
//!
//! Opening and closing are animated; the host drives animations by calling
//! [`Modal::tick`] (or [`Modal::tick_now`]) each frame. Finalization —
//! teardown, scroll unlock, the `on_close` hook — happens when the exit
//! transition's *transform* track completes, never synchronously inside
//! `close`. If the host stops ticking, the modal stays in its intermediate
//! state; there is no timeout fallback.
//!
//! # Example
//!
//! ```ignore
//! use velum_widgets::modal::{Blueprint, Modal, ModalConfig, OverlayContext, TemplateRegistry};
//!
//! let mut registry = TemplateRegistry::new();
//! registry.register("greeting", Blueprint::from_text("Hello!"));
//!
//! let mut ctx = OverlayContext::new();
//! let mut modal = Modal::new(&registry, ModalConfig::new("greeting"))?;
//!
//! modal.open(&mut ctx);
//! // each frame: modal.tick_now(&mut ctx); modal.render(area, &mut frame, &sheet);
//! # Ok::<(), velum_widgets::modal::ModalError>(())
//! ```
//!
//! # Style class contract
//!
//! Elements carry class names; what they look like belongs to the host's
//! [`Stylesheet`](velum_core::style::Stylesheet). This module only
//! guarantees the names below are applied and removed consistently.

mod animation;
mod config;
mod container;
mod element;
mod footer;
mod stack;
mod template;

pub use animation::{
    ModalAnimationConfig, ModalAnimationPhase, ModalAnimationState, ModalEasing, ModalEntrance,
    ModalExit, TransitionEnd, TransitionProperty,
};
pub use config::{
    DismissMethods, MissingTemplate, ModalConfig, ModalError, ModalPosition, ModalSizeConstraints,
};
pub use container::{Modal, ModalAction, ModalLifecycleEvent, ModalPhase};
pub use element::{ClassList, Element, ElementId};
pub use footer::FooterButton;
pub use stack::{HostChrome, ModalToken, OverlayContext, TerminalChrome};
pub use template::{Blueprint, TemplateRegistry};

/// Backdrop element class (full-viewport dimming layer).
pub const CLASS_BACKDROP: &str = "velum__backdrop";
/// Panel element class (the visible modal box).
pub const CLASS_PANEL: &str = "velum__panel";
/// Shown-state class toggled on the backdrop while the modal is visible.
pub const CLASS_SHOW: &str = "velum--show";
/// Close affordance class.
pub const CLASS_CLOSE: &str = "velum__close";
/// Content slot class.
pub const CLASS_CONTENT: &str = "velum__content";
/// Footer region class.
pub const CLASS_FOOTER: &str = "velum__footer";
/// Scroll-lock class applied to the host body while any modal is open.
pub const CLASS_NO_SCROLL: &str = "velum--no-scroll";
