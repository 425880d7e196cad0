#![forbid(unsafe_code)]

//! The modal instance: lifecycle, input routing, and rendering.
//!
//! A [`Modal`] owns its element tree and animation state; shared concerns
//! (stack order, scroll lock) go through the [`OverlayContext`] passed to
//! each call. The tree is built lazily on first open and, depending on
//! [`ModalConfig::destroy_on_close`], either torn down when the exit
//! transition finishes or kept for the next open with its element
//! identities intact.
//!
//! # Invariants
//!
//! - The shown-state class is applied on the tick *after* `open`, never
//!   synchronously, so the entrance transition always has a from-state.
//! - Close finalization (teardown, scroll unlock, `on_close`) runs when
//!   the exit's transform track completes, never inside `close` itself.
//! - Escape only dismisses the topmost modal on the stack.
//!
//! # Failure Modes
//!
//! - An unknown template id under the lenient policy yields an inert
//!   modal: constructed, but `open` logs an error and does nothing.
//! - If the host stops calling [`Modal::tick`], a closing modal stays in
//!   its closing state indefinitely; there is no timeout fallback.

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, warn};
use velum_core::{
    Cell, Event, Frame, HitId, HitRegion, KeyCode, KeyEventKind, MouseButton, MouseEventKind,
    Rect, Size, Style, Stylesheet,
};
use web_time::Instant;

use super::animation::{
    ModalAnimationConfig, ModalAnimationPhase, ModalAnimationState, TransitionProperty,
};
use super::config::{DismissMethods, MissingTemplate, ModalConfig, ModalError};
use super::element::{Element, ElementId};
use super::footer::{CLASS_FOOTER_BUTTON, FooterButton, FooterState};
use super::stack::{HostChrome, ModalToken, OverlayContext, TerminalChrome};
use super::template::{Blueprint, TemplateRegistry};
use super::{CLASS_BACKDROP, CLASS_CLOSE, CLASS_CONTENT, CLASS_FOOTER, CLASS_PANEL, CLASS_SHOW};
use crate::{draw_text_span, set_style_area};

/// Where a modal is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    /// No element tree: never built, or torn down. The next `open`
    /// rebuilds from the blueprint.
    Unbuilt,
    /// Built but not shown.
    Closed,
    /// Entrance transition running.
    Opening,
    /// Fully shown.
    Open,
    /// Exit transition running.
    Closing,
}

/// Lifecycle notifications returned from [`Modal::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalLifecycleEvent {
    /// The entrance transition finished.
    Opened,
    /// The exit transition finished; the tree was kept.
    Closed,
    /// The exit transition finished; the tree was torn down.
    Destroyed,
}

/// What a routed input event did, returned from [`Modal::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    /// Escape dismissed the modal.
    EscapePressed,
    /// A backdrop click dismissed the modal.
    BackdropClicked,
    /// The close affordance dismissed the modal.
    CloseButton,
    /// A footer button was clicked; carries its registration index.
    FooterButton(usize),
}

/// A template-driven modal overlay.
///
/// See the [module docs](super) for the lifecycle and an example.
pub struct Modal {
    token: ModalToken,
    config: ModalConfig,
    blueprint: Option<Blueprint>,
    animation_config: ModalAnimationConfig,
    animation: ModalAnimationState,
    phase: ModalPhase,
    root: Option<Element>,
    footer: FooterState,
    pending_show: bool,
    pending_destroy: bool,
    gutter: Option<u16>,
    on_open: Option<Box<dyn FnMut()>>,
    on_close: Option<Box<dyn FnMut()>>,
    last_tick: Option<Instant>,
}

impl Modal {
    /// Construct a modal from a registered template.
    ///
    /// With [`MissingTemplate::Fail`] an unknown template id is an error;
    /// under the default lenient policy it logs and yields an inert
    /// instance whose `open` is a no-op.
    pub fn new(registry: &TemplateRegistry, config: ModalConfig) -> Result<Self, ModalError> {
        let blueprint = registry.get(&config.template_id).cloned();
        if blueprint.is_none() {
            match config.missing_template {
                MissingTemplate::Fail => {
                    return Err(ModalError::TemplateNotFound {
                        id: config.template_id.clone(),
                    });
                }
                MissingTemplate::LogOnly => {
                    error!(
                        template = %config.template_id,
                        "template does not exist; modal will be inert"
                    );
                }
            }
        }
        Ok(Self {
            token: ModalToken::next(),
            config,
            blueprint,
            animation_config: ModalAnimationConfig::default(),
            animation: ModalAnimationState::idle(),
            phase: ModalPhase::Unbuilt,
            root: None,
            footer: FooterState::default(),
            pending_show: false,
            pending_destroy: false,
            gutter: None,
            on_open: None,
            on_close: None,
            last_tick: None,
        })
    }

    /// Set the hook invoked when the entrance transition finishes.
    pub fn on_open(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_open = Some(Box::new(hook));
        self
    }

    /// Set the hook invoked when a close finalizes.
    pub fn on_close(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Override the open/close animation.
    pub fn animation(mut self, config: ModalAnimationConfig) -> Self {
        self.animation_config = config;
        self
    }

    /// This instance's stack identity.
    #[inline]
    pub fn token(&self) -> ModalToken {
        self.token
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    /// Whether the modal is on screen (including transitions).
    pub fn is_visible(&self) -> bool {
        matches!(
            self.phase,
            ModalPhase::Opening | ModalPhase::Open | ModalPhase::Closing
        )
    }

    /// Whether the modal accepts input.
    pub fn is_open(&self) -> bool {
        matches!(self.phase, ModalPhase::Opening | ModalPhase::Open)
    }

    /// Whether construction found no template (lenient policy).
    pub fn is_inert(&self) -> bool {
        self.blueprint.is_none()
    }

    /// The root element of the built tree, if any.
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Identity of the root element, if the tree is built.
    pub fn root_id(&self) -> Option<ElementId> {
        self.root.as_ref().map(Element::id)
    }

    /// Open with the default terminal chrome probe.
    pub fn open(&mut self, ctx: &mut OverlayContext) -> Option<ElementId> {
        self.open_with_chrome(ctx, &TerminalChrome)
    }

    /// Open the modal: build the tree if needed, join the stack, engage the
    /// scroll lock, and start the entrance on the next tick.
    ///
    /// Returns the root element id, or `None` when the modal is inert or
    /// destroyed. Opening an already-open modal is a no-op. The chrome
    /// probe runs once per instance; its result is memoized.
    pub fn open_with_chrome(
        &mut self,
        ctx: &mut OverlayContext,
        chrome: &dyn HostChrome,
    ) -> Option<ElementId> {
        if self.blueprint.is_none() {
            error!(
                template = %self.config.template_id,
                "open ignored: modal has no template"
            );
            return None;
        }
        if matches!(self.phase, ModalPhase::Opening | ModalPhase::Open) {
            return self.root_id();
        }

        if self.root.is_none() {
            self.build();
        }
        self.sync_footer();

        let gutter = *self.gutter.get_or_insert_with(|| chrome.scrollbar_gutter());
        ctx.push(self.token);
        ctx.lock_scroll(gutter);

        self.phase = ModalPhase::Opening;
        self.pending_show = true;
        self.pending_destroy = false;
        debug!(token = self.token.raw(), "modal opening");
        self.root_id()
    }

    /// Begin closing, destroying or keeping the tree per
    /// [`ModalConfig::destroy_on_close`].
    pub fn close(&mut self, ctx: &mut OverlayContext) {
        self.close_with(ctx, self.config.destroy_on_close);
    }

    /// Begin closing with an explicit destroy decision. The modal leaves
    /// the stack now; finalization waits for the exit transition.
    pub fn close_with(&mut self, ctx: &mut OverlayContext, destroy: bool) {
        if !self.is_open() {
            return;
        }
        self.pending_destroy = destroy;
        self.pending_show = false;
        if let Some(root) = &mut self.root {
            root.classes.remove(CLASS_SHOW);
        }
        ctx.remove(self.token);
        self.phase = ModalPhase::Closing;
        self.animation.begin_exit(&self.animation_config);
        debug!(token = self.token.raw(), destroy, "modal closing");
    }

    /// Tear the modal down regardless of the configured close policy. An
    /// open modal closes first and is torn down when its exit finishes; a
    /// closed one is torn down immediately. The next `open` rebuilds.
    pub fn destroy(&mut self, ctx: &mut OverlayContext) {
        match self.phase {
            ModalPhase::Opening | ModalPhase::Open => self.close_with(ctx, true),
            ModalPhase::Closing => self.pending_destroy = true,
            ModalPhase::Closed => {
                self.root = None;
                self.phase = ModalPhase::Unbuilt;
                debug!(token = self.token.raw(), "modal destroyed");
            }
            ModalPhase::Unbuilt => {}
        }
    }

    /// Replace the footer content text. Takes effect on the next sync pass;
    /// content always renders before buttons.
    pub fn set_footer_content(&mut self, content: impl Into<String>) {
        if !self.config.footer {
            warn!(token = self.token.raw(), "footer content set but footer is disabled");
        }
        self.footer.set_content(content);
        self.sync_footer();
    }

    /// Register a footer button. May be called before or after opening.
    pub fn add_footer_button(&mut self, button: FooterButton) {
        if !self.config.footer {
            warn!(token = self.token.raw(), "footer button added but footer is disabled");
        }
        self.footer.add_button(button);
        self.sync_footer();
    }

    /// Route an input event. `hit` is the frame's hit-test result at the
    /// mouse position, if the event was a mouse event.
    pub fn handle_event(
        &mut self,
        event: &Event,
        hit: Option<(HitId, HitRegion, u64)>,
        ctx: &mut OverlayContext,
    ) -> Option<ModalAction> {
        if !self.is_open() {
            return None;
        }
        match event {
            Event::Key(key) if key.code == KeyCode::Escape && key.kind == KeyEventKind::Press => {
                if !self.config.dismiss.contains(DismissMethods::ESCAPE) {
                    return None;
                }
                // only the topmost modal answers Escape
                if ctx.topmost() != Some(self.token) {
                    return None;
                }
                self.close(ctx);
                Some(ModalAction::EscapePressed)
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (id, region, data) = hit?;
                if id != self.hit_id() {
                    return None;
                }
                match region {
                    HitRegion::Close if self.config.dismiss.contains(DismissMethods::BUTTON) => {
                        self.close(ctx);
                        Some(ModalAction::CloseButton)
                    }
                    HitRegion::Backdrop if self.config.dismiss.contains(DismissMethods::OVERLAY) => {
                        self.close(ctx);
                        Some(ModalAction::BackdropClicked)
                    }
                    HitRegion::FooterButton => {
                        let index = data as usize;
                        let button = self.footer.buttons_mut().get_mut(index)?;
                        button.click();
                        Some(ModalAction::FooterButton(index))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Advance transitions by `dt`.
    ///
    /// The first tick after `open` applies the shown-state class and starts
    /// the entrance. Later ticks report [`ModalLifecycleEvent`]s as
    /// transitions finish; close finalization happens here.
    pub fn tick(&mut self, dt: Duration, ctx: &mut OverlayContext) -> Option<ModalLifecycleEvent> {
        if self.pending_show {
            self.pending_show = false;
            if let Some(root) = &mut self.root {
                root.classes.add(CLASS_SHOW);
            }
            self.animation.begin_enter();
            return None;
        }

        let event = self.animation.advance(dt, &self.animation_config)?;
        if event.property != TransitionProperty::Transform {
            return None;
        }
        match event.phase {
            ModalAnimationPhase::Entering => {
                self.phase = ModalPhase::Open;
                if let Some(hook) = self.on_open.as_mut() {
                    hook();
                }
                debug!(token = self.token.raw(), "modal open");
                Some(ModalLifecycleEvent::Opened)
            }
            ModalAnimationPhase::Exiting => Some(self.finalize_close(ctx)),
            ModalAnimationPhase::Idle => None,
        }
    }

    /// Like [`tick`](Self::tick), measuring `dt` from the previous call.
    pub fn tick_now(&mut self, ctx: &mut OverlayContext) -> Option<ModalLifecycleEvent> {
        let now = Instant::now();
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.duration_since(last));
        self.last_tick = Some(now);
        self.tick(dt, ctx)
    }

    /// Draw the modal into `frame` over `area`, registering hit regions.
    ///
    /// Draw order is backdrop, panel, close affordance, content, footer;
    /// later hit registrations win, so a click lands on the most specific
    /// region under the cursor.
    pub fn render(&mut self, area: Rect, frame: &mut Frame, sheet: &impl Stylesheet) {
        if !self.is_visible() || area.is_empty() {
            return;
        }
        self.sync_footer();
        let Some(root) = &self.root else { return };
        let hit_id = self.hit_id();
        let anim = &self.animation;
        let anim_config = &self.animation_config;

        let backdrop_style = sheet.resolve_all(root.classes.iter());
        let faded = Style {
            bg: backdrop_style
                .bg
                .map(|c| c.with_opacity(anim.backdrop_opacity(anim_config))),
            ..backdrop_style
        };
        set_style_area(&mut frame.buffer, area, faded);
        frame.register_hit(area, hit_id, HitRegion::Backdrop, 0);

        let Some(panel_el) = root.find_by_class(CLASS_PANEL) else {
            return;
        };

        let mut content_lines = Vec::new();
        if let Some(content_el) = panel_el.find_by_class(CLASS_CONTENT) {
            collect_text(content_el, &mut content_lines);
        }
        let footer_el = panel_el.find_by_class(CLASS_FOOTER);
        let (footer_lines, footer_buttons) = footer_el.map_or((Vec::new(), Vec::new()), split_footer);

        let content_width = text_width(&content_lines);
        let buttons_width = footer_buttons
            .iter()
            .map(|(_, label)| display_width(label).saturating_add(4))
            .fold(0u16, u16::saturating_add)
            .saturating_add(footer_buttons.len().saturating_sub(1) as u16);
        let footer_width = text_width(&footer_lines).max(buttons_width);
        let footer_height =
            footer_lines.len() as u16 + u16::from(!footer_buttons.is_empty());

        let wanted = Size::new(
            content_width.max(footer_width).max(8).saturating_add(4),
            (content_lines.len() as u16)
                .saturating_add(footer_height)
                .saturating_add(if footer_height > 0 { 3 } else { 2 }),
        );
        let size = self.config.size.clamp(wanted, area.size());

        let scale = anim.scale(anim_config);
        let scaled = Size::new(
            ((size.width as f32 * scale).round() as u16).max(1),
            ((size.height as f32 * scale).round() as u16).max(1),
        );
        let mut panel_area = self.config.position.resolve(area, scaled);
        let offset = anim.y_offset(anim_config);
        panel_area.y = (panel_area.y as i32 + offset as i32)
            .clamp(area.y as i32, (area.bottom().saturating_sub(panel_area.height)) as i32)
            as u16;

        let panel_style = {
            let resolved = sheet.resolve_all(panel_el.classes.iter());
            Style {
                bg: resolved.bg.map(|c| c.with_opacity(anim.opacity(anim_config))),
                ..resolved
            }
        };
        fill_area(frame, panel_area, panel_style);
        frame.register_hit(panel_area, hit_id, HitRegion::Panel, 0);

        if let Some(close_el) = panel_el.find_by_class(CLASS_CLOSE)
            && panel_area.width >= 3
        {
            let close_style = panel_style.patch(sheet.resolve_all(close_el.classes.iter()));
            let glyph = close_el.text.as_deref().unwrap_or("✕");
            let x = panel_area.right().saturating_sub(2);
            draw_text_span(frame, x, panel_area.y, glyph, close_style, panel_area.right());
            frame.register_hit(Rect::new(x, panel_area.y, 1, 1), hit_id, HitRegion::Close, 0);
        }

        let inner = Rect::new(
            panel_area.x.saturating_add(2),
            panel_area.y.saturating_add(1),
            panel_area.width.saturating_sub(4),
            panel_area.height.saturating_sub(2),
        );
        if inner.is_empty() {
            return;
        }

        let mut y = inner.y;
        for line in &content_lines {
            if y >= inner.bottom() {
                break;
            }
            draw_text_span(frame, inner.x, y, line, panel_style, inner.right());
            y += 1;
        }

        if footer_height > 0 {
            let mut fy = inner
                .bottom()
                .saturating_sub(footer_height)
                .max(y.saturating_add(1));
            for line in &footer_lines {
                if fy >= inner.bottom() {
                    break;
                }
                draw_text_span(frame, inner.x, fy, line, panel_style, inner.right());
                fy += 1;
            }
            if !footer_buttons.is_empty() && fy < inner.bottom() {
                let mut x = inner.x;
                for (index, label) in &footer_buttons {
                    let caption = format!("[ {label} ]");
                    let end = draw_text_span(frame, x, fy, &caption, panel_style, inner.right());
                    if end > x {
                        frame.register_hit(
                            Rect::new(x, fy, end - x, 1),
                            hit_id,
                            HitRegion::FooterButton,
                            *index as u64,
                        );
                    }
                    x = end.saturating_add(1);
                    if x >= inner.right() {
                        break;
                    }
                }
            }
        }
    }

    fn hit_id(&self) -> HitId {
        HitId::new(self.token.raw())
    }

    /// Build the element tree: backdrop > panel > [close], content, [footer].
    fn build(&mut self) {
        let Some(blueprint) = &self.blueprint else {
            return;
        };
        let mut panel = Element::new(CLASS_PANEL);
        for class in &self.config.css_classes {
            panel.classes.add(class.clone());
        }
        if self.config.dismiss.contains(DismissMethods::BUTTON) {
            panel.children.push(Element::new(CLASS_CLOSE).text("✕"));
        }
        panel
            .children
            .push(Element::new(CLASS_CONTENT).child(blueprint.instantiate()));
        if self.config.footer {
            panel.children.push(Element::new(CLASS_FOOTER));
        }
        self.root = Some(Element::new(CLASS_BACKDROP).child(panel));
        self.phase = ModalPhase::Closed;
        debug!(token = self.token.raw(), "structure built");
    }

    fn sync_footer(&mut self) {
        if !self.config.footer {
            return;
        }
        if let Some(root) = &mut self.root
            && let Some(footer_el) = root.find_by_class_mut(CLASS_FOOTER)
        {
            self.footer.sync_into(footer_el);
        }
    }

    /// Teardown (or keep), then scroll unlock, then the `on_close` hook.
    fn finalize_close(&mut self, ctx: &mut OverlayContext) -> ModalLifecycleEvent {
        let event = if self.pending_destroy {
            self.root = None;
            self.phase = ModalPhase::Unbuilt;
            debug!(token = self.token.raw(), "modal destroyed");
            ModalLifecycleEvent::Destroyed
        } else {
            self.phase = ModalPhase::Closed;
            debug!(token = self.token.raw(), "modal closed");
            ModalLifecycleEvent::Closed
        };
        if ctx.is_empty() {
            ctx.unlock_scroll();
        }
        if let Some(hook) = self.on_close.as_mut() {
            hook();
        }
        event
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("token", &self.token)
            .field("phase", &self.phase)
            .field("template_id", &self.config.template_id)
            .field("built", &self.root.is_some())
            .field("inert", &self.blueprint.is_none())
            .finish_non_exhaustive()
    }
}

fn collect_text(el: &Element, out: &mut Vec<String>) {
    if let Some(text) = &el.text {
        out.extend(text.lines().map(str::to_owned));
    }
    for child in &el.children {
        collect_text(child, out);
    }
}

/// Footer children split into content lines and `(index, label)` buttons.
fn split_footer(footer: &Element) -> (Vec<String>, Vec<(usize, String)>) {
    let mut lines = Vec::new();
    let mut buttons = Vec::new();
    for child in &footer.children {
        if child.classes.contains(CLASS_FOOTER_BUTTON) {
            let label = child.text.clone().unwrap_or_default();
            buttons.push((buttons.len(), label));
        } else {
            collect_text(child, &mut lines);
        }
    }
    (lines, buttons)
}

fn display_width(text: &str) -> u16 {
    use unicode_width::UnicodeWidthStr;
    UnicodeWidthStr::width(text).min(u16::MAX as usize) as u16
}

fn text_width(lines: &[String]) -> u16 {
    lines.iter().map(|l| display_width(l)).max().unwrap_or(0)
}

fn fill_area(frame: &mut Frame, area: Rect, style: Style) {
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let mut cell = Cell::from_char(' ');
            crate::apply_style(&mut cell, style);
            frame.buffer.set(x, y, cell);
        }
    }
}
