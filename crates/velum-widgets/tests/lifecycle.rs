//! End-to-end lifecycle tests driving modals the way a host event loop
//! would: open, tick, render with hit testing, route events, close.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use velum_core::{
    ClassMap, Event, Frame, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind, Rect,
    Rgba, Style,
};
use velum_widgets::modal::{
    Blueprint, CLASS_BACKDROP, CLASS_PANEL, FooterButton, Modal, ModalAction,
    ModalAnimationConfig, ModalConfig, ModalLifecycleEvent, ModalPhase, OverlayContext,
    TemplateRegistry,
};

const AREA: Rect = Rect::new(0, 0, 60, 24);

fn registry() -> TemplateRegistry {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut registry = TemplateRegistry::new();
    registry.register("greeting", Blueprint::from_text("Hello there"));
    registry.register("confirm", Blueprint::from_text("Delete everything?"));
    registry
}

fn sheet() -> ClassMap {
    let mut sheet = ClassMap::new();
    sheet.set(CLASS_BACKDROP, Style::new().bg(Rgba::rgb(0, 0, 0)));
    sheet.set(CLASS_PANEL, Style::new().bg(Rgba::rgb(30, 30, 46)));
    sheet
}

fn modal(registry: &TemplateRegistry, config: ModalConfig) -> Modal {
    Modal::new(registry, config)
        .unwrap()
        .animation(ModalAnimationConfig::none())
}

/// Tick until the next lifecycle event.
fn settle(modal: &mut Modal, ctx: &mut OverlayContext) -> ModalLifecycleEvent {
    for _ in 0..100 {
        if let Some(event) = modal.tick(Duration::from_millis(50), ctx) {
            return event;
        }
    }
    panic!("modal never settled");
}

/// Render, hit-test the cell under the cursor, and route a left click.
fn click_at(
    modal: &mut Modal,
    ctx: &mut OverlayContext,
    x: u16,
    y: u16,
) -> Option<ModalAction> {
    let mut frame = Frame::with_hit_grid(AREA.width, AREA.height);
    modal.render(AREA, &mut frame, &sheet());
    let hit = frame.hit_test(x, y);
    let click = Event::Mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), x, y));
    modal.handle_event(&click, hit, ctx)
}

#[test]
fn open_close_cycle_balances_the_stack() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let mut modals: Vec<Modal> = (0..4)
        .map(|_| modal(&registry, ModalConfig::new("greeting")))
        .collect();

    for m in &mut modals {
        m.open(&mut ctx);
        settle(m, &mut ctx);
    }
    assert_eq!(ctx.depth(), 4);
    assert!(ctx.scroll_locked());

    for m in &mut modals {
        m.close(&mut ctx);
        settle(m, &mut ctx);
    }
    assert!(ctx.is_empty());
    assert!(!ctx.scroll_locked());
    assert_eq!(ctx.pad_right(), 0);
}

#[test]
fn escape_unwinds_the_stack_top_down() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let mut a = modal(&registry, ModalConfig::new("greeting"));
    let mut b = modal(&registry, ModalConfig::new("confirm"));
    let mut c = modal(&registry, ModalConfig::new("greeting"));
    a.open(&mut ctx);
    b.open(&mut ctx);
    c.open(&mut ctx);

    let escape = Event::Key(KeyEvent::press(KeyCode::Escape));

    // the host broadcasts Escape to every open modal; only the topmost reacts
    assert_eq!(a.handle_event(&escape, None, &mut ctx), None);
    assert_eq!(b.handle_event(&escape, None, &mut ctx), None);
    assert_eq!(
        c.handle_event(&escape, None, &mut ctx),
        Some(ModalAction::EscapePressed)
    );
    assert_eq!(ctx.topmost(), Some(b.token()));

    assert_eq!(a.handle_event(&escape, None, &mut ctx), None);
    assert_eq!(
        b.handle_event(&escape, None, &mut ctx),
        Some(ModalAction::EscapePressed)
    );
    assert_eq!(
        a.handle_event(&escape, None, &mut ctx),
        Some(ModalAction::EscapePressed)
    );
    assert!(ctx.is_empty());
}

#[test]
fn destroying_close_rebuilds_reusing_close_does_not() {
    let registry = registry();
    let mut ctx = OverlayContext::new();

    let mut kept = modal(
        &registry,
        ModalConfig::new("greeting").destroy_on_close(false),
    );
    let first = kept.open(&mut ctx).unwrap();
    settle(&mut kept, &mut ctx);
    kept.close(&mut ctx);
    assert_eq!(settle(&mut kept, &mut ctx), ModalLifecycleEvent::Closed);
    assert_eq!(kept.open(&mut ctx), Some(first));
    kept.close(&mut ctx);
    settle(&mut kept, &mut ctx);

    let mut destroyed = modal(&registry, ModalConfig::new("greeting"));
    let before = destroyed.open(&mut ctx).unwrap();
    settle(&mut destroyed, &mut ctx);
    destroyed.close(&mut ctx);
    assert_eq!(
        settle(&mut destroyed, &mut ctx),
        ModalLifecycleEvent::Destroyed
    );
    assert_eq!(destroyed.phase(), ModalPhase::Unbuilt);
    // reopening rebuilds with fresh node identities
    let after = destroyed.open(&mut ctx).unwrap();
    assert_ne!(before, after);
}

#[test]
fn footer_registered_before_open_is_clickable_after() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    let mut m = modal(&registry, ModalConfig::new("confirm").footer(true));
    m.set_footer_content("This cannot be undone.");
    let ok_log = Rc::clone(&log);
    m.add_footer_button(FooterButton::new("OK").on_click(move || ok_log.borrow_mut().push("ok")));
    let cancel_log = Rc::clone(&log);
    m.add_footer_button(
        FooterButton::new("Cancel").on_click(move || cancel_log.borrow_mut().push("cancel")),
    );

    m.open(&mut ctx);
    settle(&mut m, &mut ctx);

    // find each button by scanning the hit grid
    let mut frame = Frame::with_hit_grid(AREA.width, AREA.height);
    m.render(AREA, &mut frame, &sheet());
    let mut targets = Vec::new();
    for y in 0..AREA.height {
        for x in 0..AREA.width {
            if let Some((_, velum_core::HitRegion::FooterButton, data)) = frame.hit_test(x, y) {
                if !targets.iter().any(|(_, _, d)| *d == data) {
                    targets.push((x, y, data));
                }
            }
        }
    }
    assert_eq!(targets.len(), 2);

    for (x, y, data) in targets {
        assert_eq!(
            click_at(&mut m, &mut ctx, x, y),
            Some(ModalAction::FooterButton(data as usize))
        );
    }
    assert_eq!(*log.borrow(), vec!["ok", "cancel"]);
    assert!(m.is_open());
}

#[test]
fn footer_content_precedes_buttons_regardless_of_order() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let mut m = modal(&registry, ModalConfig::new("confirm").footer(true));

    // buttons first, content second
    m.add_footer_button(FooterButton::new("Yes"));
    m.add_footer_button(FooterButton::new("No"));
    m.set_footer_content("Really?");
    m.open(&mut ctx);

    let footer = m
        .root()
        .unwrap()
        .find_by_class(velum_widgets::modal::CLASS_FOOTER)
        .unwrap();
    assert_eq!(footer.children[0].text.as_deref(), Some("Really?"));
    assert_eq!(footer.children[1].text.as_deref(), Some("Yes"));
    assert_eq!(footer.children[2].text.as_deref(), Some("No"));
}

#[test]
fn scroll_lock_survives_until_the_last_modal_leaves() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let mut a = modal(&registry, ModalConfig::new("greeting"));
    let mut b = modal(&registry, ModalConfig::new("confirm"));

    a.open(&mut ctx);
    assert!(ctx.scroll_locked());
    b.open(&mut ctx);

    // close the *first* opened modal, out of stack order
    a.close(&mut ctx);
    settle(&mut a, &mut ctx);
    assert!(ctx.scroll_locked());
    assert_eq!(ctx.topmost(), Some(b.token()));

    b.close(&mut ctx);
    settle(&mut b, &mut ctx);
    assert!(!ctx.scroll_locked());
}

#[test]
fn backdrop_click_closes_panel_click_never_does() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let mut m = modal(&registry, ModalConfig::new("greeting"));
    m.open(&mut ctx);
    settle(&mut m, &mut ctx);

    // panel is centered; its middle cell must not dismiss
    let (cx, cy) = (AREA.width / 2, AREA.height / 2);
    assert_eq!(click_at(&mut m, &mut ctx, cx, cy), None);
    assert!(m.is_open());

    // the far corner is backdrop
    assert_eq!(
        click_at(&mut m, &mut ctx, 0, AREA.height - 1),
        Some(ModalAction::BackdropClicked)
    );
    assert_eq!(m.phase(), ModalPhase::Closing);
}

#[test]
fn inert_modal_never_touches_shared_state() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let mut inert = modal(&registry, ModalConfig::new("does-not-exist"));
    assert!(inert.is_inert());

    assert!(inert.open(&mut ctx).is_none());
    assert!(ctx.is_empty());
    assert!(!ctx.scroll_locked());

    let mut frame = Frame::with_hit_grid(AREA.width, AREA.height);
    inert.render(AREA, &mut frame, &sheet());
    assert!(frame.hit_test(10, 10).is_none());
}

#[test]
fn reopen_during_exit_rejoins_the_stack() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let mut m = modal(&registry, ModalConfig::new("greeting").destroy_on_close(false));
    m.open(&mut ctx);
    settle(&mut m, &mut ctx);

    m.close(&mut ctx);
    assert_eq!(m.phase(), ModalPhase::Closing);
    assert!(ctx.is_empty());

    m.open(&mut ctx);
    assert_eq!(m.phase(), ModalPhase::Opening);
    assert_eq!(ctx.depth(), 1);
    assert_eq!(settle(&mut m, &mut ctx), ModalLifecycleEvent::Opened);
    assert!(ctx.scroll_locked());
}

#[test]
fn close_hooks_fire_once_per_cycle() {
    let registry = registry();
    let mut ctx = OverlayContext::new();
    let count = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&count);
    let mut m = modal(
        &registry,
        ModalConfig::new("greeting").destroy_on_close(false),
    )
    .on_close(move || *seen.borrow_mut() += 1);

    for _ in 0..3 {
        m.open(&mut ctx);
        settle(&mut m, &mut ctx);
        m.close(&mut ctx);
        m.close(&mut ctx); // double close is a no-op
        settle(&mut m, &mut ctx);
    }
    assert_eq!(*count.borrow(), 3);
}
