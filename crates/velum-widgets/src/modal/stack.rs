#![forbid(unsafe_code)]

//! Shared overlay state: the modal stack and the scroll lock.
//!
//! One [`OverlayContext`] is created by the host and threaded through every
//! modal call that touches shared state. The context owns only identities
//! ([`ModalToken`]s), never the modals themselves, so callers keep full
//! ownership of their instances.
//!
//! # Invariants
//!
//! - The stack holds no duplicate tokens.
//! - Removal is by identity: removing a token that is not topmost leaves
//!   the rest of the stack intact.
//! - The scroll lock is engaged while at least one modal is on the stack
//!   and releases exactly when the stack empties.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::CLASS_NO_SCROLL;
use super::element::ClassList;

static MODAL_TOKEN_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a modal instance, used for stack membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalToken(u64);

impl ModalToken {
    pub(crate) fn next() -> Self {
        Self(MODAL_TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw token value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Host-side chrome measurements the scroll lock compensates for.
///
/// Locking scrolling removes the host's scroll gutter; padding by the
/// gutter's width keeps content from shifting. The probe runs once per
/// modal and is memoized, so implementations may be arbitrarily costly.
pub trait HostChrome {
    /// Width of the scroll gutter in cells, `0` when none is reserved.
    fn scrollbar_gutter(&self) -> u16;
}

/// Chrome of a plain terminal host with a one-cell reserved gutter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalChrome;

impl HostChrome for TerminalChrome {
    fn scrollbar_gutter(&self) -> u16 {
        1
    }
}

/// Shared state every modal instance cooperates through.
#[derive(Debug, Default)]
pub struct OverlayContext {
    stack: Vec<ModalToken>,
    body_classes: ClassList,
    pad_right: u16,
}

impl OverlayContext {
    /// Create an empty context: no open modals, scroll unlocked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a token onto the stack. Pushing a token that is already on the
    /// stack is a no-op; the stack never holds duplicates.
    pub fn push(&mut self, token: ModalToken) {
        if self.contains(token) {
            return;
        }
        self.stack.push(token);
        debug!(token = token.raw(), depth = self.stack.len(), "modal pushed");
    }

    /// Remove `token` wherever it sits in the stack. Returns whether it was
    /// present.
    pub fn remove(&mut self, token: ModalToken) -> bool {
        let before = self.stack.len();
        self.stack.retain(|t| *t != token);
        let removed = self.stack.len() != before;
        if removed {
            debug!(token = token.raw(), depth = self.stack.len(), "modal removed");
        }
        removed
    }

    /// The token that currently receives the Escape key.
    pub fn topmost(&self) -> Option<ModalToken> {
        self.stack.last().copied()
    }

    /// Whether `token` is on the stack.
    pub fn contains(&self, token: ModalToken) -> bool {
        self.stack.contains(&token)
    }

    /// Number of open modals.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether no modal is open.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Classes currently applied to the host body.
    pub fn body_classes(&self) -> &ClassList {
        &self.body_classes
    }

    /// Cells of right padding compensating for the hidden scroll gutter.
    pub fn pad_right(&self) -> u16 {
        self.pad_right
    }

    /// Whether the scroll lock is engaged.
    pub fn scroll_locked(&self) -> bool {
        self.body_classes.contains(CLASS_NO_SCROLL)
    }

    /// Engage the scroll lock, compensating with `gutter` cells of right
    /// padding. Idempotent; the first caller's gutter wins.
    pub fn lock_scroll(&mut self, gutter: u16) {
        if self.scroll_locked() {
            return;
        }
        self.body_classes.add(CLASS_NO_SCROLL);
        self.pad_right = gutter;
        debug!(gutter, "scroll locked");
    }

    /// Release the scroll lock and drop the compensation padding.
    pub fn unlock_scroll(&mut self) {
        if !self.scroll_locked() {
            return;
        }
        self.body_classes.remove(CLASS_NO_SCROLL);
        self.pad_right = 0;
        debug!("scroll unlocked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(ModalToken::next(), ModalToken::next());
    }

    #[test]
    fn push_remove_topmost() {
        let mut ctx = OverlayContext::new();
        let a = ModalToken::next();
        let b = ModalToken::next();

        ctx.push(a);
        ctx.push(b);
        assert_eq!(ctx.depth(), 2);
        assert_eq!(ctx.topmost(), Some(b));

        assert!(ctx.remove(b));
        assert_eq!(ctx.topmost(), Some(a));
        assert!(ctx.remove(a));
        assert!(ctx.is_empty());
        assert!(!ctx.remove(a));
    }

    #[test]
    fn remove_by_identity_not_position() {
        let mut ctx = OverlayContext::new();
        let a = ModalToken::next();
        let b = ModalToken::next();
        let c = ModalToken::next();
        ctx.push(a);
        ctx.push(b);
        ctx.push(c);

        // closing the middle modal leaves the topmost alone
        assert!(ctx.remove(b));
        assert_eq!(ctx.topmost(), Some(c));
        assert_eq!(ctx.depth(), 2);
        assert!(ctx.contains(a));
        assert!(!ctx.contains(b));
    }

    #[test]
    fn double_push_is_a_noop() {
        let mut ctx = OverlayContext::new();
        let a = ModalToken::next();
        ctx.push(a);
        ctx.push(a);
        assert_eq!(ctx.depth(), 1);
        assert!(ctx.remove(a));
        assert!(ctx.is_empty());
    }

    #[test]
    fn scroll_lock_is_idempotent_and_first_gutter_wins() {
        let mut ctx = OverlayContext::new();
        assert!(!ctx.scroll_locked());

        ctx.lock_scroll(2);
        assert!(ctx.scroll_locked());
        assert_eq!(ctx.pad_right(), 2);
        assert!(ctx.body_classes().contains(CLASS_NO_SCROLL));

        ctx.lock_scroll(5);
        assert_eq!(ctx.pad_right(), 2);

        ctx.unlock_scroll();
        assert!(!ctx.scroll_locked());
        assert_eq!(ctx.pad_right(), 0);
        ctx.unlock_scroll(); // releasing twice is harmless
    }

    #[test]
    fn terminal_chrome_reserves_one_cell() {
        assert_eq!(TerminalChrome.scrollbar_gutter(), 1);
    }

    proptest! {
        /// Any interleaving of pushes and removes keeps the stack
        /// duplicate-free and the topmost equal to the most recently
        /// pushed surviving token.
        #[test]
        fn stack_stays_consistent(ops in proptest::collection::vec(0u8..4, 1..64)) {
            let mut ctx = OverlayContext::new();
            let mut model: Vec<ModalToken> = Vec::new();

            for op in ops {
                match op {
                    0 | 1 => {
                        let t = ModalToken::next();
                        ctx.push(t);
                        model.push(t);
                    }
                    2 => {
                        // remove the topmost, as a close would
                        if let Some(t) = model.last().copied() {
                            prop_assert!(ctx.remove(t));
                            model.pop();
                        }
                    }
                    _ => {
                        // remove from the middle, as an out-of-order close would
                        if !model.is_empty() {
                            let t = model.remove(model.len() / 2);
                            prop_assert!(ctx.remove(t));
                        }
                    }
                }
                prop_assert_eq!(ctx.depth(), model.len());
                prop_assert_eq!(ctx.topmost(), model.last().copied());
            }
        }
    }
}
