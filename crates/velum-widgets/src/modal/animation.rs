#![forbid(unsafe_code)]

//! Tick-driven open/close transitions.
//!
//! A modal animates on two tracks: the *transform* track (panel scale and
//! slide) and the *opacity* track (backdrop fade). Each track reports a
//! [`TransitionEnd`] when it finishes; lifecycle finalization listens only
//! for the transform track, so a backdrop fade finishing early never tears
//! the modal down.
//!
//! # Invariants
//!
//! - Each track emits at most one [`TransitionEnd`] per run.
//! - A reversal (`close` during the entrance) starts the exit from the
//!   panel's current visual position, not from fully shown.
//! - Progress only moves when [`ModalAnimationState::advance`] is called;
//!   if the host stops ticking, the animation stalls where it is.

use std::time::Duration;

/// Which animation track completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionProperty {
    /// Panel scale / slide. Completion of this track finalizes the phase.
    Transform,
    /// Backdrop fade. Informational only.
    Opacity,
}

/// Emitted when an animation track finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEnd {
    /// The track that finished.
    pub property: TransitionProperty,
    /// The phase the track was running in.
    pub phase: ModalAnimationPhase,
}

/// Current animation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalAnimationPhase {
    /// No animation running.
    #[default]
    Idle,
    /// Playing the entrance.
    Entering,
    /// Playing the exit.
    Exiting,
}

/// Entrance animation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalEntrance {
    /// Grow from slightly shrunken while fading in.
    #[default]
    ScaleIn,
    /// Fade in at full size.
    FadeIn,
    /// Slide down from above the resting position.
    SlideDown,
    /// Slide up from below the resting position.
    SlideUp,
    /// Appear instantly (the transform track still runs to completion).
    None,
}

/// Exit animation kinds, mirroring [`ModalEntrance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalExit {
    #[default]
    ScaleOut,
    FadeOut,
    SlideUp,
    SlideDown,
    None,
}

/// Easing curves for the transform track. The opacity track is linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalEasing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
}

impl ModalEasing {
    /// Map linear progress `t` in `[0, 1]` through the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

/// Animation parameters for one modal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalAnimationConfig {
    /// Entrance kind.
    pub entrance: ModalEntrance,
    /// Exit kind.
    pub exit: ModalExit,
    /// Transform-track duration.
    pub duration: Duration,
    /// Opacity-track (backdrop fade) duration.
    pub backdrop_duration: Duration,
    /// Easing for the transform track.
    pub easing: ModalEasing,
    /// Rows a slide entrance/exit travels.
    pub slide_distance: u16,
}

impl Default for ModalAnimationConfig {
    fn default() -> Self {
        Self {
            entrance: ModalEntrance::ScaleIn,
            exit: ModalExit::ScaleOut,
            duration: Duration::from_millis(200),
            backdrop_duration: Duration::from_millis(150),
            easing: ModalEasing::EaseOut,
            slide_distance: 2,
        }
    }
}

impl ModalAnimationConfig {
    /// Zero-duration config: both tracks complete on the first tick.
    pub fn none() -> Self {
        Self {
            entrance: ModalEntrance::None,
            exit: ModalExit::None,
            duration: Duration::ZERO,
            backdrop_duration: Duration::ZERO,
            easing: ModalEasing::Linear,
            slide_distance: 0,
        }
    }

    /// Set the entrance kind.
    pub fn entrance(mut self, entrance: ModalEntrance) -> Self {
        self.entrance = entrance;
        self
    }

    /// Set the exit kind.
    pub fn exit(mut self, exit: ModalExit) -> Self {
        self.exit = exit;
        self
    }

    /// Set the transform-track duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the backdrop-fade duration.
    pub fn backdrop_duration(mut self, duration: Duration) -> Self {
        self.backdrop_duration = duration;
        self
    }

    /// Set the transform easing.
    pub fn easing(mut self, easing: ModalEasing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the slide travel distance in rows.
    pub fn slide_distance(mut self, rows: u16) -> Self {
        self.slide_distance = rows;
        self
    }
}

/// Progress of one track. Completion fires exactly once.
#[derive(Debug, Clone, Copy, Default)]
struct Track {
    elapsed: Duration,
    done: bool,
    reported: bool,
}

impl Track {
    fn restart_at(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
        self.done = false;
        self.reported = false;
    }

    fn progress(&self, duration: Duration) -> f32 {
        if duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Advance and report whether the track newly completed.
    fn advance(&mut self, dt: Duration, duration: Duration) -> bool {
        if self.done {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= duration {
            self.elapsed = duration;
            self.done = true;
            if !self.reported {
                self.reported = true;
                return true;
            }
        }
        false
    }
}

/// Mutable animation state for one modal instance.
#[derive(Debug, Clone, Default)]
pub struct ModalAnimationState {
    phase: ModalAnimationPhase,
    transform: Track,
    opacity: Track,
    pending: Option<TransitionEnd>,
}

impl ModalAnimationState {
    /// An idle state (no animation running).
    pub fn idle() -> Self {
        Self::default()
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> ModalAnimationPhase {
        self.phase
    }

    /// Whether either track is still running.
    pub fn is_animating(&self) -> bool {
        self.phase != ModalAnimationPhase::Idle
    }

    /// Start the entrance from the beginning.
    pub fn begin_enter(&mut self) {
        self.phase = ModalAnimationPhase::Entering;
        self.transform.restart_at(Duration::ZERO);
        self.opacity.restart_at(Duration::ZERO);
        self.pending = None;
    }

    /// Start the exit. If the entrance is still running, the exit picks up
    /// from the panel's current position instead of snapping to fully shown.
    pub fn begin_exit(&mut self, config: &ModalAnimationConfig) {
        let carry = |track: &Track, duration: Duration| {
            if self.phase == ModalAnimationPhase::Entering && !track.done {
                duration.saturating_sub(track.elapsed.min(duration))
            } else {
                Duration::ZERO
            }
        };
        let transform_start = carry(&self.transform, config.duration);
        let opacity_start = carry(&self.opacity, config.backdrop_duration);
        self.phase = ModalAnimationPhase::Exiting;
        self.transform.restart_at(transform_start);
        self.opacity.restart_at(opacity_start);
        self.pending = None;
    }

    /// Advance both tracks by `dt`, returning at most one newly completed
    /// track per call. When both tracks complete in the same tick, the
    /// opacity event is returned now and the transform event on the next
    /// call, so the finalizing event is never lost.
    pub fn advance(
        &mut self,
        dt: Duration,
        config: &ModalAnimationConfig,
    ) -> Option<TransitionEnd> {
        if let Some(event) = self.pending.take() {
            if event.property == TransitionProperty::Transform {
                self.phase = ModalAnimationPhase::Idle;
            }
            return Some(event);
        }
        if self.phase == ModalAnimationPhase::Idle {
            return None;
        }
        let phase = self.phase;

        let opacity_done = self.opacity.advance(dt, config.backdrop_duration);
        let transform_done = self.transform.advance(dt, config.duration);

        let transform_event = transform_done.then_some(TransitionEnd {
            property: TransitionProperty::Transform,
            phase,
        });
        if opacity_done {
            self.pending = transform_event;
            return Some(TransitionEnd {
                property: TransitionProperty::Opacity,
                phase,
            });
        }
        if transform_event.is_some() {
            self.phase = ModalAnimationPhase::Idle;
        }
        transform_event
    }

    fn eased(&self, config: &ModalAnimationConfig) -> f32 {
        config.easing.apply(self.transform.progress(config.duration))
    }

    /// Panel scale in `[0.9, 1.0]`; `1.0` when resting.
    pub fn scale(&self, config: &ModalAnimationConfig) -> f32 {
        let t = self.eased(config);
        match self.phase {
            ModalAnimationPhase::Idle => 1.0,
            ModalAnimationPhase::Entering => match config.entrance {
                ModalEntrance::ScaleIn => 0.9 + 0.1 * t,
                _ => 1.0,
            },
            ModalAnimationPhase::Exiting => match config.exit {
                ModalExit::ScaleOut => 1.0 - 0.1 * t,
                _ => 1.0,
            },
        }
    }

    /// Panel opacity in `[0, 1]`.
    pub fn opacity(&self, config: &ModalAnimationConfig) -> f32 {
        let t = self.eased(config);
        match self.phase {
            ModalAnimationPhase::Idle => 1.0,
            ModalAnimationPhase::Entering => match config.entrance {
                ModalEntrance::None => 1.0,
                _ => t,
            },
            ModalAnimationPhase::Exiting => match config.exit {
                ModalExit::None => 1.0,
                _ => 1.0 - t,
            },
        }
    }

    /// Backdrop opacity in `[0, 1]`, linear over the opacity track.
    pub fn backdrop_opacity(&self, config: &ModalAnimationConfig) -> f32 {
        let t = self.opacity.progress(config.backdrop_duration);
        match self.phase {
            ModalAnimationPhase::Idle => 1.0,
            ModalAnimationPhase::Entering => t,
            ModalAnimationPhase::Exiting => 1.0 - t,
        }
    }

    /// Vertical offset in rows from the resting position (negative is up).
    pub fn y_offset(&self, config: &ModalAnimationConfig) -> i16 {
        let distance = config.slide_distance as f32;
        let t = self.eased(config);
        let offset = match self.phase {
            ModalAnimationPhase::Idle => 0.0,
            ModalAnimationPhase::Entering => match config.entrance {
                ModalEntrance::SlideDown => -distance * (1.0 - t),
                ModalEntrance::SlideUp => distance * (1.0 - t),
                _ => 0.0,
            },
            ModalAnimationPhase::Exiting => match config.exit {
                ModalExit::SlideUp => -distance * t,
                ModalExit::SlideDown => distance * t,
                _ => 0.0,
            },
        };
        offset.round() as i16
    }
}
