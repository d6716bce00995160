//! Per-frame gesture pipeline: noisy landmark samples in, pointer commands
//! out. One `update` call per camera frame; no I/O, no blocking, no internal
//! concurrency.

pub mod click;
pub mod gestures;
pub mod stability;
pub mod stabilizer;

use std::time::Instant;

use thiserror::Error;

use crate::config::Settings;
use crate::models::commands::{MouseButton, PointerCommand};
use crate::models::landmarks::HandFrame;

use self::click::{ClickMachine, ClickOutcome};
use self::gestures::{FlickDetector, PostureDetector};
use self::stability::StabilityDetector;
use self::stabilizer::PositionStabilizer;

/// Normalized thumb-to-index distance under which a pinch is active.
pub const PINCH_THRESHOLD: f64 = 0.05;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TickError {
    /// Landmark data missing, NaN, or outside the normalized frame. The tick
    /// is dropped with no command emitted and no state change.
    #[error("malformed landmark frame; tick skipped")]
    MalformedFrame,
}

/// Shared gate for discrete actions: taps, right-clicks, and scroll flicks
/// all refresh the same timestamp, so no two discrete actions ever fire
/// within one cooldown window system-wide.
#[derive(Debug, Default)]
pub struct CooldownClock {
    last_action_at: Option<Instant>,
}

impl CooldownClock {
    pub fn ready(&self, now: Instant, cooldown: std::time::Duration) -> bool {
        self.last_action_at
            .map_or(true, |last| now.duration_since(last) >= cooldown)
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_action_at = Some(now);
    }
}

/// The whole per-session pipeline state. Constructed when gesture control
/// starts, torn down (with a forced release) when it stops.
pub struct GesturePipeline {
    stability: StabilityDetector,
    stabilizer: PositionStabilizer,
    click: ClickMachine,
    posture: PostureDetector,
    flick: FlickDetector,
    cooldown: CooldownClock,
}

impl GesturePipeline {
    pub fn new(screen_width: f64, screen_height: f64) -> Self {
        Self {
            stability: StabilityDetector::new(),
            stabilizer: PositionStabilizer::new(screen_width, screen_height),
            click: ClickMachine::new(),
            posture: PostureDetector::new(),
            flick: FlickDetector::new(),
            cooldown: CooldownClock::default(),
        }
    }

    /// Processes one frame tick and returns the pointer commands to inject,
    /// in order. Discrete actions come before the move so a click lands at
    /// the locked position.
    pub fn update(
        &mut self,
        frame: &HandFrame,
        now: Instant,
        settings: &Settings,
    ) -> Result<Vec<PointerCommand>, TickError> {
        if !frame.is_valid() {
            return Err(TickError::MalformedFrame);
        }

        let mut commands = Vec::new();
        let cooldown_window = settings.gesture_cooldown();

        // Stability tracking runs on the raw point every tick, even when
        // movement below is rate-limited or lock-suppressed.
        let stable = self.stability.update(
            frame.pointer,
            settings.click_stability_zone,
            settings.min_stable_frames,
        );

        let pinch_active = frame.pinch_distance < PINCH_THRESHOLD;
        match self.click.update(
            pinch_active,
            stable,
            now,
            settings.hold_threshold(),
            &mut self.cooldown,
            cooldown_window,
        ) {
            ClickOutcome::None => {}
            ClickOutcome::PinchStarted => {
                // Lock on the settled anchor, not this frame's raw point, so
                // jitter on the pinch tick does not shift the lock center.
                let settled = self.stability.anchor().unwrap_or(frame.pointer);
                self.stabilizer.engage_click_lock(settled, now);
            }
            ClickOutcome::Tap => {
                commands.push(PointerCommand::Click(MouseButton::Left));
                self.stabilizer.release_click_lock();
            }
            ClickOutcome::TapSuppressed => {
                log::debug!("tap suppressed by gesture cooldown");
                self.stabilizer.release_click_lock();
            }
            ClickOutcome::Press => {
                commands.push(PointerCommand::Press(MouseButton::Left));
            }
            ClickOutcome::Release => {
                commands.push(PointerCommand::Release(MouseButton::Left));
                self.stabilizer.release_click_lock();
            }
            ClickOutcome::PinchIgnored => {
                log::debug!("pinch ignored: pointer was not stable");
                self.stabilizer.release_click_lock();
            }
        }

        if self
            .posture
            .update(frame.posture_active, now, &mut self.cooldown, cooldown_window)
        {
            commands.push(PointerCommand::Click(MouseButton::Right));
        }

        if settings.quick_scroll_enabled {
            if let Some((direction, amount)) = self.flick.update(
                frame.scroll_y,
                now,
                &mut self.cooldown,
                cooldown_window,
                settings,
            ) {
                commands.push(PointerCommand::Scroll { direction, amount });
            }
        } else {
            self.flick.observe(frame.scroll_y);
        }

        if let Some(point) = self.stabilizer.update(frame.pointer, now, settings) {
            commands.push(PointerCommand::Move(point));
        }

        Ok(commands)
    }

    /// Unconditional session teardown: clears every piece of per-session
    /// state and returns the release command for an outstanding hold, if any.
    /// The caller must inject it; a stuck virtual button is a correctness
    /// violation.
    pub fn force_release(&mut self) -> Option<PointerCommand> {
        let release = self
            .click
            .force_release()
            .then_some(PointerCommand::Release(MouseButton::Left));
        self.stability.reset();
        self.stabilizer.reset();
        self.posture.reset();
        self.flick.reset();
        self.cooldown = CooldownClock::default();
        release
    }
}
