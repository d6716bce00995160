//! Discrete gesture detectors: posture-based right-click and vertical
//! flick scroll. Both are debounced by consecutive-frame counters and gated
//! by the pipeline's shared cooldown clock.

use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::models::commands::ScrollDirection;
use crate::pipeline::CooldownClock;

/// Qualifying frames required before the posture fires a right-click.
const POSTURE_CONSECUTIVE_FRAMES: u32 = 3;
/// Qualifying frames required before a flick fires a scroll.
const FLICK_CONSECUTIVE_FRAMES: u32 = 2;
/// Per-frame vertical displacement that counts as flick motion.
const FLICK_VELOCITY_THRESHOLD: f64 = 0.05;

/// Right-click posture detector. The posture predicate itself is computed by
/// the tracker backend; this only debounces it.
#[derive(Debug, Default)]
pub struct PostureDetector {
    streak: u32,
}

impl PostureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a right-click should fire this tick. Any
    /// non-qualifying frame clears the run; a blocked cooldown keeps the
    /// streak so the gesture fires as soon as the window opens.
    pub fn update(
        &mut self,
        posture_active: bool,
        now: Instant,
        cooldown: &mut CooldownClock,
        cooldown_window: Duration,
    ) -> bool {
        if !posture_active {
            self.streak = 0;
            return false;
        }
        self.streak = self.streak.saturating_add(1);
        if self.streak >= POSTURE_CONSECUTIVE_FRAMES && cooldown.ready(now, cooldown_window) {
            cooldown.touch(now);
            self.streak = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.streak = 0;
    }
}

/// Scroll-flick detector over one landmark's vertical coordinate. The hand
/// moving up (y shrinking) scrolls up.
#[derive(Debug, Default)]
pub struct FlickDetector {
    previous_y: Option<f64>,
    direction: Option<ScrollDirection>,
    streak: u32,
}

impl FlickDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scroll to emit this tick, if any. The previous-y sample is
    /// updated every tick regardless of firing.
    pub fn update(
        &mut self,
        y: f64,
        now: Instant,
        cooldown: &mut CooldownClock,
        cooldown_window: Duration,
        settings: &Settings,
    ) -> Option<(ScrollDirection, i32)> {
        let previous = match self.previous_y.replace(y) {
            Some(previous) => previous,
            None => return None,
        };

        let velocity = y - previous;
        if velocity.abs() <= FLICK_VELOCITY_THRESHOLD {
            self.streak = 0;
            return None;
        }

        let direction = if velocity < 0.0 {
            ScrollDirection::Up
        } else {
            ScrollDirection::Down
        };
        // A direction change starts a fresh run.
        if self.direction != Some(direction) {
            self.direction = Some(direction);
            self.streak = 0;
        }
        self.streak = self.streak.saturating_add(1);

        if self.streak >= FLICK_CONSECUTIVE_FRAMES && cooldown.ready(now, cooldown_window) {
            cooldown.touch(now);
            self.streak = 0;
            let sensitivity = match direction {
                ScrollDirection::Up => settings.scroll_up_sensitivity,
                ScrollDirection::Down => settings.scroll_down_sensitivity,
            };
            let amount = (settings.scroll_amount as f64 * sensitivity).round() as i32;
            return Some((direction, amount.max(1)));
        }
        None
    }

    /// Tracks the vertical sample without detecting, for ticks where quick
    /// scroll is disabled.
    pub fn observe(&mut self, y: f64) {
        self.previous_y = Some(y);
        self.streak = 0;
    }

    pub fn reset(&mut self) {
        self.previous_y = None;
        self.direction = None;
        self.streak = 0;
    }
}
