//! Click/hold state machine driven by the per-tick pinch signal.
//!
//! A short pinch is a tap, a pinch held past the hold threshold becomes a
//! press that stays outstanding until the pinch ends. At most one press is
//! ever outstanding; releases are never dropped.

use std::time::{Duration, Instant};

use crate::pipeline::CooldownClock;

/// Pinch lifecycle. `Holding` always has an outstanding press.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Pinching {
        started_at: Instant,
        /// Whether the pointer was stable when the pinch engaged. Unarmed
        /// pinches are tracked for timing but never emit click or press.
        armed: bool,
    },
    Holding,
}

/// What the pipeline must do after one click-machine tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    None,
    /// Pinch engaged: lock the cursor at the current raw point.
    PinchStarted,
    /// Emit a left tap-click; the position lock is done.
    Tap,
    /// Tap blocked by the shared cooldown; nothing is emitted and the
    /// cooldown clock is left untouched.
    TapSuppressed,
    /// Hold threshold crossed: emit a left press.
    Press,
    /// Hold ended: emit the matching release unconditionally.
    Release,
    /// An unarmed pinch resolved with no action.
    PinchIgnored,
}

#[derive(Debug)]
pub struct ClickMachine {
    phase: Phase,
}

impl ClickMachine {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn update(
        &mut self,
        pinch_active: bool,
        stable: bool,
        now: Instant,
        hold_threshold: Duration,
        cooldown: &mut CooldownClock,
        cooldown_window: Duration,
    ) -> ClickOutcome {
        match self.phase {
            Phase::Idle => {
                if pinch_active {
                    self.phase = Phase::Pinching {
                        started_at: now,
                        armed: stable,
                    };
                    return ClickOutcome::PinchStarted;
                }
                ClickOutcome::None
            }
            Phase::Pinching { started_at, armed } => {
                if pinch_active {
                    if now.duration_since(started_at) >= hold_threshold && armed {
                        self.phase = Phase::Holding;
                        return ClickOutcome::Press;
                    }
                    // Unarmed pinches sit here until the pinch ends.
                    return ClickOutcome::None;
                }

                self.phase = Phase::Idle;
                if !armed {
                    return ClickOutcome::PinchIgnored;
                }
                if now.duration_since(started_at) >= hold_threshold {
                    // Hold threshold crossed and released on the same tick;
                    // no press was issued, so nothing to release.
                    return ClickOutcome::PinchIgnored;
                }
                if cooldown.ready(now, cooldown_window) {
                    cooldown.touch(now);
                    ClickOutcome::Tap
                } else {
                    ClickOutcome::TapSuppressed
                }
            }
            Phase::Holding => {
                if pinch_active {
                    return ClickOutcome::None;
                }
                self.phase = Phase::Idle;
                ClickOutcome::Release
            }
        }
    }

    pub fn is_holding(&self) -> bool {
        self.phase == Phase::Holding
    }

    /// Teardown path: returns true when a press is outstanding and must be
    /// released. Always leaves the machine idle.
    pub fn force_release(&mut self) -> bool {
        let holding = self.phase == Phase::Holding;
        self.phase = Phase::Idle;
        holding
    }
}

impl Default for ClickMachine {
    fn default() -> Self {
        Self::new()
    }
}
