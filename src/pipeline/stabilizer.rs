//! Position stabilizer: one raw normalized point per frame in, a
//! rate-limited, smoothed absolute screen coordinate out.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::models::landmarks::{NormalizedPoint, ScreenPoint};

/// Raw-sample history depth for the weighted average.
const HISTORY_CAPACITY: usize = 5;
/// Weighted smoothing starts once this many samples are present.
const SMOOTHING_WARMUP: usize = 3;
/// Remaining distance under which interpolation snaps straight to the target.
const SNAP_EPSILON_PX: f64 = 2.0;
/// Interpolation slowdown applied while a click gesture is in progress.
const IN_CLICK_SMOOTHING_SCALE: f64 = 0.3;
/// A click lock older than this no longer suppresses movement.
pub const CLICK_LOCK_DURATION: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct ClickLock {
    raw_anchor: NormalizedPoint,
    engaged_at: Instant,
}

#[derive(Debug)]
pub struct PositionStabilizer {
    screen_width: f64,
    screen_height: f64,
    last_move_at: Option<Instant>,
    /// Recent projected samples, oldest first.
    history: VecDeque<ScreenPoint>,
    current: Option<ScreenPoint>,
    lock: Option<ClickLock>,
    click_active: bool,
}

impl PositionStabilizer {
    pub fn new(screen_width: f64, screen_height: f64) -> Self {
        Self {
            screen_width: screen_width.max(1.0),
            screen_height: screen_height.max(1.0),
            last_move_at: None,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            current: None,
            lock: None,
            click_active: false,
        }
    }

    /// Processes one raw frame. Returns the next cursor position, or `None`
    /// when the per-frame rate limit has not elapsed or a click lock is
    /// suppressing movement.
    pub fn update(
        &mut self,
        raw: NormalizedPoint,
        now: Instant,
        settings: &Settings,
    ) -> Option<ScreenPoint> {
        if let Some(last) = self.last_move_at {
            if now.duration_since(last) < settings.min_move_interval() {
                return None;
            }
        }
        self.last_move_at = Some(now);

        if let Some(lock) = self.lock {
            if now.duration_since(lock.engaged_at) < CLICK_LOCK_DURATION {
                let dx = (raw.x - lock.raw_anchor.x).abs();
                let dy = (raw.y - lock.raw_anchor.y).abs();
                if dx < settings.click_stability_zone && dy < settings.click_stability_zone {
                    return None;
                }
                // The hand moved away deliberately: drop the lock, keep going.
                self.lock = None;
            } else {
                self.lock = None;
            }
        }

        let dead_zone = settings.dead_zone;
        let clamped = NormalizedPoint::new(
            raw.x.clamp(dead_zone, 1.0 - dead_zone),
            raw.y.clamp(dead_zone, 1.0 - dead_zone),
        );

        let projected = self.project(clamped, settings.sensitivity);

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(projected);

        let target = if self.history.len() >= SMOOTHING_WARMUP {
            self.weighted_target()
        } else {
            projected
        };

        let factor = if self.click_active {
            settings.smoothing_factor * IN_CLICK_SMOOTHING_SCALE
        } else {
            settings.smoothing_factor
        };

        let next = match self.current {
            None => target,
            Some(current) => {
                let dx = target.x - current.x;
                let dy = target.y - current.y;
                if dx.hypot(dy) < SNAP_EPSILON_PX {
                    target
                } else {
                    ScreenPoint {
                        x: current.x + dx * factor,
                        y: current.y + dy * factor,
                    }
                }
            }
        };

        let next = ScreenPoint::clamped(next.x, next.y, self.screen_width, self.screen_height);
        self.current = Some(next);
        Some(next)
    }

    /// Locks movement around `raw` for the duration of a click gesture.
    pub fn engage_click_lock(&mut self, raw: NormalizedPoint, now: Instant) {
        self.lock = Some(ClickLock {
            raw_anchor: raw,
            engaged_at: now,
        });
        self.click_active = true;
    }

    pub fn release_click_lock(&mut self) {
        self.lock = None;
        self.click_active = false;
    }

    /// Clears all per-session state, including the rate gate and history.
    pub fn reset(&mut self) {
        self.last_move_at = None;
        self.history.clear();
        self.current = None;
        self.lock = None;
        self.click_active = false;
    }

    /// Mirror x, scale to screen pixels, then scale from center by
    /// sensitivity. Mirroring makes camera-space motion read naturally.
    fn project(&self, point: NormalizedPoint, sensitivity: f64) -> ScreenPoint {
        let screen_x = self.screen_width * (1.0 - point.x);
        let screen_y = self.screen_height * point.y;
        let center_x = self.screen_width / 2.0;
        let center_y = self.screen_height / 2.0;
        ScreenPoint::clamped(
            center_x + (screen_x - center_x) * sensitivity,
            center_y + (screen_y - center_y) * sensitivity,
            self.screen_width,
            self.screen_height,
        )
    }

    /// Weighted average over the history with weight `(index + 1)^1.5`, so
    /// the newest sample dominates without being the sole contributor.
    fn weighted_target(&self) -> ScreenPoint {
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut total = 0.0;
        for (idx, point) in self.history.iter().enumerate() {
            let weight = ((idx + 1) as f64).powf(1.5);
            sum_x += point.x * weight;
            sum_y += point.y * weight;
            total += weight;
        }
        ScreenPoint {
            x: sum_x / total,
            y: sum_y / total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    fn point(x: f64, y: f64) -> NormalizedPoint {
        NormalizedPoint::new(x, y)
    }

    /// Tick times spaced comfortably past the 120 fps rate gate.
    fn ticks(count: usize) -> Vec<Instant> {
        let start = Instant::now();
        (0..count)
            .map(|idx| start + Duration::from_millis(20 * idx as u64))
            .collect()
    }

    #[test]
    fn centered_pointer_maps_to_screen_center_without_drift() {
        let mut stabilizer = PositionStabilizer::new(1_920.0, 1_080.0);
        let cfg = settings();

        for now in ticks(5) {
            let moved = stabilizer.update(point(0.5, 0.5), now, &cfg);
            let moved = moved.expect("rate gate satisfied");
            assert_eq!(moved.x, 960.0);
            assert_eq!(moved.y, 540.0);
        }
    }

    #[test]
    fn rate_gate_yields_at_most_one_move_per_interval() {
        let mut stabilizer = PositionStabilizer::new(1_920.0, 1_080.0);
        let cfg = settings();
        let start = Instant::now();

        assert!(stabilizer.update(point(0.5, 0.5), start, &cfg).is_some());
        // 1 ms later: inside the 120 fps window.
        assert!(stabilizer
            .update(point(0.5, 0.5), start + Duration::from_millis(1), &cfg)
            .is_none());
        assert!(stabilizer
            .update(point(0.5, 0.5), start + Duration::from_millis(20), &cfg)
            .is_some());
    }

    #[test]
    fn output_never_leaves_screen_bounds() {
        let mut stabilizer = PositionStabilizer::new(1_920.0, 1_080.0);
        let mut cfg = settings();
        cfg.set_sensitivity(5.0);

        // Corner-to-corner sweep at maximum sensitivity.
        let inputs = [
            point(0.05, 0.05),
            point(0.95, 0.95),
            point(0.05, 0.95),
            point(0.95, 0.05),
            point(0.5, 0.5),
        ];
        for (raw, now) in inputs.iter().zip(ticks(inputs.len())) {
            if let Some(moved) = stabilizer.update(*raw, now, &cfg) {
                assert!((0.0..=1_919.0).contains(&moved.x), "x = {}", moved.x);
                assert!((0.0..=1_079.0).contains(&moved.y), "y = {}", moved.y);
            }
        }
    }

    #[test]
    fn dead_zone_clamps_extreme_readings() {
        let mut stabilizer = PositionStabilizer::new(1_920.0, 1_080.0);
        let mut cfg = settings();
        cfg.set_sensitivity(1.0);

        let now = Instant::now();
        let moved = stabilizer
            .update(point(0.0, 0.0), now, &cfg)
            .expect("first tick always moves");
        // x is clamped to the dead zone edge (0.05), then mirrored.
        assert_eq!(moved.x, 1_920.0 * 0.95);
        assert_eq!(moved.y, 1_080.0 * 0.05);
    }

    #[test]
    fn click_lock_suppresses_jitter_but_not_deliberate_motion() {
        let mut stabilizer = PositionStabilizer::new(1_920.0, 1_080.0);
        let cfg = settings();
        let times = ticks(4);

        stabilizer.update(point(0.5, 0.5), times[0], &cfg);
        stabilizer.engage_click_lock(point(0.5, 0.5), times[0]);

        // Sub-threshold jitter during the lock: no move emitted.
        assert!(stabilizer
            .update(point(0.505, 0.5), times[1], &cfg)
            .is_none());
        assert!(stabilizer
            .update(point(0.5, 0.495), times[2], &cfg)
            .is_none());

        // Deliberate displacement cancels the lock and movement resumes.
        assert!(stabilizer.update(point(0.6, 0.5), times[3], &cfg).is_some());
    }

    #[test]
    fn expired_click_lock_stops_suppressing() {
        let mut stabilizer = PositionStabilizer::new(1_920.0, 1_080.0);
        let cfg = settings();
        let start = Instant::now();

        stabilizer.engage_click_lock(point(0.5, 0.5), start);
        let after_expiry = start + CLICK_LOCK_DURATION + Duration::from_millis(50);
        assert!(stabilizer
            .update(point(0.5, 0.5), after_expiry, &cfg)
            .is_some());
    }

    #[test]
    fn smoothing_damps_a_single_frame_spike() {
        let mut stabilizer = PositionStabilizer::new(1_920.0, 1_080.0);
        let mut cfg = settings();
        cfg.set_sensitivity(1.0);
        let times = ticks(5);

        for now in &times[..4] {
            stabilizer.update(point(0.5, 0.5), *now, &cfg);
        }
        // One spike far from the resting point.
        let moved = stabilizer
            .update(point(0.8, 0.5), times[4], &cfg)
            .expect("rate gate satisfied");

        // Raw projection of the spike would be x = 1920 * 0.2 = 384; the
        // smoothed step must stay well short of it.
        assert!(moved.x > 384.0 + 100.0, "jumped too far: {}", moved.x);
        assert!(moved.x < 960.0, "did not move at all: {}", moved.x);
    }
}
