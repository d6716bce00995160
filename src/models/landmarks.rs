//! Per-tick landmark data handed to the pipeline by a tracker backend.

use serde::{Deserialize, Serialize};

/// One tracked hand landmark, normalized to the camera frame.
/// `x` runs left to right, `y` top to bottom, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are finite and inside the camera frame.
    pub fn is_valid(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
    }

    pub fn distance_to(self, other: NormalizedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Absolute screen position in physical pixels.
///
/// Coordinates stay `f64` between ticks; truncation to integer pixels happens
/// at the injection boundary and nowhere earlier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    /// Builds a point clamped to `[0, width-1] x [0, height-1]`.
    pub fn clamped(x: f64, y: f64, screen_width: f64, screen_height: f64) -> Self {
        Self {
            x: x.clamp(0.0, (screen_width - 1.0).max(0.0)),
            y: y.clamp(0.0, (screen_height - 1.0).max(0.0)),
        }
    }
}

/// Scalar signals for one pipeline tick, derived from a full landmark set by
/// the tracker backend. The pipeline never sees raw landmark arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandFrame {
    /// Pointer-control landmark (index fingertip).
    pub pointer: NormalizedPoint,
    /// Normalized distance between thumb tip and index fingertip.
    pub pinch_distance: f64,
    /// True when the right-click posture is held this frame.
    pub posture_active: bool,
    /// Vertical coordinate of the scroll landmark (middle fingertip).
    pub scroll_y: f64,
}

impl HandFrame {
    /// Rejects missing, NaN, or out-of-frame tracker output.
    pub fn is_valid(&self) -> bool {
        self.pointer.is_valid()
            && self.pinch_distance.is_finite()
            && self.pinch_distance >= 0.0
            && self.scroll_y.is_finite()
            && (0.0..=1.0).contains(&self.scroll_y)
    }
}

/// Right-click posture test for tracker adapters: index and middle fingers
/// extended above the wrist, ring and pinky curled below it, and the extended
/// tips spread at least `min_spread` apart. `y` grows downward, so an
/// extended finger has a smaller `y` than the wrist.
pub fn is_v_sign(
    index_tip: NormalizedPoint,
    middle_tip: NormalizedPoint,
    ring_tip: NormalizedPoint,
    pinky_tip: NormalizedPoint,
    wrist: NormalizedPoint,
    min_spread: f64,
) -> bool {
    index_tip.y < wrist.y
        && middle_tip.y < wrist.y
        && ring_tip.y > wrist.y
        && pinky_tip.y > wrist.y
        && (index_tip.x - middle_tip.x).abs() >= min_spread
}
