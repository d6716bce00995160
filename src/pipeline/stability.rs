//! Stability gate: has the raw pointer stayed near a fixed anchor for a
//! minimum run of consecutive frames? Every click path depends on it.

use crate::models::landmarks::NormalizedPoint;

/// Anchor the detector measures displacement against. It only moves when a
/// frame lands outside the stability radius, so slow drift accumulating
/// frame-by-frame cannot keep the gate open.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Anchor {
    NotYetSeen,
    Anchored(NormalizedPoint),
}

#[derive(Debug)]
pub struct StabilityDetector {
    anchor: Anchor,
    stable_frames: u32,
}

impl StabilityDetector {
    pub fn new() -> Self {
        Self {
            anchor: Anchor::NotYetSeen,
            stable_frames: 0,
        }
    }

    /// Feeds one raw frame. Returns true once the pointer has stayed within
    /// `threshold` of the anchor on both axes for at least
    /// `min_stable_frames` consecutive frames.
    pub fn update(&mut self, raw: NormalizedPoint, threshold: f64, min_stable_frames: u32) -> bool {
        match self.anchor {
            Anchor::NotYetSeen => {
                self.anchor = Anchor::Anchored(raw);
                self.stable_frames = 0;
                false
            }
            Anchor::Anchored(anchor) => {
                let dx = (raw.x - anchor.x).abs();
                let dy = (raw.y - anchor.y).abs();
                if dx < threshold && dy < threshold {
                    self.stable_frames = self.stable_frames.saturating_add(1);
                } else {
                    // Re-anchor only on the unstable branch.
                    self.anchor = Anchor::Anchored(raw);
                    self.stable_frames = 0;
                }
                self.stable_frames >= min_stable_frames
            }
        }
    }

    /// The point stability is currently measured against, once seeded. While
    /// the pointer is stable this is the settled position, free of the
    /// current frame's jitter.
    pub fn anchor(&self) -> Option<NormalizedPoint> {
        match self.anchor {
            Anchor::NotYetSeen => None,
            Anchor::Anchored(point) => Some(point),
        }
    }

    pub fn reset(&mut self) {
        self.anchor = Anchor::NotYetSeen;
        self.stable_frames = 0;
    }
}

impl Default for StabilityDetector {
    fn default() -> Self {
        Self::new()
    }
}
