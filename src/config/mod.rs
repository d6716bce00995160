//! Persisted settings and the JSON config store.
//!
//! Every numeric field is clamped into a safe range by its setter, and again
//! by `sanitize` when loaded from disk, so an out-of-range value in the file
//! self-heals instead of being rejected.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Tracker backend name. Opaque to the pipeline.
    pub recognizer: String,
    /// Camera device index handed to the tracker backend.
    pub camera_id: u32,
    pub start_silently: bool,
    /// Linear scale-from-center applied after projection.
    pub sensitivity: f64,
    /// Margin near the normalized frame edges clamped away before projection.
    pub dead_zone: f64,
    /// Per-tick interpolation step toward the smoothed target.
    pub smoothing_factor: f64,
    /// Upper bound on emitted move commands per second.
    pub max_fps: u32,
    /// Stability radius, normalized. Shared by the stability detector and the
    /// click lock.
    pub click_stability_zone: f64,
    /// Consecutive near-anchor frames required before the pointer counts as
    /// stable.
    pub min_stable_frames: u32,
    /// Pinch duration at which a tap becomes a press-and-hold.
    pub hold_threshold_secs: f64,
    /// Minimum gap between any two discrete actions.
    pub gesture_cooldown_secs: f64,
    pub quick_scroll_enabled: bool,
    /// Base wheel magnitude per scroll flick.
    pub scroll_amount: u32,
    pub scroll_up_sensitivity: f64,
    pub scroll_down_sensitivity: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recognizer: "mediapipe".to_string(),
            camera_id: 0,
            start_silently: true,
            sensitivity: 2.0,
            dead_zone: 0.05,
            smoothing_factor: 0.3,
            max_fps: 120,
            click_stability_zone: 0.015,
            min_stable_frames: 3,
            hold_threshold_secs: 0.6,
            gesture_cooldown_secs: 0.5,
            quick_scroll_enabled: true,
            scroll_amount: 50,
            scroll_up_sensitivity: 1.0,
            scroll_down_sensitivity: 1.0,
        }
    }
}

impl Settings {
    pub fn set_sensitivity(&mut self, value: f64) {
        self.sensitivity = clamp_or_default(value, 0.1, 5.0, 2.0);
    }

    pub fn set_dead_zone(&mut self, value: f64) {
        self.dead_zone = clamp_or_default(value, 0.0, 0.25, 0.05);
    }

    pub fn set_smoothing_factor(&mut self, value: f64) {
        self.smoothing_factor = clamp_or_default(value, 0.1, 1.0, 0.3);
    }

    pub fn set_max_fps(&mut self, value: u32) {
        self.max_fps = value.clamp(30, 240);
    }

    pub fn set_click_stability_zone(&mut self, value: f64) {
        self.click_stability_zone = clamp_or_default(value, 0.001, 0.1, 0.015);
    }

    pub fn set_min_stable_frames(&mut self, value: u32) {
        self.min_stable_frames = value.clamp(1, 30);
    }

    pub fn set_hold_threshold_secs(&mut self, value: f64) {
        self.hold_threshold_secs = clamp_or_default(value, 0.2, 3.0, 0.6);
    }

    pub fn set_gesture_cooldown_secs(&mut self, value: f64) {
        self.gesture_cooldown_secs = clamp_or_default(value, 0.1, 3.0, 0.5);
    }

    pub fn set_scroll_amount(&mut self, value: u32) {
        self.scroll_amount = value.clamp(1, 500);
    }

    pub fn set_scroll_up_sensitivity(&mut self, value: f64) {
        self.scroll_up_sensitivity = clamp_or_default(value, 0.1, 5.0, 1.0);
    }

    pub fn set_scroll_down_sensitivity(&mut self, value: f64) {
        self.scroll_down_sensitivity = clamp_or_default(value, 0.1, 5.0, 1.0);
    }

    /// Re-applies every setter clamp. Run on every load from disk.
    pub fn sanitize(&mut self) {
        self.set_sensitivity(self.sensitivity);
        self.set_dead_zone(self.dead_zone);
        self.set_smoothing_factor(self.smoothing_factor);
        self.set_max_fps(self.max_fps);
        self.set_click_stability_zone(self.click_stability_zone);
        self.set_min_stable_frames(self.min_stable_frames);
        self.set_hold_threshold_secs(self.hold_threshold_secs);
        self.set_gesture_cooldown_secs(self.gesture_cooldown_secs);
        self.set_scroll_amount(self.scroll_amount);
        self.set_scroll_up_sensitivity(self.scroll_up_sensitivity);
        self.set_scroll_down_sensitivity(self.scroll_down_sensitivity);
    }

    pub fn hold_threshold(&self) -> Duration {
        Duration::from_secs_f64(self.hold_threshold_secs)
    }

    pub fn gesture_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.gesture_cooldown_secs)
    }

    /// Rate gate between move commands, derived from `max_fps`.
    pub fn min_move_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.max_fps.max(1) as f64)
    }
}

/// NaN falls back to the default; everything else clamps into range.
fn clamp_or_default(value: f64, min: f64, max: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// JSON config file on disk: `{config_dir}/PalmControl/config.json`.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("PalmControl").join("config.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings, falling back to defaults when the file is missing or
    /// corrupted. The fallback is written back so the next load is clean.
    pub fn load(&self) -> Settings {
        match fs::read_to_string(&self.path) {
            Ok(text) => match serde_json::from_str::<Settings>(&text) {
                Ok(mut settings) => {
                    settings.sanitize();
                    settings
                }
                Err(err) => {
                    log::warn!("config file is corrupted ({err}); restoring defaults");
                    self.restore_defaults()
                }
            },
            Err(_) => self.restore_defaults(),
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        Ok(())
    }

    fn restore_defaults(&self) -> Settings {
        let defaults = Settings::default();
        if let Err(err) = self.save(&defaults) {
            log::warn!("failed to write default config: {err}");
        }
        defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_into_valid_ranges() {
        let mut settings = Settings::default();

        settings.set_sensitivity(99.0);
        assert_eq!(settings.sensitivity, 5.0);

        settings.set_smoothing_factor(0.0);
        assert_eq!(settings.smoothing_factor, 0.1);

        settings.set_max_fps(10_000);
        assert_eq!(settings.max_fps, 240);

        settings.set_min_stable_frames(0);
        assert_eq!(settings.min_stable_frames, 1);

        settings.set_scroll_amount(0);
        assert_eq!(settings.scroll_amount, 1);
    }

    #[test]
    fn sanitize_heals_out_of_range_values_from_disk() {
        let json = r#"{
            "sensitivity": -3.0,
            "smoothingFactor": 7.5,
            "maxFps": 5,
            "holdThresholdSecs": 0.0,
            "gestureCooldownSecs": 100.0
        }"#;

        let mut settings: Settings = serde_json::from_str(json).expect("parse partial config");
        settings.sanitize();

        assert_eq!(settings.sensitivity, 0.1);
        assert_eq!(settings.smoothing_factor, 1.0);
        assert_eq!(settings.max_fps, 30);
        assert_eq!(settings.hold_threshold_secs, 0.2);
        assert_eq!(settings.gesture_cooldown_secs, 3.0);
        // Missing keys fall back to defaults.
        assert_eq!(settings.scroll_amount, 50);
        assert_eq!(settings.recognizer, "mediapipe");
    }

    #[test]
    fn nan_values_fall_back_to_defaults() {
        let mut settings = Settings::default();
        settings.set_sensitivity(f64::NAN);
        assert_eq!(settings.sensitivity, 2.0);
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).expect("serialize settings");
        assert!(json.contains("\"smoothingFactor\""));
        let parsed: Settings = serde_json::from_str(&json).expect("deserialize settings");
        assert_eq!(parsed, settings);
    }
}
