//! Injection boundary: maps pointer commands onto OS input primitives.

use thiserror::Error;

use crate::models::commands::{MouseButton, PointerCommand, ScrollDirection};

#[derive(Debug, Error)]
pub enum InjectError {
    /// The OS refused the command. Non-fatal: the caller logs it and moves
    /// on; commands are never retried with stale coordinates.
    #[error("the OS refused the input command: {0}")]
    Refused(String),
    #[error("screen dimensions unavailable: {0}")]
    NoDisplay(String),
}

/// OS input primitives the pipeline output is mapped onto. Implementations
/// may be slow; the processing thread treats every call as a synchronous
/// boundary it awaits.
pub trait PointerInjector {
    fn inject(&mut self, command: &PointerCommand) -> Result<(), InjectError>;
}

/// Injector backed by `rdev::simulate`.
pub struct RdevInjector;

impl RdevInjector {
    pub fn new() -> Self {
        Self
    }

    /// Physical screen size in pixels, for sizing the stabilizer.
    pub fn screen_size() -> Result<(f64, f64), InjectError> {
        let (width, height) =
            rdev::display_size().map_err(|err| InjectError::NoDisplay(format!("{err:?}")))?;
        Ok((width as f64, height as f64))
    }

    fn simulate(event: &rdev::EventType) -> Result<(), InjectError> {
        rdev::simulate(event).map_err(|err| InjectError::Refused(format!("{err:?}")))
    }

    fn button(button: MouseButton) -> rdev::Button {
        match button {
            MouseButton::Left => rdev::Button::Left,
            MouseButton::Right => rdev::Button::Right,
            MouseButton::Middle => rdev::Button::Middle,
        }
    }
}

impl Default for RdevInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerInjector for RdevInjector {
    fn inject(&mut self, command: &PointerCommand) -> Result<(), InjectError> {
        match *command {
            PointerCommand::Move(point) => {
                // Truncation to integer pixels happens here and nowhere earlier.
                Self::simulate(&rdev::EventType::MouseMove {
                    x: point.x.trunc(),
                    y: point.y.trunc(),
                })
            }
            PointerCommand::Click(button) => {
                let button = Self::button(button);
                Self::simulate(&rdev::EventType::ButtonPress(button))?;
                Self::simulate(&rdev::EventType::ButtonRelease(button))
            }
            PointerCommand::Press(button) => {
                Self::simulate(&rdev::EventType::ButtonPress(Self::button(button)))
            }
            PointerCommand::Release(button) => {
                Self::simulate(&rdev::EventType::ButtonRelease(Self::button(button)))
            }
            PointerCommand::Scroll { direction, amount } => {
                let delta_y = match direction {
                    ScrollDirection::Up => amount as i64,
                    ScrollDirection::Down => -(amount as i64),
                };
                Self::simulate(&rdev::EventType::Wheel {
                    delta_x: 0,
                    delta_y,
                })
            }
        }
    }
}
