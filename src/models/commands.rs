//! Pointer commands emitted by the pipeline, mapped onto OS primitives by the
//! injection boundary.

use serde::{Deserialize, Serialize};

use crate::models::landmarks::ScreenPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

/// One pointer command. `Press` and `Release` are independent but must always
/// pair; `Click` is a press+release issued atomically by the injector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerCommand {
    /// Absolute cursor placement.
    Move(ScreenPoint),
    Click(MouseButton),
    Press(MouseButton),
    Release(MouseButton),
    Scroll {
        direction: ScrollDirection,
        amount: i32,
    },
}
