//! Raw input records delivered by the platform layer.
//!
//! Records are ephemeral: each one is consumed by exactly one dispatch and
//! never stored.  Field values are kept exactly as the platform reported
//! them; all interpretation happens in the hub.

use serde::{Deserialize, Serialize};

use crate::domain::device::DeviceHandle;
use crate::input::events::{MouseButton, ScrollAxis};

// ── Mouse button flag bits ────────────────────────────────────────────────────

pub const MOUSE_LEFT_DOWN: u16 = 0x0001;
pub const MOUSE_LEFT_UP: u16 = 0x0002;
pub const MOUSE_RIGHT_DOWN: u16 = 0x0004;
pub const MOUSE_RIGHT_UP: u16 = 0x0008;
pub const MOUSE_MIDDLE_DOWN: u16 = 0x0010;
pub const MOUSE_MIDDLE_UP: u16 = 0x0020;
pub const MOUSE_BUTTON_4_DOWN: u16 = 0x0040;
pub const MOUSE_BUTTON_4_UP: u16 = 0x0080;
pub const MOUSE_BUTTON_5_DOWN: u16 = 0x0100;
pub const MOUSE_BUTTON_5_UP: u16 = 0x0200;
pub const MOUSE_WHEEL: u16 = 0x0400;
pub const MOUSE_HWHEEL: u16 = 0x0800;

/// One keyboard record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawKeyboardRecord {
    /// Handle of the device that produced the record.
    pub device: DeviceHandle,
    /// Platform virtual-key code.
    pub virtual_code: u16,
    /// Hardware make code (without the E0/E1 prefix).
    pub scan_code: u16,
    /// Break / E0 / E1 bits, see [`crate::keymap::KEY_BREAK`].
    pub flags: u16,
}

/// One mouse record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMouseRecord {
    pub device: DeviceHandle,
    /// Button transition bits; zero for pure movement.
    pub button_flags: u16,
    /// Wheel delta when a wheel bit is set (multiples of 120 per notch).
    pub button_data: i16,
    /// Relative X movement since the previous record.
    pub delta_x: i32,
    /// Relative Y movement since the previous record.
    pub delta_y: i32,
}

impl RawMouseRecord {
    /// Returns `true` when no button or wheel bit is set.
    pub fn is_movement_only(&self) -> bool {
        self.button_flags == 0
    }

    /// The scroll axis, when the flags are exactly one wheel bit.
    ///
    /// Wheel bits combined with anything else are not treated as scrolling.
    pub fn scroll_axis(&self) -> Option<ScrollAxis> {
        match self.button_flags {
            MOUSE_WHEEL => Some(ScrollAxis::Vertical),
            MOUSE_HWHEEL => Some(ScrollAxis::Horizontal),
            _ => None,
        }
    }

    /// The single button transition encoded in the flags, as `(button, is_down)`.
    ///
    /// Returns `None` for zero flags, wheel flags and multi-bit combinations.
    pub fn button_transition(&self) -> Option<(MouseButton, bool)> {
        let transition = match self.button_flags {
            MOUSE_LEFT_DOWN => (MouseButton::Left, true),
            MOUSE_LEFT_UP => (MouseButton::Left, false),
            MOUSE_RIGHT_DOWN => (MouseButton::Right, true),
            MOUSE_RIGHT_UP => (MouseButton::Right, false),
            MOUSE_MIDDLE_DOWN => (MouseButton::Middle, true),
            MOUSE_MIDDLE_UP => (MouseButton::Middle, false),
            MOUSE_BUTTON_4_DOWN => (MouseButton::Button4, true),
            MOUSE_BUTTON_4_UP => (MouseButton::Button4, false),
            MOUSE_BUTTON_5_DOWN => (MouseButton::Button5, true),
            MOUSE_BUTTON_5_UP => (MouseButton::Button5, false),
            _ => return None,
        };
        Some(transition)
    }
}

/// A tagged raw input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawInputRecord {
    Keyboard(RawKeyboardRecord),
    Mouse(RawMouseRecord),
}

impl RawInputRecord {
    /// The device handle of the wrapped record.
    pub fn device(&self) -> DeviceHandle {
        match self {
            RawInputRecord::Keyboard(k) => k.device,
            RawInputRecord::Mouse(m) => m.device,
        }
    }
}
