//! Normalized events published to subscribers.
//!
//! These are the only types that leave the pipeline.  Each event optionally
//! carries the [`Device`] it was attributed to; the device is `None` when the
//! identifier could not be resolved or the lookup service did not know it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::device::DeviceIdentifier;
use crate::domain::toggle::ToggleStatus;
use crate::keymap::LogicalKey;

/// Identifies this input provider to the device lookup service.
pub type ProviderId = Uuid;

/// Fixed identity of the raw-input provider.
pub const RAW_INPUT_PROVIDER_ID: ProviderId = Uuid::from_u128(0x6737b204_ffb1_4cd9_8776_9fb851db303a);

/// Kind of physical device an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputDeviceType {
    Keyboard,
    Mouse,
}

/// A device known to the device lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub device_type: InputDeviceType,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Button4,
    Button5,
}

/// Wheel axis of a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub device: Option<Device>,
    /// Never [`LogicalKey::None`].
    pub key: LogicalKey,
    pub is_down: bool,
}

/// Throttled cursor movement.
///
/// `x`/`y` are absolute cursor coordinates; `dx`/`dy` are the change since the
/// previously published movement event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseMoveEvent {
    pub device: Option<Device>,
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseScrollEvent {
    pub device: Option<Device>,
    pub axis: ScrollAxis,
    /// Signed wheel delta, multiples of 120 per notch.
    pub magnitude: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseButtonEvent {
    pub device: Option<Device>,
    pub button: MouseButton,
    pub is_down: bool,
}

/// Everything the hub publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Key(KeyEvent),
    MouseMove(MouseMoveEvent),
    MouseScroll(MouseScrollEvent),
    MouseButton(MouseButtonEvent),
    ToggleStatus(ToggleStatus),
    /// A device identifier was observed on a non-movement record, so the
    /// host may bind it to a device it has not identified yet.
    IdentifierReceived {
        identifier: DeviceIdentifier,
        device_type: InputDeviceType,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_is_stable() {
        assert_eq!(
            RAW_INPUT_PROVIDER_ID.to_string(),
            "6737b204-ffb1-4cd9-8776-9fb851db303a"
        );
    }

    #[test]
    fn test_events_with_equal_fields_compare_equal() {
        let a = InputEvent::Key(KeyEvent { device: None, key: LogicalKey::A, is_down: true });
        let b = InputEvent::Key(KeyEvent { device: None, key: LogicalKey::A, is_down: true });
        assert_eq!(a, b);
    }
}
