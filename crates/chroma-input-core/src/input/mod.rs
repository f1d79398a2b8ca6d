//! Raw records coming in and normalized events going out.

pub mod events;
pub mod records;

pub use events::{
    Device, InputDeviceType, InputEvent, KeyEvent, MouseButton, MouseButtonEvent, MouseMoveEvent,
    MouseScrollEvent, ProviderId, ScrollAxis, RAW_INPUT_PROVIDER_ID,
};
pub use records::{RawInputRecord, RawKeyboardRecord, RawMouseRecord};
