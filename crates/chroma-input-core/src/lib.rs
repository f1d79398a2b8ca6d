//! # chroma-input-core
//!
//! Platform-independent core of the Chroma Input raw input pipeline.
//!
//! The pipeline turns raw keyboard and mouse records into a normalized event
//! stream for lighting and profile consumers:
//!
//! ```text
//! RawInputRecord ──► translate (keymap) ──► identify (domain::device)
//!                ──► aggregate motion (domain::motion) ──► InputEvent
//! ```
//!
//! - **`keymap`** – `(virtual_code, scan_code, flags)` → [`LogicalKey`],
//!   resolving left/right modifiers, keypad aliases and synthetic keys.
//! - **`domain`** – the device identity cache, toggle-state tracker, motion
//!   aggregator and foreground tracker.
//! - **`input`** – raw records coming in and the events published out.
//!
//! This crate makes no OS calls; platform queries go through the small traits
//! defined next to the state that needs them.

pub mod domain;
pub mod input;
pub mod keymap;

pub use domain::device::{
    DeviceHandle, DeviceIdentifier, DeviceIdentityCache, DevicePathSource, DeviceResolutionError,
};
pub use domain::focus::{FocusLost, ForegroundTracker, DEFAULT_FOCUS_DENYLIST};
pub use domain::motion::{AccumulatedMotion, MotionAggregator, DEFAULT_MAX_PUBLISH_HZ};
pub use domain::toggle::{LockKey, LockKeyProbe, ToggleStateTracker, ToggleStatus};
pub use input::events::{
    Device, InputDeviceType, InputEvent, KeyEvent, MouseButton, MouseButtonEvent, MouseMoveEvent,
    MouseScrollEvent, ProviderId, ScrollAxis, RAW_INPUT_PROVIDER_ID,
};
pub use input::records::{RawInputRecord, RawKeyboardRecord, RawMouseRecord};
pub use keymap::{translate, LogicalKey, TranslationError};
