//! Platform probes: device paths, lock-key state, cursor position and the
//! foreground process.
//!
//! Each concern is a small trait owned by the code that consumes it
//! ([`chroma_input_core::DevicePathSource`], [`chroma_input_core::LockKeyProbe`],
//! [`crate::application::dispatch_input::CursorPosition`],
//! [`crate::application::focus_monitor::ForegroundProcessProbe`]).  This module
//! provides one type per platform implementing all of them.

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;
