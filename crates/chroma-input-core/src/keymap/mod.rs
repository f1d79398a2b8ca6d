//! Key/code translation for raw keyboard records.
//!
//! A raw keyboard record carries a `(virtual_code, scan_code, flags)` triple.
//! The virtual code alone is ambiguous; [`translate`] combines all three to
//! produce one canonical [`LogicalKey`]:
//!
//! - `VK_SHIFT` is split into left/right by scan code (0x2A / 0x36).
//! - `VK_CONTROL` and `VK_MENU` are split by the E0 prefix bit (right = E0).
//! - `VK_RETURN` with E0 is the keypad Enter.
//! - Navigation VKs *without* E0 come from the numeric keypad with NumLock off.
//! - Synthetic "fake shift" presses (Shift with E0) and the 0xFF filler code
//!   translate to [`LogicalKey::None`] so the hub can drop them silently.
//!
//! `translate` is a pure function with no shared state, so it may be called
//! from any number of dispatch contexts concurrently.

pub mod logical;
pub mod windows_vk;

pub use logical::LogicalKey;

use thiserror::Error;

use windows_vk::{
    VK_CLEAR, VK_CONTROL, VK_DELETE, VK_DOWN, VK_END, VK_FAKE, VK_HOME, VK_INSERT, VK_LEFT,
    VK_MENU, VK_NEXT, VK_PRIOR, VK_RETURN, VK_RIGHT, VK_SHIFT, VK_UP,
};

/// Raw keyboard flag: the key was released.
pub const KEY_BREAK: u16 = 0x01;
/// Raw keyboard flag: the scan code carried the E0 prefix (extended key).
pub const KEY_E0: u16 = 0x02;
/// Raw keyboard flag: the scan code carried the E1 prefix (Pause/Break).
pub const KEY_E1: u16 = 0x04;

/// Make code of the left Shift key.
pub const SCAN_LEFT_SHIFT: u16 = 0x2A;
/// Make code of the right Shift key.
pub const SCAN_RIGHT_SHIFT: u16 = 0x36;

/// Failure to turn a raw code combination into a [`LogicalKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// The virtual-key code does not fit the 8-bit VK space.
    #[error("virtual key 0x{virtual_code:04X} is outside the VK range")]
    VirtualKeyOutOfRange { virtual_code: u16 },

    /// The virtual-key code has no keyboard meaning.
    #[error("virtual key 0x{virtual_code:02X} (scan 0x{scan_code:02X}) has no logical key")]
    UnmappedVirtualKey { virtual_code: u16, scan_code: u16 },

    /// A Shift press whose scan code is neither left nor right Shift.
    #[error("shift key reported unrecognized scan code 0x{scan_code:02X}")]
    UnrecognizedShiftScanCode { scan_code: u16 },
}

/// Translates a raw `(virtual_code, scan_code, flags)` triple into a [`LogicalKey`].
///
/// Returns `Ok(LogicalKey::None)` for synthetic records that carry no key of
/// their own; callers drop those without logging.
///
/// # Errors
///
/// Returns [`TranslationError`] when the combination is not recognized.
/// Callers log the error and skip the record.
pub fn translate(virtual_code: u16, scan_code: u16, flags: u16) -> Result<LogicalKey, TranslationError> {
    let is_e0 = flags & KEY_E0 != 0;

    let key = match virtual_code {
        VK_SHIFT => {
            // Keyboards wrap extended keys (arrows, Insert, ...) in synthetic
            // shift presses carrying the E0 prefix. Real Shift keys never do.
            if is_e0 {
                return Ok(LogicalKey::None);
            }
            return match scan_code {
                SCAN_LEFT_SHIFT => Ok(LogicalKey::LeftShift),
                SCAN_RIGHT_SHIFT => Ok(LogicalKey::RightShift),
                _ => Err(TranslationError::UnrecognizedShiftScanCode { scan_code }),
            };
        }
        VK_FAKE => return Ok(LogicalKey::None),
        VK_CONTROL => {
            return Ok(if is_e0 { LogicalKey::RightCtrl } else { LogicalKey::LeftCtrl });
        }
        VK_MENU => {
            return Ok(if is_e0 { LogicalKey::RightAlt } else { LogicalKey::LeftAlt });
        }
        VK_RETURN if is_e0 => return Ok(LogicalKey::NumPadEnter),
        vk if !is_e0 => keypad_alias(vk).unwrap_or(vk),
        vk => vk,
    };

    match windows_vk::vk_to_key(key) {
        Some(LogicalKey::None) => Err(TranslationError::UnmappedVirtualKey {
            virtual_code,
            scan_code,
        }),
        Some(logical) => Ok(logical),
        None => Err(TranslationError::VirtualKeyOutOfRange { virtual_code }),
    }
}

/// Returns `true` when the record describes a key press (the break bit is clear).
pub fn key_is_down(flags: u16) -> bool {
    flags & KEY_BREAK == 0
}

/// Navigation VKs that the numeric keypad reports when NumLock is off.
///
/// The dedicated navigation cluster always sets E0; the keypad never does.
fn keypad_alias(vk: u16) -> Option<u16> {
    let numpad = match vk {
        VK_INSERT => 0x60, // VK_NUMPAD0
        VK_END => 0x61,    // VK_NUMPAD1
        VK_DOWN => 0x62,   // VK_NUMPAD2
        VK_NEXT => 0x63,   // VK_NUMPAD3
        VK_LEFT => 0x64,   // VK_NUMPAD4
        VK_CLEAR => 0x65,  // VK_NUMPAD5
        VK_RIGHT => 0x66,  // VK_NUMPAD6
        VK_HOME => 0x67,   // VK_NUMPAD7
        VK_UP => 0x68,     // VK_NUMPAD8
        VK_PRIOR => 0x69,  // VK_NUMPAD9
        VK_DELETE => 0x6E, // VK_DECIMAL
        _ => return None,
    };
    Some(numpad)
}
