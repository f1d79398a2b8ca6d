//! Canonical logical key values.
//!
//! Every keyboard record that survives translation is reported to subscribers
//! as a [`LogicalKey`].  Unlike raw virtual-key codes, logical keys are
//! unambiguous: the left and right variants of Shift, Ctrl, Alt and Win are
//! distinct values, and keys on the numeric keypad never collapse onto the
//! navigation cluster (e.g. keypad 7 is [`LogicalKey::NumPad7`], never
//! [`LogicalKey::Home`]).
//!
//! # The `None` sentinel
//!
//! [`LogicalKey::None`] marks records that carry no key of their own, such as
//! the synthetic shift presses some keyboards emit around Print Screen.  The
//! hub drops these; `None` is never forwarded to subscribers.

use serde::{Deserialize, Serialize};

/// Platform-independent key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogicalKey {
    None,

    // Editing and control
    Cancel,
    Backspace,
    Tab,
    Clear,
    Enter,
    NumPadEnter,
    Pause,
    Escape,
    Space,
    PrintScreen,
    Insert,
    Delete,
    Help,
    Apps,
    Sleep,

    // Lock keys
    CapsLock,
    NumLock,
    ScrollLock,

    // Navigation
    PageUp,
    PageDown,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    Select,
    Print,
    Execute,

    // Digit row
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D8,
    D9,

    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Modifiers
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    LeftWin,
    RightWin,

    // Numeric keypad
    NumPad0,
    NumPad1,
    NumPad2,
    NumPad3,
    NumPad4,
    NumPad5,
    NumPad6,
    NumPad7,
    NumPad8,
    NumPad9,
    Multiply,
    Add,
    Separator,
    Subtract,
    Decimal,
    Divide,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    // Browser and media
    BrowserBack,
    BrowserForward,
    BrowserRefresh,
    BrowserStop,
    BrowserSearch,
    BrowserFavorites,
    BrowserHome,
    VolumeMute,
    VolumeDown,
    VolumeUp,
    MediaNextTrack,
    MediaPreviousTrack,
    MediaStop,
    MediaPlayPause,
    LaunchMail,
    SelectMedia,
    LaunchApplication1,
    LaunchApplication2,

    // OEM (US layout legends)
    OemSemicolon,
    OemPlus,
    OemComma,
    OemMinus,
    OemPeriod,
    OemQuestion,
    OemTilde,
    OemOpenBrackets,
    OemPipe,
    OemCloseBrackets,
    OemQuotes,
    Oem8,
    OemBackslash,

    // IME
    ImeConvert,
    ImeNonConvert,
    KanaMode,
    KanjiMode,
}

impl LogicalKey {
    /// Returns `true` for the sentinel that must never reach subscribers.
    pub fn is_none(self) -> bool {
        self == LogicalKey::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_sentinel() {
        assert!(LogicalKey::None.is_none());
        assert!(!LogicalKey::A.is_none());
    }

    #[test]
    fn test_left_and_right_modifiers_are_distinct_values() {
        assert_ne!(LogicalKey::LeftShift, LogicalKey::RightShift);
        assert_ne!(LogicalKey::LeftCtrl, LogicalKey::RightCtrl);
        assert_ne!(LogicalKey::LeftAlt, LogicalKey::RightAlt);
    }
}
