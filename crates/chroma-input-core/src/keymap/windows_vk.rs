//! Windows Virtual Key (VK) code to [`LogicalKey`] table.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//! VK codes delivered in raw keyboard records range from 0x00 to 0xFF.
//!
//! # What is a Virtual Key code? (for beginners)
//!
//! Windows assigns each keyboard key a number called a "Virtual Key code",
//! named `VK_*` in `<winuser.h>` (e.g. `VK_RETURN = 0x0D`).  Several physical
//! keys share one VK code: both Shift keys report `VK_SHIFT`, both Enter keys
//! report `VK_RETURN`, and the keypad digits report navigation codes while
//! NumLock is off.  The table below is therefore only the *last* step of
//! translation; the ambiguous codes are resolved first by
//! [`super::translate`] using the scan code and the E0 flag.
//!
//! # How this table works
//!
//! `VK_TO_KEY_TABLE` is a compile-time array of 256 [`LogicalKey`] values
//! indexed by VK code.  Codes without a keyboard meaning (mouse buttons,
//! reserved ranges) hold [`LogicalKey::None`].

use super::logical::LogicalKey;

pub const VK_CLEAR: u16 = 0x0C;
pub const VK_RETURN: u16 = 0x0D;
pub const VK_SHIFT: u16 = 0x10;
pub const VK_CONTROL: u16 = 0x11;
pub const VK_MENU: u16 = 0x12;
pub const VK_PRIOR: u16 = 0x21;
pub const VK_NEXT: u16 = 0x22;
pub const VK_END: u16 = 0x23;
pub const VK_HOME: u16 = 0x24;
pub const VK_LEFT: u16 = 0x25;
pub const VK_UP: u16 = 0x26;
pub const VK_RIGHT: u16 = 0x27;
pub const VK_DOWN: u16 = 0x28;
pub const VK_INSERT: u16 = 0x2D;
pub const VK_DELETE: u16 = 0x2E;
/// Filler code some keyboards emit alongside Print Screen and Pause.
pub const VK_FAKE: u16 = 0xFF;

/// Looks up the table entry for `vk`.
///
/// Returns `None` for codes above 0xFF; returns `Some(LogicalKey::None)` for
/// codes inside the table that have no keyboard meaning.
pub fn vk_to_key(vk: u16) -> Option<LogicalKey> {
    VK_TO_KEY_TABLE.get(vk as usize).copied()
}

const VK_TO_KEY_TABLE: [LogicalKey; 256] = {
    use LogicalKey::*;
    let mut t = [None; 256];

    // ── Control keys ─────────────────────────────────────────────────────────
    t[0x03] = Cancel;       // VK_CANCEL
    t[0x08] = Backspace;    // VK_BACK
    t[0x09] = Tab;          // VK_TAB
    t[0x0C] = Clear;        // VK_CLEAR
    t[0x0D] = Enter;        // VK_RETURN
    t[0x13] = Pause;        // VK_PAUSE
    t[0x14] = CapsLock;     // VK_CAPITAL
    t[0x15] = KanaMode;     // VK_KANA
    t[0x19] = KanjiMode;    // VK_KANJI
    t[0x1B] = Escape;       // VK_ESCAPE
    t[0x1C] = ImeConvert;   // VK_CONVERT
    t[0x1D] = ImeNonConvert; // VK_NONCONVERT
    t[0x20] = Space;        // VK_SPACE
    t[0x29] = Select;       // VK_SELECT
    t[0x2A] = Print;        // VK_PRINT
    t[0x2B] = Execute;      // VK_EXECUTE
    t[0x2C] = PrintScreen;  // VK_SNAPSHOT
    t[0x2D] = Insert;       // VK_INSERT
    t[0x2E] = Delete;       // VK_DELETE
    t[0x2F] = Help;         // VK_HELP
    t[0x5D] = Apps;         // VK_APPS
    t[0x5F] = Sleep;        // VK_SLEEP
    t[0x90] = NumLock;      // VK_NUMLOCK
    t[0x91] = ScrollLock;   // VK_SCROLL

    // ── Navigation ───────────────────────────────────────────────────────────
    t[0x21] = PageUp;       // VK_PRIOR
    t[0x22] = PageDown;     // VK_NEXT
    t[0x23] = End;
    t[0x24] = Home;
    t[0x25] = Left;
    t[0x26] = Up;
    t[0x27] = Right;
    t[0x28] = Down;

    // ── Digit row (VK_0=0x30 … VK_9=0x39) ────────────────────────────────────
    t[0x30] = D0;
    t[0x31] = D1;
    t[0x32] = D2;
    t[0x33] = D3;
    t[0x34] = D4;
    t[0x35] = D5;
    t[0x36] = D6;
    t[0x37] = D7;
    t[0x38] = D8;
    t[0x39] = D9;

    // ── Letters (VK_A=0x41 … VK_Z=0x5A) ──────────────────────────────────────
    t[0x41] = A;
    t[0x42] = B;
    t[0x43] = C;
    t[0x44] = D;
    t[0x45] = E;
    t[0x46] = F;
    t[0x47] = G;
    t[0x48] = H;
    t[0x49] = I;
    t[0x4A] = J;
    t[0x4B] = K;
    t[0x4C] = L;
    t[0x4D] = M;
    t[0x4E] = N;
    t[0x4F] = O;
    t[0x50] = P;
    t[0x51] = Q;
    t[0x52] = R;
    t[0x53] = S;
    t[0x54] = T;
    t[0x55] = U;
    t[0x56] = V;
    t[0x57] = W;
    t[0x58] = X;
    t[0x59] = Y;
    t[0x5A] = Z;

    // ── Numpad (VK_NUMPAD0=0x60 … VK_DIVIDE=0x6F) ────────────────────────────
    t[0x60] = NumPad0;
    t[0x61] = NumPad1;
    t[0x62] = NumPad2;
    t[0x63] = NumPad3;
    t[0x64] = NumPad4;
    t[0x65] = NumPad5;
    t[0x66] = NumPad6;
    t[0x67] = NumPad7;
    t[0x68] = NumPad8;
    t[0x69] = NumPad9;
    t[0x6A] = Multiply;
    t[0x6B] = Add;
    t[0x6C] = Separator;
    t[0x6D] = Subtract;
    t[0x6E] = Decimal;
    t[0x6F] = Divide;

    // ── Function keys (VK_F1=0x70 … VK_F24=0x87) ─────────────────────────────
    t[0x70] = F1;
    t[0x71] = F2;
    t[0x72] = F3;
    t[0x73] = F4;
    t[0x74] = F5;
    t[0x75] = F6;
    t[0x76] = F7;
    t[0x77] = F8;
    t[0x78] = F9;
    t[0x79] = F10;
    t[0x7A] = F11;
    t[0x7B] = F12;
    t[0x7C] = F13;
    t[0x7D] = F14;
    t[0x7E] = F15;
    t[0x7F] = F16;
    t[0x80] = F17;
    t[0x81] = F18;
    t[0x82] = F19;
    t[0x83] = F20;
    t[0x84] = F21;
    t[0x85] = F22;
    t[0x86] = F23;
    t[0x87] = F24;

    // ── Sided modifiers ──────────────────────────────────────────────────────
    // The generic VK_SHIFT / VK_CONTROL / VK_MENU codes are resolved by the
    // translator before this table is consulted.
    t[0xA0] = LeftShift;    // VK_LSHIFT
    t[0xA1] = RightShift;   // VK_RSHIFT
    t[0xA2] = LeftCtrl;     // VK_LCONTROL
    t[0xA3] = RightCtrl;    // VK_RCONTROL
    t[0xA4] = LeftAlt;      // VK_LMENU
    t[0xA5] = RightAlt;     // VK_RMENU
    t[0x5B] = LeftWin;      // VK_LWIN
    t[0x5C] = RightWin;     // VK_RWIN

    // ── Browser / media ──────────────────────────────────────────────────────
    t[0xA6] = BrowserBack;
    t[0xA7] = BrowserForward;
    t[0xA8] = BrowserRefresh;
    t[0xA9] = BrowserStop;
    t[0xAA] = BrowserSearch;
    t[0xAB] = BrowserFavorites;
    t[0xAC] = BrowserHome;
    t[0xAD] = VolumeMute;
    t[0xAE] = VolumeDown;
    t[0xAF] = VolumeUp;
    t[0xB0] = MediaNextTrack;
    t[0xB1] = MediaPreviousTrack;
    t[0xB2] = MediaStop;
    t[0xB3] = MediaPlayPause;
    t[0xB4] = LaunchMail;
    t[0xB5] = SelectMedia;
    t[0xB6] = LaunchApplication1;
    t[0xB7] = LaunchApplication2;

    // ── OEM / punctuation ────────────────────────────────────────────────────
    t[0xBA] = OemSemicolon;     // VK_OEM_1      (; :)
    t[0xBB] = OemPlus;          // VK_OEM_PLUS   (= +)
    t[0xBC] = OemComma;         // VK_OEM_COMMA  (, <)
    t[0xBD] = OemMinus;         // VK_OEM_MINUS  (- _)
    t[0xBE] = OemPeriod;        // VK_OEM_PERIOD (. >)
    t[0xBF] = OemQuestion;      // VK_OEM_2      (/ ?)
    t[0xC0] = OemTilde;         // VK_OEM_3      (` ~)
    t[0xDB] = OemOpenBrackets;  // VK_OEM_4      ([ {)
    t[0xDC] = OemPipe;          // VK_OEM_5      (\ |)
    t[0xDD] = OemCloseBrackets; // VK_OEM_6      (] })
    t[0xDE] = OemQuotes;        // VK_OEM_7      (' ")
    t[0xDF] = Oem8;             // VK_OEM_8
    t[0xE2] = OemBackslash;     // VK_OEM_102    (ISO extra key)

    t
};
