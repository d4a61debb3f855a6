//! Set 1 scancode to key symbol table for the US PC keyboard.

use input_types::KeySym;
use input_types::KeySym::*;

/// Number of entries in [`KEYMAP`]
pub const KEYMAP_LEN: usize = 0x7F;

/// Make code to key symbol. Unlisted codes map to `Unknown`.
pub static KEYMAP: [KeySym; KEYMAP_LEN] = build_keymap();

const fn build_keymap() -> [KeySym; KEYMAP_LEN] {
    let mut map = [Unknown; KEYMAP_LEN];
    let rows: [KeySym; 0x59] = [
        // 0x00
        Unknown, Escape, Num1, Num2, Num3, Num4, Num5, Num6,
        // 0x08
        Num7, Num8, Num9, Num0, Minus, Equals, Backspace, Tab,
        // 0x10
        Q, W, E, R, T, Y, U, I,
        // 0x18
        O, P, LeftBracket, RightBracket, Return, LeftCtrl, A, S,
        // 0x20
        D, F, G, H, J, K, L, Semicolon,
        // 0x28
        Quote, Backquote, LeftShift, Backslash, Z, X, C, V,
        // 0x30
        B, N, M, Comma, Period, Slash, RightShift, Unknown,
        // 0x38
        LeftAlt, Space, CapsLock, F1, F2, F3, F4, F5,
        // 0x40
        F6, F7, F8, F9, F10, NumLock, ScrollLock, Home,
        // 0x48
        Up, PageUp, Unknown, Left, Unknown, Right, Unknown, End,
        // 0x50
        Down, PageDown, Insert, Delete, Unknown, Unknown, Less, F11,
        // 0x58
        F12,
    ];
    let mut i = 0;
    while i < rows.len() {
        map[i] = rows[i];
        i += 1;
    }
    map
}

/// Looks up the symbol for a 7-bit make code.
///
/// 0x7F lies past the end of the table and maps to `Unknown`.
pub fn keysym_for(scancode: u8) -> KeySym {
    KEYMAP
        .get(usize::from(scancode))
        .copied()
        .unwrap_or(Unknown)
}
