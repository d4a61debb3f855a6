#![no_std]

//! # Input Types
//!
//! This crate defines the normalized input events produced by the platform
//! backends and consumed by the event queue.
//!
//! ## Philosophy
//!
//! - **Events, not bytes**: Backends decode raw scancodes, mouse registers and
//!   joystick words before anything leaves the driver
//! - **Device-relative symbols**: Key symbols describe the physical key, not text
//! - **Testable**: Events are serializable and can be injected for testing
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - Raw hardware scancodes (those stay inside the backend)
//! - Modifier tracking or text input (modifiers are carried, never computed here)
//! - An event queue (see the `event_queue` crate)

extern crate alloc;

use bitflags::bitflags;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Input event
///
/// Represents a single state change from any input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Keyboard key pressed or released
    Key(KeyEvent),
    /// Relative pointer motion
    MouseMotion { xrel: i16, yrel: i16 },
    /// Pointer button pressed or released
    MouseButton {
        button: MouseButton,
        state: ButtonState,
    },
    /// Joystick axis moved
    JoyAxis { device: u8, axis: u8, value: i16 },
    /// Joystick button pressed or released
    JoyButton {
        device: u8,
        button: u8,
        state: ButtonState,
    },
}

impl InputEvent {
    /// Creates a key event
    pub fn key(event: KeyEvent) -> Self {
        Self::Key(event)
    }

    /// Creates a relative motion event
    pub fn motion(xrel: i16, yrel: i16) -> Self {
        Self::MouseMotion { xrel, yrel }
    }

    /// Creates a mouse button event
    pub fn button(button: MouseButton, state: ButtonState) -> Self {
        Self::MouseButton { button, state }
    }

    /// Returns true if this is a key event
    pub fn is_key(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Returns the key event if this is a key event
    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(event) => Some(event),
            _ => None,
        }
    }
}

/// Keyboard event
///
/// One decoded key transition. `unicode` is 0 when the backend does not
/// translate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Hardware scancode with the break bit stripped
    pub scancode: u8,
    /// Device-relative key symbol
    pub sym: KeySym,
    /// Modifier keys that were active
    pub modifiers: KeyMod,
    /// Text codepoint, 0 if none
    pub unicode: u16,
    /// Pressed or released
    pub state: ButtonState,
}

impl KeyEvent {
    /// Creates a new key event with no modifiers and no text
    pub fn new(scancode: u8, sym: KeySym, state: ButtonState) -> Self {
        Self {
            scancode,
            sym,
            modifiers: KeyMod::NONE,
            unicode: 0,
            state,
        }
    }

    /// Creates a key pressed event
    pub fn pressed(scancode: u8, sym: KeySym) -> Self {
        Self::new(scancode, sym, ButtonState::Pressed)
    }

    /// Creates a key released event
    pub fn released(scancode: u8, sym: KeySym) -> Self {
        Self::new(scancode, sym, ButtonState::Released)
    }

    /// Returns true if this is a press event
    pub fn is_pressed(&self) -> bool {
        self.state == ButtonState::Pressed
    }

    /// Returns true if this is a release event
    pub fn is_released(&self) -> bool {
        self.state == ButtonState::Released
    }
}

/// Pressed/released state shared by keys and buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonState {
    Pressed,
    Released,
}

impl ButtonState {
    /// Maps a "bit is set" flag to a state.
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Self::Pressed
        } else {
            Self::Released
        }
    }
}

impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pressed => write!(f, "pressed"),
            Self::Released => write!(f, "released"),
        }
    }
}

/// Logical mouse button
///
/// Discriminants are the library's button indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MouseButton {
    Left = 1,
    Middle = 2,
    Right = 3,
}

impl MouseButton {
    /// Returns the logical button index
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the bit this button occupies in a button mask
    pub const fn mask(self) -> u8 {
        1 << (self as u8 - 1)
    }
}

/// Key symbol
///
/// Device-relative key identifiers. Discriminants follow the library's
/// historical key symbol numbering, so printable keys equal their ASCII code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KeySym {
    Unknown = 0,
    Backspace = 8,
    Tab = 9,
    Return = 13,
    Escape = 27,
    Space = 32,
    Quote = 39,
    Comma = 44,
    Minus = 45,
    Period = 46,
    Slash = 47,
    Num0 = 48,
    Num1 = 49,
    Num2 = 50,
    Num3 = 51,
    Num4 = 52,
    Num5 = 53,
    Num6 = 54,
    Num7 = 55,
    Num8 = 56,
    Num9 = 57,
    Semicolon = 59,
    Less = 60,
    Equals = 61,
    LeftBracket = 91,
    Backslash = 92,
    RightBracket = 93,
    Backquote = 96,
    A = 97,
    B = 98,
    C = 99,
    D = 100,
    E = 101,
    F = 102,
    G = 103,
    H = 104,
    I = 105,
    J = 106,
    K = 107,
    L = 108,
    M = 109,
    N = 110,
    O = 111,
    P = 112,
    Q = 113,
    R = 114,
    S = 115,
    T = 116,
    U = 117,
    V = 118,
    W = 119,
    X = 120,
    Y = 121,
    Z = 122,
    Delete = 127,
    Up = 273,
    Down = 274,
    Right = 275,
    Left = 276,
    Insert = 277,
    Home = 278,
    End = 279,
    PageUp = 280,
    PageDown = 281,
    F1 = 282,
    F2 = 283,
    F3 = 284,
    F4 = 285,
    F5 = 286,
    F6 = 287,
    F7 = 288,
    F8 = 289,
    F9 = 290,
    F10 = 291,
    F11 = 292,
    F12 = 293,
    NumLock = 300,
    CapsLock = 301,
    ScrollLock = 302,
    RightShift = 303,
    LeftShift = 304,
    RightCtrl = 305,
    LeftCtrl = 306,
    RightAlt = 307,
    LeftAlt = 308,
}

impl KeySym {
    /// Returns the numeric symbol value
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Returns true for the null symbol
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }
}

impl fmt::Display for KeySym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

bitflags! {
    /// Modifier key mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct KeyMod: u16 {
        const LSHIFT = 0x0001;
        const RSHIFT = 0x0002;
        const LCTRL = 0x0040;
        const RCTRL = 0x0080;
        const LALT = 0x0100;
        const RALT = 0x0200;
        const LMETA = 0x0400;
        const RMETA = 0x0800;
        const NUM = 0x1000;
        const CAPS = 0x2000;
        const MODE = 0x4000;

        const SHIFT = Self::LSHIFT.bits() | Self::RSHIFT.bits();
        const CTRL = Self::LCTRL.bits() | Self::RCTRL.bits();
        const ALT = Self::LALT.bits() | Self::RALT.bits();
        const META = Self::LMETA.bits() | Self::RMETA.bits();
    }
}

impl KeyMod {
    /// No modifiers
    pub const NONE: Self = Self::empty();
}

impl Default for KeyMod {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_input_event_key() {
        let key_event = KeyEvent::pressed(0x1E, KeySym::A);
        let event = InputEvent::key(key_event);

        assert!(event.is_key());
        assert_eq!(event.as_key(), Some(&key_event));
        assert!(InputEvent::motion(1, 2).as_key().is_none());
    }

    #[test]
    fn test_key_event_defaults() {
        let event = KeyEvent::released(0x10, KeySym::Q);

        assert!(event.is_released());
        assert!(!event.is_pressed());
        assert_eq!(event.modifiers, KeyMod::NONE);
        assert_eq!(event.unicode, 0);
        assert_eq!(event.scancode, 0x10);
    }

    #[test]
    fn test_button_state_from_pressed() {
        assert_eq!(ButtonState::from_pressed(true), ButtonState::Pressed);
        assert_eq!(ButtonState::from_pressed(false), ButtonState::Released);
        assert_eq!(ButtonState::Pressed.to_string(), "pressed");
        assert_eq!(ButtonState::Released.to_string(), "released");
    }

    #[test]
    fn test_mouse_button_indices() {
        assert_eq!(MouseButton::Left.index(), 1);
        assert_eq!(MouseButton::Middle.index(), 2);
        assert_eq!(MouseButton::Right.index(), 3);
        assert_eq!(MouseButton::Right.mask(), 0b100);
    }

    #[test]
    fn test_keysym_ascii_values() {
        assert_eq!(KeySym::A.code(), b'a' as u16);
        assert_eq!(KeySym::Num0.code(), b'0' as u16);
        assert_eq!(KeySym::Space.code(), b' ' as u16);
        assert!(KeySym::Unknown.is_unknown());
        assert!(!KeySym::Escape.is_unknown());
    }

    #[test]
    fn test_keymod_groups() {
        let mods = KeyMod::LSHIFT | KeyMod::RCTRL;
        assert!(mods.intersects(KeyMod::SHIFT));
        assert!(mods.intersects(KeyMod::CTRL));
        assert!(!mods.intersects(KeyMod::ALT));
        assert!(KeyMod::default().is_empty());
    }

    #[test]
    fn test_key_event_serialization() {
        let event = KeyEvent::pressed(0x1C, KeySym::Return);
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: KeyEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_input_event_serialization() {
        let events = [
            InputEvent::motion(5, -3),
            InputEvent::button(MouseButton::Middle, ButtonState::Pressed),
            InputEvent::JoyAxis {
                device: 0,
                axis: 1,
                value: -256,
            },
        ];

        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let deserialized: InputEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event, deserialized);
        }
    }
}
