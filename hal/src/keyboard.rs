//! Keyboard controller abstraction
//!
//! This module provides a hardware abstraction for scancode-producing keyboard
//! controllers. It defines the interface that platform implementations must
//! provide to the interrupt-context producer.
//!
//! ## Philosophy
//!
//! - **Hardware is just a source**: Controllers hand out raw Set 1 bytes
//! - **Interrupt-safe**: Every method takes `&self` and must not block
//! - **Testable**: Can mock hardware via fake implementations
//!
//! Decoding (prefix handling, break bit, symbol lookup) happens in the
//! consumer, never here.

/// Extended-key prefix byte (Set 1)
pub const EXTENDED_PREFIX: u8 = 0xE0;

/// Bit set on break (release) codes
pub const BREAK_BIT: u8 = 0x80;

/// Mask leaving the 7-bit make code
pub const SCANCODE_MASK: u8 = 0x7F;

/// Raw key transition split out of one Set 1 byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKey {
    /// 7-bit make code
    pub scancode: u8,
    /// Whether the key was pressed (true) or released (false)
    pub pressed: bool,
}

impl RawKey {
    /// Splits a make/break byte into scancode and direction
    pub fn from_byte(byte: u8) -> Self {
        Self {
            scancode: byte & SCANCODE_MASK,
            pressed: byte & BREAK_BIT == 0,
        }
    }

    /// Returns true if this is a key press
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Returns true if this is a key release
    pub fn is_released(&self) -> bool {
        !self.pressed
    }
}

/// Keyboard controller trait
///
/// Called from interrupt context once per keyboard interrupt.
///
/// ## Implementation Notes
///
/// - **Non-blocking**: Both methods return immediately
/// - **Shared**: Implementations are `Send + Sync`; the interrupt handler and
///   the driver hold the same instance
pub trait KeyboardController: Send + Sync {
    /// Reads the pending scancode byte from the controller
    fn read_scancode(&self) -> u8;

    /// Signals end-of-interrupt to the interrupt controller
    fn acknowledge(&self);
}
