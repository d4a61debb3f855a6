//! # Pointer Device
//!
//! Hardware abstraction for relative pointing devices (mice).
//!
//! ## Philosophy
//!
//! - **Polled, not pushed**: The driver asks for motion and buttons once per
//!   pump cycle
//! - **Raw values**: Motion counters and button bits come back untranslated
//!
//! ## Non-Goals
//!
//! - Acceleration, absolute positioning or cursor clipping
//! - Mapping physical buttons to logical ones (the driver owns that)

/// Pointer device trait
pub trait PointerDevice: Send {
    /// Resets the device and probes for presence.
    ///
    /// Returns the number of physical buttons, or `None` when no device is
    /// attached.
    fn reset(&mut self) -> Option<u8>;

    /// Returns motion since the previous call as `(dx, dy)`
    fn read_motion(&mut self) -> (i16, i16);

    /// Returns the current button bitmask (bit 0 = first physical button)
    fn read_buttons(&mut self) -> u16;
}

/// Pointer with no hardware behind it
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPointer;

impl PointerDevice for NoPointer {
    fn reset(&mut self) -> Option<u8> {
        None
    }

    fn read_motion(&mut self) -> (i16, i16) {
        (0, 0)
    }

    fn read_buttons(&mut self) -> u16 {
        0
    }
}
