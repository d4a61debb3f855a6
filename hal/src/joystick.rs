//! # Joystick
//!
//! Hardware abstraction for polled joysticks.
//!
//! Drivers compare the device state against the last state they saw and
//! deliver axis and button changes as joystick input events.

use event_queue::EventSink;
use thiserror::Error;

/// Joystick errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoystickError {
    #[error("Unable to get name of joystick {0}")]
    NoName(usize),

    #[error("Invalid data returned from {0}")]
    InvalidDeviceInfo(&'static str),

    #[error("Joystick {0} is not open")]
    NotOpen(usize),
}

/// Controls an opened joystick exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickCaps {
    pub num_axes: u8,
    pub num_buttons: u8,
    pub num_hats: u8,
    pub num_balls: u8,
}

/// Joystick driver trait
pub trait JoystickDriver {
    /// Scans for joysticks and returns how many were found
    fn init(&mut self) -> usize;

    /// Device name of joystick `index`
    fn name(&self, index: usize) -> Result<&str, JoystickError>;

    /// Opens joystick `index`
    fn open(&mut self, index: usize) -> Result<JoystickCaps, JoystickError>;

    /// Polls joystick `index`, delivering any changes to `sink`
    fn update(&mut self, index: usize, sink: &mut dyn EventSink);

    /// Releases joystick `index`
    fn close(&mut self, index: usize);

    /// Forgets every detected joystick
    fn quit(&mut self);
}
