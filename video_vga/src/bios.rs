//! INT 10h video BIOS calls.

use std::sync::{Arc, Mutex};

/// 320x200, 256 colors
pub const MODE_13H: u8 = 0x13;

/// 80x25 color text
pub const MODE_TEXT: u8 = 0x03;

/// Video BIOS services used by the VGA driver
pub trait VideoBios: Send {
    /// INT 10h AH=00h: set video mode
    fn set_mode(&mut self, mode: u8);
}

/// BIOS that records mode switches, for tests
///
/// Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingBios {
    modes: Arc<Mutex<Vec<u8>>>,
}

impl RecordingBios {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modes set so far, oldest first
    pub fn modes(&self) -> Vec<u8> {
        self.modes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl VideoBios for RecordingBios {
    fn set_mode(&mut self, mode: u8) {
        self.modes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(mode);
    }
}
