//! INT 33h mouse driver interface
//!
//! Talks to a resident mouse driver through its software interrupt. Only
//! the three functions the event pump needs are used.

use hal::pointer::PointerDevice;
use std::collections::VecDeque;

/// Mouse driver software interrupt
pub const MOUSE_INTERRUPT: u8 = 0x33;

/// Reset driver and read status
pub const FN_RESET: u16 = 0x00;

/// Get button status and position
pub const FN_GET_BUTTONS: u16 = 0x03;

/// Read motion counters
pub const FN_READ_MOTION: u16 = 0x0B;

/// Register block passed to and returned from INT 33h
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int33Regs {
    pub ax: u16,
    pub bx: u16,
    pub cx: u16,
    pub dx: u16,
}

impl Int33Regs {
    /// Registers for calling function `ax`
    pub fn function(ax: u16) -> Self {
        Self {
            ax,
            ..Self::default()
        }
    }
}

/// Issues INT 33h calls
pub trait MouseInterrupt: Send {
    fn int33(&mut self, regs: Int33Regs) -> Int33Regs;
}

/// Pointer device backed by an INT 33h mouse driver
#[derive(Debug)]
pub struct Int33Mouse<M: MouseInterrupt> {
    driver: M,
}

impl<M: MouseInterrupt> Int33Mouse<M> {
    pub fn new(driver: M) -> Self {
        Self { driver }
    }

    /// Returns the underlying driver
    pub fn driver(&self) -> &M {
        &self.driver
    }
}

impl<M: MouseInterrupt> PointerDevice for Int33Mouse<M> {
    fn reset(&mut self) -> Option<u8> {
        let out = self.driver.int33(Int33Regs::function(FN_RESET));
        if out.ax == 0 {
            return None;
        }
        Some(out.bx.min(u16::from(u8::MAX)) as u8)
    }

    fn read_motion(&mut self) -> (i16, i16) {
        let out = self.driver.int33(Int33Regs::function(FN_READ_MOTION));
        (out.cx as i16, out.dx as i16)
    }

    fn read_buttons(&mut self) -> u16 {
        self.driver.int33(Int33Regs::function(FN_GET_BUTTONS)).bx
    }
}

/// Mouse driver answering from scripted state, for tests
///
/// Motion reads consume queued deltas (then read zero); button reads return
/// the current mask.
#[derive(Debug, Default)]
pub struct ScriptedMouse {
    present: bool,
    buttons: u16,
    button_count: u16,
    motion: VecDeque<(i16, i16)>,
    calls: Vec<u16>,
}

impl ScriptedMouse {
    /// A mouse with `button_count` buttons
    pub fn present(button_count: u16) -> Self {
        Self {
            present: true,
            button_count,
            ..Self::default()
        }
    }

    /// No mouse driver installed
    pub fn absent() -> Self {
        Self::default()
    }

    /// Queues a motion delta for the next motion read
    pub fn push_motion(&mut self, dx: i16, dy: i16) {
        self.motion.push_back((dx, dy));
    }

    /// Sets the button mask reported from now on
    pub fn set_buttons(&mut self, mask: u16) {
        self.buttons = mask;
    }

    /// Function numbers called so far
    pub fn calls(&self) -> &[u16] {
        &self.calls
    }
}

impl MouseInterrupt for ScriptedMouse {
    fn int33(&mut self, regs: Int33Regs) -> Int33Regs {
        self.calls.push(regs.ax);
        match regs.ax {
            FN_RESET if self.present => Int33Regs {
                ax: 0xFFFF,
                bx: self.button_count,
                ..regs
            },
            FN_RESET => Int33Regs::default(),
            FN_READ_MOTION => {
                let (dx, dy) = self.motion.pop_front().unwrap_or((0, 0));
                Int33Regs {
                    cx: dx as u16,
                    dx: dy as u16,
                    ..regs
                }
            }
            FN_GET_BUTTONS => Int33Regs {
                bx: self.buttons,
                ..regs
            },
            _ => regs,
        }
    }
}

impl PointerDevice for ScriptedMouse {
    fn reset(&mut self) -> Option<u8> {
        Int33Mouse::new(&mut *self).reset()
    }

    fn read_motion(&mut self) -> (i16, i16) {
        Int33Mouse::new(&mut *self).read_motion()
    }

    fn read_buttons(&mut self) -> u16 {
        Int33Mouse::new(&mut *self).read_buttons()
    }
}

impl<M: MouseInterrupt + ?Sized> MouseInterrupt for &mut M {
    fn int33(&mut self, regs: Int33Regs) -> Int33Regs {
        (**self).int33(regs)
    }
}
