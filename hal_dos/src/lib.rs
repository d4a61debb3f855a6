//! # DOS Hardware Abstraction Layer
//!
//! This crate implements the HAL traits for DOS on PC hardware: the
//! interrupt-driven keyboard pipeline, the INT 33h mouse, and `clock()`
//! based timing.
//!
//! ## Keyboard pipeline
//!
//! The keyboard interrupt (vector 9) stores raw scancodes in a
//! [`KeyBuffer`]; [`DosEvents::pump`] drains and decodes them on the
//! application's schedule, then polls the mouse.

pub mod events;
pub mod interrupts;
pub mod keybuf;
pub mod keyboard;
pub mod keymap;
pub mod mouse;
pub mod port_io;
pub mod timer;

pub use events::{DosEvents, DosEventsError, ScancodeDecoder, MOUSEMAP};
pub use interrupts::SoftVectorTable;
pub use keybuf::{KeyBuffer, KEYBUF_MASK, KEYBUF_SIZE};
pub use keyboard::{keyboard_handler, Ps2Controller, ScriptedController, KEYBOARD_VECTOR};
pub use keymap::{keysym_for, KEYMAP};
pub use mouse::{Int33Mouse, Int33Regs, MouseInterrupt, ScriptedMouse};
pub use port_io::{FakePortIo, PortIo};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use port_io::RealPortIo;
pub use timer::{DosTimer, StdProcessClock};
