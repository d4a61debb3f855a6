//! PS/2 keyboard interrupt producer
//!
//! The interrupt half of the keyboard pipeline: read one byte, acknowledge
//! the PIC, store the byte, chain. Decoding is the pump's job.

use crate::keybuf::KeyBuffer;
use crate::port_io::{PortIo, KEYBOARD_DATA_PORT, PIC1_COMMAND_PORT, PIC_EOI};
use hal::interrupts::InterruptHandler;
use hal::keyboard::KeyboardController;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Keyboard hardware interrupt vector (IRQ 1)
pub const KEYBOARD_VECTOR: u8 = 9;

/// PS/2 controller reached through port I/O
#[derive(Debug)]
pub struct Ps2Controller<P: PortIo> {
    io: P,
}

impl<P: PortIo> Ps2Controller<P> {
    pub fn new(io: P) -> Self {
        Self { io }
    }

    /// Returns the underlying port I/O
    pub fn io(&self) -> &P {
        &self.io
    }
}

impl<P: PortIo> KeyboardController for Ps2Controller<P> {
    fn read_scancode(&self) -> u8 {
        self.io.inb(KEYBOARD_DATA_PORT)
    }

    fn acknowledge(&self) {
        self.io.outb(PIC1_COMMAND_PORT, PIC_EOI);
    }
}

/// Controller fed from a script, for tests
///
/// Reading with an empty script yields 0x00.
#[derive(Debug, Default)]
pub struct ScriptedController {
    scancodes: Mutex<VecDeque<u8>>,
    acks: AtomicUsize,
}

impl ScriptedController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues scancodes for subsequent interrupts
    pub fn feed(&self, bytes: &[u8]) {
        self.scancodes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(bytes.iter().copied());
    }

    /// Number of scancodes not yet read
    pub fn pending(&self) -> usize {
        self.scancodes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Number of end-of-interrupt acknowledgements sent
    pub fn acks(&self) -> usize {
        self.acks.load(Ordering::SeqCst)
    }
}

impl KeyboardController for ScriptedController {
    fn read_scancode(&self) -> u8 {
        self.scancodes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(0)
    }

    fn acknowledge(&self) {
        self.acks.fetch_add(1, Ordering::SeqCst);
    }
}

/// Builds the keyboard interrupt handler.
///
/// The handler reads one scancode, acknowledges the interrupt, stores the
/// byte (dropping it if the buffer is full) and chains to `previous`. It
/// never allocates, logs or blocks.
pub fn keyboard_handler(
    buffer: Arc<KeyBuffer>,
    controller: Arc<dyn KeyboardController>,
    previous: Option<InterruptHandler>,
) -> InterruptHandler {
    Arc::new(move || {
        let scancode = controller.read_scancode();
        controller.acknowledge();
        buffer.push(scancode);
        if let Some(previous) = &previous {
            previous();
        }
    })
}
