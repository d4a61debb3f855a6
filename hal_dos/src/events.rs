//! DOS keyboard and mouse event state
//!
//! Owns the keyboard interrupt installation, the scancode buffer it fills,
//! and the mouse polling state. The video driver calls `pump` once per
//! frame to turn both into input events.

use crate::keybuf::KeyBuffer;
use crate::keyboard::{keyboard_handler, KEYBOARD_VECTOR};
use crate::keymap::keysym_for;
use event_queue::{deliver, EventSink};
use hal::interrupts::{InstalledVector, InterruptError, InterruptVectors};
use hal::keyboard::{KeyboardController, RawKey, EXTENDED_PREFIX};
use hal::pointer::PointerDevice;
use input_types::{ButtonState, InputEvent, KeyEvent, MouseButton};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Physical mouse button index to logical button
pub const MOUSEMAP: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

/// DOS event errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DosEventsError {
    #[error("Failed to install keyboard handler: {0}")]
    Install(#[from] InterruptError),

    #[error("DOS events already initialized")]
    AlreadyInitialized,
}

/// Scancode decoder
///
/// Extended (0xE0-prefixed) keys are not decoded: the prefix and the byte
/// after it produce nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScancodeDecoder {
    extended_pending: bool,
}

impl ScancodeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the previous byte was an extended prefix
    pub fn extended_pending(&self) -> bool {
        self.extended_pending
    }

    /// Decodes one raw byte into a key event
    pub fn decode(&mut self, byte: u8) -> Option<KeyEvent> {
        if byte == EXTENDED_PREFIX {
            self.extended_pending = true;
            return None;
        }
        if self.extended_pending {
            self.extended_pending = false;
            return None;
        }

        let raw = RawKey::from_byte(byte);
        Some(KeyEvent::new(
            raw.scancode,
            keysym_for(raw.scancode),
            ButtonState::from_pressed(raw.pressed),
        ))
    }

    pub fn reset(&mut self) {
        self.extended_pending = false;
    }
}

/// Keyboard and mouse event state for one video device
pub struct DosEvents {
    buffer: Arc<KeyBuffer>,
    controller: Arc<dyn KeyboardController>,
    vectors: Arc<dyn InterruptVectors>,
    pointer: Box<dyn PointerDevice>,
    installed: Option<InstalledVector>,
    decoder: ScancodeDecoder,
    mouse_on: bool,
    num_buttons: u8,
    prev_buttons: u16,
}

impl DosEvents {
    /// Creates event state; nothing is installed until `init`
    pub fn new(
        controller: Arc<dyn KeyboardController>,
        vectors: Arc<dyn InterruptVectors>,
        pointer: Box<dyn PointerDevice>,
    ) -> Self {
        Self {
            buffer: Arc::new(KeyBuffer::new()),
            controller,
            vectors,
            pointer,
            installed: None,
            decoder: ScancodeDecoder::new(),
            mouse_on: false,
            num_buttons: 0,
            prev_buttons: 0,
        }
    }

    /// Probes the mouse and installs the keyboard handler.
    ///
    /// A missing mouse is not an error; pointer polling is simply disabled.
    pub fn init(&mut self) -> Result<(), DosEventsError> {
        if self.installed.is_some() {
            return Err(DosEventsError::AlreadyInitialized);
        }

        self.buffer.reset();
        self.decoder.reset();
        self.prev_buttons = 0;

        self.mouse_on = false;
        self.num_buttons = 0;
        let probed = self.pointer.reset();

        let buffer = self.buffer.clone();
        let controller = self.controller.clone();
        let installed = InstalledVector::install(self.vectors.clone(), KEYBOARD_VECTOR, |prev| {
            keyboard_handler(buffer, controller, prev)
        })?;
        self.installed = Some(installed);

        if let Some(buttons) = probed {
            self.mouse_on = true;
            self.num_buttons = buttons.min(MOUSEMAP.len() as u8);
        }

        tracing::info!(
            mouse = self.mouse_on,
            buttons = self.num_buttons,
            "DOS events initialized"
        );
        Ok(())
    }

    /// Delivers every pending keyboard and mouse event to `sink`
    pub fn pump(&mut self, sink: &mut dyn EventSink) {
        self.drain_keyboard(sink);
        self.poll_pointer(sink);
    }

    /// Decodes the scancodes buffered since the last drain
    pub fn drain_keyboard(&mut self, sink: &mut dyn EventSink) -> usize {
        let decoder = &mut self.decoder;
        self.buffer.drain(|byte| {
            if let Some(key) = decoder.decode(byte) {
                deliver(sink, InputEvent::Key(key));
            }
        })
    }

    /// Emits pointer motion and button changes
    pub fn poll_pointer(&mut self, sink: &mut dyn EventSink) {
        if !self.mouse_on {
            return;
        }

        let (dx, dy) = self.pointer.read_motion();
        if dx != 0 || dy != 0 {
            deliver(sink, InputEvent::motion(dx, dy));
        }

        let buttons = self.pointer.read_buttons();
        let changed = buttons ^ self.prev_buttons;
        for (i, button) in MOUSEMAP.iter().enumerate().take(self.num_buttons as usize) {
            let bit = 1u16 << i;
            if changed & bit != 0 {
                let state = ButtonState::from_pressed(buttons & bit != 0);
                deliver(sink, InputEvent::button(*button, state));
            }
        }
        self.prev_buttons = buttons;
    }

    /// Restores the previous keyboard handler and clears state.
    ///
    /// Safe to call more than once, and before `init`.
    pub fn quit(&mut self) {
        let Some(mut installed) = self.installed.take() else {
            return;
        };
        installed.restore();
        let dropped = self.buffer.dropped();
        if dropped > 0 {
            tracing::warn!(dropped, "scancodes lost to a full keyboard buffer");
        }
        self.buffer.reset();
        self.decoder.reset();
        self.mouse_on = false;
        self.prev_buttons = 0;
        tracing::info!("DOS events shut down");
    }

    pub fn is_initialized(&self) -> bool {
        self.installed.is_some()
    }

    pub fn mouse_enabled(&self) -> bool {
        self.mouse_on
    }

    /// Mouse buttons polled, clamped to the button map
    pub fn num_buttons(&self) -> u8 {
        self.num_buttons
    }

    /// Scancode buffer filled by the keyboard handler
    pub fn buffer(&self) -> &Arc<KeyBuffer> {
        &self.buffer
    }

    /// Scancodes dropped because the buffer was full
    pub fn dropped_scancodes(&self) -> u64 {
        self.buffer.dropped()
    }
}

impl Drop for DosEvents {
    fn drop(&mut self) {
        self.quit();
    }
}

impl fmt::Debug for DosEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DosEvents")
            .field("installed", &self.installed)
            .field("decoder", &self.decoder)
            .field("mouse_on", &self.mouse_on)
            .field("num_buttons", &self.num_buttons)
            .field("prev_buttons", &self.prev_buttons)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupts::SoftVectorTable;
    use crate::keybuf::KEYBUF_SIZE;
    use crate::keyboard::ScriptedController;
    use crate::mouse::ScriptedMouse;
    use hal::pointer::NoPointer;
    use input_types::KeySym;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Rig {
        events: DosEvents,
        controller: Arc<ScriptedController>,
        table: SoftVectorTable,
    }

    fn rig(pointer: Box<dyn PointerDevice>) -> Rig {
        let controller = Arc::new(ScriptedController::new());
        let table = SoftVectorTable::new();
        let events = DosEvents::new(controller.clone(), Arc::new(table.clone()), pointer);
        Rig {
            events,
            controller,
            table,
        }
    }

    impl Rig {
        fn type_bytes(&self, bytes: &[u8]) {
            self.controller.feed(bytes);
            for _ in bytes {
                self.table.raise(KEYBOARD_VECTOR).unwrap();
            }
        }
    }

    fn keys(events: &[InputEvent]) -> Vec<KeyEvent> {
        events.iter().filter_map(|e| e.as_key().copied()).collect()
    }

    #[test]
    fn test_decoder_press_and_release() {
        let mut decoder = ScancodeDecoder::new();
        let press = decoder.decode(0x1E).unwrap();
        let release = decoder.decode(0x9E).unwrap();

        assert_eq!(press, KeyEvent::pressed(0x1E, KeySym::A));
        assert_eq!(release, KeyEvent::released(0x1E, KeySym::A));
    }

    #[test]
    fn test_decoder_discards_extended_pair() {
        let mut decoder = ScancodeDecoder::new();
        assert_eq!(decoder.decode(0xE0), None);
        assert!(decoder.extended_pending());
        assert_eq!(decoder.decode(0x48), None);
        assert!(!decoder.extended_pending());
        assert!(decoder.decode(0x48).is_some());
    }

    #[test]
    fn test_decoder_unknown_still_emits() {
        let mut decoder = ScancodeDecoder::new();
        let event = decoder.decode(0x7F).unwrap();
        assert_eq!(event.sym, KeySym::Unknown);
        assert_eq!(event.scancode, 0x7F);
        assert!(event.is_pressed());

        let event = decoder.decode(0xFF).unwrap();
        assert_eq!(event.sym, KeySym::Unknown);
        assert!(event.is_released());
    }

    #[test]
    fn test_init_installs_and_quit_restores() {
        let mut rig = rig(Box::new(NoPointer));
        let bios_hits = Arc::new(AtomicUsize::new(0));
        let counter = bios_hits.clone();
        rig.table
            .set_vector(KEYBOARD_VECTOR, Some(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })))
            .unwrap();

        rig.events.init().unwrap();
        assert!(rig.events.is_initialized());

        rig.type_bytes(&[0x1E]);
        assert_eq!(bios_hits.load(Ordering::SeqCst), 1);
        assert_eq!(rig.events.buffer().len(), 1);

        rig.events.quit();
        assert!(!rig.events.is_initialized());
        rig.table.raise(KEYBOARD_VECTOR).unwrap();
        assert_eq!(bios_hits.load(Ordering::SeqCst), 2);
        assert!(rig.events.buffer().is_empty());

        rig.events.quit();
    }

    #[test]
    fn test_double_init_fails() {
        let mut rig = rig(Box::new(NoPointer));
        rig.events.init().unwrap();
        assert_eq!(rig.events.init(), Err(DosEventsError::AlreadyInitialized));
    }

    struct LockedTable;

    impl InterruptVectors for LockedTable {
        fn vector(&self, _vector: u8) -> Option<hal::interrupts::InterruptHandler> {
            None
        }

        fn set_vector(
            &self,
            vector: u8,
            _handler: Option<hal::interrupts::InterruptHandler>,
        ) -> Result<(), InterruptError> {
            Err(InterruptError::Reserved(vector))
        }
    }

    #[test]
    fn test_failed_init_leaves_mouse_disabled() {
        let mut mouse = ScriptedMouse::present(2);
        mouse.push_motion(5, -3);
        mouse.set_buttons(0b001);
        let controller = Arc::new(ScriptedController::new());
        let mut events = DosEvents::new(controller, Arc::new(LockedTable), Box::new(mouse));

        assert_eq!(
            events.init(),
            Err(DosEventsError::Install(InterruptError::Reserved(KEYBOARD_VECTOR)))
        );
        assert!(!events.is_initialized());
        assert!(!events.mouse_enabled());
        assert_eq!(events.num_buttons(), 0);

        let mut sink = Vec::new();
        events.pump(&mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_drop_restores_handler() {
        let rig = rig(Box::new(NoPointer));
        let table = rig.table.clone();
        let mut events = rig.events;
        events.init().unwrap();
        assert!(table.is_installed(KEYBOARD_VECTOR));

        drop(events);
        assert!(!table.is_installed(KEYBOARD_VECTOR));
    }

    #[test]
    fn test_pump_keys_in_order() {
        let mut rig = rig(Box::new(NoPointer));
        rig.events.init().unwrap();
        rig.type_bytes(&[0x1E, 0x9E]);

        let mut sink = Vec::new();
        rig.events.pump(&mut sink);

        assert_eq!(
            keys(&sink),
            vec![
                KeyEvent::pressed(0x1E, KeySym::A),
                KeyEvent::released(0x1E, KeySym::A),
            ]
        );
    }

    #[test]
    fn test_second_pump_is_empty() {
        let mut rig = rig(Box::new(NoPointer));
        rig.events.init().unwrap();
        rig.type_bytes(&[0x10, 0x90, 0x11]);

        let mut first = Vec::new();
        rig.events.pump(&mut first);
        let mut second = Vec::new();
        rig.events.pump(&mut second);

        assert_eq!(first.len(), 3);
        assert!(second.is_empty());
    }

    #[test]
    fn test_extended_prefix_spans_pumps() {
        let mut rig = rig(Box::new(NoPointer));
        rig.events.init().unwrap();

        let mut sink = Vec::new();
        rig.type_bytes(&[0xE0]);
        rig.events.pump(&mut sink);
        rig.type_bytes(&[0x4B, 0x1E]);
        rig.events.pump(&mut sink);

        assert_eq!(keys(&sink), vec![KeyEvent::pressed(0x1E, KeySym::A)]);
    }

    #[test]
    fn test_full_buffer_yields_capacity_minus_one() {
        let mut rig = rig(Box::new(NoPointer));
        rig.events.init().unwrap();
        rig.type_bytes(&[0x1E; KEYBUF_SIZE]);

        let mut sink = Vec::new();
        rig.events.pump(&mut sink);

        assert_eq!(sink.len(), KEYBUF_SIZE - 1);
        assert_eq!(rig.events.dropped_scancodes(), 1);
        assert_eq!(rig.controller.acks(), KEYBUF_SIZE);
    }

    #[test]
    fn test_pointer_initial_press() {
        let mut mouse = ScriptedMouse::present(3);
        mouse.set_buttons(0b001);
        let mut rig = rig(Box::new(mouse));
        rig.events.init().unwrap();
        assert!(rig.events.mouse_enabled());

        let mut sink = Vec::new();
        rig.events.pump(&mut sink);
        assert_eq!(
            sink,
            vec![InputEvent::button(MouseButton::Left, ButtonState::Pressed)]
        );
    }

    #[test]
    fn test_pointer_poll_delta() {
        struct Fixed {
            buttons: u16,
        }
        impl PointerDevice for Fixed {
            fn reset(&mut self) -> Option<u8> {
                Some(3)
            }
            fn read_motion(&mut self) -> (i16, i16) {
                (5, -3)
            }
            fn read_buttons(&mut self) -> u16 {
                self.buttons
            }
        }

        let mut rig = rig(Box::new(Fixed { buttons: 0b101 }));
        rig.events.init().unwrap();
        rig.events.prev_buttons = 0b001;

        let mut sink = Vec::new();
        rig.events.poll_pointer(&mut sink);

        assert_eq!(
            sink,
            vec![
                InputEvent::motion(5, -3),
                InputEvent::button(MouseButton::Middle, ButtonState::Pressed),
            ]
        );
    }

    #[test]
    fn test_button_count_clamped() {
        let mut mouse = ScriptedMouse::present(5);
        mouse.set_buttons(0b11000);
        let mut rig = rig(Box::new(mouse));
        rig.events.init().unwrap();
        assert_eq!(rig.events.num_buttons(), 3);

        let mut sink = Vec::new();
        rig.events.pump(&mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_absent_mouse_is_not_polled() {
        let mut rig = rig(Box::new(ScriptedMouse::absent()));
        rig.events.init().unwrap();
        assert!(!rig.events.mouse_enabled());

        let mut sink = Vec::new();
        rig.events.pump(&mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_quit_before_init_is_noop() {
        let mut rig = rig(Box::new(NoPointer));
        rig.events.quit();
        assert!(!rig.events.is_initialized());
    }
}
