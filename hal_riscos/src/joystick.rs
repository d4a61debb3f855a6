//! Joysticks through `Joystick_Read`
//!
//! The module reports each joystick as one packed word: signed y in byte
//! 0, signed x in byte 1 and up to eight buttons in byte 2. Newer modules
//! also enumerate devices; records grow over module versions, so fields
//! are only read when the reported record size covers them.

use crate::swi::{swi_name, DeviceRecord, JoystickSwis, JOYSTICK_READ};
use event_queue::{deliver, EventSink};
use hal::joystick::{JoystickCaps, JoystickDriver, JoystickError};
use input_types::{ButtonState, InputEvent};
use std::collections::HashMap;

/// Most joysticks the driver tracks
pub const MAX_JOYSTICKS: usize = 255;

/// Reason code enumerating every device
pub const ENUMERATE_ALL: u32 = 0x2FF;

/// Reason code reading the record of one device
pub const ENUMERATE_ONE: u32 = 0x200;

/// End of the product pointer within a device record
pub const RECORD_PRODUCT_END: usize = 16;

/// End of the axis count within a device record
pub const RECORD_NUM_AXES_END: usize = 24;

/// End of the button count within a device record
pub const RECORD_NUM_BUTTONS_END: usize = 28;

const DEFAULT_AXES: u8 = 2;
const DEFAULT_BUTTONS: u8 = 8;
const STATE_BUTTONS: u8 = 8;

/// Name used when the module has no product string for a device
pub fn default_joystick_name(index: usize) -> String {
    format!("RISC OS Joystick {}", index)
}

fn has_entry(record_size: usize, entry_end: usize) -> bool {
    record_size >= entry_end
}

/// Byte `shift` of the state word as a signed axis position
fn axis_byte(state: u32, shift: u32) -> i32 {
    i32::from(((state >> shift) & 0xFF) as u8 as i8)
}

fn axis_value(position: i32) -> i16 {
    (position * 256).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn count(value: i32) -> u8 {
    value.clamp(0, i32::from(u8::MAX)) as u8
}

#[derive(Debug, Clone, Copy)]
struct OpenJoystick {
    id: u32,
    state: u32,
    caps: JoystickCaps,
}

/// Joystick driver for RISC OS
#[derive(Debug)]
pub struct RiscOsJoystick<S: JoystickSwis> {
    swis: S,
    names: Vec<String>,
    open: HashMap<usize, OpenJoystick>,
}

impl<S: JoystickSwis> RiscOsJoystick<S> {
    pub fn new(swis: S) -> Self {
        Self {
            swis,
            names: Vec::new(),
            open: HashMap::new(),
        }
    }

    pub fn swis(&self) -> &S {
        &self.swis
    }

    pub fn swis_mut(&mut self) -> &mut S {
        &mut self.swis
    }

    /// Whether joystick `index` is open
    pub fn is_open(&self, index: usize) -> bool {
        self.open.contains_key(&index)
    }

    fn record_name(size: usize, index: usize, record: &DeviceRecord) -> String {
        match &record.product {
            Some(product) if has_entry(size, RECORD_PRODUCT_END) => product.clone(),
            _ => default_joystick_name(index),
        }
    }
}

impl<S: JoystickSwis> JoystickDriver for RiscOsJoystick<S> {
    fn init(&mut self) -> usize {
        self.names.clear();
        if let Err(err) = self.swis.read_state(0) {
            tracing::debug!(%err, "no joystick present");
            return 0;
        }

        match self.swis.read_info(ENUMERATE_ALL) {
            Ok(info) => {
                self.names = info
                    .records
                    .iter()
                    .take(MAX_JOYSTICKS)
                    .enumerate()
                    .map(|(index, record)| Self::record_name(info.size, index, record))
                    .collect();
            }
            Err(err) => {
                tracing::debug!(%err, "joystick enumeration unavailable, assuming one");
                self.names.push(default_joystick_name(0));
            }
        }
        tracing::info!(count = self.names.len(), "joysticks detected");
        self.names.len()
    }

    fn name(&self, index: usize) -> Result<&str, JoystickError> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or(JoystickError::NoName(index))
    }

    fn open(&mut self, index: usize) -> Result<JoystickCaps, JoystickError> {
        if index >= self.names.len() {
            return Err(JoystickError::NoName(index));
        }
        let mut caps = JoystickCaps {
            num_axes: DEFAULT_AXES,
            num_buttons: DEFAULT_BUTTONS,
            num_hats: 0,
            num_balls: 0,
        };
        let mut id = index as u32;

        if let Ok(info) = self.swis.read_info(ENUMERATE_ONE | index as u32) {
            let record = match info.records.first() {
                Some(record) if info.size > 0 => record,
                _ => return Err(JoystickError::InvalidDeviceInfo(swi_name(JOYSTICK_READ))),
            };
            id = u32::from(record.id);
            if has_entry(info.size, RECORD_NUM_BUTTONS_END) {
                caps.num_buttons = count(record.num_buttons);
            }
            if has_entry(info.size, RECORD_NUM_AXES_END) {
                caps.num_axes = count(record.num_axes);
            }
        }

        self.open.insert(index, OpenJoystick { id, state: 0, caps });
        tracing::debug!(index, id, axes = caps.num_axes, buttons = caps.num_buttons, "joystick opened");
        Ok(caps)
    }

    fn update(&mut self, index: usize, sink: &mut dyn EventSink) {
        let Some(joystick) = self.open.get_mut(&index) else {
            return;
        };
        let Ok(state) = self.swis.read_state(joystick.id) else {
            return;
        };
        let old = joystick.state;
        if state == old {
            return;
        }
        let device = index as u8;

        if (state ^ old) & 0xFF != 0 {
            // Up is positive on the hardware.
            let y = axis_byte(state, 0);
            deliver(sink, InputEvent::JoyAxis {
                device,
                axis: 1,
                value: axis_value(-y),
            });
        }
        if (state ^ old) & 0xFF00 != 0 {
            let x = axis_byte(state, 8);
            deliver(sink, InputEvent::JoyAxis {
                device,
                axis: 0,
                value: axis_value(x),
            });
        }
        if (state ^ old) & 0xFF_0000 != 0 {
            let buttons = (state >> 16) & 0xFF;
            let changed = buttons ^ ((old >> 16) & 0xFF);
            for button in 0..joystick.caps.num_buttons.min(STATE_BUTTONS) {
                let bit = 1 << button;
                if changed & bit != 0 {
                    deliver(sink, InputEvent::JoyButton {
                        device,
                        button,
                        state: ButtonState::from_pressed(buttons & bit != 0),
                    });
                }
            }
        }
        joystick.state = state;
    }

    fn close(&mut self, index: usize) {
        self.open.remove(&index);
    }

    fn quit(&mut self) {
        self.open.clear();
        self.names.clear();
    }
}
