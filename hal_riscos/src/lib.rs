//! # RISC OS Hardware Abstraction Layer
//!
//! CD audio through the CDFS and CD SWIs, and joysticks through
//! `Joystick_Read`. Both drivers talk to the OS only through the typed SWI
//! traits in [`swi`], so they run against the fakes in [`fake`] anywhere.

pub mod cdrom;
pub mod fake;
pub mod joystick;
pub mod swi;

pub use cdrom::{drive_name, msf_word, RiscOsCdrom};
pub use fake::{FakeCdfs, FakeJoystickModule, SwiCall};
pub use joystick::{default_joystick_name, RiscOsJoystick};
pub use swi::{CdSwis, ControlBlock, DeviceInfo, DeviceRecord, JoystickSwis, OsError};
