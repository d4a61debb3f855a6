//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the hardware abstraction traits platform backends are
//! written against.
//!
//! ## Philosophy
//!
//! **Platforms must be fully abstracted and swappable.**
//!
//! Backend logic talks to keyboards, interrupt tables, mice, clocks, CD
//! drives, joysticks and library loaders only through these traits, so every
//! backend can be driven by a fake in tests.
//!
//! ## Design Principles
//!
//! 1. **Trait-based**: All hardware operations go through traits
//! 2. **Minimal unsafe**: Hardware access requires unsafe, but keep it isolated
//!    in the platform crates
//! 3. **Testable**: HAL can be mocked for testing

pub mod cdrom;
pub mod framebuffer;
pub mod interrupts;
pub mod joystick;
pub mod keyboard;
pub mod loadso;
pub mod pointer;
pub mod timer;

pub use cdrom::{CdStatus, CdTrack, CdromDriver, CdromError, Toc, TrackType, CD_FPS};
pub use framebuffer::{Framebuffer, FramebufferInfo, MemoryFramebuffer, PixelFormat};
pub use interrupts::{InstalledVector, InterruptError, InterruptHandler, InterruptVectors};
pub use joystick::{JoystickCaps, JoystickDriver, JoystickError};
pub use keyboard::{KeyboardController, RawKey};
pub use loadso::{LoadError, ObjectHandle, SharedObjectLoader, Symbol, SymbolTableLoader};
pub use pointer::{NoPointer, PointerDevice};
pub use timer::{ManualClock, ProcessClock, TimerError};
