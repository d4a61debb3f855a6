//! # Win32 Hardware Abstraction Layer
//!
//! Dynamic library loading through `LoadLibraryW`, `GetProcAddress` and
//! `FreeLibrary`. Other hosts get an empty in-memory loader so callers can
//! probe for Windows libraries and fail cleanly.

pub mod loadso;

#[cfg(windows)]
pub use loadso::Win32Loader;
pub use loadso::system_loader;
