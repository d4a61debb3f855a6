//! # Video
//!
//! The video capability interface and backend registry.
//!
//! ## Philosophy
//!
//! - **One trait per concern**: `VideoBackend` bootstraps, `VideoDevice`
//!   drives the display
//! - **Optional capabilities have defaults**: Backends override only what
//!   their hardware can do
//! - **State per instance**: Each device owns its hardware state; nothing is
//!   process-global
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A blitter or software renderer
//! - OpenGL or YUV overlay support

pub mod config;
pub mod device;
pub mod error;
pub mod registry;
pub mod surface;

pub use config::{ConfigError, VideoConfig};
pub use device::{CursorId, CursorImage, GammaRamp, ModeList, VideoDevice, VideoInfo};
pub use error::VideoError;
pub use registry::{VideoBackend, VideoRegistry};
pub use surface::{Color, PixelFormat, Pixels, Rect, Surface, SurfaceFlags};
