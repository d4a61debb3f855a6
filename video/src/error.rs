use thiserror::Error;

/// Video errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VideoError {
    #[error("No available video device")]
    NoVideoDevice,

    #[error("{0} not available")]
    DriverNotAvailable(String),

    #[error("Unsupported video mode {width}x{height}x{bpp}")]
    UnsupportedMode { width: u32, height: u32, bpp: u8 },

    #[error("{0} not supported by this driver")]
    Unsupported(&'static str),

    #[error("Video device not initialized")]
    NotInitialized,

    #[error("Out of memory")]
    OutOfMemory,

    #[error("{0}")]
    Platform(String),
}
