//! # Framebuffer HAL
//!
//! This module defines hardware abstraction traits for linear framebuffers
//! (VGA VRAM, console bitmaps).
//!
//! ## Philosophy
//!
//! The framebuffer HAL provides a minimal, deterministic interface for pixel
//! output. Drivers copy rows in; nothing here knows about surfaces or rects.
//!
//! ## Design Principles
//!
//! 1. **Minimal and explicit**: Width, height, stride, and pixel format
//! 2. **Testable**: `MemoryFramebuffer` stands in for device memory
//! 3. **Deterministic**: Same writes, same bytes

/// Pixel format for the framebuffer
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit palette index
    Indexed8,
    /// 16-bit ABGR 1-5-5-5, alpha bit set for opaque pixels
    Abgr1555,
}

impl PixelFormat {
    /// Returns the number of bytes per pixel
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Indexed8 => 1,
            PixelFormat::Abgr1555 => 2,
        }
    }
}

/// Framebuffer information
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FramebufferInfo {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Stride in pixels (may be larger than width)
    pub stride_pixels: usize,
    /// Pixel format
    pub format: PixelFormat,
}

impl FramebufferInfo {
    /// Calculate the byte offset for a pixel at (x, y)
    pub const fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.stride_pixels + x) * self.format.bytes_per_pixel()
    }

    /// Returns the row length in bytes
    pub const fn stride_bytes(&self) -> usize {
        self.stride_pixels * self.format.bytes_per_pixel()
    }

    /// Returns total buffer size in bytes
    pub const fn buffer_size(&self) -> usize {
        self.height * self.stride_bytes()
    }
}

/// Framebuffer trait for pixel-based output
///
/// Implementations handle platform-specific memory mapping.
pub trait Framebuffer: Send {
    /// Returns framebuffer information
    fn info(&self) -> FramebufferInfo;

    /// Returns a mutable slice over the pixel data
    ///
    /// # Notes
    ///
    /// The slice may be backed by device memory (e.g., video RAM).
    fn buffer_mut(&mut self) -> &mut [u8];

    /// Returns the pixel data
    fn buffer(&self) -> &[u8];
}

/// Framebuffer backed by ordinary memory
#[derive(Debug, Clone)]
pub struct MemoryFramebuffer {
    info: FramebufferInfo,
    pixels: Vec<u8>,
}

impl MemoryFramebuffer {
    /// Creates a zeroed framebuffer described by `info`
    pub fn new(info: FramebufferInfo) -> Self {
        Self {
            info,
            pixels: vec![0; info.buffer_size()],
        }
    }

    /// Reads the pixel bytes at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let offset = self.info.offset(x, y);
        &self.pixels[offset..offset + self.info.format.bytes_per_pixel()]
    }
}

impl Framebuffer for MemoryFramebuffer {
    fn info(&self) -> FramebufferInfo {
        self.info
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    fn buffer(&self) -> &[u8] {
        &self.pixels
    }
}
