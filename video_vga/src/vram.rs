//! Direct access to the mode 13h frame at physical 0xA0000.

use hal::framebuffer::{Framebuffer, FramebufferInfo, PixelFormat};

/// Physical address of mode 13h video memory
pub const VGA_VRAM_ADDR: usize = 0xA0000;

const VRAM_INFO: FramebufferInfo = FramebufferInfo {
    width: 320,
    height: 200,
    stride_pixels: 320,
    format: PixelFormat::Indexed8,
};

/// Mode 13h VRAM reached through a linear mapping
#[derive(Debug)]
pub struct PhysicalVram {
    base: *mut u8,
}

// SAFETY: The mapping is plain memory; exclusive access goes through
// `&mut self`.
unsafe impl Send for PhysicalVram {}

impl PhysicalVram {
    /// Wraps a mapping of the VGA frame.
    ///
    /// # Safety
    ///
    /// `base` must point to at least 64000 bytes of writable memory mapped
    /// onto the VGA frame (for example 0xA0000 in a flat DOS address space)
    /// for the lifetime of the value, and nothing else may alias it.
    pub unsafe fn new(base: *mut u8) -> Self {
        Self { base }
    }
}

impl Framebuffer for PhysicalVram {
    fn info(&self) -> FramebufferInfo {
        VRAM_INFO
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        // SAFETY: `new` guarantees the mapping covers the frame and is not
        // aliased.
        unsafe { std::slice::from_raw_parts_mut(self.base, VRAM_INFO.buffer_size()) }
    }

    fn buffer(&self) -> &[u8] {
        // SAFETY: As above.
        unsafe { std::slice::from_raw_parts(self.base, VRAM_INFO.buffer_size()) }
    }
}
