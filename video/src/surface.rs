//! Surfaces, pixel formats and the small value types around them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Surface and video mode flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SurfaceFlags: u32 {
        const HWSURFACE = 0x0000_0001;
        const OPENGL = 0x0000_0002;
        const ASYNCBLIT = 0x0000_0004;
        const RESIZABLE = 0x0000_0010;
        const NOFRAME = 0x0000_0020;
        const HWACCEL = 0x0000_0100;
        const SRCCOLORKEY = 0x0000_1000;
        const SRCALPHA = 0x0001_0000;
        const TOP_SCREEN = 0x0010_0000;
        const BOTTOM_SCREEN = 0x0020_0000;
        const ANYFORMAT = 0x1000_0000;
        const HWPALETTE = 0x2000_0000;
        const DOUBLEBUF = 0x4000_0000;
        const FULLSCREEN = 0x8000_0000;
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect at the origin
    pub const fn sized(w: u32, h: u32) -> Self {
        Self::new(0, 0, w, h)
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Intersects with a `width` x `height` area at the origin
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.w)).min(i64::from(width));
        let y1 = (i64::from(self.y) + i64::from(self.h)).min(i64::from(height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

/// Pixel layout of a surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFormat {
    pub bits_per_pixel: u8,
    pub bytes_per_pixel: u8,
    pub rmask: u32,
    pub gmask: u32,
    pub bmask: u32,
    pub amask: u32,
    pub colorkey: u32,
    pub alpha: u8,
    /// Palette for formats of 8 bits or fewer
    pub palette: Option<Vec<Color>>,
}

impl PixelFormat {
    /// Builds a format from channel masks; depths of 8 or less get a
    /// palette sized for the depth.
    pub fn from_masks(bpp: u8, rmask: u32, gmask: u32, bmask: u32, amask: u32) -> Self {
        let palette = if bpp <= 8 {
            Some(vec![Color::BLACK; 1usize << bpp])
        } else {
            None
        };
        Self {
            bits_per_pixel: bpp,
            bytes_per_pixel: bpp.div_ceil(8),
            rmask,
            gmask,
            bmask,
            amask,
            colorkey: 0,
            alpha: 255,
            palette,
        }
    }

    /// 8-bit palettized
    pub fn indexed8() -> Self {
        Self::from_masks(8, 0, 0, 0, 0)
    }

    pub fn is_palettized(&self) -> bool {
        self.palette.is_some()
    }

    pub fn rshift(&self) -> u32 {
        mask_shift(self.rmask)
    }

    pub fn gshift(&self) -> u32 {
        mask_shift(self.gmask)
    }

    pub fn bshift(&self) -> u32 {
        mask_shift(self.bmask)
    }

    /// Row length in bytes for `width` pixels, padded to 4 bytes
    pub fn calculate_pitch(&self, width: u32) -> u32 {
        let bits = width * u32::from(self.bits_per_pixel);
        let bytes = match self.bits_per_pixel {
            1 | 4 => bits.div_ceil(8),
            _ => width * u32::from(self.bytes_per_pixel),
        };
        (bytes + 3) & !3
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::indexed8()
    }
}

fn mask_shift(mask: u32) -> u32 {
    if mask == 0 {
        0
    } else {
        mask.trailing_zeros()
    }
}

/// Where a surface's pixels live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pixels {
    /// System memory owned by the surface
    Software(Vec<u8>),
    /// Video memory owned by the driver, identified by bank
    Hardware { bank: usize },
}

/// A drawable surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub flags: SurfaceFlags,
    pub format: PixelFormat,
    pub w: u32,
    pub h: u32,
    pub pitch: u32,
    pub pixels: Pixels,
}

impl Surface {
    /// Creates a zeroed software surface
    pub fn software(w: u32, h: u32, pitch: u32, format: PixelFormat, flags: SurfaceFlags) -> Self {
        Self {
            flags,
            format,
            w,
            h,
            pitch,
            pixels: Pixels::Software(vec![0; (pitch as usize) * (h as usize)]),
        }
    }

    /// Software pixel bytes, `None` for hardware surfaces
    pub fn pixels(&self) -> Option<&[u8]> {
        match &self.pixels {
            Pixels::Software(buf) => Some(buf),
            Pixels::Hardware { .. } => None,
        }
    }

    pub fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.pixels {
            Pixels::Software(buf) => Some(buf),
            Pixels::Hardware { .. } => None,
        }
    }

    pub fn is_hardware(&self) -> bool {
        matches!(self.pixels, Pixels::Hardware { .. })
    }

    /// Full-surface rect
    pub fn rect(&self) -> Rect {
        Rect::sized(self.w, self.h)
    }
}
