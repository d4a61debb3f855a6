//! The capability interface every video backend implements.

use crate::error::VideoError;
use crate::surface::{Color, PixelFormat, Rect, Surface, SurfaceFlags};
use event_queue::EventSink;

/// Capabilities reported after `video_init`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoInfo {
    /// Hardware surfaces can be created
    pub hw_available: bool,
    /// A window manager is present
    pub wm_available: bool,
    /// Hardware to hardware blits are accelerated
    pub blit_hw: bool,
    pub blit_hw_cc: bool,
    pub blit_hw_a: bool,
    pub blit_fill: bool,
    /// Video memory in kilobytes
    pub video_mem: u32,
    /// Current display size
    pub current_w: u32,
    pub current_h: u32,
}

/// Available modes for a format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeList {
    /// No modes for this format
    None,
    /// Any size is acceptable
    Any,
    /// Exactly these sizes, largest first
    Modes(Vec<Rect>),
}

impl ModeList {
    /// Whether a `w` x `h` mode is acceptable
    pub fn accepts(&self, w: u32, h: u32) -> bool {
        match self {
            Self::None => false,
            Self::Any => true,
            Self::Modes(modes) => modes.iter().any(|m| m.w == w && m.h == h),
        }
    }
}

/// Per-channel gamma lookup tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaRamp {
    pub red: [u16; 256],
    pub green: [u16; 256],
    pub blue: [u16; 256],
}

impl GammaRamp {
    /// Linear ramp
    pub fn identity() -> Self {
        let mut ramp = [0u16; 256];
        for (i, v) in ramp.iter_mut().enumerate() {
            *v = (i as u16) << 8 | i as u16;
        }
        Self {
            red: ramp,
            green: ramp,
            blue: ramp,
        }
    }
}

impl Default for GammaRamp {
    fn default() -> Self {
        Self::identity()
    }
}

/// Monochrome cursor bitmap
///
/// `data` and `mask` hold one bit per pixel, MSB first, `w / 8` bytes per
/// row. A pixel is opaque where the mask bit is set; the data bit then
/// picks black (1) or white (0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    pub data: Vec<u8>,
    pub mask: Vec<u8>,
    pub w: u32,
    pub h: u32,
    pub hot_x: i32,
    pub hot_y: i32,
}

/// Driver-side cursor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorId(pub u32);

/// Video device trait
///
/// One implementation per backend. Methods with defaults are optional
/// capabilities; a backend overrides only what its hardware offers.
pub trait VideoDevice: Send {
    /// Backend name, as registered
    fn name(&self) -> &'static str;

    /// Initializes the device and returns the preferred pixel format
    fn video_init(&mut self) -> Result<PixelFormat, VideoError>;

    /// Capabilities, valid after `video_init`
    fn info(&self) -> &VideoInfo;

    /// Lists modes available for `format`
    fn list_modes(&self, format: &PixelFormat, flags: SurfaceFlags) -> ModeList;

    /// Sets a video mode and returns the screen surface
    fn set_video_mode(
        &mut self,
        width: u32,
        height: u32,
        bpp: u8,
        flags: SurfaceFlags,
    ) -> Result<Surface, VideoError>;

    /// Loads `colors` into the hardware palette starting at `first`
    fn set_colors(&mut self, first: usize, colors: &[Color]) -> Result<(), VideoError>;

    /// Pushes the given screen regions to the display
    fn update_rects(&mut self, screen: &Surface, rects: &[Rect]);

    /// Releases everything `video_init` and `set_video_mode` acquired
    fn video_quit(&mut self);

    fn toggle_fullscreen(&mut self, _on: bool) -> bool {
        false
    }

    fn alloc_hw_surface(&mut self, _surface: &mut Surface) -> Result<(), VideoError> {
        Err(VideoError::Unsupported("hardware surfaces"))
    }

    /// Whether hardware can blit `src` onto `dst`
    fn check_hw_blit(&mut self, _src: &Surface, _dst: &Surface) -> bool {
        false
    }

    fn lock_hw_surface(&mut self, _surface: &mut Surface) -> Result<(), VideoError> {
        Ok(())
    }

    fn unlock_hw_surface(&mut self, _surface: &mut Surface) {}

    /// Presents the back buffer of a double-buffered screen
    fn flip_hw_surface(&mut self, _surface: &mut Surface) -> Result<(), VideoError> {
        Ok(())
    }

    fn free_hw_surface(&mut self, _surface: &mut Surface) {}

    fn set_gamma_ramp(&mut self, _ramp: &GammaRamp) -> Result<(), VideoError> {
        Err(VideoError::Unsupported("gamma ramps"))
    }

    fn gamma_ramp(&mut self) -> Result<GammaRamp, VideoError> {
        Err(VideoError::Unsupported("gamma ramps"))
    }

    fn create_wm_cursor(&mut self, _image: &CursorImage) -> Result<CursorId, VideoError> {
        Err(VideoError::Unsupported("window manager cursors"))
    }

    fn free_wm_cursor(&mut self, _cursor: CursorId) {}

    /// Shows `cursor`, or hides the cursor with `None`
    fn show_wm_cursor(&mut self, _cursor: Option<CursorId>) -> bool {
        false
    }

    fn move_wm_cursor(&mut self, _x: i32, _y: i32) {}

    fn init_os_keymap(&mut self) {}

    /// Delivers pending input to `sink`
    fn pump_events(&mut self, _sink: &mut dyn EventSink) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_list_accepts() {
        assert!(ModeList::Any.accepts(1, 1));
        assert!(!ModeList::None.accepts(320, 200));
        let modes = ModeList::Modes(vec![Rect::sized(320, 200)]);
        assert!(modes.accepts(320, 200));
        assert!(!modes.accepts(640, 480));
    }

    #[test]
    fn test_identity_gamma() {
        let ramp = GammaRamp::identity();
        assert_eq!(ramp.red[0], 0);
        assert_eq!(ramp.green[255], 0xFFFF);
        assert_eq!(ramp.blue[0x80], 0x8080);
    }
}
