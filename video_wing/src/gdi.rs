//! Window, palette, gamma and display-settings calls the driver makes
//! outside WinG itself.

use bitflags::bitflags;
use video::GammaRamp;

/// Device context handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dc(pub usize);

/// Bitmap handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmap(pub usize);

/// Logical palette handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette(pub usize);

/// Palette entry must not be mapped onto an existing system color
pub const PC_NOCOLLAPSE: u8 = 0x04;

/// Logical palette entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaletteEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub flags: u8,
}

impl PaletteEntry {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            flags: 0,
        }
    }

    pub fn same_color(&self, red: u8, green: u8, blue: u8) -> bool {
        self.red == red && self.green == green && self.blue == blue
    }
}

/// DIB color table entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbQuad {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub reserved: u8,
}

/// How many system palette entries are reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemPaletteUse {
    /// 20 static colors
    Static,
    /// Only black and white are static
    NoStatic,
    /// Every entry is available
    NoStatic256,
}

/// Display resolution, depth and refresh rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub bits_per_pixel: u32,
    pub width: u32,
    pub height: u32,
    pub frequency: Option<u32>,
}

bitflags! {
    /// Window style bits the driver manages
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowStyle: u32 {
        const POPUP = 0x8000_0000;
        const MAXIMIZE = 0x0100_0000;
        const CAPTION = 0x00C0_0000;
        const SYSMENU = 0x0008_0000;
        const THICKFRAME = 0x0004_0000;
        const MINIMIZEBOX = 0x0002_0000;
        const MAXIMIZEBOX = 0x0001_0000;

        /// Borderless
        const DIRECT = Self::POPUP.bits();
        /// Overlapped window with a caption
        const WINDOWED = Self::CAPTION.bits() | Self::SYSMENU.bits() | Self::MINIMIZEBOX.bits();
        /// Extra bits of a resizable window
        const RESIZABLE = Self::THICKFRAME.bits() | Self::MAXIMIZEBOX.bits();
    }
}

/// Windowing and GDI services
///
/// Every method that takes no `Dc` works on the driver's own window.
pub trait Gdi: Send {
    fn create_window(&mut self) -> Result<(), String>;
    fn destroy_window(&mut self);
    fn show_window(&mut self, visible: bool);

    fn window_style(&self) -> WindowStyle;
    fn set_window_style(&mut self, style: WindowStyle);
    fn is_zoomed(&self) -> bool;

    /// Sizes the window's client area, centered and topmost when fullscreen
    fn position_window(&mut self, width: u32, height: u32, fullscreen: bool);

    /// Requests a repaint of the whole window
    fn invalidate(&mut self);

    fn get_dc(&mut self) -> Dc;
    fn release_dc(&mut self, dc: Dc);
    fn delete_dc(&mut self, dc: Dc);
    fn select_bitmap(&mut self, dc: Dc, bitmap: Bitmap);
    fn delete_bitmap(&mut self, bitmap: Bitmap);

    fn system_palette_entries(&mut self, dc: Dc, count: usize) -> Vec<PaletteEntry>;
    fn create_palette(&mut self, entries: &[PaletteEntry]) -> Option<Palette>;
    fn delete_palette(&mut self, palette: Palette);
    fn set_palette_entries(&mut self, palette: Palette, first: usize, entries: &[PaletteEntry]);
    fn unrealize_palette(&mut self, palette: Palette);
    fn select_palette(&mut self, dc: Dc, palette: Palette);

    /// Maps the selected palette into the system palette and returns how
    /// many entries changed
    fn realize_palette(&mut self, dc: Dc) -> usize;
    fn system_palette_use(&mut self, dc: Dc) -> SystemPaletteUse;
    fn set_system_palette_use(&mut self, dc: Dc, usage: SystemPaletteUse);

    fn set_dib_color_table(&mut self, dc: Dc, first: usize, colors: &[RgbQuad]);

    fn device_gamma_ramp(&mut self, dc: Dc) -> Option<GammaRamp>;
    fn set_device_gamma_ramp(&mut self, dc: Dc, ramp: &GammaRamp) -> bool;

    fn desktop_mode(&mut self) -> DisplayMode;

    /// Every mode the display driver enumerates
    fn display_modes(&mut self) -> Vec<DisplayMode>;

    /// Switches to `mode` for fullscreen use, or restores the registry
    /// settings with `None`
    fn change_display_settings(&mut self, mode: Option<&DisplayMode>) -> bool;
}
