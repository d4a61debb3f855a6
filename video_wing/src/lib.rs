//! # WinG Video
//!
//! Windowed or fullscreen drawing through a WinG DIB section blitted to the
//! window with `WinGBitBlt`. The bitmap always uses the depth WinG
//! recommends. Palettized modes keep an identity palette and may take over
//! the static system colors while the window is active.
//!
//! WinG itself is loaded dynamically; the device holds the library for its
//! whole life and unloads it on drop.

pub mod fake;
pub mod gdi;
pub mod wing;

use gdi::{
    Bitmap, DisplayMode, Gdi, Palette, PaletteEntry, RgbQuad, SystemPaletteUse, WindowStyle,
    PC_NOCOLLAPSE,
};
use hal::loadso::SharedObjectLoader;
use video::{
    Color, GammaRamp, ModeList, PixelFormat, Pixels, Rect, Surface, SurfaceFlags, VideoBackend,
    VideoConfig, VideoDevice, VideoError, VideoInfo,
};
use wing::{Compression, DibHeader, WinG, WingLibrary};

pub use fake::{Blit, FakeGdi, FakeWinG};
pub use wing::{wing_available, WingEntryPoints, WING_LIBRARY};

/// Mode lists kept per byte depth (8, 16, 24 and 32 bits)
pub const NUM_MODELISTS: usize = 4;

/// Index of the mode list for `bpp`, `None` outside 8-32 bits
pub fn mode_list_index(bpp: u32) -> Option<usize> {
    (8..=32).contains(&bpp).then(|| ((bpp + 7) / 8 - 1) as usize)
}

/// GDI channel masks for a DIB depth
pub fn depth_masks(bits: u32) -> (u32, u32, u32) {
    match bits {
        15 => (0x7C00, 0x03E0, 0x001F),
        16 => (0xF800, 0x07E0, 0x001F),
        24 | 32 => (0x00FF_0000, 0x0000_FF00, 0x0000_00FF),
        _ => (0, 0, 0),
    }
}

/// Display format for a recommended DIB. 15-bit DIBs are reported as
/// 16-bit 5-5-5, and explicit bitfields win over the depth defaults.
pub fn format_for_dib(header: &DibHeader) -> PixelFormat {
    let bits = u32::from(header.bit_count);
    let (mut r, mut g, mut b) = depth_masks(bits);
    if let Compression::Bitfields(masks) = header.compression {
        [r, g, b] = masks;
    }
    let bpp = if bits == 15 { 16 } else { bits };
    PixelFormat::from_masks(bpp as u8, r, g, b, 0)
}

/// Builds the WinG and window-system access for a device from the
/// resolved entry points
pub type WingHardwareFactory<W, G> = Box<dyn Fn(&WingEntryPoints) -> (W, G) + Send + Sync>;

/// Creates the loader WING32.DLL is loaded through
pub type LoaderFactory = Box<dyn Fn() -> Box<dyn SharedObjectLoader + Send> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
struct WingScreen {
    w: u32,
    h: u32,
    flags: SurfaceFlags,
}

/// WinG video device
pub struct WingVideo<W: WinG, G: Gdi> {
    wing: W,
    gdi: G,
    library: Option<(Box<dyn SharedObjectLoader + Send>, WingLibrary)>,
    config: VideoConfig,
    info: VideoInfo,
    modes: [Vec<Rect>; NUM_MODELISTS],
    desktop: Option<DisplayMode>,
    fullscreen_mode: Option<DisplayMode>,
    window: bool,
    screen: Option<WingScreen>,
    bitmap: Option<Bitmap>,
    palette: Option<Palette>,
    logical_palette: Vec<PaletteEntry>,
    grab_palette: bool,
    gamma_supported: bool,
    gamma: Option<GammaRamp>,
    gamma_saved: Option<GammaRamp>,
    focused: bool,
    allow_screensaver: bool,
}

impl<W: WinG, G: Gdi> WingVideo<W, G> {
    pub fn new(wing: W, gdi: G, config: VideoConfig) -> Self {
        Self {
            wing,
            gdi,
            library: None,
            config,
            info: VideoInfo::default(),
            modes: Default::default(),
            desktop: None,
            fullscreen_mode: None,
            window: false,
            screen: None,
            bitmap: None,
            palette: None,
            logical_palette: Vec::new(),
            grab_palette: false,
            gamma_supported: false,
            gamma: None,
            gamma_saved: None,
            focused: true,
            allow_screensaver: true,
        }
    }

    /// Hands the loaded library to the device, which unloads it on drop
    pub fn with_library(
        mut self,
        loader: Box<dyn SharedObjectLoader + Send>,
        library: WingLibrary,
    ) -> Self {
        self.library = Some((loader, library));
        self
    }

    pub fn wing(&self) -> &W {
        &self.wing
    }

    pub fn gdi(&self) -> &G {
        &self.gdi
    }

    pub fn gdi_mut(&mut self) -> &mut G {
        &mut self.gdi
    }

    pub fn allow_screensaver(&self) -> bool {
        self.allow_screensaver
    }

    pub fn has_input_focus(&self) -> bool {
        self.focused
    }

    /// Whether static system colors are taken while active
    pub fn grabs_static_colors(&self) -> bool {
        self.grab_palette
    }

    /// Display mode in effect while fullscreen
    pub fn fullscreen_mode(&self) -> Option<&DisplayMode> {
        self.fullscreen_mode.as_ref()
    }

    /// Current logical palette
    pub fn logical_palette(&self) -> &[PaletteEntry] {
        &self.logical_palette
    }

    /// The DIB section behind the screen surface
    pub fn screen_pixels_mut(&mut self) -> Option<&mut [u8]> {
        let bitmap = self.bitmap?;
        self.wing.bits_mut(bitmap)
    }

    fn add_mode(&mut self, bpp: u32, w: u32, h: u32) {
        let Some(index) = mode_list_index(bpp) else {
            return;
        };
        let list = &mut self.modes[index];
        if list.iter().any(|m| m.w == w && m.h == h) {
            return;
        }
        list.push(Rect::sized(w, h));
    }

    fn create_palette(&mut self, bpp: u32) {
        let count = 1usize << bpp;
        let dc = self.gdi.get_dc();
        let mut entries = self.gdi.system_palette_entries(dc, count);
        self.gdi.release_dc(dc);
        entries.resize(count, PaletteEntry::default());

        self.palette = self.gdi.create_palette(&entries);
        self.logical_palette = entries;
    }

    fn free_palette(&mut self) {
        if let Some(palette) = self.palette.take() {
            self.gdi.delete_palette(palette);
        }
        self.logical_palette.clear();
    }

    fn grab_static_colors(&mut self) {
        let dc = self.gdi.get_dc();
        self.gdi.set_system_palette_use(dc, SystemPaletteUse::NoStatic256);
        if self.gdi.system_palette_use(dc) != SystemPaletteUse::NoStatic256 {
            self.gdi.set_system_palette_use(dc, SystemPaletteUse::NoStatic);
        }
        self.gdi.release_dc(dc);
    }

    fn release_static_colors(&mut self) {
        let dc = self.gdi.get_dc();
        self.gdi.set_system_palette_use(dc, SystemPaletteUse::Static);
        self.gdi.release_dc(dc);
    }

    /// Puts `rgb` at `index`, moving whatever entry held `rgb` before to
    /// the old color at `index`. Returns true if anything changed.
    fn pin_palette_entry(&mut self, index: usize, red: u8, green: u8, blue: u8) -> bool {
        let Some(&current) = self.logical_palette.get(index) else {
            return false;
        };
        let mut moved = false;
        if !current.same_color(red, green, blue) {
            if let Some(found) = self
                .logical_palette
                .iter()
                .position(|e| e.same_color(red, green, blue))
            {
                self.logical_palette[found] = current;
            }
            self.logical_palette[index] = PaletteEntry::rgb(red, green, blue);
            moved = true;
        }
        self.logical_palette[index].flags = 0;
        moved
    }

    /// Blits the whole screen bitmap to the window
    fn blit_screen(&mut self, dc: gdi::Dc) {
        let (Some(bitmap), Some(screen)) = (self.bitmap, self.screen) else {
            return;
        };
        let Some(mdc) = self.wing.create_dc() else {
            tracing::warn!("WinGCreateDC failed");
            return;
        };
        self.gdi.select_bitmap(mdc, bitmap);
        self.wing.bit_blt(dc, 0, 0, screen.w, screen.h, mdc, 0, 0);
        self.gdi.delete_dc(mdc);
    }

    /// Window activation handler
    pub fn activate(&mut self, active: bool, minimized: bool) {
        let focused = active && !minimized;
        if focused != self.focused {
            self.swap_gamma();
            self.focused = focused;
        }

        if self.grab_palette {
            if !active {
                self.release_static_colors();
                self.realize_palette();
            } else if !minimized {
                self.grab_static_colors();
                self.realize_palette();
            }
        }
    }

    /// Maps the logical palette into the system palette, repainting if
    /// the mapping changed
    pub fn realize_palette(&mut self) {
        let Some(palette) = self.palette else {
            return;
        };
        let dc = self.gdi.get_dc();
        self.gdi.unrealize_palette(palette);
        self.gdi.select_palette(dc, palette);
        if self.gdi.realize_palette(dc) > 0 {
            self.gdi.invalidate();
        }
        self.gdi.release_dc(dc);
    }

    /// System palette changed handler; `ours` is true when this window
    /// caused the change
    pub fn palette_changed(&mut self, ours: bool) {
        if !ours {
            self.realize_palette();
        }
    }

    /// Paint handler
    pub fn paint(&mut self) {
        let dc = self.gdi.get_dc();
        if let Some(palette) = self.palette {
            self.gdi.select_palette(dc, palette);
        }
        self.blit_screen(dc);
        self.gdi.release_dc(dc);
    }

    /// Swaps the device ramp with the saved one around focus changes
    fn swap_gamma(&mut self) {
        let Some(saved) = self.gamma_saved.clone() else {
            return;
        };
        let dc = self.gdi.get_dc();
        if self.focused {
            self.gdi.set_device_gamma_ramp(dc, &saved);
        } else {
            if let Some(current) = self.gdi.device_gamma_ramp(dc) {
                self.gamma_saved = Some(current);
            }
            if let Some(ramp) = &self.gamma {
                self.gdi.set_device_gamma_ramp(dc, ramp);
            }
        }
        self.gdi.release_dc(dc);
    }

    fn quit_gamma(&mut self) {
        let Some(saved) = self.gamma_saved.take() else {
            return;
        };
        if self.focused {
            let dc = self.gdi.get_dc();
            self.gdi.set_device_gamma_ramp(dc, &saved);
            self.gdi.release_dc(dc);
        }
    }
}

impl<W: WinG, G: Gdi> Drop for WingVideo<W, G> {
    fn drop(&mut self) {
        if let Some((mut loader, library)) = self.library.take() {
            library.unload(loader.as_mut());
        }
    }
}

impl<W: WinG, G: Gdi> VideoDevice for WingVideo<W, G> {
    fn name(&self) -> &'static str {
        "wing"
    }

    fn video_init(&mut self) -> Result<PixelFormat, VideoError> {
        self.gdi.create_window().map_err(VideoError::Platform)?;
        self.window = true;

        let format = match self.wing.recommend_dib_format() {
            Some(header) => format_for_dib(&header),
            None => PixelFormat::indexed8(),
        };

        let dc = self.gdi.get_dc();
        self.gamma_supported = self.gdi.device_gamma_ramp(dc).is_some();
        self.gdi.release_dc(dc);

        let desktop = self.gdi.desktop_mode();
        self.info.current_w = desktop.width;
        self.info.current_h = desktop.height;
        self.desktop = Some(desktop);

        for mode in self.gdi.display_modes() {
            self.add_mode(mode.bits_per_pixel, mode.width, mode.height);
        }
        for list in self.modes.iter_mut() {
            list.sort_by(|a, b| b.w.cmp(&a.w).then(b.h.cmp(&a.h)));
        }

        if format.bits_per_pixel <= 8 {
            self.create_palette(u32::from(format.bits_per_pixel));
        }

        self.info.wm_available = true;
        self.allow_screensaver = self.config.allow_screensaver.unwrap_or(true);

        tracing::info!(
            bpp = format.bits_per_pixel,
            desktop_w = desktop.width,
            desktop_h = desktop.height,
            gamma = self.gamma_supported,
            "WinG video initialized"
        );
        Ok(format)
    }

    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn list_modes(&self, format: &PixelFormat, flags: SurfaceFlags) -> ModeList {
        if !flags.contains(SurfaceFlags::FULLSCREEN) {
            return ModeList::Any;
        }
        match mode_list_index(u32::from(format.bits_per_pixel)) {
            Some(index) if !self.modes[index].is_empty() => {
                ModeList::Modes(self.modes[index].clone())
            }
            _ => ModeList::None,
        }
    }

    fn set_video_mode(
        &mut self,
        width: u32,
        height: u32,
        _bpp: u8,
        flags: SurfaceFlags,
    ) -> Result<Surface, VideoError> {
        if flags.contains(SurfaceFlags::OPENGL) {
            return Err(VideoError::Unsupported("OpenGL"));
        }
        let prev_flags = self.screen.map(|s| s.flags).unwrap_or_default();

        // The recommended depth always wins over the requested one.
        let mut header = self
            .wing
            .recommend_dib_format()
            .unwrap_or_else(DibHeader::fallback);
        let bpp = u32::from(header.bit_count);
        let (r, g, b) = depth_masks(bpp);
        let format = PixelFormat::from_masks(bpp as u8, r, g, b, 0);
        let pitch = format.calculate_pitch(width);
        if pitch == 0 {
            return Err(VideoError::UnsupportedMode {
                width,
                height,
                bpp: bpp as u8,
            });
        }

        let mut video_flags = SurfaceFlags::empty();
        self.fullscreen_mode = None;
        if flags.contains(SurfaceFlags::FULLSCREEN) {
            let desktop = self.desktop.unwrap_or_else(|| self.gdi.desktop_mode());
            let mut settings = DisplayMode {
                bits_per_pixel: u32::from(format.bits_per_pixel),
                width,
                height,
                frequency: None,
            };
            if width <= desktop.width && height <= desktop.height {
                settings.frequency = desktop.frequency;
            }
            let mut changed = self.gdi.change_display_settings(Some(&settings));
            if !changed && settings.frequency.is_some() {
                settings.frequency = None;
                changed = self.gdi.change_display_settings(Some(&settings));
            }
            if changed {
                video_flags |= SurfaceFlags::FULLSCREEN;
                self.fullscreen_mode = Some(settings);
            } else {
                tracing::warn!(width, height, "fullscreen display change failed");
            }
        }

        if self.grab_palette {
            self.release_static_colors();
            self.grab_palette = false;
        }
        self.free_palette();
        if bpp <= 8 {
            self.create_palette(bpp);
        }

        let mut style = self.gdi.window_style();
        style.remove(WindowStyle::RESIZABLE | WindowStyle::MAXIMIZE);
        if video_flags.contains(SurfaceFlags::FULLSCREEN) {
            style.remove(WindowStyle::WINDOWED);
            style.insert(WindowStyle::DIRECT);
        } else {
            if prev_flags.contains(SurfaceFlags::FULLSCREEN) {
                self.gdi.change_display_settings(None);
            }
            if flags.contains(SurfaceFlags::NOFRAME) {
                style.remove(WindowStyle::WINDOWED);
                style.insert(WindowStyle::DIRECT);
                video_flags |= SurfaceFlags::NOFRAME;
            } else {
                style.remove(WindowStyle::DIRECT);
                style.insert(WindowStyle::WINDOWED);
                if flags.contains(SurfaceFlags::RESIZABLE) {
                    style.insert(WindowStyle::RESIZABLE);
                    video_flags |= SurfaceFlags::RESIZABLE;
                }
            }
            if self.gdi.is_zoomed() {
                style.insert(WindowStyle::MAXIMIZE);
            }
        }

        let foreign = self.config.uses_foreign_window();
        if !foreign {
            self.gdi.set_window_style(style);
        }

        if let Some(old) = self.bitmap.take() {
            self.gdi.delete_bitmap(old);
        }
        header.width = width as i32;
        header.height = -(height as i32);
        header.size_image = height * pitch;

        let dc = self.gdi.get_dc();
        let bitmap = self.wing.create_bitmap(dc, &header);
        self.gdi.release_dc(dc);
        let bitmap = bitmap.ok_or_else(|| {
            VideoError::Platform("Couldn't create DIB section".to_string())
        })?;
        self.bitmap = Some(bitmap);

        if self.palette.is_some() {
            if flags.intersects(SurfaceFlags::FULLSCREEN | SurfaceFlags::HWPALETTE) {
                self.grab_palette = true;
            }
            // WinGBitBlt maps colors through the selected palette.
            video_flags |= SurfaceFlags::HWPALETTE;
        }

        if !foreign && !self.gdi.is_zoomed() {
            self.gdi
                .position_window(width, height, flags.contains(SurfaceFlags::FULLSCREEN));
        }

        self.screen = Some(WingScreen {
            w: width,
            h: height,
            flags: video_flags,
        });

        tracing::info!(
            width,
            height,
            bpp,
            fullscreen = video_flags.contains(SurfaceFlags::FULLSCREEN),
            palettized = self.palette.is_some(),
            "WinG video mode set"
        );
        Ok(Surface {
            flags: video_flags,
            format,
            w: width,
            h: height,
            pitch,
            pixels: Pixels::Hardware { bank: 0 },
        })
    }

    fn set_colors(&mut self, first: usize, colors: &[Color]) -> Result<(), VideoError> {
        let limit = if self.palette.is_some() {
            self.logical_palette.len()
        } else {
            256
        };
        if first + colors.len() > limit {
            return Err(VideoError::Platform(format!(
                "Palette range {}..{} out of bounds",
                first,
                first + colors.len()
            )));
        }

        let dc = self.gdi.get_dc();
        let mut moved = false;
        if let Some(palette) = self.palette {
            for (entry, color) in self.logical_palette[first..].iter_mut().zip(colors) {
                *entry = PaletteEntry {
                    red: color.r,
                    green: color.g,
                    blue: color.b,
                    flags: PC_NOCOLLAPSE,
                };
            }
            // Black and white stay at the ends unless every entry is ours.
            if self.gdi.system_palette_use(dc) != SystemPaletteUse::NoStatic256 {
                let last = self.logical_palette.len() - 1;
                moved |= self.pin_palette_entry(0, 0x00, 0x00, 0x00);
                moved |= self.pin_palette_entry(last, 0xFF, 0xFF, 0xFF);
            }

            self.gdi.unrealize_palette(palette);
            self.gdi.set_palette_entries(palette, 0, &self.logical_palette);
            self.gdi.select_palette(dc, palette);
            self.gdi.realize_palette(dc);
        }

        let table: Vec<RgbQuad> = colors
            .iter()
            .map(|c| RgbQuad {
                blue: c.b,
                green: c.g,
                red: c.r,
                reserved: 0,
            })
            .collect();

        if let Some(bitmap) = self.bitmap {
            if let Some(mdc) = self.wing.create_dc() {
                self.gdi.select_bitmap(mdc, bitmap);
                self.gdi.set_dib_color_table(mdc, first, &table);
                self.gdi.delete_dc(mdc);
            }
            if moved || !self.grab_palette {
                self.blit_screen(dc);
            }
        }
        self.gdi.release_dc(dc);
        Ok(())
    }

    fn update_rects(&mut self, screen: &Surface, rects: &[Rect]) {
        let Some(bitmap) = self.bitmap else {
            return;
        };
        let dc = self.gdi.get_dc();
        if let Some(palette) = self.palette {
            self.gdi.select_palette(dc, palette);
        }
        if let Some(mdc) = self.wing.create_dc() {
            self.gdi.select_bitmap(mdc, bitmap);
            for rect in rects.iter().filter_map(|r| r.clip(screen.w, screen.h)) {
                self.wing
                    .bit_blt(dc, rect.x, rect.y, rect.w, rect.h, mdc, rect.x, rect.y);
            }
            self.gdi.delete_dc(mdc);
        } else {
            tracing::warn!("WinGCreateDC failed");
        }
        self.gdi.release_dc(dc);
    }

    fn video_quit(&mut self) {
        if self.window {
            if let Some(screen) = self.screen.take() {
                if self.grab_palette {
                    self.release_static_colors();
                    self.grab_palette = false;
                }
                if screen.flags.contains(SurfaceFlags::FULLSCREEN) {
                    self.gdi.change_display_settings(None);
                    self.gdi.show_window(false);
                }
            }
            self.free_palette();
            if let Some(bitmap) = self.bitmap.take() {
                self.gdi.delete_bitmap(bitmap);
            }
            self.quit_gamma();
            self.gdi.destroy_window();
            self.window = false;
        }
        for list in self.modes.iter_mut() {
            list.clear();
        }
        self.fullscreen_mode = None;
        tracing::info!("WinG video shut down");
    }

    fn alloc_hw_surface(&mut self, _surface: &mut Surface) -> Result<(), VideoError> {
        Err(VideoError::Unsupported("hardware surfaces"))
    }

    fn set_gamma_ramp(&mut self, ramp: &GammaRamp) -> Result<(), VideoError> {
        if !self.gamma_supported {
            return Err(VideoError::Unsupported("gamma ramps"));
        }
        let dc = self.gdi.get_dc();
        if self.gamma_saved.is_none() {
            self.gamma_saved = self.gdi.device_gamma_ramp(dc);
        }
        self.gamma = Some(ramp.clone());
        let applied = !self.focused || self.gdi.set_device_gamma_ramp(dc, ramp);
        self.gdi.release_dc(dc);

        if applied {
            Ok(())
        } else {
            Err(VideoError::Platform("Couldn't set gamma ramp".to_string()))
        }
    }

    fn gamma_ramp(&mut self) -> Result<GammaRamp, VideoError> {
        if !self.gamma_supported {
            return Err(VideoError::Unsupported("gamma ramps"));
        }
        let dc = self.gdi.get_dc();
        let ramp = self.gdi.device_gamma_ramp(dc);
        self.gdi.release_dc(dc);
        ramp.ok_or_else(|| VideoError::Platform("Couldn't get gamma ramp".to_string()))
    }
}

/// Registry entry for the WinG backend
pub struct WingBootstrap<W: WinG, G: Gdi> {
    loader: LoaderFactory,
    make: WingHardwareFactory<W, G>,
}

impl<W: WinG, G: Gdi> WingBootstrap<W, G> {
    pub fn new(loader: LoaderFactory, make: WingHardwareFactory<W, G>) -> Self {
        Self { loader, make }
    }
}

impl<W: WinG + 'static, G: Gdi + 'static> VideoBackend for WingBootstrap<W, G> {
    fn name(&self) -> &'static str {
        "wing"
    }

    fn description(&self) -> &'static str {
        "Win32s WinG"
    }

    fn available(&self) -> bool {
        let mut loader = (self.loader)();
        wing_available(loader.as_mut())
    }

    fn create(&self, config: &VideoConfig) -> Result<Box<dyn VideoDevice>, VideoError> {
        let mut loader = (self.loader)();
        let library = WingLibrary::load(loader.as_mut()).map_err(|err| {
            tracing::debug!(%err, "WinG unavailable");
            VideoError::Platform(err.to_string())
        })?;
        let (wing, gdi) = (self.make)(library.entry_points());
        Ok(Box::new(
            WingVideo::new(wing, gdi, config.clone()).with_library(loader, library),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::loadso::SymbolTableLoader;
    use wing::{
        WING_BIT_BLT, WING_CREATE_BITMAP, WING_CREATE_DC, WING_GET_DIB_COLOR_TABLE,
        WING_RECOMMEND_DIB_FORMAT,
    };

    type TestVideo = WingVideo<FakeWinG, FakeGdi>;

    fn device(bits: u16) -> TestVideo {
        let mut video = WingVideo::new(
            FakeWinG::recommending(bits),
            FakeGdi::new(),
            VideoConfig::default(),
        );
        video.video_init().unwrap();
        video
    }

    fn mode(bits_per_pixel: u32, width: u32, height: u32) -> DisplayMode {
        DisplayMode {
            bits_per_pixel,
            width,
            height,
            frequency: Some(60),
        }
    }

    #[test]
    fn test_mode_list_index() {
        assert_eq!(mode_list_index(8), Some(0));
        assert_eq!(mode_list_index(15), Some(1));
        assert_eq!(mode_list_index(16), Some(1));
        assert_eq!(mode_list_index(24), Some(2));
        assert_eq!(mode_list_index(32), Some(3));
        assert_eq!(mode_list_index(4), None);
        assert_eq!(mode_list_index(48), None);
    }

    #[test]
    fn test_format_for_dib() {
        let f15 = format_for_dib(&DibHeader {
            bit_count: 15,
            ..DibHeader::fallback()
        });
        assert_eq!(f15.bits_per_pixel, 16);
        assert_eq!((f15.rmask, f15.gmask, f15.bmask), (0x7C00, 0x03E0, 0x001F));

        let f16 = format_for_dib(&DibHeader {
            bit_count: 16,
            ..DibHeader::fallback()
        });
        assert_eq!(f16.rmask, 0xF800);

        let f32 = format_for_dib(&DibHeader {
            bit_count: 32,
            ..DibHeader::fallback()
        });
        assert_eq!(f32.rmask, 0x00FF_0000);

        let fields = format_for_dib(&DibHeader {
            bit_count: 16,
            compression: Compression::Bitfields([0x7C00, 0x03E0, 0x001F]),
            ..DibHeader::fallback()
        });
        assert_eq!(fields.gmask, 0x03E0);

        assert!(format_for_dib(&DibHeader::fallback()).is_palettized());
    }

    #[test]
    fn test_init_defaults_to_8bit_without_recommendation() {
        let mut video = WingVideo::new(FakeWinG::default(), FakeGdi::new(), VideoConfig::default());
        let format = video.video_init().unwrap();
        assert_eq!(format.bits_per_pixel, 8);
        assert_eq!(video.logical_palette().len(), 256);
        assert_eq!(video.gdi().palettes.len(), 1);
    }

    #[test]
    fn test_init_probes_display() {
        let mut gdi = FakeGdi::new();
        gdi.gamma = None;
        gdi.modes = vec![
            mode(32, 640, 480),
            mode(32, 800, 600),
            mode(32, 640, 480),
            mode(32, 800, 480),
            mode(16, 320, 200),
            mode(4, 640, 480),
        ];
        let mut video = WingVideo::new(FakeWinG::recommending(16), gdi, VideoConfig::default());
        let format = video.video_init().unwrap();

        assert_eq!(format.bits_per_pixel, 16);
        assert!(video.gdi().window);
        assert!(video.info().wm_available);
        assert_eq!((video.info().current_w, video.info().current_h), (640, 480));
        assert!(video.gdi().palettes.is_empty());

        let fullscreen = SurfaceFlags::FULLSCREEN;
        let rgb32 = PixelFormat::from_masks(32, 0xFF0000, 0xFF00, 0xFF, 0);
        assert_eq!(
            video.list_modes(&rgb32, fullscreen),
            ModeList::Modes(vec![
                Rect::sized(800, 600),
                Rect::sized(800, 480),
                Rect::sized(640, 480),
            ])
        );
        assert_eq!(video.list_modes(&rgb32, SurfaceFlags::empty()), ModeList::Any);
        assert_eq!(
            video.list_modes(&PixelFormat::indexed8(), fullscreen),
            ModeList::None
        );

        assert!(video.set_gamma_ramp(&GammaRamp::identity()).is_err());
        assert!(video.gamma_ramp().is_err());
    }

    #[test]
    fn test_init_window_failure() {
        let mut gdi = FakeGdi::new();
        gdi.fail_window = true;
        let mut video = WingVideo::new(FakeWinG::recommending(8), gdi, VideoConfig::default());
        assert_eq!(
            video.video_init().unwrap_err(),
            VideoError::Platform("Couldn't create window".to_string())
        );
    }

    #[test]
    fn test_init_reads_screensaver_setting() {
        assert!(device(8).allow_screensaver());

        let config = VideoConfig {
            allow_screensaver: Some(false),
            ..VideoConfig::default()
        };
        let mut video = WingVideo::new(FakeWinG::recommending(8), FakeGdi::new(), config);
        video.video_init().unwrap();
        assert!(!video.allow_screensaver());
    }

    #[test]
    fn test_set_video_mode_windowed_8bit() {
        let mut video = device(8);
        let screen = video
            .set_video_mode(320, 200, 32, SurfaceFlags::empty())
            .unwrap();

        // Requested depth is ignored.
        assert_eq!(screen.format.bits_per_pixel, 8);
        assert_eq!(screen.pitch, 320);
        assert!(screen.flags.contains(SurfaceFlags::HWPALETTE));
        assert!(!screen.flags.contains(SurfaceFlags::FULLSCREEN));
        assert!(!video.grabs_static_colors());

        let gdi = video.gdi();
        assert_eq!(gdi.style, WindowStyle::WINDOWED);
        assert!(gdi.display_changes.is_empty());
        assert_eq!(gdi.positions, vec![(320, 200, false)]);
        assert_eq!(gdi.open_dcs, 0);

        let (header, bits) = video.wing().bitmaps.values().next().unwrap();
        assert_eq!(header.width, 320);
        assert_eq!(header.height, -200);
        assert_eq!(header.size_image, 320 * 200);
        assert_eq!(bits.len(), 320 * 200);
    }

    #[test]
    fn test_set_video_mode_fullscreen() {
        let mut video = device(8);
        let screen = video
            .set_video_mode(640, 480, 8, SurfaceFlags::FULLSCREEN)
            .unwrap();

        assert!(screen.flags.contains(SurfaceFlags::FULLSCREEN));
        assert!(video.grabs_static_colors());
        assert_eq!(video.gdi().style, WindowStyle::DIRECT);
        assert_eq!(
            video.gdi().display_changes,
            vec![Some(DisplayMode {
                bits_per_pixel: 8,
                width: 640,
                height: 480,
                frequency: Some(60),
            })]
        );
        assert_eq!(video.fullscreen_mode().unwrap().width, 640);
        assert_eq!(video.gdi().positions, vec![(640, 480, true)]);
    }

    #[test]
    fn test_fullscreen_retries_without_refresh_rate() {
        let mut video = device(16);
        video.gdi_mut().reject_refresh = true;
        let screen = video
            .set_video_mode(320, 240, 16, SurfaceFlags::FULLSCREEN)
            .unwrap();

        assert!(screen.flags.contains(SurfaceFlags::FULLSCREEN));
        assert_eq!(video.gdi().display_changes.len(), 1);
        assert_eq!(video.fullscreen_mode().unwrap().frequency, None);
    }

    #[test]
    fn test_fullscreen_larger_than_desktop_has_no_refresh_rate() {
        let mut video = device(16);
        video
            .set_video_mode(1024, 768, 16, SurfaceFlags::FULLSCREEN)
            .unwrap();
        assert_eq!(video.gdi().display_changes[0].unwrap().frequency, None);
    }

    #[test]
    fn test_failed_fullscreen_stays_windowed() {
        let mut video = device(8);
        video.gdi_mut().fail_display_changes = true;
        let screen = video
            .set_video_mode(640, 480, 8, SurfaceFlags::FULLSCREEN)
            .unwrap();

        assert!(!screen.flags.contains(SurfaceFlags::FULLSCREEN));
        assert!(video.fullscreen_mode().is_none());
        assert!(video.gdi().display_changes.is_empty());
        assert_eq!(video.gdi().style, WindowStyle::WINDOWED);
        // The palette is still taken over as requested.
        assert!(video.grabs_static_colors());
    }

    #[test]
    fn test_leaving_fullscreen_restores_display() {
        let mut video = device(16);
        video
            .set_video_mode(640, 480, 16, SurfaceFlags::FULLSCREEN)
            .unwrap();
        let screen = video
            .set_video_mode(640, 480, 16, SurfaceFlags::empty())
            .unwrap();

        assert!(!screen.flags.contains(SurfaceFlags::FULLSCREEN));
        assert_eq!(video.gdi().display_changes.last(), Some(&None));
        assert_eq!(video.gdi().style, WindowStyle::WINDOWED);
        // The first bitmap was released.
        assert_eq!(video.gdi().deleted_bitmaps.len(), 1);
    }

    #[test]
    fn test_window_styles() {
        let mut video = device(16);
        let screen = video
            .set_video_mode(320, 240, 16, SurfaceFlags::RESIZABLE)
            .unwrap();
        assert!(screen.flags.contains(SurfaceFlags::RESIZABLE));
        assert_eq!(
            video.gdi().style,
            WindowStyle::WINDOWED | WindowStyle::RESIZABLE
        );

        let screen = video
            .set_video_mode(320, 240, 16, SurfaceFlags::NOFRAME)
            .unwrap();
        assert!(screen.flags.contains(SurfaceFlags::NOFRAME));
        assert_eq!(video.gdi().style, WindowStyle::DIRECT);

        video.gdi_mut().zoomed = true;
        let positions = video.gdi().positions.len();
        video
            .set_video_mode(320, 240, 16, SurfaceFlags::empty())
            .unwrap();
        assert_eq!(
            video.gdi().style,
            WindowStyle::WINDOWED | WindowStyle::MAXIMIZE
        );
        // Maximized windows are not moved.
        assert_eq!(video.gdi().positions.len(), positions);
    }

    #[test]
    fn test_foreign_window_is_left_alone() {
        let config = VideoConfig {
            window_id: Some("0x1234".to_string()),
            ..VideoConfig::default()
        };
        let mut video = WingVideo::new(FakeWinG::recommending(16), FakeGdi::new(), config);
        video.video_init().unwrap();
        video.gdi_mut().style = WindowStyle::empty();
        video
            .set_video_mode(320, 240, 16, SurfaceFlags::RESIZABLE)
            .unwrap();

        assert_eq!(video.gdi().style, WindowStyle::empty());
        assert!(video.gdi().positions.is_empty());
    }

    #[test]
    fn test_opengl_rejected() {
        let mut video = device(16);
        assert_eq!(
            video
                .set_video_mode(320, 240, 16, SurfaceFlags::OPENGL)
                .unwrap_err(),
            VideoError::Unsupported("OpenGL")
        );
    }

    #[test]
    fn test_bitmap_failure() {
        let mut video = device(16);
        let mut wing = FakeWinG::recommending(16);
        wing.fail_bitmaps = true;
        video.wing = wing;
        let err = video
            .set_video_mode(320, 240, 16, SurfaceFlags::empty())
            .unwrap_err();
        assert_eq!(
            err,
            VideoError::Platform("Couldn't create DIB section".to_string())
        );
    }

    #[test]
    fn test_update_rects_blits_each_rect() {
        let mut video = device(8);
        let screen = video
            .set_video_mode(320, 200, 8, SurfaceFlags::empty())
            .unwrap();
        video.screen_pixels_mut().unwrap()[0] = 5;

        video.update_rects(
            &screen,
            &[Rect::new(0, 0, 10, 10), Rect::new(300, 190, 50, 50)],
        );

        let blits = &video.wing().blits;
        assert_eq!(blits.len(), 2);
        assert_eq!((blits[0].x, blits[0].y, blits[0].w, blits[0].h), (0, 0, 10, 10));
        assert_eq!((blits[1].w, blits[1].h), (20, 10));
        assert!(video.gdi().selected_palette.is_some());
        assert_eq!(video.gdi().open_dcs, 0);
        assert_eq!(video.gdi().deleted_dcs, 1);
    }

    #[test]
    fn test_set_colors_pins_black_and_white() {
        let mut video = device(8);
        video
            .set_video_mode(320, 200, 8, SurfaceFlags::empty())
            .unwrap();
        let blits = video.wing().blits.len();

        video
            .set_colors(0, &[Color::new(10, 20, 30), Color::new(0, 0, 0)])
            .unwrap();

        let palette = video.logical_palette();
        // Black moved into 0, and the color that was at 0 took black's slot.
        assert!(palette[0].same_color(0, 0, 0));
        assert_eq!(palette[0].flags, 0);
        assert!(palette[1].same_color(10, 20, 30));
        assert_eq!(palette[1].flags, PC_NOCOLLAPSE);
        assert!(palette[255].same_color(255, 255, 255));

        let gdi = video.gdi();
        assert!(gdi.realized > 0);
        assert_eq!(gdi.dib_color_table[0].red, 10);
        assert_eq!(gdi.dib_color_table[1].blue, 0);
        let stored = gdi.palettes.values().next().unwrap();
        assert!(stored[1].same_color(10, 20, 30));
        // Moved entries force a repaint.
        assert_eq!(video.wing().blits.len(), blits + 1);
        assert_eq!(gdi.open_dcs, 0);
    }

    #[test]
    fn test_set_colors_nostatic256_keeps_entries() {
        let mut video = device(8);
        video
            .set_video_mode(320, 200, 8, SurfaceFlags::FULLSCREEN)
            .unwrap();
        video.gdi_mut().palette_use = SystemPaletteUse::NoStatic256;
        let blits = video.wing().blits.len();

        video.set_colors(0, &[Color::new(1, 2, 3)]).unwrap();

        assert!(video.logical_palette()[0].same_color(1, 2, 3));
        // Static colors grabbed and nothing moved: no repaint.
        assert_eq!(video.wing().blits.len(), blits);
    }

    #[test]
    fn test_set_colors_out_of_range() {
        let mut video = device(8);
        video
            .set_video_mode(320, 200, 8, SurfaceFlags::empty())
            .unwrap();
        assert!(video.set_colors(250, &[Color::BLACK; 7]).is_err());
    }

    #[test]
    fn test_gamma_saved_and_restored() {
        let mut video = device(16);
        let mut ramp = GammaRamp::identity();
        ramp.red[255] = 0x8000;

        video.set_gamma_ramp(&ramp).unwrap();
        assert_eq!(video.gdi().gamma.as_ref().unwrap().red[255], 0x8000);
        assert_eq!(video.gamma_ramp().unwrap(), ramp);

        // Losing focus puts the desktop ramp back.
        video.activate(false, false);
        assert!(!video.has_input_focus());
        assert_eq!(video.gdi().gamma, Some(GammaRamp::identity()));

        // Regaining it applies ours again.
        video.activate(true, false);
        assert_eq!(video.gdi().gamma, Some(ramp));

        video.video_quit();
        assert_eq!(video.gdi().gamma, Some(GammaRamp::identity()));
    }

    #[test]
    fn test_gamma_deferred_while_unfocused() {
        let mut video = device(16);
        video.activate(false, false);
        let mut ramp = GammaRamp::identity();
        ramp.blue[0] = 0x100;

        video.set_gamma_ramp(&ramp).unwrap();
        assert_eq!(video.gdi().gamma_writes, 0);

        video.activate(true, false);
        assert_eq!(video.gdi().gamma, Some(ramp));
    }

    #[test]
    fn test_activation_grabs_static_colors() {
        let mut video = device(8);
        video
            .set_video_mode(320, 200, 8, SurfaceFlags::HWPALETTE)
            .unwrap();
        assert!(video.grabs_static_colors());
        video.gdi_mut().realize_changes = 3;

        video.activate(true, false);
        assert_eq!(video.gdi().palette_use, SystemPaletteUse::NoStatic256);
        assert_eq!(video.gdi().invalidated, 1);

        video.activate(false, false);
        assert_eq!(video.gdi().palette_use, SystemPaletteUse::Static);

        video.gdi_mut().allows_nostatic256 = false;
        video.activate(true, false);
        assert_eq!(video.gdi().palette_use, SystemPaletteUse::NoStatic);

        // Minimized activation leaves the palette alone.
        video.gdi_mut().palette_use = SystemPaletteUse::Static;
        video.activate(true, true);
        assert_eq!(video.gdi().palette_use, SystemPaletteUse::Static);
    }

    #[test]
    fn test_palette_changed_by_other_window() {
        let mut video = device(8);
        video.palette_changed(true);
        assert_eq!(video.gdi().realized, 0);
        video.palette_changed(false);
        assert_eq!(video.gdi().realized, 1);
    }

    #[test]
    fn test_paint_blits_whole_screen() {
        let mut video = device(16);
        video.paint();
        assert!(video.wing().blits.is_empty());

        video
            .set_video_mode(320, 240, 16, SurfaceFlags::empty())
            .unwrap();
        video.paint();
        let blit = video.wing().blits[0];
        assert_eq!((blit.x, blit.y, blit.w, blit.h), (0, 0, 320, 240));
        assert_eq!(video.gdi().open_dcs, 0);
    }

    #[test]
    fn test_quit_releases_everything() {
        let mut video = device(8);
        video
            .set_video_mode(640, 480, 8, SurfaceFlags::FULLSCREEN)
            .unwrap();
        video.activate(true, false);

        video.video_quit();

        let gdi = video.gdi();
        assert_eq!(gdi.palette_use, SystemPaletteUse::Static);
        assert_eq!(gdi.display_changes.last(), Some(&None));
        assert!(!gdi.visible);
        assert!(gdi.palettes.is_empty());
        assert_eq!(gdi.deleted_bitmaps.len(), 1);
        assert!(!gdi.window);
        assert!(video.screen_pixels_mut().is_none());
    }

    #[test]
    fn test_hardware_surfaces_unsupported() {
        let mut video = device(16);
        let mut surface =
            Surface::software(8, 8, 8, PixelFormat::indexed8(), SurfaceFlags::empty());
        assert!(video.alloc_hw_surface(&mut surface).is_err());
    }

    fn wing_loader(symbols: &'static [(&'static str, usize)]) -> LoaderFactory {
        Box::new(move || {
            Box::new(SymbolTableLoader::new().with_library(WING_LIBRARY, symbols))
                as Box<dyn SharedObjectLoader + Send>
        })
    }

    fn fakes() -> WingHardwareFactory<FakeWinG, FakeGdi> {
        Box::new(|_: &WingEntryPoints| (FakeWinG::recommending(8), FakeGdi::new()))
    }

    #[test]
    fn test_bootstrap_creates_device() {
        const SYMBOLS: &[(&str, usize)] = &[
            (WING_CREATE_DC, 1),
            (WING_RECOMMEND_DIB_FORMAT, 2),
            (WING_CREATE_BITMAP, 3),
            (WING_GET_DIB_COLOR_TABLE, 4),
            (WING_BIT_BLT, 5),
        ];
        let bootstrap = WingBootstrap::new(wing_loader(SYMBOLS), fakes());
        assert_eq!(bootstrap.name(), "wing");
        assert_eq!(bootstrap.description(), "Win32s WinG");
        assert!(bootstrap.available());

        let mut device = bootstrap.create(&VideoConfig::default()).unwrap();
        assert_eq!(device.name(), "wing");
        assert_eq!(device.video_init().unwrap().bits_per_pixel, 8);
    }

    #[test]
    fn test_bootstrap_requires_every_entry_point() {
        const PARTIAL: &[(&str, usize)] = &[(WING_CREATE_DC, 1), (WING_BIT_BLT, 5)];
        let bootstrap = WingBootstrap::new(wing_loader(PARTIAL), fakes());
        assert!(bootstrap.available());
        let err = bootstrap.create(&VideoConfig::default()).err().unwrap();
        assert_eq!(
            err,
            VideoError::Platform(format!(
                "Failed loading {}: The specified procedure could not be found.",
                WING_RECOMMEND_DIB_FORMAT
            ))
        );
    }

    #[test]
    fn test_bootstrap_unavailable_without_library() {
        let bootstrap: WingBootstrap<FakeWinG, FakeGdi> = WingBootstrap::new(
            Box::new(|| Box::new(SymbolTableLoader::new()) as Box<dyn SharedObjectLoader + Send>),
            fakes(),
        );
        assert!(!bootstrap.available());
        assert!(bootstrap.create(&VideoConfig::default()).is_err());
    }
}
