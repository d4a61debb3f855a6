//! # Nintendo DS Video
//!
//! The main engine runs bitmap mode 5 with BG2 as an affine bitmap
//! background scaled onto the 256x192 screen. 16-bit hardware screens draw
//! straight into background VRAM and may be double buffered; everything
//! else draws into system memory and is copied over by DMA. The mouse
//! cursor is sprite 0.

pub mod fake;
pub mod hardware;

use hardware::{
    bg_bmp_ram, bg_map_base, rgb15, Bg2Affine, GfxHandle, NdsHardware, VramBank, VramUsage,
    BG_BMP16_128X128, BG_BMP16_256X256, BG_BMP16_512X256, BG_BMP16_512X512, BG_BMP8_1024X512,
    BG_BMP8_128X128, BG_BMP8_256X256, BG_BMP8_512X1024, BG_BMP8_512X256, BG_BMP8_512X512,
    DISPLAY_BG0_ACTIVE, DISPLAY_BG2_ACTIVE, MAIN_BG_RAM_SIZE, MODE_0_2D, MODE_5_2D, VBLANK_LINE,
};
use std::collections::HashMap;
use video::{
    Color, CursorId, CursorImage, ModeList, PixelFormat, Pixels, Rect, Surface, SurfaceFlags,
    VideoBackend, VideoConfig, VideoDevice, VideoError, VideoInfo,
};

pub use fake::FakeNds;

/// Physical screen width
pub const SCREEN_WIDTH: u32 = 256;

/// Physical screen height
pub const SCREEN_HEIGHT: u32 = 192;

/// Cursor sprite size
pub const CURSOR_WIDTH: u32 = 32;
pub const CURSOR_HEIGHT: u32 = 64;

/// OAM slot the cursor occupies
pub const CURSOR_SPRITE: u8 = 0;

/// 32-bit words in one packed cursor sprite
pub const CURSOR_WORDS: usize = (CURSOR_WIDTH * CURSOR_HEIGHT / 8) as usize;

/// Background bitmap block of the second buffer
const BACK_BANK_BLOCK: usize = 16;

/// Picks the BG2 control value and VRAM pitch for a bitmap of the given
/// size. Returns `None` when no background size holds it.
pub fn background_control(width: u32, height: u32, bytes_pp: u32) -> Option<(u16, usize)> {
    let bmp16 = bytes_pp > 1;
    let pick = |bmp8: u16, bmp16_cnt: u16, pitch: u32| {
        let cnt = if bmp16 { bmp16_cnt } else { bmp8 };
        Some((cnt, (pitch * bytes_pp) as usize))
    };

    if width <= 128 && height <= 128 {
        pick(BG_BMP8_128X128, BG_BMP16_128X128, 128)
    } else if width <= 256 && height <= 256 {
        pick(BG_BMP8_256X256, BG_BMP16_256X256, 256)
    } else if width <= 512 && height <= 256 {
        pick(BG_BMP8_512X256, BG_BMP16_512X256, 512)
    } else if width <= 512 && height <= 512 {
        pick(BG_BMP8_512X512, BG_BMP16_512X512, 512)
    } else if !bmp16 && width <= 1024 && height <= 512 {
        Some((BG_BMP8_1024X512, 1024))
    } else if !bmp16 && width <= 512 && height <= 1024 {
        Some((BG_BMP8_512X1024, 512))
    } else {
        None
    }
}

/// BG2 transform scaling a `width` x `height` bitmap onto the screen
pub fn background_scale(width: u32, height: u32) -> Bg2Affine {
    let pa = ((width / SCREEN_WIDTH) << 8) | (width % SCREEN_WIDTH);
    let rem = height % SCREEN_HEIGHT;
    let pd = ((height / SCREEN_HEIGHT) << 8) | (rem + rem / 3);
    Bg2Affine {
        pa: pa as i16,
        pb: 0,
        pc: 0,
        pd: pd as i16,
        x: 0,
        y: 0,
    }
}

/// Packs a monochrome cursor into 16-color sprite tiles.
///
/// Each pixel becomes the palette index `data << 1 | mask`. The sprite is
/// 8 rows of 4 tiles; a tile is 8 words and a word holds 8 pixels, leftmost
/// in the low nibble.
pub fn pack_cursor(image: &CursorImage) -> Result<Vec<u32>, VideoError> {
    if image.w > CURSOR_WIDTH || image.h > CURSOR_HEIGHT {
        return Err(VideoError::Unsupported("cursors larger than 32x64"));
    }
    if image.w % 8 != 0 {
        return Err(VideoError::Unsupported("cursor widths not a multiple of 8"));
    }
    let row_bytes = (image.w / 8) as usize;
    let bytes = row_bytes * image.h as usize;
    if image.data.len() < bytes || image.mask.len() < bytes {
        return Err(VideoError::Platform("Cursor bitmap is truncated".to_string()));
    }

    let tiles_per_row = (CURSOR_WIDTH / 8) as usize;
    let mut words = vec![0u32; CURSOR_WORDS];
    for y in 0..image.h as usize {
        for xtile in 0..row_bytes {
            let i = y * row_bytes + xtile;
            let (mut data, mut mask) = (image.data[i], image.mask[i]);
            let mut word = 0u32;
            for _ in 0..8 {
                word = (word << 4) | (u32::from(data & 1) << 1) | u32::from(mask & 1);
                data >>= 1;
                mask >>= 1;
            }
            let tile = (y / 8) * tiles_per_row + xtile;
            words[tile * 8 + y % 8] = word;
        }
    }
    Ok(words)
}

#[derive(Debug, Clone, Copy)]
struct NdsMode {
    w: u32,
    h: u32,
    bg_pitch: usize,
    bgcnt: [u16; 2],
    double_buffered: bool,
}

#[derive(Debug, Clone, Copy)]
struct NdsCursor {
    gfx: GfxHandle,
    hot_x: i32,
    hot_y: i32,
}

/// Nintendo DS video device
pub struct NdsVideo<H: NdsHardware> {
    hw: H,
    info: VideoInfo,
    mode: Option<NdsMode>,
    /// Byte offsets of the two bitmap buffers in background RAM
    banks: [usize; 2],
    current_bank: usize,
    touchscreen: bool,
    cursors: HashMap<CursorId, NdsCursor>,
    next_cursor: u32,
    shown_cursor: Option<CursorId>,
    cursor_x: i32,
    cursor_y: i32,
}

impl<H: NdsHardware> NdsVideo<H> {
    pub fn new(hw: H) -> Self {
        Self {
            hw,
            info: VideoInfo {
                blit_hw: true,
                ..VideoInfo::default()
            },
            mode: None,
            banks: [bg_bmp_ram(0), bg_bmp_ram(BACK_BANK_BLOCK)],
            current_bank: 0,
            touchscreen: false,
            cursors: HashMap::new(),
            next_cursor: 0,
            shown_cursor: None,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Bank the next frame is drawn into
    pub fn current_bank(&self) -> usize {
        self.current_bank
    }

    /// Whether the main engine ended up on the touch screen
    pub fn touchscreen(&self) -> bool {
        self.touchscreen
    }

    /// Video memory behind a hardware surface
    pub fn hardware_pixels_mut(&mut self, surface: &Surface) -> Option<&mut [u8]> {
        let Pixels::Hardware { bank } = surface.pixels else {
            return None;
        };
        let mode = self.mode?;
        let start = *self.banks.get(bank)?;
        let end = (start + mode.bg_pitch * mode.h as usize).min(MAIN_BG_RAM_SIZE);
        self.hw.bg_ram_mut().get_mut(start..end)
    }

    fn wait_vblank(&mut self) {
        while self.hw.vcount() != VBLANK_LINE {}
        while self.hw.vcount() == VBLANK_LINE {}
    }

    fn update_cursor(&mut self) {
        match self.shown_cursor.and_then(|id| self.cursors.get(&id)) {
            Some(cursor) => {
                let (x, y) = (self.cursor_x - cursor.hot_x, self.cursor_y - cursor.hot_y);
                self.hw.oam_set(CURSOR_SPRITE, x, y, cursor.gfx);
            }
            None => self.hw.oam_set_hidden(CURSOR_SPRITE, true),
        }
        self.hw.oam_update();
    }
}

/// Even-length span of `pixels` for a halfword DMA
fn halfword_span(pixels: &[u8], start: usize, len: usize) -> &[u8] {
    let end = (start + len).min(pixels.len());
    let start = start.min(end);
    let len = (end - start) & !1;
    &pixels[start..start + len]
}

impl<H: NdsHardware> VideoDevice for NdsVideo<H> {
    fn name(&self) -> &'static str {
        "nds"
    }

    fn video_init(&mut self) -> Result<PixelFormat, VideoError> {
        self.hw.set_main_mode(MODE_5_2D | DISPLAY_BG2_ACTIVE);
        self.hw.set_sub_mode(MODE_0_2D | DISPLAY_BG0_ACTIVE);

        for bank in [VramBank::A, VramBank::B, VramBank::C, VramBank::D] {
            self.hw.set_vram_bank(bank, VramUsage::MainBg);
        }
        self.hw.set_vram_bank(VramBank::E, VramUsage::MainSprite);
        self.hw.set_vram_bank(VramBank::H, VramUsage::SubBg);
        self.hw.set_vram_bank(VramBank::I, VramUsage::Lcd);

        self.hw.oam_init();
        // transparent, white, inverted (approximated as black), black
        self.hw.set_sprite_palette(0, rgb15(31, 31, 31));
        self.hw.set_sprite_palette(1, rgb15(31, 31, 31));
        self.hw.set_sprite_palette(2, rgb15(0, 0, 0));
        self.hw.set_sprite_palette(3, rgb15(0, 0, 0));

        self.hw.console_init();

        self.info.current_w = SCREEN_WIDTH;
        self.info.current_h = SCREEN_HEIGHT;
        tracing::info!("NDS video initialized");
        Ok(PixelFormat::indexed8())
    }

    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn list_modes(&self, _format: &PixelFormat, _flags: SurfaceFlags) -> ModeList {
        ModeList::Any
    }

    fn set_video_mode(
        &mut self,
        width: u32,
        height: u32,
        bpp: u8,
        flags: SurfaceFlags,
    ) -> Result<Surface, VideoError> {
        if width == 0 || height == 0 {
            return Err(VideoError::UnsupportedMode { width, height, bpp });
        }
        let mut flags = flags | SurfaceFlags::FULLSCREEN;
        let (format, bpp) = if bpp > 8 {
            (PixelFormat::from_masks(16, 0x001F, 0x03E0, 0x7C00, 0x8000), 16)
        } else {
            (PixelFormat::indexed8(), 8)
        };

        let (cnt, bg_pitch) = background_control(width, height, u32::from(bpp / 8)).ok_or(
            VideoError::UnsupportedMode {
                width,
                height,
                bpp,
            },
        )?;
        let bank_size = bg_pitch * height as usize;

        self.hw.dma_fill_halfwords(0, self.banks[0], bank_size);
        let mut bgcnt = [cnt, cnt];
        let double_buffered = flags.contains(SurfaceFlags::DOUBLEBUF) && height <= 256;
        if double_buffered {
            bgcnt[1] = cnt | bg_map_base(BACK_BANK_BLOCK as u16);
            self.hw.dma_fill_halfwords(0, self.banks[1], bank_size);
        } else {
            flags.remove(SurfaceFlags::DOUBLEBUF);
        }

        self.hw.set_bg2_affine(background_scale(width, height));
        self.hw.set_bg2_control(bgcnt[0]);
        self.current_bank = 0;

        let hardware = flags.contains(SurfaceFlags::HWSURFACE) && bpp > 8;
        let surface = if hardware {
            if double_buffered {
                self.hw.set_bg2_control(bgcnt[1]);
            }
            Surface {
                flags,
                format,
                w: width,
                h: height,
                pitch: bg_pitch as u32,
                pixels: Pixels::Hardware { bank: 0 },
            }
        } else {
            flags.remove(SurfaceFlags::HWSURFACE | SurfaceFlags::DOUBLEBUF);
            let pitch = format.calculate_pitch(width);
            Surface::software(width, height, pitch, format, flags)
        };

        if flags.contains(SurfaceFlags::BOTTOM_SCREEN) {
            self.hw.lcd_main_on_bottom();
        } else if flags.contains(SurfaceFlags::TOP_SCREEN) {
            self.hw.lcd_main_on_top();
        }
        self.touchscreen = !self.hw.lcds_swapped();

        self.mode = Some(NdsMode {
            w: width,
            h: height,
            bg_pitch,
            bgcnt,
            double_buffered: hardware && double_buffered,
        });
        self.info.current_w = width;
        self.info.current_h = height;

        tracing::info!(
            width,
            height,
            bpp,
            hardware,
            double_buffered = hardware && double_buffered,
            touchscreen = self.touchscreen,
            "NDS video mode set"
        );
        Ok(surface)
    }

    fn set_colors(&mut self, first: usize, colors: &[Color]) -> Result<(), VideoError> {
        if first.checked_add(colors.len()).map_or(true, |end| end > 256) {
            return Err(VideoError::Platform(format!(
                "Palette range {}+{} out of bounds",
                first,
                colors.len()
            )));
        }
        for (i, color) in colors.iter().enumerate() {
            let value = rgb15(
                u16::from(color.r >> 3),
                u16::from(color.g >> 3),
                u16::from(color.b >> 3),
            );
            self.hw.set_bg_palette(first + i, value);
        }
        Ok(())
    }

    fn update_rects(&mut self, screen: &Surface, rects: &[Rect]) {
        // Hardware screens are drawn in place.
        let Some(pixels) = screen.pixels() else {
            return;
        };
        let Some(mode) = self.mode else {
            return;
        };

        self.hw.flush_range(pixels);

        let bytes_pp = usize::from(screen.format.bytes_per_pixel);
        let pitch = screen.pitch as usize;
        let bank = self.banks[self.current_bank];
        for rect in rects {
            let Some(rect) = rect.clip(screen.w, screen.h) else {
                continue;
            };
            let (x, y, h) = (rect.x as usize, rect.y as usize, rect.h as usize);
            let mut from = x * bytes_pp + y * pitch;
            let mut to = bank + x * bytes_pp + y * mode.bg_pitch;
            let mut rowsize = rect.w as usize * bytes_pp;

            // DMA moves halfwords.
            if to & 1 != 0 {
                from -= bytes_pp;
                to -= bytes_pp;
                rowsize += bytes_pp;
            }
            if rowsize & 1 != 0 {
                rowsize += 1;
            }

            if mode.bg_pitch == pitch && rowsize == pitch {
                self.hw.dma_copy(halfword_span(pixels, from, pitch * h), to);
            } else {
                for row in 0..h {
                    let src = halfword_span(pixels, from + row * pitch, rowsize);
                    self.hw.dma_copy(src, to + row * mode.bg_pitch);
                }
            }
        }
    }

    fn video_quit(&mut self) {
        for (_, cursor) in self.cursors.drain() {
            self.hw.oam_free_gfx(cursor.gfx);
        }
        self.shown_cursor = None;
        self.mode = None;
        self.current_bank = 0;
        tracing::info!("NDS video shut down");
    }

    fn alloc_hw_surface(&mut self, _surface: &mut Surface) -> Result<(), VideoError> {
        Err(VideoError::Unsupported("off-screen hardware surfaces"))
    }

    fn check_hw_blit(&mut self, src: &Surface, dst: &Surface) -> bool {
        let unsupported =
            SurfaceFlags::SRCALPHA | SurfaceFlags::SRCCOLORKEY | SurfaceFlags::HWPALETTE;
        if src.flags.intersects(unsupported) || dst.flags.intersects(unsupported) {
            return false;
        }
        src.format.bits_per_pixel == dst.format.bits_per_pixel
            && src.format.bytes_per_pixel == dst.format.bytes_per_pixel
    }

    fn flip_hw_surface(&mut self, surface: &mut Surface) -> Result<(), VideoError> {
        let mode = self.mode.ok_or(VideoError::NotInitialized)?;
        if !mode.double_buffered {
            return Ok(());
        }

        self.hw.set_bg2_control(mode.bgcnt[self.current_bank]);
        self.current_bank ^= 1;
        surface.pixels = Pixels::Hardware {
            bank: self.current_bank,
        };
        self.wait_vblank();
        Ok(())
    }

    fn create_wm_cursor(&mut self, image: &CursorImage) -> Result<CursorId, VideoError> {
        let words = pack_cursor(image)?;
        let gfx = self.hw.oam_allocate_gfx().ok_or(VideoError::OutOfMemory)?;
        self.hw.oam_write_gfx(gfx, &words);

        self.next_cursor += 1;
        let id = CursorId(self.next_cursor);
        self.cursors.insert(
            id,
            NdsCursor {
                gfx,
                hot_x: image.hot_x,
                hot_y: image.hot_y,
            },
        );
        tracing::debug!(id = id.0, w = image.w, h = image.h, "cursor created");
        Ok(id)
    }

    fn free_wm_cursor(&mut self, cursor: CursorId) {
        let Some(entry) = self.cursors.remove(&cursor) else {
            return;
        };
        if self.shown_cursor == Some(cursor) {
            self.shown_cursor = None;
            self.update_cursor();
        }
        self.hw.oam_free_gfx(entry.gfx);
    }

    fn show_wm_cursor(&mut self, cursor: Option<CursorId>) -> bool {
        if let Some(id) = cursor {
            if !self.cursors.contains_key(&id) {
                return false;
            }
        }
        self.shown_cursor = cursor;
        self.update_cursor();
        true
    }

    fn move_wm_cursor(&mut self, x: i32, y: i32) {
        let Some(mode) = self.mode else {
            return;
        };
        self.cursor_x = x * SCREEN_WIDTH as i32 / mode.w as i32;
        self.cursor_y = y * SCREEN_HEIGHT as i32 / mode.h as i32;
        self.update_cursor();
    }
}

/// Builds the hardware for each new device
pub type NdsHardwareFactory<H> = Box<dyn Fn() -> H + Send + Sync>;

/// Registry entry for the NDS backend
pub struct NdsBootstrap<H: NdsHardware> {
    make: NdsHardwareFactory<H>,
}

impl<H: NdsHardware> NdsBootstrap<H> {
    pub fn new(make: NdsHardwareFactory<H>) -> Self {
        Self { make }
    }
}

impl<H: NdsHardware + 'static> VideoBackend for NdsBootstrap<H> {
    fn name(&self) -> &'static str {
        "nds"
    }

    fn description(&self) -> &'static str {
        "SDL NDS video driver"
    }

    fn available(&self) -> bool {
        true
    }

    fn create(&self, _config: &VideoConfig) -> Result<Box<dyn VideoDevice>, VideoError> {
        Ok(Box::new(NdsVideo::new((self.make)())))
    }
}
