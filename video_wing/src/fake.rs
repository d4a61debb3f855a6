//! Recording WinG and GDI implementations for tests and host simulation.

use crate::gdi::{
    Bitmap, Dc, DisplayMode, Gdi, Palette, PaletteEntry, RgbQuad, SystemPaletteUse, WindowStyle,
};
use crate::wing::{DibHeader, WinG};
use std::collections::HashMap;
use video::GammaRamp;

/// One `bit_blt` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blit {
    pub dst: Dc,
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    pub src: Dc,
}

/// Fake WinG
#[derive(Debug, Default)]
pub struct FakeWinG {
    /// What `recommend_dib_format` returns
    pub recommended: Option<DibHeader>,
    pub bitmaps: HashMap<Bitmap, (DibHeader, Vec<u8>)>,
    pub blits: Vec<Blit>,
    pub dcs_created: usize,
    pub fail_bitmaps: bool,
    next_handle: usize,
}

impl FakeWinG {
    /// WinG recommending `bit_count` top-down DIBs
    pub fn recommending(bit_count: u16) -> Self {
        Self {
            recommended: Some(DibHeader {
                bit_count,
                ..DibHeader::fallback()
            }),
            ..Self::default()
        }
    }
}

impl WinG for FakeWinG {
    fn create_dc(&mut self) -> Option<Dc> {
        self.dcs_created += 1;
        self.next_handle += 1;
        Some(Dc(0x1000 + self.next_handle))
    }

    fn recommend_dib_format(&mut self) -> Option<DibHeader> {
        self.recommended
    }

    fn create_bitmap(&mut self, _dc: Dc, header: &DibHeader) -> Option<Bitmap> {
        if self.fail_bitmaps {
            return None;
        }
        self.next_handle += 1;
        let bitmap = Bitmap(0x2000 + self.next_handle);
        self.bitmaps
            .insert(bitmap, (*header, vec![0; header.size_image as usize]));
        Some(bitmap)
    }

    fn bits_mut(&mut self, bitmap: Bitmap) -> Option<&mut [u8]> {
        self.bitmaps.get_mut(&bitmap).map(|(_, bits)| bits.as_mut_slice())
    }

    fn get_dib_color_table(&mut self, _dc: Dc, _first: usize, colors: &mut [RgbQuad]) -> usize {
        colors.len()
    }

    fn bit_blt(
        &mut self,
        dst: Dc,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        src: Dc,
        _src_x: i32,
        _src_y: i32,
    ) -> bool {
        self.blits.push(Blit {
            dst,
            x,
            y,
            w,
            h,
            src,
        });
        true
    }
}

/// Fake window system
///
/// Starts with a 640x480 32-bit desktop at 60 Hz, a gray system palette,
/// working gamma ramps and static system colors.
#[derive(Debug)]
pub struct FakeGdi {
    pub window: bool,
    pub fail_window: bool,
    pub visible: bool,
    pub style: WindowStyle,
    pub zoomed: bool,
    pub positions: Vec<(u32, u32, bool)>,
    pub invalidated: usize,
    pub open_dcs: i64,
    pub deleted_dcs: usize,
    pub selected_bitmaps: HashMap<Dc, Bitmap>,
    pub deleted_bitmaps: Vec<Bitmap>,
    pub system_palette: Vec<PaletteEntry>,
    pub palettes: HashMap<Palette, Vec<PaletteEntry>>,
    pub selected_palette: Option<Palette>,
    pub realize_changes: usize,
    pub realized: usize,
    pub palette_use: SystemPaletteUse,
    /// Whether the display honors a NOSTATIC256 request
    pub allows_nostatic256: bool,
    pub dib_color_table: [RgbQuad; 256],
    /// Current device ramp, `None` when the display has no gamma support
    pub gamma: Option<GammaRamp>,
    pub gamma_writes: usize,
    pub desktop: DisplayMode,
    pub modes: Vec<DisplayMode>,
    pub display_changes: Vec<Option<DisplayMode>>,
    /// Reject mode changes that carry a refresh rate
    pub reject_refresh: bool,
    /// Reject every mode change
    pub fail_display_changes: bool,
    next_handle: usize,
}

impl FakeGdi {
    pub fn new() -> Self {
        let system_palette = (0..=255u8).map(|i| PaletteEntry::rgb(i, i, i)).collect();
        Self {
            window: false,
            fail_window: false,
            visible: false,
            style: WindowStyle::WINDOWED,
            zoomed: false,
            positions: Vec::new(),
            invalidated: 0,
            open_dcs: 0,
            deleted_dcs: 0,
            selected_bitmaps: HashMap::new(),
            deleted_bitmaps: Vec::new(),
            system_palette,
            palettes: HashMap::new(),
            selected_palette: None,
            realize_changes: 0,
            realized: 0,
            palette_use: SystemPaletteUse::Static,
            allows_nostatic256: true,
            dib_color_table: [RgbQuad::default(); 256],
            gamma: Some(GammaRamp::identity()),
            gamma_writes: 0,
            desktop: DisplayMode {
                bits_per_pixel: 32,
                width: 640,
                height: 480,
                frequency: Some(60),
            },
            modes: Vec::new(),
            display_changes: Vec::new(),
            reject_refresh: false,
            fail_display_changes: false,
            next_handle: 0,
        }
    }

    fn handle(&mut self) -> usize {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Default for FakeGdi {
    fn default() -> Self {
        Self::new()
    }
}

impl Gdi for FakeGdi {
    fn create_window(&mut self) -> Result<(), String> {
        if self.fail_window {
            return Err("Couldn't create window".to_string());
        }
        self.window = true;
        Ok(())
    }

    fn destroy_window(&mut self) {
        self.window = false;
    }

    fn show_window(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn window_style(&self) -> WindowStyle {
        self.style
    }

    fn set_window_style(&mut self, style: WindowStyle) {
        self.style = style;
    }

    fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    fn position_window(&mut self, width: u32, height: u32, fullscreen: bool) {
        self.positions.push((width, height, fullscreen));
        self.visible = true;
    }

    fn invalidate(&mut self) {
        self.invalidated += 1;
    }

    fn get_dc(&mut self) -> Dc {
        self.open_dcs += 1;
        Dc(self.handle())
    }

    fn release_dc(&mut self, _dc: Dc) {
        self.open_dcs -= 1;
    }

    fn delete_dc(&mut self, dc: Dc) {
        self.selected_bitmaps.remove(&dc);
        self.deleted_dcs += 1;
    }

    fn select_bitmap(&mut self, dc: Dc, bitmap: Bitmap) {
        self.selected_bitmaps.insert(dc, bitmap);
    }

    fn delete_bitmap(&mut self, bitmap: Bitmap) {
        self.deleted_bitmaps.push(bitmap);
    }

    fn system_palette_entries(&mut self, _dc: Dc, count: usize) -> Vec<PaletteEntry> {
        self.system_palette.iter().copied().take(count).collect()
    }

    fn create_palette(&mut self, entries: &[PaletteEntry]) -> Option<Palette> {
        let palette = Palette(self.handle());
        self.palettes.insert(palette, entries.to_vec());
        Some(palette)
    }

    fn delete_palette(&mut self, palette: Palette) {
        self.palettes.remove(&palette);
        if self.selected_palette == Some(palette) {
            self.selected_palette = None;
        }
    }

    fn set_palette_entries(&mut self, palette: Palette, first: usize, entries: &[PaletteEntry]) {
        if let Some(table) = self.palettes.get_mut(&palette) {
            table[first..first + entries.len()].copy_from_slice(entries);
        }
    }

    fn unrealize_palette(&mut self, _palette: Palette) {}

    fn select_palette(&mut self, _dc: Dc, palette: Palette) {
        self.selected_palette = Some(palette);
    }

    fn realize_palette(&mut self, _dc: Dc) -> usize {
        self.realized += 1;
        self.realize_changes
    }

    fn system_palette_use(&mut self, _dc: Dc) -> SystemPaletteUse {
        self.palette_use
    }

    fn set_system_palette_use(&mut self, _dc: Dc, usage: SystemPaletteUse) {
        if usage == SystemPaletteUse::NoStatic256 && !self.allows_nostatic256 {
            return;
        }
        self.palette_use = usage;
    }

    fn set_dib_color_table(&mut self, _dc: Dc, first: usize, colors: &[RgbQuad]) {
        self.dib_color_table[first..first + colors.len()].copy_from_slice(colors);
    }

    fn device_gamma_ramp(&mut self, _dc: Dc) -> Option<GammaRamp> {
        self.gamma.clone()
    }

    fn set_device_gamma_ramp(&mut self, _dc: Dc, ramp: &GammaRamp) -> bool {
        if self.gamma.is_none() {
            return false;
        }
        self.gamma = Some(ramp.clone());
        self.gamma_writes += 1;
        true
    }

    fn desktop_mode(&mut self) -> DisplayMode {
        self.desktop
    }

    fn display_modes(&mut self) -> Vec<DisplayMode> {
        self.modes.clone()
    }

    fn change_display_settings(&mut self, mode: Option<&DisplayMode>) -> bool {
        if let Some(mode) = mode {
            if self.fail_display_changes || (self.reject_refresh && mode.frequency.is_some()) {
                return false;
            }
        }
        self.display_changes.push(mode.copied());
        true
    }
}
