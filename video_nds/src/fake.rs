//! Recording 2D engine for tests and host simulation.

use crate::hardware::{
    Bg2Affine, GfxHandle, NdsHardware, VramBank, VramUsage, MAIN_BG_RAM_SIZE, VBLANK_LINE,
};
use std::collections::{HashMap, VecDeque};

/// One sprite attribute entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OamEntry {
    pub x: i32,
    pub y: i32,
    pub gfx: GfxHandle,
    pub hidden: bool,
}

/// Fake 2D engine
///
/// VCOUNT reads come from a script; when it runs out the counter cycles
/// through 191, 192, 193 so vblank waits terminate.
#[derive(Debug)]
pub struct FakeNds {
    pub main_mode: u32,
    pub sub_mode: u32,
    pub vram_banks: Vec<(VramBank, VramUsage)>,
    pub oam_initialized: bool,
    pub console_initialized: bool,
    pub sprite_palette: [u16; 16],
    pub bg_palette: [u16; 256],
    pub bg2_control: u16,
    pub bg2_control_writes: Vec<u16>,
    pub bg2_affine: Bg2Affine,
    pub swapped: bool,
    /// (offset, len) of every DMA copy
    pub dma_copies: Vec<(usize, usize)>,
    pub flushes: usize,
    pub oam: HashMap<u8, OamEntry>,
    pub gfx: HashMap<GfxHandle, Vec<u32>>,
    pub oam_updates: usize,
    pub vcount_script: VecDeque<u16>,
    pub gfx_limit: usize,
    bg_ram: Vec<u8>,
    next_gfx: u32,
    vcount: u16,
}

impl FakeNds {
    pub fn new() -> Self {
        Self {
            main_mode: 0,
            sub_mode: 0,
            vram_banks: Vec::new(),
            oam_initialized: false,
            console_initialized: false,
            sprite_palette: [0; 16],
            bg_palette: [0; 256],
            bg2_control: 0,
            bg2_control_writes: Vec::new(),
            bg2_affine: Bg2Affine::default(),
            swapped: true,
            dma_copies: Vec::new(),
            flushes: 0,
            oam: HashMap::new(),
            gfx: HashMap::new(),
            oam_updates: 0,
            vcount_script: VecDeque::new(),
            gfx_limit: usize::MAX,
            bg_ram: vec![0; MAIN_BG_RAM_SIZE],
            next_gfx: 0,
            vcount: 190,
        }
    }
}

impl Default for FakeNds {
    fn default() -> Self {
        Self::new()
    }
}

impl NdsHardware for FakeNds {
    fn set_main_mode(&mut self, mode: u32) {
        self.main_mode = mode;
    }

    fn set_sub_mode(&mut self, mode: u32) {
        self.sub_mode = mode;
    }

    fn set_vram_bank(&mut self, bank: VramBank, usage: VramUsage) {
        self.vram_banks.push((bank, usage));
    }

    fn oam_init(&mut self) {
        self.oam_initialized = true;
    }

    fn set_sprite_palette(&mut self, index: usize, color: u16) {
        self.sprite_palette[index] = color;
    }

    fn console_init(&mut self) {
        self.console_initialized = true;
    }

    fn bg_ram(&self) -> &[u8] {
        &self.bg_ram
    }

    fn bg_ram_mut(&mut self) -> &mut [u8] {
        &mut self.bg_ram
    }

    fn dma_fill_halfwords(&mut self, value: u16, offset: usize, len: usize) {
        assert!(offset % 2 == 0 && len % 2 == 0, "unaligned DMA fill");
        let bytes = value.to_le_bytes();
        for (i, byte) in self.bg_ram[offset..offset + len].iter_mut().enumerate() {
            *byte = bytes[i % 2];
        }
    }

    fn dma_copy(&mut self, src: &[u8], offset: usize) {
        assert!(
            offset % 2 == 0 && src.len() % 2 == 0,
            "unaligned DMA copy: offset {} len {}",
            offset,
            src.len()
        );
        self.bg_ram[offset..offset + src.len()].copy_from_slice(src);
        self.dma_copies.push((offset, src.len()));
    }

    fn flush_range(&mut self, _range: &[u8]) {
        self.flushes += 1;
    }

    fn set_bg2_control(&mut self, value: u16) {
        self.bg2_control = value;
        self.bg2_control_writes.push(value);
    }

    fn set_bg2_affine(&mut self, affine: Bg2Affine) {
        self.bg2_affine = affine;
    }

    fn set_bg_palette(&mut self, index: usize, color: u16) {
        self.bg_palette[index] = color;
    }

    fn lcd_main_on_bottom(&mut self) {
        self.swapped = false;
    }

    fn lcd_main_on_top(&mut self) {
        self.swapped = true;
    }

    fn lcds_swapped(&self) -> bool {
        self.swapped
    }

    fn vcount(&mut self) -> u16 {
        if let Some(v) = self.vcount_script.pop_front() {
            return v;
        }
        self.vcount = if self.vcount >= VBLANK_LINE + 1 {
            VBLANK_LINE - 1
        } else {
            self.vcount + 1
        };
        self.vcount
    }

    fn oam_allocate_gfx(&mut self) -> Option<GfxHandle> {
        if self.gfx.len() >= self.gfx_limit {
            return None;
        }
        self.next_gfx += 1;
        let handle = GfxHandle(self.next_gfx);
        self.gfx.insert(handle, vec![0; 256]);
        Some(handle)
    }

    fn oam_write_gfx(&mut self, gfx: GfxHandle, words: &[u32]) {
        self.gfx.insert(gfx, words.to_vec());
    }

    fn oam_free_gfx(&mut self, gfx: GfxHandle) {
        self.gfx.remove(&gfx);
    }

    fn oam_set(&mut self, index: u8, x: i32, y: i32, gfx: GfxHandle) {
        self.oam.insert(
            index,
            OamEntry {
                x,
                y,
                gfx,
                hidden: false,
            },
        );
    }

    fn oam_set_hidden(&mut self, index: u8, hidden: bool) {
        if let Some(entry) = self.oam.get_mut(&index) {
            entry.hidden = hidden;
        }
    }

    fn oam_update(&mut self) {
        self.oam_updates += 1;
    }
}
