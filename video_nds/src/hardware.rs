//! Nintendo DS 2D engine registers and memory, as the driver sees them.

/// Main engine bitmap mode 5
pub const MODE_5_2D: u32 = 0x10005;
/// Sub engine text mode 0
pub const MODE_0_2D: u32 = 0x10000;
pub const DISPLAY_BG0_ACTIVE: u32 = 0x100;
pub const DISPLAY_BG2_ACTIVE: u32 = 0x400;

pub const BG_BMP8_128X128: u16 = 0x0080;
pub const BG_BMP8_256X256: u16 = 0x4080;
pub const BG_BMP8_512X256: u16 = 0x8080;
pub const BG_BMP8_512X512: u16 = 0xC080;
pub const BG_BMP8_1024X512: u16 = 0x4000;
pub const BG_BMP8_512X1024: u16 = 0x0000;
pub const BG_BMP16_128X128: u16 = 0x0084;
pub const BG_BMP16_256X256: u16 = 0x4084;
pub const BG_BMP16_512X256: u16 = 0x8084;
pub const BG_BMP16_512X512: u16 = 0xC084;

/// Background bitmap base block size in bytes
pub const BG_BMP_BLOCK: usize = 0x4000;

/// Main background VRAM (banks A-D)
pub const MAIN_BG_RAM_SIZE: usize = 4 * 128 * 1024;

/// Scanline at which vertical blank starts
pub const VBLANK_LINE: u16 = 192;

/// Background control map base field
pub const fn bg_map_base(base: u16) -> u16 {
    base << 8
}

/// Byte offset of background bitmap block `block`
pub const fn bg_bmp_ram(block: usize) -> usize {
    block * BG_BMP_BLOCK
}

/// Packs 5-bit components into a 15-bit color
pub const fn rgb15(r: u16, g: u16, b: u16) -> u16 {
    r | (g << 5) | (b << 10)
}

/// VRAM banks the driver configures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VramBank {
    A,
    B,
    C,
    D,
    E,
    H,
    I,
}

/// What a VRAM bank is mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VramUsage {
    MainBg,
    MainSprite,
    SubBg,
    Lcd,
}

/// BG2 affine transform registers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bg2Affine {
    pub pa: i16,
    pub pb: i16,
    pub pc: i16,
    pub pd: i16,
    pub x: i32,
    pub y: i32,
}

/// Sprite graphics allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GfxHandle(pub u32);

/// 2D engine access
///
/// Offsets into background RAM are bytes from the start of main BG VRAM.
/// DMA transfers move halfwords: offsets and lengths must be even.
pub trait NdsHardware: Send {
    fn set_main_mode(&mut self, mode: u32);
    fn set_sub_mode(&mut self, mode: u32);
    fn set_vram_bank(&mut self, bank: VramBank, usage: VramUsage);

    /// Initializes main OAM with 1D 32-byte sprite mapping
    fn oam_init(&mut self);
    fn set_sprite_palette(&mut self, index: usize, color: u16);

    /// Sets up the text console on the sub screen
    fn console_init(&mut self);

    /// Main background bitmap memory
    fn bg_ram(&self) -> &[u8];
    fn bg_ram_mut(&mut self) -> &mut [u8];
    fn dma_fill_halfwords(&mut self, value: u16, offset: usize, len: usize);
    fn dma_copy(&mut self, src: &[u8], offset: usize);

    /// Writes back the data cache over `range` so DMA sees it
    fn flush_range(&mut self, range: &[u8]);

    fn set_bg2_control(&mut self, value: u16);
    fn set_bg2_affine(&mut self, affine: Bg2Affine);
    fn set_bg_palette(&mut self, index: usize, color: u16);

    fn lcd_main_on_bottom(&mut self);
    fn lcd_main_on_top(&mut self);

    /// Whether POWCNT's LCD swap bit is set (main engine on top)
    fn lcds_swapped(&self) -> bool;

    /// Current scanline
    fn vcount(&mut self) -> u16;

    /// Allocates a 32x64 16-color sprite
    fn oam_allocate_gfx(&mut self) -> Option<GfxHandle>;
    fn oam_write_gfx(&mut self, gfx: GfxHandle, words: &[u32]);
    fn oam_free_gfx(&mut self, gfx: GfxHandle);
    fn oam_set(&mut self, index: u8, x: i32, y: i32, gfx: GfxHandle);
    fn oam_set_hidden(&mut self, index: u8, hidden: bool);

    /// Copies the OAM shadow to hardware
    fn oam_update(&mut self);
}
