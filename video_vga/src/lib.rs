//! # VGA Mode 13h Video
//!
//! 320x200 with 256 palettized colors, drawn through a system-memory back
//! buffer copied to VRAM during vertical retrace. Keyboard and mouse input
//! come from the DOS event pump.

pub mod bios;
pub mod vram;

use bios::VideoBios;
use event_queue::EventSink;
use hal::framebuffer::Framebuffer;
use hal_dos::events::DosEvents;
use hal_dos::port_io::PortIo;
use std::sync::Arc;
use video::{
    Color, ModeList, PixelFormat, Rect, Surface, SurfaceFlags, VideoBackend, VideoConfig,
    VideoDevice, VideoError, VideoInfo,
};

pub use bios::{RecordingBios, MODE_13H, MODE_TEXT};
pub use vram::{PhysicalVram, VGA_VRAM_ADDR};

/// Mode 13h width in pixels
pub const VGA_WIDTH: u32 = 320;

/// Mode 13h height in pixels
pub const VGA_HEIGHT: u32 = 200;

/// DAC write index port
pub const DAC_WRITE_INDEX_PORT: u16 = 0x3C8;

/// DAC data port
pub const DAC_DATA_PORT: u16 = 0x3C9;

/// Input status register 1
pub const INPUT_STATUS_PORT: u16 = 0x3DA;

/// Vertical retrace bit in input status register 1
pub const VRETRACE_BIT: u8 = 0x08;

/// Hardware a VGA device drives
pub struct VgaHardware {
    pub io: Arc<dyn PortIo>,
    pub bios: Box<dyn VideoBios>,
    pub vram: Box<dyn Framebuffer>,
    pub events: DosEvents,
}

/// VGA mode 13h device
pub struct VgaVideo {
    io: Arc<dyn PortIo>,
    bios: Box<dyn VideoBios>,
    vram: Box<dyn Framebuffer>,
    events: DosEvents,
    info: VideoInfo,
}

impl VgaVideo {
    pub fn new(hw: VgaHardware) -> Self {
        Self {
            io: hw.io,
            bios: hw.bios,
            vram: hw.vram,
            events: hw.events,
            info: VideoInfo::default(),
        }
    }

    /// Video memory the screen is copied into
    pub fn vram(&self) -> &dyn Framebuffer {
        self.vram.as_ref()
    }

    pub fn events(&self) -> &DosEvents {
        &self.events
    }

    /// Waits for the start of the next vertical retrace
    fn wait_vretrace(&self) {
        while self.io.inb(INPUT_STATUS_PORT) & VRETRACE_BIT != 0 {}
        while self.io.inb(INPUT_STATUS_PORT) & VRETRACE_BIT == 0 {}
    }
}

impl VideoDevice for VgaVideo {
    fn name(&self) -> &'static str {
        "vga"
    }

    fn video_init(&mut self) -> Result<PixelFormat, VideoError> {
        self.info.current_w = VGA_WIDTH;
        self.info.current_h = VGA_HEIGHT;
        self.events
            .init()
            .map_err(|err| VideoError::Platform(err.to_string()))?;
        Ok(PixelFormat::indexed8())
    }

    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn list_modes(&self, _format: &PixelFormat, _flags: SurfaceFlags) -> ModeList {
        ModeList::Modes(vec![Rect::sized(VGA_WIDTH, VGA_HEIGHT)])
    }

    fn set_video_mode(
        &mut self,
        width: u32,
        height: u32,
        bpp: u8,
        flags: SurfaceFlags,
    ) -> Result<Surface, VideoError> {
        if width > VGA_WIDTH || height > VGA_HEIGHT {
            return Err(VideoError::UnsupportedMode { width, height, bpp });
        }

        let surface = Surface::software(
            width,
            height,
            width,
            PixelFormat::indexed8(),
            flags | SurfaceFlags::FULLSCREEN,
        );
        self.bios.set_mode(MODE_13H);

        tracing::info!(width, height, "VGA mode 13h set");
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

        self.io.outb(DAC_WRITE_INDEX_PORT, first as u8);
        for color in colors {
            self.io.outb(DAC_DATA_PORT, color.r >> 2);
            self.io.outb(DAC_DATA_PORT, color.g >> 2);
            self.io.outb(DAC_DATA_PORT, color.b >> 2);
        }
        Ok(())
    }

    fn update_rects(&mut self, screen: &Surface, rects: &[Rect]) {
        let Some(pixels) = screen.pixels() else {
            return;
        };

        self.wait_vretrace();

        let info = self.vram.info();
        let pitch = screen.pitch as usize;
        let vram = self.vram.buffer_mut();
        for rect in rects {
            let Some(rect) = rect
                .clip(screen.w, screen.h)
                .and_then(|r| r.clip(info.width as u32, info.height as u32))
            else {
                continue;
            };
            let (x, w) = (rect.x as usize, rect.w as usize);
            for row in rect.y as usize..(rect.y as usize + rect.h as usize) {
                let src = row * pitch + x;
                let dst = info.offset(x, row);
                vram[dst..dst + w].copy_from_slice(&pixels[src..src + w]);
            }
        }
    }

    fn video_quit(&mut self) {
        self.events.quit();
        self.bios.set_mode(MODE_TEXT);
        tracing::info!("VGA video shut down");
    }

    fn pump_events(&mut self, sink: &mut dyn EventSink) {
        self.events.pump(sink);
    }
}

/// Builds the hardware for each new device
pub type VgaHardwareFactory = Box<dyn Fn() -> VgaHardware + Send + Sync>;

/// Registry entry for the VGA backend
pub struct VgaBootstrap {
    make: VgaHardwareFactory,
}

impl VgaBootstrap {
    pub fn new(make: VgaHardwareFactory) -> Self {
        Self { make }
    }
}

impl VideoBackend for VgaBootstrap {
    fn name(&self) -> &'static str {
        "vga"
    }

    fn description(&self) -> &'static str {
        "VGA mode 13h driver"
    }

    fn available(&self) -> bool {
        true
    }

    fn create(&self, _config: &VideoConfig) -> Result<Box<dyn VideoDevice>, VideoError> {
        Ok(Box::new(VgaVideo::new((self.make)())))
    }
}
