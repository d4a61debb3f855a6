//! # Backend Pipeline Tests
//!
//! Shared rigs for the end-to-end tests under `tests/`.
//!
//! ## Test Philosophy
//!
//! - **Real wiring**: Backends are built the way an application builds them,
//!   through the video registry and the DOS event pump
//! - **Fake hardware only at the edge**: Ports, BIOS, interrupt table and
//!   mouse driver are the only scripted parts

use hal::framebuffer::{FramebufferInfo, MemoryFramebuffer, PixelFormat as FbFormat};
use hal::interrupts::InterruptVectors;
use hal::pointer::PointerDevice;
use hal_dos::interrupts::SoftVectorTable;
use hal_dos::keyboard::{ScriptedController, KEYBOARD_VECTOR};
use hal_dos::mouse::{Int33Mouse, ScriptedMouse};
use hal_dos::port_io::FakePortIo;
use hal_dos::DosEvents;
use std::sync::Arc;
use video::VideoRegistry;
use video_nds::{FakeNds, NdsBootstrap};
use video_vga::{RecordingBios, VgaBootstrap, VgaHardware, INPUT_STATUS_PORT};
use video_wing::{FakeGdi, FakeWinG, WingBootstrap, WingEntryPoints};

/// The DOS machine a VGA device runs on
#[derive(Clone)]
pub struct DosRig {
    pub io: Arc<FakePortIo>,
    pub bios: RecordingBios,
    pub controller: Arc<ScriptedController>,
    pub table: SoftVectorTable,
}

impl DosRig {
    pub fn new() -> Self {
        Self {
            io: Arc::new(FakePortIo::new()),
            bios: RecordingBios::new(),
            controller: Arc::new(ScriptedController::new()),
            table: SoftVectorTable::new(),
        }
    }

    /// Event state wired to this machine's keyboard and interrupt table
    pub fn events(&self, pointer: Box<dyn PointerDevice>) -> DosEvents {
        let vectors: Arc<dyn InterruptVectors> = Arc::new(self.table.clone());
        DosEvents::new(self.controller.clone(), vectors, pointer)
    }

    /// Hardware for one VGA device, with `mouse` as its INT 33h driver
    pub fn hardware(&self, mouse: ScriptedMouse) -> VgaHardware {
        VgaHardware {
            io: self.io.clone(),
            bios: Box::new(self.bios.clone()),
            vram: Box::new(vga_vram()),
            events: self.events(Box::new(Int33Mouse::new(mouse))),
        }
    }

    /// Presses keys: one keyboard interrupt per scancode byte
    pub fn type_scancodes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.controller.feed(&[byte]);
            // Nothing installed means the keystroke is lost, as on hardware.
            let _ = self.table.raise(KEYBOARD_VECTOR);
        }
    }

    /// Scripts one full vertical retrace for the next frame copy
    pub fn script_retrace(&self) {
        self.io.script_reads(&[
            (INPUT_STATUS_PORT, 0x08),
            (INPUT_STATUS_PORT, 0x00),
            (INPUT_STATUS_PORT, 0x08),
        ]);
    }
}

impl Default for DosRig {
    fn default() -> Self {
        Self::new()
    }
}

/// Mode 13h video memory
pub fn vga_vram() -> MemoryFramebuffer {
    MemoryFramebuffer::new(FramebufferInfo {
        width: 320,
        height: 200,
        stride_pixels: 320,
        format: FbFormat::Indexed8,
    })
}

/// Every backend in priority order: WinG (through the host loader), VGA on
/// `rig`, then NDS on fake hardware
pub fn registry(rig: &DosRig) -> VideoRegistry {
    let vga_rig = rig.clone();
    VideoRegistry::new()
        .with(Box::new(WingBootstrap::new(
            Box::new(hal_win32::system_loader),
            Box::new(|_: &WingEntryPoints| {
                (FakeWinG::recommending(8), FakeGdi::new())
            }),
        )))
        .with(Box::new(VgaBootstrap::new(Box::new(move || {
            vga_rig.hardware(ScriptedMouse::absent())
        }))))
        .with(Box::new(NdsBootstrap::new(Box::new(FakeNds::new))))
}
