//! Recording SWI implementations for tests and host simulation.

use crate::swi::{
    CdSwis, ControlBlock, DeviceInfo, JoystickSwis, OsError, CDFS_CONVERT_DRIVE_TO_DEVICE,
    CD_AUDIO_PAUSE, CD_ENQUIRE_TRACK, CD_OPEN_DRAWER, CD_PLAY_AUDIO, CD_STOP_DISC,
};
use std::collections::HashMap;

/// One recorded SWI call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwiCall {
    pub swi: u32,
    /// Control block passed in R7, if any
    pub block: Option<ControlBlock>,
    /// R0-R2 as passed
    pub args: [u32; 3],
}

/// Fake CDFS and CD driver modules
#[derive(Debug, Default)]
pub struct FakeCdfs {
    /// Composite device id per logical drive
    pub device_ids: HashMap<u32, u32>,
    pub first_track: u8,
    pub last_track: u8,
    /// SWIs that fail, with the error they return
    pub failures: HashMap<u32, OsError>,
    pub calls: Vec<SwiCall>,
}

impl FakeCdfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single drive 0 with `device_id` holding tracks `first..=last`
    pub fn with_disc(device_id: u32, first_track: u8, last_track: u8) -> Self {
        Self {
            device_ids: HashMap::from([(0, device_id)]),
            first_track,
            last_track,
            ..Self::default()
        }
    }

    /// Makes `swi` fail from now on
    pub fn fail(&mut self, swi: u32, error: OsError) {
        self.failures.insert(swi, error);
    }

    fn call(&mut self, swi: u32, block: Option<&ControlBlock>, args: [u32; 3]) -> Result<(), OsError> {
        self.calls.push(SwiCall {
            swi,
            block: block.copied(),
            args,
        });
        match self.failures.get(&swi) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl CdSwis for FakeCdfs {
    fn convert_drive_to_device(&mut self, drive: u32) -> Result<u32, OsError> {
        self.call(CDFS_CONVERT_DRIVE_TO_DEVICE, None, [drive, 0, 0])?;
        self.device_ids
            .get(&drive)
            .copied()
            .ok_or_else(|| OsError::new(0x1E8, "Drive not known"))
    }

    fn enquire_track(&mut self, block: &ControlBlock, track: u8) -> Result<[u8; 5], OsError> {
        self.call(CD_ENQUIRE_TRACK, Some(block), [u32::from(track), 0, 0])?;
        Ok([self.first_track, self.last_track, 0, 0, 0])
    }

    fn play_audio(
        &mut self,
        block: &ControlBlock,
        addressing: u32,
        start: u32,
        end: u32,
    ) -> Result<(), OsError> {
        self.call(CD_PLAY_AUDIO, Some(block), [addressing, start, end])
    }

    fn audio_pause(&mut self, block: &ControlBlock, pause: bool) -> Result<(), OsError> {
        self.call(CD_AUDIO_PAUSE, Some(block), [u32::from(pause), 0, 0])
    }

    fn stop_disc(&mut self, block: &ControlBlock) -> Result<(), OsError> {
        self.call(CD_STOP_DISC, Some(block), [0; 3])
    }

    fn open_drawer(&mut self, block: &ControlBlock) -> Result<(), OsError> {
        self.call(CD_OPEN_DRAWER, Some(block), [0; 3])
    }
}

/// Fake joystick module
///
/// `state` is returned for every device; `enumeration` answers `0x2FF`
/// and `device_info` answers `0x200 | n`.
#[derive(Debug, Default)]
pub struct FakeJoystickModule {
    pub present: bool,
    pub state: u32,
    pub enumeration: Option<DeviceInfo>,
    pub device_info: HashMap<u32, DeviceInfo>,
    /// Reason codes passed so far
    pub reads: Vec<u32>,
}

impl FakeJoystickModule {
    /// Module loaded, without the enumeration API
    pub fn present() -> Self {
        Self {
            present: true,
            ..Self::default()
        }
    }

    /// No joystick module
    pub fn absent() -> Self {
        Self::default()
    }

    fn missing() -> OsError {
        OsError::new(0x1E6, "SWI name not known")
    }
}

impl JoystickSwis for FakeJoystickModule {
    fn read_state(&mut self, joystick: u32) -> Result<u32, OsError> {
        self.reads.push(joystick);
        if !self.present {
            return Err(Self::missing());
        }
        Ok(self.state)
    }

    fn read_info(&mut self, reason: u32) -> Result<DeviceInfo, OsError> {
        self.reads.push(reason);
        if !self.present {
            return Err(Self::missing());
        }
        let info = if reason == 0x2FF {
            self.enumeration.clone()
        } else {
            self.device_info.get(&(reason & 0xFF)).cloned()
        };
        info.ok_or_else(|| OsError::new(0x43F40, "Bad reason code"))
    }
}
