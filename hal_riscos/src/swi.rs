//! SWI numbers and the typed calls the drivers make.
//!
//! Calls that hand back OS memory (track blocks, device records) return
//! owned copies, so implementations do the pointer reading.

use thiserror::Error;

pub const JOYSTICK_READ: u32 = 0x43F40;
pub const CDFS_CONVERT_DRIVE_TO_DEVICE: u32 = 0x41E80;
pub const CD_OPEN_DRAWER: u32 = 0x41247;
pub const CD_PLAY_AUDIO: u32 = 0x4124B;
pub const CD_AUDIO_PAUSE: u32 = 0x4124D;
pub const CD_ENQUIRE_TRACK: u32 = 0x4124E;
pub const CD_STOP_DISC: u32 = 0x41252;

/// Name of a SWI the drivers call, for error messages
pub fn swi_name(number: u32) -> &'static str {
    match number {
        JOYSTICK_READ => "Joystick_Read",
        CDFS_CONVERT_DRIVE_TO_DEVICE => "CDFS_ConvertDriveToDevice",
        CD_OPEN_DRAWER => "CD_OpenDrawer",
        CD_PLAY_AUDIO => "CD_PlayAudio",
        CD_AUDIO_PAUSE => "CD_AudioPause",
        CD_ENQUIRE_TRACK => "CD_EnquireTrack",
        CD_STOP_DISC => "CD_StopDisc",
        _ => "SWI",
    }
}

/// Error block returned by a failing SWI
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{errmess} ({errnum})")]
pub struct OsError {
    pub errnum: i32,
    pub errmess: String,
}

impl OsError {
    pub fn new(errnum: i32, errmess: impl Into<String>) -> Self {
        Self {
            errnum,
            errmess: errmess.into(),
        }
    }
}

/// CDFS control block addressing one drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlBlock {
    pub device: u32,
    pub card: u32,
    pub logical_unit: u32,
    pub driver_handle: u32,
    pub reserved: u32,
}

impl ControlBlock {
    /// Splits the composite id from `CDFS_ConvertDriveToDevice`
    pub fn from_device_id(id: u32) -> Self {
        Self {
            device: id & 0x7,
            card: (id >> 3) & 0x3,
            logical_unit: (id >> 5) & 0x7,
            driver_handle: (id >> 8) & 0xFF,
            reserved: id >> 16,
        }
    }

    /// The block as laid out in memory for the CD SWIs (R7)
    pub fn words(&self) -> [u32; 5] {
        [
            self.device,
            self.card,
            self.logical_unit,
            self.driver_handle,
            self.reserved,
        ]
    }
}

/// CDFS and CD driver SWIs
pub trait CdSwis: Send {
    /// Returns the composite device id of logical drive `drive`
    fn convert_drive_to_device(&mut self, drive: u32) -> Result<u32, OsError>;

    /// Reads the 5-byte track block for `track`. Track 0 gives the first
    /// and last track numbers in bytes 0 and 1.
    fn enquire_track(&mut self, block: &ControlBlock, track: u8) -> Result<[u8; 5], OsError>;

    /// Plays from `start` to `end` using `addressing` mode (1 = Red Book)
    fn play_audio(
        &mut self,
        block: &ControlBlock,
        addressing: u32,
        start: u32,
        end: u32,
    ) -> Result<(), OsError>;

    fn audio_pause(&mut self, block: &ControlBlock, pause: bool) -> Result<(), OsError>;

    fn stop_disc(&mut self, block: &ControlBlock) -> Result<(), OsError>;

    fn open_drawer(&mut self, block: &ControlBlock) -> Result<(), OsError>;
}

/// One device record from the joystick enumeration reason codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRecord {
    pub id: u8,
    /// Product string, `None` for a null pointer
    pub product: Option<String>,
    pub num_axes: i32,
    pub num_buttons: i32,
}

/// Result of an enumeration call: the per-record size the module reported
/// and the records themselves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub size: usize,
    pub records: Vec<DeviceRecord>,
}

/// `Joystick_Read` reason codes
pub trait JoystickSwis: Send {
    /// Reads joystick `joystick`'s packed state: byte 0 y, byte 1 x,
    /// byte 2 buttons
    fn read_state(&mut self, joystick: u32) -> Result<u32, OsError>;

    /// Reads device records for an enumeration reason code
    /// (`0x2FF` for all devices, `0x200 | n` for device `n`)
    fn read_info(&mut self, reason: u32) -> Result<DeviceInfo, OsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_block_from_device_id() {
        let id = 0x0012_3456;
        let block = ControlBlock::from_device_id(id);
        assert_eq!(block.device, 0x6);
        assert_eq!(block.card, 0x2);
        assert_eq!(block.logical_unit, 0x2);
        assert_eq!(block.driver_handle, 0x34);
        assert_eq!(block.reserved, 0x12);
    }

    #[test]
    fn test_control_block_fields_cover_id() {
        let block = ControlBlock::from_device_id(u32::MAX);
        assert_eq!(block.words(), [0x7, 0x3, 0x7, 0xFF, 0xFFFF]);
        assert_eq!(ControlBlock::from_device_id(0), ControlBlock::default());
    }

    #[test]
    fn test_os_error_display() {
        let err = OsError::new(0x1E4, "Drive not ready");
        assert_eq!(err.to_string(), "Drive not ready (484)");
        assert_eq!(swi_name(CD_STOP_DISC), "CD_StopDisc");
        assert_eq!(swi_name(0), "SWI");
    }
}
