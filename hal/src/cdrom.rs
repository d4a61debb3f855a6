//! # CD-ROM Audio
//!
//! Hardware abstraction for CD audio drives.
//!
//! ## Philosophy
//!
//! - **Frames are the unit**: Positions and lengths are counted in CD frames
//!   (75 per second); drivers convert to whatever addressing the OS wants
//! - **Drives by index**: Callers refer to drives by their position in the
//!   detected drive list
//!
//! ## Non-Goals
//!
//! - Reading data sectors
//! - Digital audio extraction

use thiserror::Error;

/// CD frames per second
pub const CD_FPS: u32 = 75;

/// Largest number of drives a driver reports
pub const MAX_DRIVES: usize = 26;

/// Converts a frame count to (minutes, seconds, frames)
pub const fn frames_to_msf(frames: u32) -> (u32, u32, u32) {
    let f = frames % CD_FPS;
    let total_seconds = frames / CD_FPS;
    (total_seconds / 60, total_seconds % 60, f)
}

/// Converts (minutes, seconds, frames) to a frame count
pub const fn msf_to_frames(m: u32, s: u32, f: u32) -> u32 {
    m * 60 * CD_FPS + s * CD_FPS + f
}

/// Drive status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdStatus {
    TrayEmpty,
    Stopped,
    Playing,
    Paused,
    Error,
}

impl CdStatus {
    /// Returns true if a disc is present
    pub fn has_disc(self) -> bool {
        matches!(self, Self::Stopped | Self::Playing | Self::Paused)
    }
}

/// Track content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackType {
    Audio,
    Data,
}

/// One entry of a disc's table of contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdTrack {
    pub id: u8,
    pub track_type: TrackType,
    /// Start offset in frames
    pub offset: u32,
    /// Length in frames
    pub length: u32,
}

/// Disc table of contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toc {
    pub first_track: u8,
    pub last_track: u8,
    /// Per-track detail, empty when the drive only reports the track range
    pub tracks: Vec<CdTrack>,
}

impl Toc {
    /// Number of tracks on the disc
    pub fn num_tracks(&self) -> usize {
        if self.last_track < self.first_track {
            return 0;
        }
        usize::from(self.last_track - self.first_track) + 1
    }
}

/// CD-ROM errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CdromError {
    #[error("{op} failed: {errmess} ({errnum})")]
    Os {
        op: &'static str,
        errnum: i32,
        errmess: String,
    },

    #[error("Invalid CD-ROM drive index {0}")]
    NoSuchDrive(usize),

    #[error("CD-ROM drive {0} is not open")]
    NotOpen(usize),
}

/// CD-ROM driver trait
pub trait CdromDriver {
    /// Number of detected drives
    fn num_drives(&self) -> usize;

    /// System name of `drive`
    fn name(&self, drive: usize) -> Option<&str>;

    /// Opens `drive` for audio control
    fn open(&mut self, drive: usize) -> Result<(), CdromError>;

    /// Reads the table of contents
    fn toc(&mut self, drive: usize) -> Result<Toc, CdromError>;

    /// Reports drive status and the current play position in frames
    fn status(&mut self, drive: usize) -> (CdStatus, Option<u32>);

    /// Plays `length` frames starting at frame `start`
    fn play(&mut self, drive: usize, start: u32, length: u32) -> Result<(), CdromError>;

    fn pause(&mut self, drive: usize) -> Result<(), CdromError>;

    fn resume(&mut self, drive: usize) -> Result<(), CdromError>;

    fn stop(&mut self, drive: usize) -> Result<(), CdromError>;

    fn eject(&mut self, drive: usize) -> Result<(), CdromError>;

    /// Releases `drive`
    fn close(&mut self, drive: usize);

    /// Forgets every detected drive
    fn quit(&mut self);
}
