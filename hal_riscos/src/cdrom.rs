//! CD audio through CDFS
//!
//! Drives are named `CDFS::<n>.$`. Opening a drive converts it to a CD
//! driver control block, which every later call passes in R7.

use crate::swi::{
    swi_name, CdSwis, ControlBlock, OsError, CDFS_CONVERT_DRIVE_TO_DEVICE, CD_AUDIO_PAUSE,
    CD_ENQUIRE_TRACK, CD_OPEN_DRAWER, CD_PLAY_AUDIO, CD_STOP_DISC,
};
use hal::cdrom::{frames_to_msf, CdStatus, CdromDriver, CdromError, Toc, MAX_DRIVES};

/// Red Book (minutes/seconds/frames) addressing for `CD_PlayAudio`
pub const RED_BOOK_ADDRESSING: u32 = 1;

/// CDFS path of logical drive `drive`
pub fn drive_name(drive: usize) -> String {
    format!("CDFS::{}.$", drive)
}

/// Packs a frame position as a Red Book address word `0x00MMSSFF`
pub fn msf_word(frames: u32) -> u32 {
    let (m, s, f) = frames_to_msf(frames);
    (m << 16) | (s << 8) | f
}

fn os_error(swi: u32, err: OsError) -> CdromError {
    tracing::warn!(swi = swi_name(swi), errnum = err.errnum, errmess = %err.errmess, "SWI failed");
    CdromError::Os {
        op: swi_name(swi),
        errnum: err.errnum,
        errmess: err.errmess,
    }
}

/// CD-ROM driver for RISC OS
#[derive(Debug)]
pub struct RiscOsCdrom<S: CdSwis> {
    swis: S,
    drives: Vec<String>,
    blocks: Vec<Option<ControlBlock>>,
}

impl<S: CdSwis> RiscOsCdrom<S> {
    /// Detects the first CDFS drive
    pub fn new(swis: S) -> Self {
        Self::with_drives(swis, 1)
    }

    /// Detects CDFS drives `0..count`, at most [`MAX_DRIVES`]
    pub fn with_drives(swis: S, count: usize) -> Self {
        let count = count.min(MAX_DRIVES);
        let drives: Vec<String> = (0..count).map(drive_name).collect();
        for drive in &drives {
            tracing::debug!(%drive, "added CD-ROM drive");
        }
        Self {
            swis,
            drives,
            blocks: vec![None; count],
        }
    }

    pub fn swis(&self) -> &S {
        &self.swis
    }

    /// Control block of an opened drive
    pub fn control_block(&self, drive: usize) -> Option<ControlBlock> {
        self.blocks.get(drive).copied().flatten()
    }

    fn block(&self, drive: usize) -> Result<ControlBlock, CdromError> {
        match self.blocks.get(drive) {
            None => Err(CdromError::NoSuchDrive(drive)),
            Some(None) => Err(CdromError::NotOpen(drive)),
            Some(Some(block)) => Ok(*block),
        }
    }
}

impl<S: CdSwis> CdromDriver for RiscOsCdrom<S> {
    fn num_drives(&self) -> usize {
        self.drives.len()
    }

    fn name(&self, drive: usize) -> Option<&str> {
        self.drives.get(drive).map(String::as_str)
    }

    fn open(&mut self, drive: usize) -> Result<(), CdromError> {
        if drive >= self.drives.len() {
            return Err(CdromError::NoSuchDrive(drive));
        }
        let id = self
            .swis
            .convert_drive_to_device(drive as u32)
            .map_err(|err| os_error(CDFS_CONVERT_DRIVE_TO_DEVICE, err))?;
        let block = ControlBlock::from_device_id(id);
        self.blocks[drive] = Some(block);
        tracing::debug!(drive, device = block.device, card = block.card, "CD-ROM drive opened");
        Ok(())
    }

    fn toc(&mut self, drive: usize) -> Result<Toc, CdromError> {
        let block = self.block(drive)?;
        let info = self
            .swis
            .enquire_track(&block, 0)
            .map_err(|err| os_error(CD_ENQUIRE_TRACK, err))?;
        // Per-track offsets are not available through this interface.
        Ok(Toc {
            first_track: info[0],
            last_track: info[1],
            tracks: Vec::new(),
        })
    }

    fn status(&mut self, _drive: usize) -> (CdStatus, Option<u32>) {
        (CdStatus::Error, None)
    }

    fn play(&mut self, drive: usize, start: u32, length: u32) -> Result<(), CdromError> {
        let block = self.block(drive)?;
        let end = start.saturating_add(length);
        self.swis
            .play_audio(&block, RED_BOOK_ADDRESSING, msf_word(start), msf_word(end))
            .map_err(|err| os_error(CD_PLAY_AUDIO, err))
    }

    fn pause(&mut self, drive: usize) -> Result<(), CdromError> {
        let block = self.block(drive)?;
        self.swis
            .audio_pause(&block, true)
            .map_err(|err| os_error(CD_AUDIO_PAUSE, err))
    }

    fn resume(&mut self, drive: usize) -> Result<(), CdromError> {
        let block = self.block(drive)?;
        self.swis
            .audio_pause(&block, false)
            .map_err(|err| os_error(CD_AUDIO_PAUSE, err))
    }

    fn stop(&mut self, drive: usize) -> Result<(), CdromError> {
        let block = self.block(drive)?;
        self.swis
            .stop_disc(&block)
            .map_err(|err| os_error(CD_STOP_DISC, err))
    }

    fn eject(&mut self, drive: usize) -> Result<(), CdromError> {
        let block = self.block(drive)?;
        self.swis
            .open_drawer(&block)
            .map_err(|err| os_error(CD_OPEN_DRAWER, err))
    }

    fn close(&mut self, _drive: usize) {}

    fn quit(&mut self) {
        self.drives.clear();
        self.blocks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeCdfs;
    use hal::cdrom::msf_to_frames;

    fn opened() -> RiscOsCdrom<FakeCdfs> {
        let mut cd = RiscOsCdrom::new(FakeCdfs::with_disc(0x0012_3456, 1, 12));
        cd.open(0).unwrap();
        cd
    }

    #[test]
    fn test_drive_list() {
        let cd = RiscOsCdrom::new(FakeCdfs::new());
        assert_eq!(cd.num_drives(), 1);
        assert_eq!(cd.name(0), Some("CDFS::0.$"));
        assert_eq!(cd.name(1), None);

        let many = RiscOsCdrom::with_drives(FakeCdfs::new(), 40);
        assert_eq!(many.num_drives(), MAX_DRIVES);
        assert_eq!(many.name(25), Some("CDFS::25.$"));
    }

    #[test]
    fn test_open_decodes_device_id() {
        let cd = opened();
        let block = cd.control_block(0).unwrap();
        assert_eq!(block, ControlBlock::from_device_id(0x0012_3456));
        assert_eq!(cd.swis().calls[0].args[0], 0);
    }

    #[test]
    fn test_open_failure() {
        let mut cdfs = FakeCdfs::with_disc(1, 1, 1);
        cdfs.fail(CDFS_CONVERT_DRIVE_TO_DEVICE, OsError::new(0x10E, "No CDFS"));
        let mut cd = RiscOsCdrom::new(cdfs);

        let err = cd.open(0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CDFS_ConvertDriveToDevice failed: No CDFS (270)"
        );
        assert_eq!(cd.control_block(0), None);
        assert_eq!(cd.open(3), Err(CdromError::NoSuchDrive(3)));
    }

    #[test]
    fn test_toc_track_range() {
        let mut cd = opened();
        let toc = cd.toc(0).unwrap();
        assert_eq!((toc.first_track, toc.last_track), (1, 12));
        assert_eq!(toc.num_tracks(), 12);
        assert!(toc.tracks.is_empty());

        let call = cd.swis().calls.last().copied().unwrap();
        assert_eq!(call.swi, CD_ENQUIRE_TRACK);
        assert_eq!(call.args[0], 0);
        assert_eq!(call.block, cd.control_block(0));
    }

    #[test]
    fn test_toc_error_names_swi() {
        let mut cd = opened();
        let mut cdfs = FakeCdfs::with_disc(0x0012_3456, 1, 12);
        cdfs.fail(CD_ENQUIRE_TRACK, OsError::new(0x1E4, "Drive empty"));
        cd.swis = cdfs;
        assert_eq!(
            cd.toc(0).unwrap_err().to_string(),
            "CD_EnquireTrack failed: Drive empty (484)"
        );
    }

    #[test]
    fn test_unopened_drive() {
        let mut cd = RiscOsCdrom::new(FakeCdfs::with_disc(1, 1, 1));
        assert_eq!(cd.toc(0), Err(CdromError::NotOpen(0)));
        assert_eq!(cd.play(0, 0, 75), Err(CdromError::NotOpen(0)));
        assert_eq!(cd.stop(5), Err(CdromError::NoSuchDrive(5)));
        assert!(cd.swis().calls.is_empty());
    }

    #[test]
    fn test_status_not_available() {
        let mut cd = opened();
        assert_eq!(cd.status(0), (CdStatus::Error, None));
    }

    #[test]
    fn test_msf_word() {
        assert_eq!(msf_word(0), 0);
        assert_eq!(msf_word(msf_to_frames(2, 30, 10)), 0x0002_1E0A);
    }

    #[test]
    fn test_play_uses_red_book_addresses() {
        let mut cd = opened();
        let start = msf_to_frames(0, 2, 0);
        let length = msf_to_frames(1, 0, 5);
        cd.play(0, start, length).unwrap();

        let call = cd.swis().calls.last().copied().unwrap();
        assert_eq!(call.swi, CD_PLAY_AUDIO);
        assert_eq!(call.args, [RED_BOOK_ADDRESSING, 0x0000_0200, 0x0001_0205]);
    }

    #[test]
    fn test_pause_resume_stop_eject() {
        let mut cd = opened();
        cd.pause(0).unwrap();
        cd.resume(0).unwrap();
        cd.stop(0).unwrap();
        cd.eject(0).unwrap();

        let calls: Vec<(u32, u32)> = cd
            .swis()
            .calls
            .iter()
            .skip(1)
            .map(|c| (c.swi, c.args[0]))
            .collect();
        assert_eq!(
            calls,
            vec![
                (CD_AUDIO_PAUSE, 1),
                (CD_AUDIO_PAUSE, 0),
                (CD_STOP_DISC, 0),
                (CD_OPEN_DRAWER, 0),
            ]
        );
    }

    #[test]
    fn test_close_keeps_block_and_quit_forgets_drives() {
        let mut cd = opened();
        cd.close(0);
        assert!(cd.control_block(0).is_some());

        cd.quit();
        assert_eq!(cd.num_drives(), 0);
        assert_eq!(cd.open(0), Err(CdromError::NoSuchDrive(0)));
    }
}
