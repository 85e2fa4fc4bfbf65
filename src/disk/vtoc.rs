use std::fmt;
use std::io;

use log::debug;

use crate::disk::block::{BlockDeviceRef, Location};
use crate::disk::error::DiskError;

/// The volume table of contents always lives here.
pub const VTOC_LOCATION: Location = Location(17, 0);

// offsets
const CATALOG_TRACK_OFFSET: usize = 0x01;
const DOS_VERSION_OFFSET: usize = 0x03;
const VOLUME_OFFSET: usize = 0x06;
const MAX_TS_PAIRS_OFFSET: usize = 0x27;
const TRACKS_OFFSET: usize = 0x34;
const SECTORS_OFFSET: usize = 0x35;
const SECTOR_SIZE_LOW_OFFSET: usize = 0x36;
const SECTOR_SIZE_HIGH_OFFSET: usize = 0x37;

/// (offset, expected value) pairs which every DOS 3.3 VTOC carries: the DOS
/// version, the number of track/sector pairs per list sector, the track
/// count, the sectors per track, and the sector size.
pub const VALIDATION: [(usize, u8); 6] = [
    (DOS_VERSION_OFFSET, 0x03),
    (MAX_TS_PAIRS_OFFSET, 0x7A),
    (TRACKS_OFFSET, 35),
    (SECTORS_OFFSET, 16),
    (SECTOR_SIZE_LOW_OFFSET, 0x00),
    (SECTOR_SIZE_HIGH_OFFSET, 0x01),
];

pub struct Vtoc {
    pub volume: u8,
    pub catalog_location: Location,
    pub dos_version: u8,
}

impl Vtoc {
    /// Read the VTOC and check it against the fixed format constants.  The
    /// first mismatch fails with `UnrecognizedFormat`.
    pub fn read(blocks: BlockDeviceRef) -> io::Result<Vtoc> {
        let block = blocks.sector(VTOC_LOCATION)?;

        for &(offset, expected) in VALIDATION.iter() {
            if block[offset] != expected {
                debug!(
                    "VTOC byte 0x{:02x} is 0x{:02x}, expected 0x{:02x}",
                    offset, block[offset], expected
                );
                return Err(DiskError::UnrecognizedFormat.into());
            }
        }

        let vtoc = Vtoc {
            volume: block[VOLUME_OFFSET],
            catalog_location: Location::from_bytes(&block[CATALOG_TRACK_OFFSET..]),
            dos_version: block[DOS_VERSION_OFFSET],
        };
        debug!(
            "VTOC: volume {}, catalog at {}",
            vtoc.volume, vtoc.catalog_location
        );
        Ok(vtoc)
    }
}

impl fmt::Debug for Vtoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "volume: {:03}", self.volume)?;
        writeln!(f, "dos version: {}", self.dos_version)?;
        writeln!(f, "catalog: {}", self.catalog_location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::test_image::TestImage;

    #[test]
    fn test_read_vtoc() {
        let mut image = TestImage::new();
        image.format(254, Location(17, 15));
        let vtoc = Vtoc::read(image.blocks()).unwrap();
        assert_eq!(vtoc.volume, 254);
        assert_eq!(vtoc.catalog_location, Location(17, 15));
        assert_eq!(vtoc.dos_version, 3);
    }

    #[test]
    fn test_each_check_byte_matters() {
        for &(offset, expected) in VALIDATION.iter() {
            let mut image = TestImage::new();
            image.format(254, Location(17, 15));
            image.sector_mut(VTOC_LOCATION)[offset] = expected.wrapping_add(1);
            let e = Vtoc::read(image.blocks()).unwrap_err();
            assert_eq!(e, DiskError::UnrecognizedFormat);
            assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        }
    }

    #[test]
    fn test_blank_image() {
        let image = TestImage::new();
        assert_eq!(
            Vtoc::read(image.blocks()).unwrap_err(),
            DiskError::UnrecognizedFormat
        );
    }
}
