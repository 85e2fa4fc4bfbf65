use std::fmt;
use std::fmt::Write;
use std::io;

use crate::disk::block::{BlockDeviceRef, Location, LocationIterator};
use crate::disk::vtoc::VTOC_LOCATION;
use crate::disk::Geometry;

/// Offset within the VTOC where the per-track bitmaps start.
const BITMAP_OFFSET: usize = 0x38;
/// Each track gets four bytes, of which only the first two are used on
/// 16-sector disks.
const BITMAP_STRIDE: usize = 4;
const BITMAP_SIZE: usize = 2;

/// The free-sector bitmap for one track.  Bit n of the map is set when
/// sector n is free.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct BamEntry {
    pub sector_map: u16,
}

impl BamEntry {
    /// The bitmap is stored big-endian: the first byte covers sectors 15..8
    /// and the second sectors 7..0.
    pub fn from_bytes(bitmap: &[u8]) -> BamEntry {
        BamEntry {
            sector_map: u16::from_be_bytes([bitmap[0], bitmap[1]]),
        }
    }

    #[inline]
    pub fn free_sectors(&self) -> usize {
        self.sector_map.count_ones() as usize
    }

    #[inline]
    pub fn is_free(&self, sector: u8) -> bool {
        sector < 16 && self.sector_map & (1u16 << sector) != 0
    }
}

/// The disk's free-sector map, decoded from the VTOC.
pub struct Bam {
    geometry: Geometry,
    entries: Vec<BamEntry>,
}

impl Bam {
    pub fn read(blocks: BlockDeviceRef) -> io::Result<Bam> {
        let geometry = *blocks.geometry();
        let block = blocks.sector(VTOC_LOCATION)?;

        let entries = (0..geometry.tracks as usize)
            .map(|track| {
                let offset = BITMAP_OFFSET + track * BITMAP_STRIDE;
                BamEntry::from_bytes(&block[offset..offset + BITMAP_SIZE])
            })
            .collect();

        Ok(Bam { geometry, entries })
    }

    /// Return the number of free sectors on the disk image: the sum of the
    /// set bits in every track's bitmap.
    pub fn blocks_free(&self) -> usize {
        self.entries.iter().map(|e| e.free_sectors()).sum()
    }

    pub fn entry(&self, track: u8) -> Option<&BamEntry> {
        self.entries.get(track as usize)
    }

    fn sectors_where(&self, free: bool) -> Vec<Location> {
        LocationIterator::from_geometry(&self.geometry)
            .filter(|location| self.entries[location.0 as usize].is_free(location.1) == free)
            .collect()
    }

    pub fn allocated_sectors(&self) -> Vec<Location> {
        self.sectors_where(false)
    }

    pub fn free_sectors(&self) -> Vec<Location> {
        self.sectors_where(true)
    }
}

impl fmt::Debug for Bam {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (track, entry) in self.entries.iter().enumerate() {
            write!(
                f,
                "t{:02}: [{:02}/{:02}] ",
                track,
                entry.free_sectors(),
                self.geometry.sectors
            )?;
            for sector in 0..self.geometry.sectors {
                let c: char = if entry.is_free(sector) { '.' } else { 'x' };
                f.write_char(c)?;
            }
            f.write_char('\n')?;
        }
        writeln!(f, "{} sectors free.", self.blocks_free())?;
        Ok(())
    }
}
