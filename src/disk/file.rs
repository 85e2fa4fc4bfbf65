//! DOS 3.3 files

use std::io::{self, Read};

use log::debug;

use crate::disk::block::{BlockDeviceRef, Location};
use crate::disk::chain::{ChainIterator, ChainSector};
use crate::disk::directory::{DirectoryEntry, FileType};
use crate::disk::error::ChainKind;

/// Track/sector lists hold their data sector pointers starting here.
pub const TS_PAIRS_OFFSET: usize = 0x0C;
/// The number of data sector pointers in one track/sector list sector.
pub const TS_PAIRS_PER_SECTOR: usize = 122;

/// Return the data sector pointers held by one track/sector list sector.
/// The scan stops at the first (0,0) pair, which only means this list
/// sector has no more pointers; the file may continue in the next one.
pub fn data_pointers(block: &[u8]) -> Vec<Location> {
    (0..TS_PAIRS_PER_SECTOR)
        .map(|i| Location::from_bytes(&block[TS_PAIRS_OFFSET + i * 2..]))
        .take_while(|location| !location.is_null())
        .collect()
}

/// A File represents a file that has been opened from a DOS 3.3 disk image.
/// Its contents are the data sectors named by its chain of track/sector
/// lists, concatenated in chain order.
pub struct File {
    blocks: BlockDeviceRef,
    entry: DirectoryEntry,
}

impl File {
    pub fn new(blocks: BlockDeviceRef, entry: DirectoryEntry) -> File {
        debug!(
            "open \"{}\" ({}), track/sector list at {}",
            entry.trimmed_filename(),
            entry.file_type,
            entry.ts_list
        );
        File { blocks, entry }
    }

    /// Return a reference to the directory entry from which this file was
    /// opened.
    pub fn entry(&self) -> &DirectoryEntry {
        &self.entry
    }

    pub fn name(&self) -> &str {
        self.entry.trimmed_filename()
    }

    pub fn file_type(&self) -> FileType {
        self.entry.file_type
    }

    fn ts_lists(&self) -> ChainIterator {
        ChainIterator::new(
            self.blocks.clone(),
            ChainKind::TrackSectorList,
            self.entry.ts_list,
        )
    }

    /// Deliver each data sector to `f`, in chain order.  The first error,
    /// whether from the disk or from `f`, stops the walk and is returned.
    pub fn for_each_sector<F>(&self, mut f: F) -> io::Result<()>
    where
        F: FnMut(&[u8]) -> io::Result<()>,
    {
        for sector in self.sectors() {
            f(&sector?)?;
        }
        Ok(())
    }

    /// Return an iterator over the file's data sectors.
    pub fn sectors(&self) -> SectorIterator {
        SectorIterator {
            blocks: self.blocks.clone(),
            ts_lists: self.ts_lists(),
            pending: vec![].into_iter(),
            failed: false,
        }
    }

    /// Return a reader for the contents of this file.
    pub fn reader(&self) -> FileReader {
        FileReader {
            sectors: self.sectors(),
            buffer: vec![],
            offset: 0,
        }
    }

    /// Read the entire file into memory.
    pub fn contents(&self) -> io::Result<Vec<u8>> {
        let mut bytes = vec![];
        self.reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Return a sorted list of every sector this file references: its
    /// track/sector list sectors and its data sectors.
    pub fn occupied_sectors(&self) -> io::Result<Vec<Location>> {
        let mut locations = vec![];
        for ts_list in self.ts_lists() {
            let ChainSector { data, location } = ts_list?;
            locations.push(location);
            locations.extend(data_pointers(&data));
        }
        locations.sort();
        locations.dedup();
        Ok(locations)
    }
}

/// Iterate over a file's data sectors, reading each track/sector list sector
/// only once its predecessor's pointers have been used up.
pub struct SectorIterator {
    blocks: BlockDeviceRef,
    ts_lists: ChainIterator,
    pending: ::std::vec::IntoIter<Location>,
    failed: bool,
}

impl Iterator for SectorIterator {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<io::Result<Vec<u8>>> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(location) = self.pending.next() {
                let result = self.blocks.sector_owned(location);
                self.failed = result.is_err();
                return Some(result);
            }
            match self.ts_lists.next()? {
                Ok(ts_list) => self.pending = data_pointers(&ts_list.data).into_iter(),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// A reader over the concatenated data sectors of a file.  DOS 3.3 does not
/// record a byte length, so the last sector is returned in full.
pub struct FileReader {
    sectors: SectorIterator,
    buffer: Vec<u8>,
    offset: usize,
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset == self.buffer.len() {
            match self.sectors.next() {
                Some(sector) => {
                    self.buffer = sector?;
                    self.offset = 0;
                }
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.buffer.len() - self.offset);
        buf[..n].copy_from_slice(&self.buffer[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}
