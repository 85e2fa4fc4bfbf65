//! DOS 3.3 catalogs

use std::fmt;
use std::io;

use log::warn;

use crate::disk::block::{BlockDeviceRef, Location, Position};
use crate::disk::chain::{ChainIterator, ChainSector};
use crate::disk::error::ChainKind;

const FILE_TYPE_TEXT: u8 = 0x00;
const FILE_TYPE_INTEGER: u8 = 0x01;
const FILE_TYPE_APPLESOFT: u8 = 0x02;
const FILE_TYPE_BINARY: u8 = 0x04;
const FILE_TYPE_S: u8 = 0x08;
const FILE_TYPE_RELOCATABLE: u8 = 0x10;
const FILE_TYPE_A: u8 = 0x20;
const FILE_TYPE_B: u8 = 0x40;
const FILE_TYPE_MASK: u8 = 0x7F;
const LOCKED_MASK: u8 = 0x80;

/// Catalog sectors hold seven entries, starting here.
pub const FIRST_ENTRY_OFFSET: usize = 0x0B;
pub const ENTRY_SIZE: usize = 0x23;
pub const ENTRIES_PER_SECTOR: usize = 7;

const ENTRY_TS_LIST_OFFSET: usize = 0x00;
const ENTRY_FILE_TYPE_OFFSET: usize = 0x02;
const ENTRY_FILENAME_OFFSET: usize = 0x03;
pub const ENTRY_FILENAME_LENGTH: usize = 30;
const ENTRY_FILE_SIZE_OFFSET: usize = 0x21;

/// A track/sector list track of 0xFF marks a deleted file.
const DELETED_MARKER: u8 = 0xFF;

/// The type of a file, as encoded in the low seven bits of its catalog
/// entry's type byte.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum FileType {
    Text,
    Integer,
    Applesoft,
    Binary,
    S,
    Relocatable,
    A,
    B,
    Unknown(u8),
}

impl FileType {
    pub fn from_byte(byte: u8) -> FileType {
        match byte & FILE_TYPE_MASK {
            FILE_TYPE_TEXT => FileType::Text,
            FILE_TYPE_INTEGER => FileType::Integer,
            FILE_TYPE_APPLESOFT => FileType::Applesoft,
            FILE_TYPE_BINARY => FileType::Binary,
            FILE_TYPE_S => FileType::S,
            FILE_TYPE_RELOCATABLE => FileType::Relocatable,
            FILE_TYPE_A => FileType::A,
            FILE_TYPE_B => FileType::B,
            b => FileType::Unknown(b),
        }
    }


    /// The single character shown in catalog listings.
    pub fn code(&self) -> char {
        match *self {
            FileType::Text => 'T',
            FileType::Integer => 'I',
            FileType::Applesoft => 'A',
            FileType::Binary => 'B',
            FileType::S => 'S',
            FileType::Relocatable => 'R',
            FileType::A => 'a',
            FileType::B => 'b',
            FileType::Unknown(_) => '?',
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A DOS 3.3 catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// The first sector of the file's track/sector list.
    pub ts_list: Location,
    pub locked: bool,
    pub file_type: FileType,
    /// The name with its high bits stripped, padded with spaces to 30
    /// characters exactly as stored.
    pub filename: String,
    /// Size in sectors, as recorded in the catalog.
    pub file_size: u16,
    // The disk image position where this entry is stored, if available.
    pub position: Option<Position>,
}

impl DirectoryEntry {
    pub fn from_bytes(bytes: &[u8]) -> DirectoryEntry {
        Self::parse(bytes, None)
    }

    fn from_positioned_bytes(bytes: &[u8], position: Position) -> DirectoryEntry {
        Self::parse(bytes, Some(position))
    }

    fn parse(bytes: &[u8], position: Option<Position>) -> DirectoryEntry {
        assert_eq!(bytes.len(), ENTRY_SIZE);

        let type_byte = bytes[ENTRY_FILE_TYPE_OFFSET];
        let filename = bytes
            [ENTRY_FILENAME_OFFSET..ENTRY_FILENAME_OFFSET + ENTRY_FILENAME_LENGTH]
            .iter()
            .map(|&b| (b & 0x7F) as char)
            .collect();

        DirectoryEntry {
            ts_list: Location::from_bytes(&bytes[ENTRY_TS_LIST_OFFSET..]),
            locked: type_byte & LOCKED_MASK != 0,
            file_type: FileType::from_byte(type_byte),
            filename,
            file_size: u16::from_le_bytes([
                bytes[ENTRY_FILE_SIZE_OFFSET],
                bytes[ENTRY_FILE_SIZE_OFFSET + 1],
            ]),
            position,
        }
    }

    /// Return true if a raw catalog slot holds a live file: one that was
    /// neither deleted nor left unused.  The type byte is not consulted,
    /// since an unlocked text file legitimately stores zero there.
    pub fn is_live_slot(bytes: &[u8]) -> bool {
        bytes[ENTRY_TS_LIST_OFFSET] != DELETED_MARKER && bytes[ENTRY_FILENAME_OFFSET] != 0x00
    }

    /// The filename without its trailing padding.
    pub fn trimmed_filename(&self) -> &str {
        self.filename.trim_end_matches(' ')
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{} {:03} {}",
            if self.locked { '*' } else { ' ' },
            self.file_type,
            self.file_size,
            self.filename
        )?;
        if f.alternate() {
            // verbose
            write!(f, " ts={}", self.ts_list)?;
            if let Some(position) = self.position {
                write!(f, " @{}", position)?;
            }
        }
        Ok(())
    }
}

type CatalogBlockIterator = Box<dyn Iterator<Item = io::Result<ChainSector>>>;

/// This iterator will process the entire catalog of a disk image and return
/// a sequence of entries.  Iteration ends after the first error.
pub struct DirectoryIterator {
    block_iter: CatalogBlockIterator,
    chunks: ::std::vec::IntoIter<(Vec<u8>, Position)>,
}

impl DirectoryIterator {
    /// Create a new directory iterator for the catalog chain starting at the
    /// provided location.
    pub fn new(blocks: BlockDeviceRef, catalog: Location) -> DirectoryIterator {
        DirectoryIterator {
            block_iter: Box::new(ChainIterator::new(blocks, ChainKind::Catalog, catalog)),
            chunks: vec![].into_iter(), // Arrange to return None the first time.
        }
    }

    fn slots(block: &ChainSector) -> Vec<(Vec<u8>, Position)> {
        (0..ENTRIES_PER_SECTOR)
            .map(|i| FIRST_ENTRY_OFFSET + i * ENTRY_SIZE)
            .map(|offset| {
                (
                    block.data[offset..offset + ENTRY_SIZE].to_vec(),
                    Position {
                        location: block.location,
                        offset: offset as u8,
                        size: ENTRY_SIZE as u8,
                    },
                )
            })
            .collect()
    }
}

impl Iterator for DirectoryIterator {
    type Item = io::Result<DirectoryEntry>;

    fn next(&mut self) -> Option<io::Result<DirectoryEntry>> {
        loop {
            match self.chunks.next() {
                Some((chunk, position)) => {
                    if !DirectoryEntry::is_live_slot(&chunk) {
                        continue;
                    }
                    let entry = DirectoryEntry::from_positioned_bytes(&chunk, position);
                    if let FileType::Unknown(code) = entry.file_type {
                        warn!(
                            "catalog entry at {} has undefined type 0x{:02x}",
                            position, code
                        );
                    }
                    return Some(Ok(entry));
                }
                None => match self.block_iter.next() {
                    Some(Ok(block)) => {
                        self.chunks = Self::slots(&block).into_iter();
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    None => return None,
                },
            }
        }
    }
}
