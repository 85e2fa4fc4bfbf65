//! Traits, structs, and functions relating to DOS 3.3 disk images.

mod bam;
mod block;
mod chain;
mod error;
mod image;
mod vtoc;

pub mod directory;
pub mod file;

#[cfg(test)]
pub(crate) mod test_image;

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use log::warn;

use crate::render::{self, Renderer};

pub use self::bam::{Bam, BamEntry};
pub use self::block::{
    BlockDevice, BlockDeviceRef, ImageBlockDevice, Location, LocationIterator, Position,
    BLOCK_SIZE,
};
pub use self::chain::MAX_HOPS;
pub use self::error::{ChainKind, DiskError};
pub use self::image::Image;
pub use self::vtoc::{Vtoc, VTOC_LOCATION};

use self::directory::{DirectoryEntry, DirectoryIterator, ENTRY_FILENAME_LENGTH};
use self::file::File;

/// A `Geometry` specifies the track and sector layout of a disk image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub tracks: u8,
    pub sectors: u8,
}

impl Geometry {
    #[inline]
    pub fn contains(&self, location: Location) -> bool {
        location.0 < self.tracks && location.1 < self.sectors
    }

    /// Return the total number of bytes used to represent a disk image in this
    /// geometry.
    pub fn size(&self) -> usize {
        self.tracks as usize * self.sectors as usize * BLOCK_SIZE
    }
}

/// 35 tracks of 16 sectors.
pub static DOS33_GEOMETRY: Geometry = Geometry {
    tracks: 35,
    sectors: 16,
};

/// The size of a complete DOS 3.3 image.
pub const IMAGE_SIZE: usize = 35 * 16 * BLOCK_SIZE;

/// An open DOS 3.3 disk image.  The VTOC is read and validated when the
/// disk is opened; the catalog is walked afresh on every request.
pub struct Disk {
    blocks: BlockDeviceRef,
    vtoc: Vtoc,
    bam: Bam,
}

impl Disk {
    /// Open a disk image file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Disk> {
        Disk::new(Image::open_read_only(path)?)
    }

    /// Open a disk image held in memory.
    pub fn open_memory(bytes: Vec<u8>) -> io::Result<Disk> {
        Disk::new(Image::open_memory(bytes))
    }

    pub fn new(image: Image) -> io::Result<Disk> {
        if image.len() != IMAGE_SIZE {
            warn!(
                "image is {} bytes; a DOS 3.3 image is {} bytes",
                image.len(),
                IMAGE_SIZE
            );
        }
        let blocks: BlockDeviceRef = Rc::new(ImageBlockDevice::new(image, &DOS33_GEOMETRY));
        let vtoc = Vtoc::read(blocks.clone())?;
        let bam = Bam::read(blocks.clone())?;
        Ok(Disk { blocks, vtoc, bam })
    }

    pub fn blocks(&self) -> BlockDeviceRef {
        self.blocks.clone()
    }

    pub fn vtoc(&self) -> &Vtoc {
        &self.vtoc
    }

    pub fn volume(&self) -> u8 {
        self.vtoc.volume
    }

    pub fn bam(&self) -> &Bam {
        &self.bam
    }

    /// Return the number of free sectors according to the VTOC's bitmaps.
    pub fn blocks_free(&self) -> usize {
        self.bam.blocks_free()
    }

    /// Return an iterator of directory entries found on this disk image.
    pub fn iter(&self) -> DirectoryIterator {
        DirectoryIterator::new(self.blocks(), self.vtoc.catalog_location)
    }

    /// Return a list of all directory entries
    pub fn directory(&self) -> io::Result<Vec<DirectoryEntry>> {
        self.iter().collect::<io::Result<Vec<_>>>()
    }

    /// Call `f` for each directory entry until it returns `Some`, and return
    /// that value.  Returns `Ok(None)` if the catalog is exhausted first.
    pub fn walk_entries<T, F>(&self, mut f: F) -> io::Result<Option<T>>
    where
        F: FnMut(&DirectoryEntry) -> Option<T>,
    {
        for entry in self.iter() {
            if let Some(value) = f(&entry?) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Locate a directory entry based on its filename.  The name is padded
    /// with spaces to the full catalog width and compared exactly.
    pub fn find_directory_entry(&self, filename: &str) -> io::Result<DirectoryEntry> {
        let padded = format!("{:width$}", filename, width = ENTRY_FILENAME_LENGTH);
        self.walk_entries(|entry| {
            if entry.filename == padded {
                Some(entry.clone())
            } else {
                None
            }
        })?
        .ok_or_else(|| DiskError::NotFound.into())
    }

    /// Open a file based on its filename.
    pub fn open_file(&self, filename: &str) -> io::Result<File> {
        let entry = self.find_directory_entry(filename)?;
        Ok(self.open_file_from_entry(&entry))
    }

    /// Open a file based on its directory entry.
    pub fn open_file_from_entry(&self, entry: &DirectoryEntry) -> File {
        File::new(self.blocks(), entry.clone())
    }

    /// Read a specific block from the disk, given its track and sector
    /// location.
    pub fn read_sector(&self, location: Location) -> io::Result<Vec<u8>> {
        self.blocks.sector_owned(location)
    }

    /// Write the named file to `writer`, decoded according to its type.
    /// Nothing is written if the file cannot be found.
    pub fn render_file(&self, filename: &str, writer: &mut dyn Write) -> io::Result<()> {
        let file = self.open_file(filename)?;
        render::render(&file, Renderer::for_file_type(file.file_type()), writer)
    }
}

impl fmt::Display for Disk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Disk Volume {}, Free Blocks: {}",
            self.volume(),
            self.blocks_free()
        )
    }
}

impl fmt::Debug for Disk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.vtoc)?;
        write!(f, "{:?}", self.bam)
    }
}

impl<'a> IntoIterator for &'a Disk {
    type Item = io::Result<DirectoryEntry>;
    type IntoIter = DirectoryIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
