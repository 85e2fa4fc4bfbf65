//! Synthetic in-memory images for unit tests.

use std::rc::Rc;

use crate::disk::block::{BlockDeviceRef, ImageBlockDevice, Location, BLOCK_SIZE};
use crate::disk::directory::{ENTRY_FILENAME_LENGTH, ENTRY_SIZE, FIRST_ENTRY_OFFSET};
use crate::disk::file::TS_PAIRS_OFFSET;
use crate::disk::image::Image;
use crate::disk::vtoc::{VALIDATION, VTOC_LOCATION};
use crate::disk::{DOS33_GEOMETRY, IMAGE_SIZE};

pub struct TestImage {
    bytes: Vec<u8>,
}

impl TestImage {
    /// An all-zero image.
    pub fn new() -> TestImage {
        TestImage {
            bytes: vec![0u8; IMAGE_SIZE],
        }
    }

    pub fn sector_mut(&mut self, location: Location) -> &mut [u8] {
        let offset = (location.0 as usize * 16 + location.1 as usize) * BLOCK_SIZE;
        &mut self.bytes[offset..offset + BLOCK_SIZE]
    }

    /// Write a valid VTOC with an empty free-sector map.
    pub fn format(&mut self, volume: u8, catalog: Location) {
        let vtoc = self.sector_mut(VTOC_LOCATION);
        for &(offset, value) in VALIDATION.iter() {
            vtoc[offset] = value;
        }
        vtoc[0x01] = catalog.0;
        vtoc[0x02] = catalog.1;
        vtoc[0x06] = volume;
    }

    /// Point a catalog or track/sector list sector at its successor.
    pub fn link(&mut self, from: Location, to: Location) {
        let sector = self.sector_mut(from);
        sector[1] = to.0;
        sector[2] = to.1;
    }

    pub fn fill(&mut self, location: Location, value: u8) {
        for byte in self.sector_mut(location).iter_mut() {
            *byte = value;
        }
    }

    /// Write a catalog entry into one of a catalog sector's seven slots.
    pub fn entry(
        &mut self,
        catalog: Location,
        slot: usize,
        ts_list: Location,
        type_byte: u8,
        name: &str,
        size: u16,
    ) {
        let offset = FIRST_ENTRY_OFFSET + slot * ENTRY_SIZE;
        let bytes = &mut self.sector_mut(catalog)[offset..offset + ENTRY_SIZE];
        bytes[0] = ts_list.0;
        bytes[1] = ts_list.1;
        bytes[2] = type_byte;
        let name = format!("{:width$}", name, width = ENTRY_FILENAME_LENGTH);
        for (i, b) in name.bytes().take(ENTRY_FILENAME_LENGTH).enumerate() {
            bytes[3 + i] = b | 0x80;
        }
        bytes[0x21..0x23].copy_from_slice(&size.to_le_bytes());
    }

    /// Write a track/sector list sector.
    pub fn ts_list(&mut self, location: Location, next: Location, data: &[Location]) {
        self.link(location, next);
        let sector = self.sector_mut(location);
        for (i, pointer) in data.iter().enumerate() {
            sector[TS_PAIRS_OFFSET + i * 2] = pointer.0;
            sector[TS_PAIRS_OFFSET + i * 2 + 1] = pointer.1;
        }
    }

    /// A block device over a snapshot of the image as it is now.
    pub fn blocks(&self) -> BlockDeviceRef {
        Rc::new(ImageBlockDevice::new(
            Image::open_memory(self.bytes.clone()),
            &DOS33_GEOMETRY,
        ))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
