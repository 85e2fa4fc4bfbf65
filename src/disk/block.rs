use std::fmt;
use std::io;
use std::rc::Rc;

use log::trace;

use crate::disk::error::DiskError;
use crate::disk::image::Image;
use crate::disk::Geometry;

pub const BLOCK_SIZE: usize = 256;

pub type BlockDeviceRef = Rc<dyn BlockDevice>;

/// Random access to the fixed-size sectors of a disk, addressed by track and
/// sector.  Out-of-range locations are rejected, never clamped.
pub trait BlockDevice {
    fn geometry(&self) -> &Geometry;
    fn sector(&self, location: Location) -> io::Result<&[u8]>;

    fn sector_owned(&self, location: Location) -> io::Result<Vec<u8>> {
        Ok(self.sector(location)?.to_owned())
    }
}

pub struct ImageBlockDevice {
    image: Image,
    geometry: &'static Geometry,
}

impl ImageBlockDevice {
    pub fn new(image: Image, geometry: &'static Geometry) -> ImageBlockDevice {
        ImageBlockDevice { image, geometry }
    }

    pub fn get_offset(&self, location: Location) -> io::Result<usize> {
        if !self.geometry.contains(location) {
            return Err(DiskError::InvalidLocation.into());
        }
        let offset = (location.0 as usize * self.geometry.sectors as usize + location.1 as usize)
            * BLOCK_SIZE;
        Ok(offset)
    }
}

impl BlockDevice for ImageBlockDevice {
    #[inline]
    fn geometry(&self) -> &Geometry {
        self.geometry
    }

    fn sector(&self, location: Location) -> io::Result<&[u8]> {
        let offset = self.get_offset(location)?;
        trace!("read sector {} at offset 0x{:05x}", location, offset);
        self.image.slice(offset, BLOCK_SIZE)
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct Location(pub u8, pub u8); // Track and sector

impl Location {
    #[inline]
    pub fn new(track: u8, sector: u8) -> Location {
        Location(track, sector)
    }

    pub fn from_bytes(bytes: &[u8]) -> Location {
        assert!(bytes.len() >= 2);
        Location(bytes[0], bytes[1])
    }

    /// A (0,0) pair marks an unused pointer slot.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == 0 && self.1 == 0
    }

    pub fn format_locations(locations: &[Location]) -> String {
        locations
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

/// The place within a sector where a structure was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub location: Location,
    pub offset: u8,
    pub size: u8,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({},{}@0x{:02x})",
            self.location.0, self.location.1, self.offset
        )
    }
}

/// Visit every location of a geometry in track-major order.
pub struct LocationIterator {
    tracks: u8,
    sectors: u8,
    next: Option<Location>,
}

impl LocationIterator {
    pub fn from_geometry(geometry: &Geometry) -> LocationIterator {
        LocationIterator {
            tracks: geometry.tracks,
            sectors: geometry.sectors,
            next: if geometry.tracks > 0 && geometry.sectors > 0 {
                Some(Location::new(0, 0))
            } else {
                None
            },
        }
    }
}

impl Iterator for LocationIterator {
    type Item = Location;

    fn next(&mut self) -> Option<Location> {
        let location = self.next?;

        let mut next_location = location;
        next_location.1 += 1;
        if next_location.1 >= self.sectors {
            next_location.0 += 1;
            next_location.1 = 0;
            if next_location.0 >= self.tracks {
                self.next = None;
                return Some(location);
            }
        }
        self.next = Some(next_location);
        Some(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::{DOS33_GEOMETRY, IMAGE_SIZE};

    fn numbered_device() -> ImageBlockDevice {
        // Stamp each sector with its own track and sector number.
        let mut bytes = vec![0u8; IMAGE_SIZE];
        for location in LocationIterator::from_geometry(&DOS33_GEOMETRY) {
            let offset = (location.0 as usize * 16 + location.1 as usize) * BLOCK_SIZE;
            bytes[offset] = location.0;
            bytes[offset + 1] = location.1;
        }
        ImageBlockDevice::new(Image::open_memory(bytes), &DOS33_GEOMETRY)
    }

    #[test]
    fn test_every_sector_is_addressable() {
        let device = numbered_device();
        let mut count = 0;
        for location in LocationIterator::from_geometry(device.geometry()) {
            let sector = device.sector(location).unwrap();
            assert_eq!(sector.len(), BLOCK_SIZE);
            assert_eq!(Location::from_bytes(sector), location);
            // Reads are repeatable.
            assert_eq!(device.sector_owned(location).unwrap(), sector.to_vec());
            count += 1;
        }
        assert_eq!(count, 35 * 16);
    }

    #[test]
    fn test_out_of_range_locations() {
        let device = numbered_device();
        for location in [
            Location(35, 0),
            Location(0, 16),
            Location(34, 16),
            Location(0xFF, 0xFF),
        ] {
            let e = device.sector(location).unwrap_err();
            assert_eq!(e, DiskError::InvalidLocation);
            assert_eq!(e.kind(), io::ErrorKind::InvalidInput);
        }
        assert!(device.sector(Location(34, 15)).is_ok());
    }

    #[test]
    fn test_short_image() {
        let device = ImageBlockDevice::new(Image::open_memory(vec![0u8; 0x1100]), &DOS33_GEOMETRY);
        assert!(device.sector(Location(1, 0)).is_ok());
        assert_eq!(
            device.sector(Location(1, 1)).unwrap_err(),
            DiskError::InvalidOffset
        );
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location(17, 0).to_string(), "(17,0)");
        assert_eq!(
            Location::format_locations(&[Location(17, 15), Location(18, 3)]),
            "(17,15) (18,3)"
        );
        assert!(Location(0, 0).is_null());
        assert!(!Location(0, 1).is_null());
    }
}
