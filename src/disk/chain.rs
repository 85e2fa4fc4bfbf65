use std::io;

use log::trace;

use crate::disk::block::{BlockDeviceRef, Location};
use crate::disk::error::{ChainKind, DiskError};

/// Catalog sectors and track/sector list sectors both carry the location of
/// the next sector in the chain at this offset.
pub const NEXT_LOCATION_OFFSET: usize = 0x01;

/// No well-formed chain comes anywhere near this many sectors (the whole
/// disk is 560 sectors), so reaching it means the chain is corrupt or
/// cyclic.
pub const MAX_HOPS: usize = 560;

/// Return the location of the next sector in the chain, or None if this
/// sector ends the chain.  Only the track byte is consulted: track 0 never
/// holds a chained sector.
#[inline]
pub fn next_location(block: &[u8]) -> Option<Location> {
    let location = Location::from_bytes(&block[NEXT_LOCATION_OFFSET..]);
    if location.0 == 0x00 {
        None
    } else {
        Some(location)
    }
}

/// A ChainSector is the result of a chain iteration, and provides the block
/// contents and the location from which it was read.
pub struct ChainSector {
    /// The 256-byte block contents, including the next-sector link.
    pub data: Vec<u8>,
    pub location: Location,
}

/// Follow a chain of linked sectors.  Visited locations are not remembered;
/// instead, the number of hops is counted and the walk fails with
/// `CorruptChain` once it reaches `MAX_HOPS`.
pub struct ChainIterator {
    blocks: BlockDeviceRef,
    kind: ChainKind,
    next_sector: Option<Location>,
    hops: usize,
}

impl ChainIterator {
    /// Create a new chain iterator starting at the specified location.  A
    /// start location on track 0 yields an empty chain.
    pub fn new(blocks: BlockDeviceRef, kind: ChainKind, start: Location) -> ChainIterator {
        ChainIterator {
            blocks,
            kind,
            next_sector: if start.0 == 0x00 { None } else { Some(start) },
            hops: 0,
        }
    }
}

impl Iterator for ChainIterator {
    type Item = io::Result<ChainSector>;

    fn next(&mut self) -> Option<io::Result<ChainSector>> {
        let location = self.next_sector.take()?;

        self.hops += 1;
        if self.hops >= MAX_HOPS {
            return Some(Err(DiskError::CorruptChain(self.kind).into()));
        }
        trace!("{} hop {}: {}", self.kind, self.hops, location);

        let data = match self.blocks.sector_owned(location) {
            Ok(data) => data,
            Err(e) => return Some(Err(e)),
        };
        self.next_sector = next_location(&data);

        Some(Ok(ChainSector { data, location }))
    }
}
