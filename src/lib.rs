//! This is a Rust library for reading Apple ][ DOS 3.3 floppy disk images.
//!
//! Features:
//!
//! * Open 140K DOS 3.3 disk images (35 tracks of 16 sectors) read-only, either
//! memory-mapped from a file or from an in-memory buffer.
//! * Validate the volume table of contents (VTOC) and report the volume
//! number and free-sector count.
//! * Iterate catalog entries, and look files up by name.
//! * Reassemble files from their track/sector lists.
//! * Detokenize Applesoft BASIC programs into source listings.
//! * Render text files, and hex-dump everything else.
//! * A sample `a2disk` program for listing catalogs and dumping files.
//!
//! Disk images are never written.  Catalog and track/sector list chains are
//! followed for at most 560 hops, so a corrupt or cyclic chain is reported as
//! an error instead of looping forever.
//!
//! # Example
//!
//! The following example opens a disk image, prints its catalog, and then
//! prints the listing of an Applesoft program:
//!
//! ```
//! use std::io;
//! use a2dos::disk::Disk;
//! # fn list_hello(disk_image_filename: &str) -> io::Result<()> {
//!
//! // Open the disk image
//! let disk = Disk::open(disk_image_filename)?;
//! println!("{}", disk);
//!
//! // Print the catalog
//! for entry in disk.iter() {
//!     println!(" {}", entry?);
//! }
//!
//! // Print the program listing
//! disk.render_file("HELLO", &mut io::stdout())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Design of disk image access
//!
//! Support for disk images was built using a layered scheme:
//!
//! 1. `Image` provides access to the underlying storage containing the disk
//!    image -- either a disk image file or an in-memory array.
//! 2. `BlockDevice` divides the image into tracks and sectors according to
//!    a `Geometry`.
//! 3. The VTOC, its free-sector map, and the catalog are read from fixed
//!    places within those sectors.
//! 4. `Disk` exposes high-level functionality such as listing the catalog
//!    and opening files.
//! 5. Opening a file yields a `File`, whose data sectors can be streamed,
//!    read through `io::Read`, or rendered.
//!
//! Components hold their own `Rc` reference to the disk's block storage, so
//! a `File` stays usable independently of the `Disk` that opened it.  Sector
//! chains are copied sector by sector as they are walked.
//!
//! # License
//!
//! A2dos is distributed under the terms of both the MIT license and the
//! Apache License (Version 2.0).

pub mod applesoft;
pub mod disk;
pub mod render;

mod util;
