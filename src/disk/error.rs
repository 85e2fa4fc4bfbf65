use std::fmt;
use std::io;

/// The two kinds of linked sector chains found on a DOS 3.3 disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainKind {
    /// The chain of catalog sectors starting at the VTOC's catalog pointer.
    Catalog,
    /// A file's chain of track/sector list sectors.
    TrackSectorList,
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ChainKind::Catalog => "catalog",
            ChainKind::TrackSectorList => "track/sector list",
        })
    }
}

/// Errors that can be returned from disk image operations.  These are
/// generally converted into `io::Error`.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum DiskError {
    /// Unknown error
    #[error("unknown error")]
    Unknown,
    /// Bad track or sector
    #[error("track or sector out of range")]
    InvalidLocation,
    /// Offset out of bounds
    #[error("offset out of bounds")]
    InvalidOffset,
    /// The VTOC does not carry the DOS 3.3 signature bytes
    #[error("not an Apple DOS 3.3 disk")]
    UnrecognizedFormat,
    /// A sector chain did not terminate within the hop limit
    #[error("exceeded {0} hops")]
    CorruptChain(ChainKind),
    /// File not found
    #[error("file not found")]
    NotFound,
    /// A tokenized program contains a byte with no keyword
    #[error("token not recognized: 0x{0:02X}")]
    UnknownToken(u8),
    /// A tokenized program ended in the middle of a line
    #[error("tokenized program ends unexpectedly")]
    TruncatedProgram,
}

impl From<DiskError> for io::Error {
    fn from(error: DiskError) -> io::Error {
        use self::DiskError::*;
        use std::io::ErrorKind::*;
        match error {
            Unknown => io::Error::new(Other, error),
            InvalidLocation => io::Error::new(InvalidInput, error),
            InvalidOffset => io::Error::new(InvalidInput, error),
            UnrecognizedFormat => io::Error::new(InvalidData, error),
            CorruptChain(_) => io::Error::new(InvalidData, error),
            self::DiskError::NotFound => io::Error::new(io::ErrorKind::NotFound, error),
            UnknownToken(_) => io::Error::new(InvalidData, error),
            TruncatedProgram => io::Error::new(UnexpectedEof, error),
        }
    }
}

impl From<io::Error> for DiskError {
    fn from(error: io::Error) -> DiskError {
        match error.into_inner() {
            Some(e) => match e.downcast_ref::<DiskError>() {
                Some(disk_error) => disk_error.clone(),
                None => DiskError::Unknown,
            },
            None => DiskError::Unknown,
        }
    }
}

impl DiskError {
    /// If the provided `io::Error` contains a `DiskError`, return the
    /// underlying `DiskError`.  If not, return None.
    pub fn from_io_error(error: &io::Error) -> Option<DiskError> {
        error
            .get_ref()
            .and_then(|e| e.downcast_ref::<DiskError>())
            .cloned()
    }

    /// This is sometimes useful instead of .into() when the compiler doesn't
    /// have enough information to perform type inference.
    pub fn to_io_error(&self) -> io::Error {
        self.clone().into()
    }
}

impl PartialEq<io::Error> for DiskError {
    fn eq(&self, other: &io::Error) -> bool {
        matches!(DiskError::from_io_error(other), Some(ref e) if e == self)
    }
}

impl PartialEq<DiskError> for io::Error {
    fn eq(&self, other: &DiskError) -> bool {
        matches!(DiskError::from_io_error(self), Some(ref e) if e == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_round_trip() {
        let io_error: io::Error = DiskError::CorruptChain(ChainKind::Catalog).into();
        assert_eq!(io_error.kind(), io::ErrorKind::InvalidData);
        assert_eq!(
            DiskError::from_io_error(&io_error),
            Some(DiskError::CorruptChain(ChainKind::Catalog))
        );
        assert!(io_error == DiskError::CorruptChain(ChainKind::Catalog));
        assert!(io_error != DiskError::CorruptChain(ChainKind::TrackSectorList));
    }

    #[test]
    fn test_foreign_io_error() {
        let io_error = io::Error::new(io::ErrorKind::Other, "something else");
        assert_eq!(DiskError::from_io_error(&io_error), None);
        assert_eq!(DiskError::from(io_error), DiskError::Unknown);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DiskError::CorruptChain(ChainKind::TrackSectorList).to_string(),
            "exceeded track/sector list hops"
        );
        assert_eq!(
            DiskError::UnknownToken(0x85).to_string(),
            "token not recognized: 0x85"
        );
        assert_eq!(
            DiskError::NotFound.to_io_error().kind(),
            io::ErrorKind::NotFound
        );
    }
}
