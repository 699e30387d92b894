use thiserror::Error;

/// I/O errors that can occur when reading the source image or writing the output
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// A file could not be opened or created
    #[error("Failed to open {path}: {message}")]
    Open { path: String, message: String },

    /// Reading from a byte source failed
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    /// Writing or finalizing the output failed
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },
}

impl IoError {
    /// Build an `Open` error from a path and the underlying I/O error.
    pub fn open(path: impl std::fmt::Display, err: std::io::Error) -> Self {
        IoError::Open {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Build a `Read` error from a path and the underlying I/O error.
    pub fn read(path: impl std::fmt::Display, err: std::io::Error) -> Self {
        IoError::Read {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Build a `Write` error from a path and the underlying I/O error.
    pub fn write(path: impl std::fmt::Display, err: std::io::Error) -> Self {
        IoError::Write {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors that can occur when decoding the TIFF structure inside an EXIF payload
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF byte order mark: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42, got {0}")]
    InvalidVersion(u16),

    /// An offset or length points past the end of the payload
    #[error("Truncated data: need {requested} bytes at offset {offset}, payload is {size} bytes")]
    Truncated {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),

    /// Tag value has an unusable type, count or range
    #[error("Invalid value for tag 0x{tag:04X}: {message}")]
    InvalidTagValue { tag: u16, message: String },
}

/// Errors returned when opening or saving an EXIF document
#[derive(Debug, Clone, Error)]
pub enum ExifError {
    /// I/O error while reading the source or writing the destination
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// TIFF decoding error
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// The file does not start with the JPEG SOI marker
    #[error("Not a JPEG file: missing SOI marker")]
    NotAJpeg,

    /// No APP1 segment carrying an "Exif\0\0" header was found
    #[error("No EXIF APP1 segment found")]
    NoExifSegment,

    /// The serialized payload does not fit in a single APP1 segment
    #[error("EXIF payload too large for an APP1 segment: {size} bytes")]
    SegmentTooLarge { size: usize },

    /// The destination is the source file itself
    #[error("Refusing to overwrite the source file {0}")]
    SameFile(String),
}
