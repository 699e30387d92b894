//! TIFF header and directory parsing.
//!
//! The EXIF payload of an APP1 segment is a small classic TIFF file: all
//! offsets inside it are relative to the first byte of its header.
//!
//! # TIFF Header Structure
//!
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to IFD0 (4 bytes)
//! ```
//!
//! # IFD Structure
//!
//! ```text
//! Bytes 0-1:       Entry count n
//! Bytes 2..2+12n:  Entries (tag u16, type u16, count u32, value-or-offset u32)
//! Next 4 bytes:    Offset of the next directory (0 if none)
//! ```

use std::ops::Range;

use tracing::{debug, warn};

use crate::error::TiffError;
use crate::exif::{is_offset_value, Directory, DirectorySet, IfdKind, SkippedEntry};
use crate::io::{
    read_u16_be, read_u16_le, read_u32_be, read_u32_le, write_u16_be, write_u16_le, write_u32_be,
    write_u32_le,
};

use super::tags::{ExifTag, FieldType};
use super::values::Value;

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
const VERSION_TIFF: u16 = 42;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of one IFD entry in bytes
pub const IFD_ENTRY_SIZE: usize = 12;

/// Size of the entry count field plus the next-directory field
pub const IFD_OVERHEAD: usize = 6;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF payload.
///
/// The payload declares its byte order in the first two bytes of the header.
/// All multi-byte values in the payload must be read respecting this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Byte order used for every serialized payload.
    pub const OUTPUT: ByteOrder = ByteOrder::LittleEndian;

    /// The two-byte mark that opens a header in this order.
    pub const fn mark(self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => *b"II",
            ByteOrder::BigEndian => *b"MM",
        }
    }

    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// Read a two's-complement integer of `width` bytes (1, 2 or 4).
    ///
    /// The sign bit is taken from the top bit of the `width`-byte value, not
    /// from a native-width integer.
    ///
    /// # Panics
    /// Panics if the slice is shorter than `width`.
    #[inline]
    pub fn read_signed(self, bytes: &[u8], width: usize) -> i32 {
        match width {
            1 => bytes[0] as i8 as i32,
            2 => self.read_u16(bytes) as i16 as i32,
            _ => self.read_u32(bytes) as i32,
        }
    }

    /// Append a u16 using this byte order.
    #[inline]
    pub fn write_u16(self, out: &mut Vec<u8>, value: u16) {
        match self {
            ByteOrder::LittleEndian => write_u16_le(out, value),
            ByteOrder::BigEndian => write_u16_be(out, value),
        }
    }

    /// Append a u32 using this byte order.
    #[inline]
    pub fn write_u32(self, out: &mut Vec<u8>, value: u32) {
        match self {
            ByteOrder::LittleEndian => write_u32_le(out, value),
            ByteOrder::BigEndian => write_u32_be(out, value),
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF header of an EXIF payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the payload
    pub byte_order: ByteOrder,

    /// Offset to IFD0, relative to the start of the header
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Parse a TIFF header from the first bytes of an EXIF payload.
    ///
    /// # Errors
    /// - `Truncated` if there are fewer than 8 bytes
    /// - `InvalidMagic` if byte order bytes are not II or MM
    /// - `InvalidVersion` if version is not 42
    pub fn parse(bytes: &[u8]) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::Truncated {
                offset: 0,
                requested: TIFF_HEADER_SIZE as u64,
                size: bytes.len() as u64,
            });
        }

        // Read as big-endian: we're matching literal byte patterns
        let magic = read_u16_be(&bytes[0..2]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);
        if version != VERSION_TIFF {
            return Err(TiffError::InvalidVersion(version));
        }

        Ok(TiffHeader {
            byte_order,
            first_ifd_offset: byte_order.read_u32(&bytes[4..8]),
        })
    }

    /// Encode a header pointing at IFD0 directly after it.
    pub fn encode(byte_order: ByteOrder) -> [u8; TIFF_HEADER_SIZE] {
        let mut out = Vec::with_capacity(TIFF_HEADER_SIZE);
        out.extend_from_slice(&byte_order.mark());
        byte_order.write_u16(&mut out, VERSION_TIFF);
        byte_order.write_u32(&mut out, TIFF_HEADER_SIZE as u32);

        let mut header = [0u8; TIFF_HEADER_SIZE];
        header.copy_from_slice(&out);
        header
    }
}

// =============================================================================
// DirectoryReader
// =============================================================================

/// Bounds-checked reader over a complete TIFF payload.
pub struct DirectoryReader<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
}

impl<'a> DirectoryReader<'a> {
    pub fn new(data: &'a [u8], byte_order: ByteOrder) -> Self {
        Self { data, byte_order }
    }

    /// Borrow `len` bytes at `offset`, or fail with `Truncated`.
    pub fn slice(&self, offset: u64, len: u64) -> Result<&'a [u8], TiffError> {
        let size = self.data.len() as u64;
        match offset.checked_add(len) {
            Some(end) if end <= size => Ok(&self.data[offset as usize..end as usize]),
            _ => Err(TiffError::Truncated {
                offset,
                requested: len,
                size,
            }),
        }
    }

    /// Decode one directory at `offset`.
    ///
    /// Returns the directory and its next-directory offset. Entries with an
    /// unknown type id are dropped and recorded in `skipped`.
    pub fn read_directory(
        &self,
        kind: IfdKind,
        offset: u32,
        skipped: &mut Vec<SkippedEntry>,
    ) -> Result<(Directory, u32), TiffError> {
        let offset = offset as u64;
        let order = self.byte_order;

        let count = order.read_u16(self.slice(offset, 2)?) as u64;
        let entries = self.slice(offset + 2, count * IFD_ENTRY_SIZE as u64)?;
        let next = order.read_u32(self.slice(offset + 2 + count * IFD_ENTRY_SIZE as u64, 4)?);

        let mut directory = Directory::new();
        for entry in entries.chunks_exact(IFD_ENTRY_SIZE) {
            let tag = order.read_u16(&entry[0..2]);
            let type_id = order.read_u16(&entry[2..4]);
            let components = order.read_u32(&entry[4..8]);

            let field_type = match FieldType::try_from(type_id) {
                Ok(field_type) => field_type,
                Err(err) => {
                    warn!(
                        ifd = %kind,
                        tag = %format!("0x{:04X}", tag),
                        error = %err,
                        "Dropping undecodable entry"
                    );
                    skipped.push(SkippedEntry {
                        ifd: kind,
                        tag,
                        field_type: type_id,
                        count: components,
                    });
                    continue;
                }
            };

            let total = field_type.total_bytes(components);
            let raw = if field_type.fits_inline(components) {
                &entry[8..8 + total as usize]
            } else {
                let value_offset = order.read_u32(&entry[8..12]) as u64;
                self.slice(value_offset, total)?
            };

            directory.insert(tag, Value::decode(field_type, raw, order));
        }

        debug!(
            ifd = %kind,
            offset,
            entries = directory.len(),
            next,
            "Parsed directory"
        );

        Ok((directory, next))
    }
}

// =============================================================================
// Payload parsing
// =============================================================================

/// Everything decoded from one EXIF payload.
#[derive(Debug, Clone)]
pub struct ParsedTiff {
    pub byte_order: ByteOrder,
    pub directories: DirectorySet,
    /// Byte range of the thumbnail stream inside the payload
    pub thumbnail: Option<Range<usize>>,
    pub skipped: Vec<SkippedEntry>,
}

/// Decode the header and all reachable directories of a TIFF payload.
///
/// IFD0 is read from the header's offset. IFD1 follows IFD0's next pointer,
/// the Exif and GPS directories follow IFD0's pointer tags and the
/// Interoperability directory follows the Exif directory's pointer tag. Any
/// offset or length running past the payload fails the whole parse.
pub fn parse_tiff(data: &[u8]) -> Result<ParsedTiff, TiffError> {
    let header = TiffHeader::parse(data)?;
    let reader = DirectoryReader::new(data, header.byte_order);
    let mut skipped = Vec::new();
    let mut dirs = DirectorySet::default();

    let (ifd0, next) = reader.read_directory(IfdKind::Ifd0, header.first_ifd_offset, &mut skipped)?;
    dirs.ifd0 = ifd0;

    let mut thumbnail = None;
    if next != 0 {
        let (ifd1, _) = reader.read_directory(IfdKind::Ifd1, next, &mut skipped)?;
        thumbnail = thumbnail_range(&reader, &ifd1)?;
        dirs.ifd1 = ifd1;
    }

    if let Some(offset) = pointer(&dirs.ifd0, ExifTag::ExifPointer)? {
        let (exif, _) = reader.read_directory(IfdKind::Exif, offset, &mut skipped)?;
        dirs.exif = exif;

        if let Some(offset) = pointer(&dirs.exif, ExifTag::InteropPointer)? {
            let (interop, _) = reader.read_directory(IfdKind::Interop, offset, &mut skipped)?;
            dirs.interop = interop;
        }
    }

    if let Some(offset) = pointer(&dirs.ifd0, ExifTag::GpsPointer)? {
        let (gps, _) = reader.read_directory(IfdKind::Gps, offset, &mut skipped)?;
        dirs.gps = gps;
    }

    Ok(ParsedTiff {
        byte_order: header.byte_order,
        directories: dirs,
        thumbnail,
        skipped,
    })
}

/// Read a directory pointer tag. A zero offset counts as absent.
fn pointer(directory: &Directory, tag: ExifTag) -> Result<Option<u32>, TiffError> {
    let Some(value) = directory.get(tag.as_u16()) else {
        return Ok(None);
    };
    if !is_offset_value(value) {
        return Err(TiffError::InvalidTagValue {
            tag: tag.as_u16(),
            message: format!(
                "expected one SHORT or LONG offset, got {} x{}",
                value.field_type().name(),
                value.count()
            ),
        });
    }
    Ok(value.as_offset().filter(|offset| *offset != 0))
}

/// Locate the thumbnail stream described by IFD1, if it has one.
fn thumbnail_range(
    reader: &DirectoryReader<'_>,
    ifd1: &Directory,
) -> Result<Option<Range<usize>>, TiffError> {
    let offset = ifd1
        .get(ExifTag::JpegInterchangeFormat.as_u16())
        .and_then(Value::as_offset);
    let length = ifd1
        .get(ExifTag::JpegInterchangeFormatLength.as_u16())
        .and_then(Value::as_offset);

    match (offset, length) {
        (Some(offset), Some(length)) if offset > 0 => {
            reader.slice(offset as u64, length as u64)?;
            debug!(offset, length, "Found thumbnail");
            let start = offset as usize;
            Ok(Some(start..start + length as usize))
        }
        (None, None) => Ok(None),
        (offset, length) => {
            warn!(?offset, ?length, "Ignoring incomplete thumbnail description");
            Ok(None)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
