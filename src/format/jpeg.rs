//! JPEG envelope handling for EXIF segments.
//!
//! EXIF metadata lives in an APP1 marker segment near the start of a JPEG
//! stream:
//!
//! ```text
//! FF E1              APP1 marker
//! SS SS              Segment size, big-endian, counting itself but not the marker
//! 45 78 69 66 00 00  "Exif\0\0"
//! ...                TIFF payload (size - 8 bytes)
//! ```
//!
//! # Locating the segment
//!
//! The stream is scanned through a [`RangeReader`] in fixed-size windows. A
//! marker and header split across two windows is never missed: consecutive
//! windows overlap by the header length, so a match that did not fit at the
//! end of one window is examined again from its first byte in the next.

use bytes::{BufMut, BytesMut};
use tracing::debug;

use crate::error::{ExifError, TiffError};
use crate::io::{read_u16_be, RangeReader};

// =============================================================================
// JPEG Markers
// =============================================================================

/// Start Of Image marker
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// Application segment 1 (EXIF, XMP) marker
pub const APP1: [u8; 2] = [0xFF, 0xE1];

/// Identifier that opens an EXIF APP1 payload
pub const EXIF_HEADER: [u8; 6] = *b"Exif\0\0";

/// Marker, size field and EXIF identifier: bytes before the TIFF payload
pub const APP1_HEADER_LEN: usize = 2 + 2 + EXIF_HEADER.len();

/// Largest TIFF payload that fits in one APP1 segment.
///
/// The 16-bit size field covers itself (2 bytes), the identifier (6 bytes)
/// and the payload.
pub const MAX_TIFF_PAYLOAD: usize = u16::MAX as usize - 2 - EXIF_HEADER.len();

/// Default scan window size in bytes
pub const DEFAULT_SCAN_WINDOW: usize = 4096;

// =============================================================================
// ExifSegment
// =============================================================================

/// Where the EXIF segment was found in the source stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ExifSegment {
    /// Absolute offset of the APP1 marker
    pub marker_offset: u64,

    /// Segment size as declared after the marker (includes the size field)
    pub declared_size: u16,

    /// Absolute offset of the first TIFF payload byte
    pub tiff_offset: u64,
}

impl ExifSegment {
    /// Length of the TIFF payload in bytes.
    pub fn payload_len(&self) -> usize {
        (self.declared_size as usize).saturating_sub(2 + EXIF_HEADER.len())
    }

    /// Absolute offset of the first byte after the segment.
    pub fn end(&self) -> u64 {
        self.tiff_offset + self.payload_len() as u64
    }
}

// =============================================================================
// Segment Locator
// =============================================================================

/// Find the first EXIF APP1 segment in a JPEG stream.
///
/// # Errors
/// - `NotAJpeg` if the stream does not start with SOI
/// - `NoExifSegment` if no APP1 marker followed by `"Exif\0\0"` is found
/// - `Tiff(Truncated)` if the declared segment size runs past the stream
pub fn locate_exif_segment<R: RangeReader + ?Sized>(
    reader: &R,
    window: usize,
) -> Result<ExifSegment, ExifError> {
    let size = reader.size();
    if size < SOI.len() as u64 || reader.read_exact_at(0, SOI.len())?[..] != SOI {
        return Err(ExifError::NotAJpeg);
    }

    // Each window must advance past the overlap
    let window = window.max(APP1_HEADER_LEN * 2);
    let mut pos = 0u64;

    let marker_offset = loop {
        let len = window.min((size - pos) as usize);
        let buf = reader.read_exact_at(pos, len)?;

        if let Some(index) = find_exif_marker(&buf) {
            break pos + index as u64;
        }

        if pos + len as u64 >= size {
            return Err(ExifError::NoExifSegment);
        }
        pos += (len - APP1_HEADER_LEN) as u64;
    };

    let declared_size = read_u16_be(&reader.read_exact_at(marker_offset + 2, 2)?);
    let segment = ExifSegment {
        marker_offset,
        declared_size,
        tiff_offset: marker_offset + APP1_HEADER_LEN as u64,
    };

    // The segment must at least hold its identifier and fit in the stream
    let segment_end = marker_offset + 2 + declared_size as u64;
    if (declared_size as usize) < 2 + EXIF_HEADER.len() || segment_end > size {
        return Err(TiffError::Truncated {
            offset: marker_offset,
            requested: 2 + declared_size as u64,
            size,
        }
        .into());
    }

    debug!(
        source = reader.identifier(),
        marker_offset,
        declared_size,
        "Located EXIF segment"
    );

    Ok(segment)
}

/// Index of the first complete APP1 marker plus EXIF identifier in `buf`.
fn find_exif_marker(buf: &[u8]) -> Option<usize> {
    buf.windows(APP1_HEADER_LEN).position(|candidate| {
        candidate[0..2] == APP1 && candidate[4..APP1_HEADER_LEN] == EXIF_HEADER
    })
}

// =============================================================================
// APP1 Header
// =============================================================================

/// Append an APP1 marker, size field and EXIF identifier for a payload of
/// `payload_len` bytes.
pub fn put_app1_header(out: &mut BytesMut, payload_len: usize) -> Result<(), ExifError> {
    if payload_len > MAX_TIFF_PAYLOAD {
        return Err(ExifError::SegmentTooLarge { size: payload_len });
    }
    out.put_slice(&APP1);
    out.put_u16((payload_len + 2 + EXIF_HEADER.len()) as u16);
    out.put_slice(&EXIF_HEADER);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
