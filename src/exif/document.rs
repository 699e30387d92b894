//! The EXIF document: parsed directories plus where they came from.
//!
//! A document is created by parsing a JPEG stream, mutated through typed
//! accessors, and written out with [`ExifDocument::save`] or
//! [`ExifDocument::to_jpeg_bytes`]. Writing never modifies the document, so
//! it can be saved any number of times.
//!
//! # Example
//!
//! ```no_run
//! use exif_splice::{ExifDocument, IfdKind};
//! use exif_splice::format::tiff::ExifTag;
//!
//! let mut doc = ExifDocument::open("photo.jpg")?;
//! doc.set_ascii_string(IfdKind::Ifd0, ExifTag::Artist, "Alice");
//! doc.set_gps_location(45.5, -73.6, 120.0)?;
//! doc.save("photo-tagged.jpg")?;
//! # Ok::<(), exif_splice::ExifError>(())
//! ```

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::error::{ExifError, TiffError};
use crate::format::jpeg::{locate_exif_segment, ExifSegment, DEFAULT_SCAN_WINDOW};
use crate::format::tiff::{self, ByteOrder, FieldType, Value};
use crate::io::{FileReader, MemoryReader, RangeReader};

use super::directory::{Directory, DirectorySet, IfdKind, SkippedEntry};
use super::writer::{assemble, is_same_file, AtomicOutput};

// =============================================================================
// OpenOptions
// =============================================================================

/// Options for locating and parsing the EXIF segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Window size used when scanning for the APP1 segment
    pub scan_window: usize,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            scan_window: DEFAULT_SCAN_WINDOW,
        }
    }
}

/// Where the source JPEG stream lives.
#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Memory(Bytes),
}

// =============================================================================
// ExifDocument
// =============================================================================

/// EXIF metadata of one JPEG stream.
#[derive(Debug, Clone)]
pub struct ExifDocument {
    directories: DirectorySet,
    byte_order: ByteOrder,
    thumbnail: Option<Bytes>,
    segment: ExifSegment,
    source: Source,
    skipped: Vec<SkippedEntry>,
}

impl ExifDocument {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Parse the EXIF segment of a JPEG file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExifError> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Parse the EXIF segment of a JPEG file with explicit options.
    ///
    /// The file is only read here; [`save`](Self::save) reopens it to copy
    /// the image data.
    pub fn open_with(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self, ExifError> {
        let path = path.as_ref();
        let reader = FileReader::open(path)?;
        Self::parse(&reader, options, Source::File(path.to_path_buf()))
    }

    /// Parse the EXIF segment of an in-memory JPEG stream.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self, ExifError> {
        let reader = MemoryReader::new(data);
        let source = Source::Memory(reader.data().clone());
        Self::parse(&reader, OpenOptions::default(), source)
    }

    fn parse<R: RangeReader>(
        reader: &R,
        options: OpenOptions,
        source: Source,
    ) -> Result<Self, ExifError> {
        let segment = locate_exif_segment(reader, options.scan_window)?;
        let payload = reader.read_exact_at(segment.tiff_offset, segment.payload_len())?;
        let parsed = tiff::parse_tiff(&payload)?;

        debug!(
            source = reader.identifier(),
            byte_order = ?parsed.byte_order,
            skipped = parsed.skipped.len(),
            thumbnail = parsed.thumbnail.as_ref().map_or(0, |range| range.len()),
            "Parsed EXIF payload"
        );

        Ok(Self {
            directories: parsed.directories,
            byte_order: parsed.byte_order,
            thumbnail: parsed.thumbnail.map(|range| payload.slice(range)),
            segment,
            source,
            skipped: parsed.skipped,
        })
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Byte order of the source payload. Output is always little-endian.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Where the EXIF segment was found in the source.
    pub fn segment(&self) -> &ExifSegment {
        &self.segment
    }

    /// Path of the source file, if the document was opened from one.
    pub fn source_path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Memory(_) => None,
        }
    }

    /// Thumbnail JPEG stream described by IFD1, copied verbatim on save.
    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    /// Entries dropped while parsing because their type was unknown.
    pub fn skipped_entries(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn directory(&self, kind: IfdKind) -> &Directory {
        self.directories.get(kind)
    }

    pub fn directories(&self) -> &DirectorySet {
        &self.directories
    }

    // -------------------------------------------------------------------------
    // Typed getters
    // -------------------------------------------------------------------------

    /// Raw value stored under `(kind, tag)`.
    pub fn get(&self, kind: IfdKind, tag: impl Into<u16>) -> Option<&Value> {
        self.directories.get(kind).get(tag.into())
    }

    /// First component of an integer value.
    pub fn get_number(&self, kind: IfdKind, tag: impl Into<u16>) -> Option<i64> {
        self.get_numbers(kind, tag)?.first().copied()
    }

    /// All components of an integer value.
    pub fn get_numbers(&self, kind: IfdKind, tag: impl Into<u16>) -> Option<Vec<i64>> {
        self.get(kind, tag)?.as_numbers()
    }

    /// First component of a rational value as `(numerator, denominator)`.
    pub fn get_rational(&self, kind: IfdKind, tag: impl Into<u16>) -> Option<(i64, i64)> {
        self.get_rationals(kind, tag)?.first().copied()
    }

    /// All components of a rational value.
    pub fn get_rationals(&self, kind: IfdKind, tag: impl Into<u16>) -> Option<Vec<(i64, i64)>> {
        self.get(kind, tag)?.as_rationals()
    }

    /// Raw bytes of an ASCII, UNDEFINED or BYTE value.
    pub fn get_bytes(&self, kind: IfdKind, tag: impl Into<u16>) -> Option<&[u8]> {
        self.get(kind, tag)?.as_bytes()
    }

    /// Text of an ASCII value up to its first NUL.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; plenty of cameras write
    /// Latin-1 into ASCII fields.
    pub fn get_ascii_string(&self, kind: IfdKind, tag: impl Into<u16>) -> Option<String> {
        match self.get(kind, tag)? {
            Value::Ascii(bytes) => {
                let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Typed setters
    // -------------------------------------------------------------------------

    /// Store `value` under `(kind, tag)`, returning the previous value.
    pub fn set_value(&mut self, kind: IfdKind, tag: impl Into<u16>, value: Value) -> Option<Value> {
        self.directories.get_mut(kind).insert(tag.into(), value)
    }

    /// Remove the value stored under `(kind, tag)`.
    pub fn remove(&mut self, kind: IfdKind, tag: impl Into<u16>) -> Option<Value> {
        self.directories.get_mut(kind).remove(tag.into())
    }

    /// Store integers as `field_type`.
    ///
    /// # Errors
    /// `InvalidTagValue` if `field_type` is not an integer type or a number
    /// does not fit it.
    pub fn set_numbers(
        &mut self,
        kind: IfdKind,
        tag: impl Into<u16>,
        field_type: FieldType,
        numbers: &[i64],
    ) -> Result<(), TiffError> {
        let tag = tag.into();
        let value = Value::from_numbers(field_type, numbers)
            .map_err(|message| TiffError::InvalidTagValue { tag, message })?;
        self.set_value(kind, tag, value);
        Ok(())
    }

    /// Store a single rational as `field_type`.
    pub fn set_rational(
        &mut self,
        kind: IfdKind,
        tag: impl Into<u16>,
        field_type: FieldType,
        rational: (i64, i64),
    ) -> Result<(), TiffError> {
        self.set_rationals(kind, tag, field_type, &[rational])
    }

    /// Store rationals as `field_type`.
    ///
    /// # Errors
    /// `InvalidTagValue` if `field_type` is not a rational type or a half
    /// does not fit it.
    pub fn set_rationals(
        &mut self,
        kind: IfdKind,
        tag: impl Into<u16>,
        field_type: FieldType,
        rationals: &[(i64, i64)],
    ) -> Result<(), TiffError> {
        let tag = tag.into();
        let value = Value::from_rationals(field_type, rationals)
            .map_err(|message| TiffError::InvalidTagValue { tag, message })?;
        self.set_value(kind, tag, value);
        Ok(())
    }

    /// Store text as a NUL-terminated ASCII value.
    pub fn set_ascii_string(&mut self, kind: IfdKind, tag: impl Into<u16>, text: &str) {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(0);
        self.set_value(kind, tag, Value::Ascii(bytes));
    }

    /// Store opaque bytes as an UNDEFINED value.
    pub fn set_bytes(&mut self, kind: IfdKind, tag: impl Into<u16>, bytes: &[u8]) {
        self.set_value(kind, tag, Value::Undefined(bytes.to_vec()));
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Serialize the directories and thumbnail into a TIFF payload.
    pub fn to_tiff_bytes(&self) -> Result<Vec<u8>, ExifError> {
        tiff::serialize(&self.directories, self.thumbnail())
    }

    /// Build the complete output JPEG stream in memory.
    pub fn to_jpeg_bytes(&self) -> Result<Vec<u8>, ExifError> {
        let payload = self.to_tiff_bytes()?;
        let mut out = Vec::new();
        match &self.source {
            Source::File(path) => {
                let reader = FileReader::open(path)?;
                assemble(&reader, &self.segment, &payload, &mut out, "memory")?;
            }
            Source::Memory(data) => {
                let reader = MemoryReader::new(data.clone());
                assemble(&reader, &self.segment, &payload, &mut out, "memory")?;
            }
        }
        Ok(out)
    }

    /// Write the edited JPEG to a new file at `path`.
    ///
    /// The payload is serialized before the destination is touched, and the
    /// file only appears at `path` once it is complete.
    ///
    /// # Errors
    /// `SameFile` if `path` is the file the document was opened from.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ExifError> {
        let path = path.as_ref();
        if let Source::File(source) = &self.source {
            if is_same_file(source, path) {
                return Err(ExifError::SameFile(path.display().to_string()));
            }
        }

        let payload = self.to_tiff_bytes()?;
        let mut output = AtomicOutput::create(path)?;
        let name = path.display().to_string();

        let written = match &self.source {
            Source::File(source) => {
                let reader = FileReader::open(source)?;
                assemble(&reader, &self.segment, &payload, &mut output, &name)?
            }
            Source::Memory(data) => {
                let reader = MemoryReader::new(data.clone());
                assemble(&reader, &self.segment, &payload, &mut output, &name)?
            }
        };
        output.finalize()?;

        debug!(path = %name, written, "Saved JPEG");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
