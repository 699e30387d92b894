//! TIFF structure of EXIF payloads.
//!
//! The payload carried by an EXIF APP1 segment is a classic TIFF file holding
//! up to five Image File Directories.
//!
//! # Key Concepts
//!
//! - **Byte order**: payloads declare their endianness (II = little-endian,
//!   MM = big-endian) in the header. All multi-byte values must be read
//!   respecting this order. Written payloads are always little-endian.
//!
//! - **IFD (Image File Directory)**: a list of 12-byte tag entries followed by
//!   the offset of the next directory.
//!
//! - **Inline vs offset values**: values of at most 4 bytes are stored inline
//!   in the entry, larger values are stored elsewhere in the payload and the
//!   entry holds their offset.
//!
//! - **Pointer tags**: entries whose value is the offset of a sub-directory
//!   (Exif, GPS, Interoperability). They are recomputed on every write.

mod layout;
mod parser;
mod tags;
mod values;

pub use layout::{block_size, serialize, Block, LayoutPlan};
pub use parser::{
    parse_tiff, ByteOrder, DirectoryReader, ParsedTiff, TiffHeader, IFD_ENTRY_SIZE, IFD_OVERHEAD,
    TIFF_HEADER_SIZE,
};
pub use tags::{ExifTag, FieldType, GpsTag, InteropTag};
pub use values::Value;
