//! # exif-splice
//!
//! Read, edit and re-serialize the EXIF metadata embedded in JPEG files.
//!
//! The EXIF segment of a JPEG file is an APP1 segment carrying a small TIFF
//! structure. This library locates that segment, decodes its directories into
//! typed values, lets callers change them, and writes a new JPEG in which only
//! the EXIF segment differs. The compressed image data is never decoded.
//!
//! ## Features
//!
//! - **Segment location**: Windowed scan for the `Exif\0\0` APP1 segment
//! - **Full directory support**: IFD0, Exif, Interoperability, GPS and IFD1
//!   with the embedded thumbnail
//! - **Typed access**: Integer, rational, ASCII and opaque values per directory
//! - **Helpers**: Copyright, GPS position, image direction, user comment
//! - **Safe output**: Files are written to a temporary sibling and renamed
//!   into place; the source file is never overwritten
//!
//! ## Architecture
//!
//! - [`io`] - Positional range readers over files and memory
//! - [`mod@format`] - JPEG segment location and the TIFF codec
//! - [`exif`] - The [`ExifDocument`] model, helpers and JPEG assembly
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use exif_splice::ExifDocument;
//!
//! let mut doc = ExifDocument::open("photo.jpg")?;
//! doc.set_copyright("Alice", Some("Bob"));
//! doc.set_direction(87.5)?;
//!
//! if let Some(location) = doc.gps_location() {
//!     println!("{}, {}", location.latitude, location.longitude);
//! }
//!
//! doc.save("photo-edited.jpg")?;
//! # Ok::<(), exif_splice::ExifError>(())
//! ```

pub mod config;
pub mod error;
pub mod exif;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use config::{Cli, Command, EditConfig, OutputFormat, ShowConfig};
pub use error::{ExifError, IoError, TiffError};
pub use exif::{
    Directory, DirectorySet, ExifDocument, GpsLocation, IfdKind, OpenOptions, SkippedEntry,
};
pub use format::jpeg::{ExifSegment, MAX_TIFF_PAYLOAD};
pub use format::tiff::{ByteOrder, ExifTag, FieldType, GpsTag, InteropTag, Value};
pub use io::{FileReader, MemoryReader, RangeReader};
