//! Binary formats involved in EXIF editing.
//!
//! - [`jpeg`]: the JPEG envelope and the APP1 segment carrying EXIF data
//! - [`tiff`]: the TIFF payload inside that segment, its directories and values

pub mod jpeg;
pub mod tiff;

pub use jpeg::{locate_exif_segment, ExifSegment, DEFAULT_SCAN_WINDOW};
