//! EXIF documents: parsing, editing and saving.
//!
//! - [`directory`]: the five directories and their entries
//! - [`document`]: [`ExifDocument`] with typed getters and setters, open and save
//! - `fields`: copyright, GPS, direction and text helpers on [`ExifDocument`]
//! - [`writer`]: splicing a payload back into a JPEG stream

pub mod directory;
pub mod document;
mod fields;
pub mod writer;

pub(crate) use directory::is_offset_value;
pub use directory::{Directory, DirectorySet, IfdKind, SkippedEntry};
pub use document::{ExifDocument, OpenOptions};
pub use fields::GpsLocation;
