//! In-memory directories of an EXIF document.
//!
//! Offsets between directories only exist inside a serialized payload, so the
//! pointer graph is modelled as a fixed set of five named directories. Pointer
//! tag values found while parsing are kept as ordinary entries but are
//! recomputed on every save.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::format::tiff::{ExifTag, FieldType, GpsTag, InteropTag, Value};

// =============================================================================
// IfdKind
// =============================================================================

/// The five directories an EXIF payload can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IfdKind {
    /// Primary image attributes
    Ifd0,
    /// Camera and exposure attributes, reached from IFD0
    Exif,
    /// Interoperability attributes, reached from the Exif directory
    Interop,
    /// Location attributes, reached from IFD0
    Gps,
    /// Thumbnail attributes, reached through IFD0's next pointer
    Ifd1,
}

impl IfdKind {
    /// All directories in serialization order.
    pub const ALL: [IfdKind; 5] = [
        IfdKind::Ifd0,
        IfdKind::Exif,
        IfdKind::Interop,
        IfdKind::Gps,
        IfdKind::Ifd1,
    ];

    /// Short lowercase name used in logs and output.
    pub const fn name(self) -> &'static str {
        match self {
            IfdKind::Ifd0 => "ifd0",
            IfdKind::Exif => "exif",
            IfdKind::Interop => "interop",
            IfdKind::Gps => "gps",
            IfdKind::Ifd1 => "ifd1",
        }
    }

    /// Known name of `tag` within this directory, if any.
    pub fn tag_name(self, tag: u16) -> Option<&'static str> {
        match self {
            IfdKind::Ifd0 | IfdKind::Exif | IfdKind::Ifd1 => ExifTag::from_u16(tag).map(ExifTag::name),
            IfdKind::Gps => GpsTag::from_u16(tag).map(GpsTag::name),
            IfdKind::Interop => InteropTag::from_u16(tag).map(InteropTag::name),
        }
    }
}

impl fmt::Display for IfdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Directory
// =============================================================================

/// Mapping from tag id to value.
///
/// Keys are unique. Iteration is always in ascending tag order, which is the
/// order entries are serialized in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Directory {
    entries: BTreeMap<u16, Value>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value stored under `tag`.
    pub fn get(&self, tag: u16) -> Option<&Value> {
        self.entries.get(&tag)
    }

    /// Insert or replace the value stored under `tag`, returning the old one.
    pub fn insert(&mut self, tag: u16, value: Value) -> Option<Value> {
        self.entries.insert(tag, value)
    }

    /// Remove the value stored under `tag`.
    pub fn remove(&mut self, tag: u16) -> Option<Value> {
        self.entries.remove(&tag)
    }

    pub fn contains(&self, tag: u16) -> bool {
        self.entries.contains_key(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in ascending tag order.
    pub fn iter(&self) -> btree_map::Iter<'_, u16, Value> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = (&'a u16, &'a Value);
    type IntoIter = btree_map::Iter<'a, u16, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(u16, Value)> for Directory {
    fn from_iter<I: IntoIterator<Item = (u16, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// DirectorySet
// =============================================================================

/// The five directories of a document, addressed by [`IfdKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectorySet {
    pub ifd0: Directory,
    pub exif: Directory,
    pub interop: Directory,
    pub gps: Directory,
    pub ifd1: Directory,
}

impl DirectorySet {
    pub fn get(&self, kind: IfdKind) -> &Directory {
        match kind {
            IfdKind::Ifd0 => &self.ifd0,
            IfdKind::Exif => &self.exif,
            IfdKind::Interop => &self.interop,
            IfdKind::Gps => &self.gps,
            IfdKind::Ifd1 => &self.ifd1,
        }
    }

    pub fn get_mut(&mut self, kind: IfdKind) -> &mut Directory {
        match kind {
            IfdKind::Ifd0 => &mut self.ifd0,
            IfdKind::Exif => &mut self.exif,
            IfdKind::Interop => &mut self.interop,
            IfdKind::Gps => &mut self.gps,
            IfdKind::Ifd1 => &mut self.ifd1,
        }
    }

    /// Iterate `(kind, directory)` pairs in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (IfdKind, &Directory)> {
        IfdKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

// =============================================================================
// SkippedEntry
// =============================================================================

/// A directory entry dropped during parsing because its type id is unknown.
///
/// Such entries cannot be carried through a save: without a component width
/// there is no way to tell whether the value was inline or at an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub ifd: IfdKind,
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
}

/// Whether `value` has the shape expected of a directory pointer.
pub(crate) fn is_offset_value(value: &Value) -> bool {
    matches!(value.field_type(), FieldType::ULong | FieldType::UShort) && value.count() == 1
}
