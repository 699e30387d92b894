//! Layout planning and serialization of EXIF payloads.
//!
//! A payload is written as one contiguous blob:
//!
//! ```text
//! TIFF header | IFD0 | Exif | Interop | GPS | IFD1 | thumbnail
//! ```
//!
//! Pointer tags hold absolute offsets of later blocks, but a block's size only
//! depends on its entry count and value sizes, never on pointer values. So the
//! planner first inserts placeholder pointers into a working copy, sizes every
//! block, assigns offsets top-down, and only then patches the real offsets in.
//! Pointer values are single LONGs and always inline, so patching them cannot
//! change any size.

use tracing::debug;

use crate::error::ExifError;
use crate::exif::{Directory, DirectorySet, IfdKind};
use crate::format::jpeg::MAX_TIFF_PAYLOAD;

use super::parser::{ByteOrder, TiffHeader, IFD_ENTRY_SIZE, IFD_OVERHEAD, TIFF_HEADER_SIZE};
use super::tags::ExifTag;
use super::values::Value;

// =============================================================================
// Block sizes
// =============================================================================

/// Serialized size of a directory, including its out-of-line values.
///
/// Empty directories are not emitted and take no space.
pub fn block_size(directory: &Directory) -> usize {
    if directory.is_empty() {
        return 0;
    }
    IFD_OVERHEAD
        + directory
            .iter()
            .map(|(_, value)| IFD_ENTRY_SIZE + value.extra_size())
            .sum::<usize>()
}

/// Position of one block inside the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Block {
    pub offset: usize,
    pub size: usize,
}

impl Block {
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

// =============================================================================
// LayoutPlan
// =============================================================================

/// Computed layout of a payload, ready to be written.
#[derive(Debug, Clone)]
pub struct LayoutPlan<'a> {
    /// Working copy of the directories with pointer tags rewritten
    directories: DirectorySet,
    blocks: [Block; 5],
    thumbnail: Option<&'a [u8]>,
    thumbnail_block: Block,
}

impl<'a> LayoutPlan<'a> {
    /// Plan the layout of `directories` plus an optional thumbnail stream.
    ///
    /// The thumbnail is only placed when IFD1 has entries to describe it.
    /// Pointer tags whose target directory is empty are dropped from the
    /// working copy, so no pointer ever refers to a block that is not written.
    pub fn new(directories: &DirectorySet, thumbnail: Option<&'a [u8]>) -> Self {
        let mut dirs = directories.clone();
        let thumbnail = thumbnail.filter(|_| !dirs.ifd1.is_empty());

        // Interop is resolved first because its pointer can make Exif non-empty
        set_placeholder(&mut dirs.exif, ExifTag::InteropPointer, !dirs.interop.is_empty());
        set_placeholder(&mut dirs.ifd0, ExifTag::ExifPointer, !dirs.exif.is_empty());
        set_placeholder(&mut dirs.ifd0, ExifTag::GpsPointer, !dirs.gps.is_empty());

        match thumbnail {
            Some(bytes) => {
                dirs.ifd1.insert(
                    ExifTag::JpegInterchangeFormat.as_u16(),
                    Value::ULong(vec![0]),
                );
                dirs.ifd1.insert(
                    ExifTag::JpegInterchangeFormatLength.as_u16(),
                    Value::ULong(vec![bytes.len() as u32]),
                );
            }
            None => {
                dirs.ifd1.remove(ExifTag::JpegInterchangeFormat.as_u16());
                dirs.ifd1.remove(ExifTag::JpegInterchangeFormatLength.as_u16());
            }
        }

        // IFD0 is always written so the header's fixed offset is valid
        let mut blocks = [Block::default(); 5];
        let mut cursor = TIFF_HEADER_SIZE;
        for (slot, (kind, directory)) in blocks.iter_mut().zip(dirs.iter()) {
            let size = match kind {
                IfdKind::Ifd0 => block_size(directory).max(IFD_OVERHEAD),
                _ => block_size(directory),
            };
            *slot = Block {
                offset: cursor,
                size,
            };
            cursor += size;
        }
        let thumbnail_block = Block {
            offset: cursor,
            size: thumbnail.map_or(0, <[u8]>::len),
        };

        let mut plan = Self {
            directories: dirs,
            blocks,
            thumbnail,
            thumbnail_block,
        };
        plan.patch_pointers();
        plan
    }

    /// Block assigned to a directory.
    pub fn block(&self, kind: IfdKind) -> Block {
        self.blocks[kind as usize]
    }

    /// Block assigned to the thumbnail stream.
    pub fn thumbnail_block(&self) -> Block {
        self.thumbnail_block
    }

    /// Total payload size in bytes.
    pub fn total_size(&self) -> usize {
        self.thumbnail_block.end()
    }

    /// Directories as they will be written, pointer tags included.
    pub fn directories(&self) -> &DirectorySet {
        &self.directories
    }

    fn patch_pointers(&mut self) {
        let pointers = [
            (IfdKind::Ifd0, ExifTag::ExifPointer, self.block(IfdKind::Exif)),
            (IfdKind::Ifd0, ExifTag::GpsPointer, self.block(IfdKind::Gps)),
            (IfdKind::Exif, ExifTag::InteropPointer, self.block(IfdKind::Interop)),
        ];
        for (parent, tag, target) in pointers {
            let directory = self.directories.get_mut(parent);
            if directory.contains(tag.as_u16()) {
                directory.insert(tag.as_u16(), Value::ULong(vec![target.offset as u32]));
            }
        }

        if self.thumbnail.is_some() {
            self.directories.ifd1.insert(
                ExifTag::JpegInterchangeFormat.as_u16(),
                Value::ULong(vec![self.thumbnail_block.offset as u32]),
            );
        }
    }

    /// Write the planned payload.
    ///
    /// Output always starts with a little-endian header pointing at offset 8.
    pub fn write(&self) -> Result<Vec<u8>, ExifError> {
        let total = self.total_size();
        if total > MAX_TIFF_PAYLOAD {
            return Err(ExifError::SegmentTooLarge { size: total });
        }

        let order = ByteOrder::OUTPUT;
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&TiffHeader::encode(order));

        let ifd1 = self.block(IfdKind::Ifd1);
        for (kind, directory) in self.directories.iter() {
            let block = self.block(kind);
            if block.is_empty() {
                continue;
            }
            let next = match kind {
                IfdKind::Ifd0 if !ifd1.is_empty() => ifd1.offset as u32,
                _ => 0,
            };
            write_directory(directory, block.offset, next, order, &mut out);
            debug!(
                ifd = %kind,
                offset = block.offset,
                size = block.size,
                entries = directory.len(),
                "Wrote directory"
            );
        }

        if let Some(thumbnail) = self.thumbnail {
            out.extend_from_slice(thumbnail);
        }

        debug_assert_eq!(out.len(), total);
        Ok(out)
    }
}

/// Serialize a directory set into a complete TIFF payload.
pub fn serialize(directories: &DirectorySet, thumbnail: Option<&[u8]>) -> Result<Vec<u8>, ExifError> {
    LayoutPlan::new(directories, thumbnail).write()
}

/// Insert a zero placeholder for a pointer tag, or drop it when unused.
fn set_placeholder(directory: &mut Directory, tag: ExifTag, needed: bool) {
    if needed {
        directory.insert(tag.as_u16(), Value::ULong(vec![0]));
    } else {
        directory.remove(tag.as_u16());
    }
}

/// Write one directory whose first byte lands at payload offset `start`.
///
/// The next-directory field follows the entries directly; out-of-line values
/// come after it in ascending tag order, without padding.
fn write_directory(
    directory: &Directory,
    start: usize,
    next: u32,
    order: ByteOrder,
    out: &mut Vec<u8>,
) {
    let mut extra_offset = start + IFD_OVERHEAD + directory.len() * IFD_ENTRY_SIZE;
    let mut extra = Vec::new();

    order.write_u16(out, directory.len() as u16);
    for (tag, value) in directory {
        order.write_u16(out, *tag);
        order.write_u16(out, value.field_type().as_u16());
        order.write_u32(out, value.count());

        if value.is_inline() {
            let encoded = value.encode(order);
            out.extend_from_slice(&encoded);
            out.resize(out.len() + 4 - encoded.len(), 0);
        } else {
            order.write_u32(out, extra_offset as u32);
            value.encode_into(order, &mut extra);
            extra_offset += value.total_bytes();
        }
    }
    order.write_u32(out, next);
    out.extend_from_slice(&extra);
}

// =============================================================================
// Tests
// =============================================================================
