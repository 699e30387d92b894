//! Test utilities for integration tests.
//!
//! This module builds real JPEG streams with the `image` encoder and EXIF
//! payloads laid out the way cameras write them: either byte order, values
//! word-aligned after each directory, sub-directories reached by pointer.

use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, Luma};

use exif_splice::{Directory, Value};

// =============================================================================
// Test JPEG Creation
// =============================================================================

/// Create a test JPEG image with a simple gradient pattern.
pub fn create_test_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |x, y| {
        let val = ((x + y) % 256) as u8;
        Luma([val])
    });

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&img).unwrap();
    buf
}

/// Insert a segment right after SOI.
///
/// Inserting several segments puts the last one inserted first.
pub fn insert_segment(jpeg: &[u8], marker: u8, body: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG stream");
    let size = u16::try_from(body.len() + 2).expect("segment body too large");

    let mut out = Vec::with_capacity(jpeg.len() + body.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Insert an EXIF APP1 segment carrying `tiff` right after SOI.
pub fn insert_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let mut body = b"Exif\0\0".to_vec();
    body.extend_from_slice(tiff);
    insert_segment(jpeg, 0xE1, &body)
}

/// Bytes following the EXIF segment, up to and including EOI.
pub fn image_data_after_exif(jpeg: &[u8]) -> &[u8] {
    let marker = jpeg
        .windows(10)
        .position(|w| w[0] == 0xFF && w[1] == 0xE1 && &w[4..10] == b"Exif\0\0")
        .expect("no EXIF segment");
    let size = u16::from_be_bytes([jpeg[marker + 2], jpeg[marker + 3]]) as usize;
    &jpeg[marker + 2 + size..]
}

// =============================================================================
// EXIF Payload Builders
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

impl ByteOrderType {
    fn u16(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrderType::LittleEndian => value.to_le_bytes(),
            ByteOrderType::BigEndian => value.to_be_bytes(),
        }
    }

    fn u32(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrderType::LittleEndian => value.to_le_bytes(),
            ByteOrderType::BigEndian => value.to_be_bytes(),
        }
    }
}

#[derive(Clone, Debug)]
enum RawValue {
    Bytes(u16, Vec<u8>),
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Rationals(u16, Vec<(u32, u32)>),
    /// Arbitrary type id with a pre-encoded 4-byte value field.
    Opaque(u16, u32, [u8; 4]),
}

impl RawValue {
    /// Field type, count and encoded value bytes.
    fn encode(&self, order: ByteOrderType) -> (u16, u32, Vec<u8>) {
        match self {
            RawValue::Bytes(field_type, bytes) => (*field_type, bytes.len() as u32, bytes.clone()),
            RawValue::Shorts(values) => (
                3,
                values.len() as u32,
                values.iter().flat_map(|v| order.u16(*v)).collect(),
            ),
            RawValue::Longs(values) => (
                4,
                values.len() as u32,
                values.iter().flat_map(|v| order.u32(*v)).collect(),
            ),
            RawValue::Rationals(field_type, values) => (
                *field_type,
                values.len() as u32,
                values
                    .iter()
                    .flat_map(|(n, d)| order.u32(*n).into_iter().chain(order.u32(*d)))
                    .collect(),
            ),
            RawValue::Opaque(field_type, count, field) => (*field_type, *count, field.to_vec()),
        }
    }
}

/// Builder for one directory's entries.
#[derive(Clone, Debug, Default)]
pub struct IfdBuilder {
    entries: Vec<(u16, RawValue)>,
}

impl IfdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// NUL-terminated ASCII value.
    pub fn ascii(mut self, tag: u16, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        self.entries.push((tag, RawValue::Bytes(2, bytes)));
        self
    }

    pub fn bytes(mut self, tag: u16, bytes: &[u8]) -> Self {
        self.entries.push((tag, RawValue::Bytes(1, bytes.to_vec())));
        self
    }

    pub fn undefined(mut self, tag: u16, bytes: &[u8]) -> Self {
        self.entries.push((tag, RawValue::Bytes(7, bytes.to_vec())));
        self
    }

    pub fn short(self, tag: u16, value: u16) -> Self {
        self.shorts(tag, &[value])
    }

    pub fn shorts(mut self, tag: u16, values: &[u16]) -> Self {
        self.entries.push((tag, RawValue::Shorts(values.to_vec())));
        self
    }

    pub fn long(mut self, tag: u16, value: u32) -> Self {
        self.entries.push((tag, RawValue::Longs(vec![value])));
        self
    }

    pub fn rational(self, tag: u16, num: u32, den: u32) -> Self {
        self.rationals(tag, &[(num, den)])
    }

    pub fn rationals(mut self, tag: u16, values: &[(u32, u32)]) -> Self {
        self.entries.push((tag, RawValue::Rationals(5, values.to_vec())));
        self
    }

    /// Signed rational; halves are written as their two's complement.
    pub fn srational(mut self, tag: u16, num: i32, den: i32) -> Self {
        self.entries
            .push((tag, RawValue::Rationals(10, vec![(num as u32, den as u32)])));
        self
    }

    /// Entry with an arbitrary type id, for exercising unknown types.
    pub fn opaque(mut self, tag: u16, field_type: u16, count: u32, field: [u8; 4]) -> Self {
        self.entries
            .push((tag, RawValue::Opaque(field_type, count, field)));
        self
    }

    fn set_long(&mut self, tag: u16, value: u32) {
        self.entries.retain(|(t, _)| *t != tag);
        self.entries.push((tag, RawValue::Longs(vec![value])));
    }

    fn sorted(&self) -> Vec<(u16, RawValue)> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|(tag, _)| *tag);
        entries
    }

    /// Bytes this directory occupies, including word-aligned extra values.
    fn size(&self, order: ByteOrderType) -> usize {
        let extras: usize = self
            .entries
            .iter()
            .map(|(_, value)| value.encode(order).2.len())
            .filter(|len| *len > 4)
            .map(|len| len + len % 2)
            .sum();
        2 + 12 * self.entries.len() + 4 + extras
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrderType, next: u32) {
        let base = out.len();
        let entries = self.sorted();
        let mut extra_offset = base + 2 + 12 * entries.len() + 4;
        let mut extras = Vec::new();

        out.extend_from_slice(&order.u16(entries.len() as u16));
        for (tag, value) in &entries {
            let (field_type, count, bytes) = value.encode(order);
            out.extend_from_slice(&order.u16(*tag));
            out.extend_from_slice(&order.u16(field_type));
            out.extend_from_slice(&order.u32(count));
            if bytes.len() <= 4 {
                let mut field = [0u8; 4];
                field[..bytes.len()].copy_from_slice(&bytes);
                out.extend_from_slice(&field);
            } else {
                out.extend_from_slice(&order.u32(extra_offset as u32));
                extra_offset += bytes.len() + bytes.len() % 2;
                extras.extend_from_slice(&bytes);
                if bytes.len() % 2 == 1 {
                    extras.push(0);
                }
            }
        }
        out.extend_from_slice(&order.u32(next));
        out.extend_from_slice(&extras);
    }
}

/// Builder for a complete TIFF payload with sub-directories and thumbnail.
///
/// Pointer tags are added automatically for every sub-directory present.
#[derive(Clone, Debug)]
pub struct ExifBuilder {
    byte_order: ByteOrderType,
    ifd0: IfdBuilder,
    exif: Option<IfdBuilder>,
    interop: Option<IfdBuilder>,
    gps: Option<IfdBuilder>,
    ifd1: Option<IfdBuilder>,
    thumbnail: Option<Vec<u8>>,
}

impl ExifBuilder {
    pub fn new(byte_order: ByteOrderType) -> Self {
        Self {
            byte_order,
            ifd0: IfdBuilder::new(),
            exif: None,
            interop: None,
            gps: None,
            ifd1: None,
            thumbnail: None,
        }
    }

    pub fn ifd0(mut self, ifd: IfdBuilder) -> Self {
        self.ifd0 = ifd;
        self
    }

    pub fn exif(mut self, ifd: IfdBuilder) -> Self {
        self.exif = Some(ifd);
        self
    }

    pub fn interop(mut self, ifd: IfdBuilder) -> Self {
        self.interop = Some(ifd);
        self
    }

    pub fn gps(mut self, ifd: IfdBuilder) -> Self {
        self.gps = Some(ifd);
        self
    }

    pub fn ifd1(mut self, ifd: IfdBuilder) -> Self {
        self.ifd1 = Some(ifd);
        self
    }

    pub fn thumbnail(mut self, jpeg: Vec<u8>) -> Self {
        self.thumbnail = Some(jpeg);
        self
    }

    /// Build the TIFF payload.
    pub fn build(&self) -> Vec<u8> {
        let order = self.byte_order;
        let mut ifd0 = self.ifd0.clone();
        let mut exif = self.exif.clone();
        let interop = self.interop.clone();
        let gps = self.gps.clone();
        let mut ifd1 = self.ifd1.clone();

        if self.thumbnail.is_some() && ifd1.is_none() {
            ifd1 = Some(IfdBuilder::new());
        }

        // Placeholders first so sizes are final
        if interop.is_some() {
            if let Some(exif) = exif.as_mut() {
                exif.set_long(0xA005, 0);
            }
        }
        if exif.is_some() {
            ifd0.set_long(0x8769, 0);
        }
        if gps.is_some() {
            ifd0.set_long(0x8825, 0);
        }
        if let (Some(ifd1), Some(thumb)) = (ifd1.as_mut(), self.thumbnail.as_ref()) {
            ifd1.set_long(0x0201, 0);
            ifd1.set_long(0x0202, thumb.len() as u32);
        }

        let mut cursor = 8;
        let mut place = |ifd: Option<&IfdBuilder>| {
            ifd.map(|ifd| {
                let offset = cursor;
                cursor += ifd.size(order);
                offset as u32
            })
        };
        let ifd0_offset = place(Some(&ifd0)).unwrap_or(8);
        let exif_offset = place(exif.as_ref());
        let interop_offset = place(interop.as_ref());
        let gps_offset = place(gps.as_ref());
        let ifd1_offset = place(ifd1.as_ref());
        let thumbnail_offset = cursor as u32;

        if let Some(offset) = exif_offset {
            ifd0.set_long(0x8769, offset);
        }
        if let Some(offset) = gps_offset {
            ifd0.set_long(0x8825, offset);
        }
        if let (Some(exif), Some(offset)) = (exif.as_mut(), interop_offset) {
            exif.set_long(0xA005, offset);
        }
        if let (Some(ifd1), true) = (ifd1.as_mut(), self.thumbnail.is_some()) {
            ifd1.set_long(0x0201, thumbnail_offset);
        }

        let mut out = Vec::new();
        match order {
            ByteOrderType::LittleEndian => out.extend_from_slice(b"II"),
            ByteOrderType::BigEndian => out.extend_from_slice(b"MM"),
        }
        out.extend_from_slice(&order.u16(42));
        out.extend_from_slice(&order.u32(ifd0_offset));

        ifd0.write(&mut out, order, ifd1_offset.unwrap_or(0));
        for ifd in [exif.as_ref(), interop.as_ref(), gps.as_ref()].into_iter().flatten() {
            ifd.write(&mut out, order, 0);
        }
        if let Some(ifd1) = ifd1.as_ref() {
            ifd1.write(&mut out, order, 0);
        }
        if let Some(thumb) = self.thumbnail.as_ref() {
            out.extend_from_slice(thumb);
        }
        out
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Payload resembling a camera's: IFD0, Exif, Interop and IFD1 with a
/// thumbnail, no GPS.
pub fn camera_exif(order: ByteOrderType) -> ExifBuilder {
    ExifBuilder::new(order)
        .ifd0(
            IfdBuilder::new()
                .ascii(0x010F, "Canon")
                .ascii(0x0110, "Canon EOS 5D")
                .short(0x0112, 1)
                .rational(0x011A, 72, 1)
                .rational(0x011B, 72, 1)
                .short(0x0128, 2)
                .ascii(0x0132, "2024:05:01 12:30:00"),
        )
        .exif(
            IfdBuilder::new()
                .rational(0x829A, 1, 125)
                .rational(0x829D, 28, 10)
                .short(0x8827, 400)
                .undefined(0x9000, b"0220")
                .srational(0x9204, -1, 3)
                .undefined(0x927C, &[0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70]),
        )
        .interop(
            IfdBuilder::new()
                .ascii(0x0001, "R98")
                .undefined(0x0002, b"0100"),
        )
        .ifd1(
            IfdBuilder::new()
                .short(0x0103, 6)
                .rational(0x011A, 72, 1)
                .rational(0x011B, 72, 1)
                .short(0x0128, 2),
        )
        .thumbnail(create_test_jpeg(16, 12, 70))
}

/// A 64x48 JPEG carrying the camera payload in the given byte order.
pub fn camera_jpeg(order: ByteOrderType) -> Vec<u8> {
    insert_exif(&create_test_jpeg(64, 48, 85), &camera_exif(order).build())
}

// =============================================================================
// Validation Helpers
// =============================================================================

/// Tags whose values are payload offsets and change on every save.
const OFFSET_TAGS: [u16; 4] = [0x8769, 0x8825, 0xA005, 0x0201];

/// Entries of `dir` other than offset-valued pointer tags.
pub fn content_entries(dir: &Directory) -> Vec<(u16, Value)> {
    dir.iter()
        .filter(|(tag, _)| !OFFSET_TAGS.contains(*tag))
        .map(|(tag, value)| (*tag, value.clone()))
        .collect()
}

/// Check if data is a valid JPEG.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }

    // Check SOI marker
    if data[0] != 0xFF || data[1] != 0xD8 {
        return false;
    }

    // Check EOI marker at end
    if data[data.len() - 2] != 0xFF || data[data.len() - 1] != 0xD9 {
        return false;
    }

    // Try to decode it
    image::load_from_memory_with_format(data, image::ImageFormat::Jpeg).is_ok()
}
