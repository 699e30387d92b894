//! Format-specific integration tests.
//!
//! Tests verify:
//! - Payloads in either byte order decode to the same values
//! - All five directories and the thumbnail are found
//! - The segment is located behind other segments and across scan windows
//! - Malformed streams fail with the right error

use exif_splice::format::locate_exif_segment;
use exif_splice::{
    ByteOrder, ExifDocument, ExifError, ExifTag, GpsTag, IfdKind, InteropTag, MemoryReader,
    OpenOptions, TiffError, Value,
};

use super::test_utils::{
    camera_exif, camera_jpeg, content_entries, create_test_jpeg, insert_exif, insert_segment,
    is_valid_jpeg, ByteOrderType, ExifBuilder, IfdBuilder,
};

// =============================================================================
// TIFF Byte Order Tests
// =============================================================================

#[test]
fn test_little_endian_payload() {
    let doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::LittleEndian)).unwrap();
    assert_eq!(doc.byte_order(), ByteOrder::LittleEndian);

    assert_eq!(doc.get_ascii_string(IfdKind::Ifd0, ExifTag::Make).as_deref(), Some("Canon"));
    assert_eq!(doc.get_number(IfdKind::Ifd0, ExifTag::Orientation), Some(1));
    assert_eq!(doc.get_rational(IfdKind::Ifd0, ExifTag::XResolution), Some((72, 1)));

    assert_eq!(doc.get_rational(IfdKind::Exif, ExifTag::ExposureTime), Some((1, 125)));
    assert_eq!(doc.get_rational(IfdKind::Exif, ExifTag::ExposureBiasValue), Some((-1, 3)));
    assert_eq!(doc.get_number(IfdKind::Exif, ExifTag::IsoSpeedRatings), Some(400));
    assert_eq!(
        doc.get(IfdKind::Exif, ExifTag::ExifVersion),
        Some(&Value::Undefined(b"0220".to_vec()))
    );
    assert_eq!(
        doc.maker_note(),
        Some(&[0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70][..])
    );

    assert_eq!(
        doc.get_ascii_string(IfdKind::Interop, InteropTag::InteroperabilityIndex)
            .as_deref(),
        Some("R98")
    );
    assert_eq!(doc.get_number(IfdKind::Ifd1, ExifTag::Compression), Some(6));
    assert!(doc.directory(IfdKind::Gps).is_empty());
}

#[test]
fn test_big_endian_payload_matches_little_endian() {
    let le = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::LittleEndian)).unwrap();
    let be = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::BigEndian)).unwrap();
    assert_eq!(be.byte_order(), ByteOrder::BigEndian);

    for kind in IfdKind::ALL {
        assert_eq!(
            content_entries(be.directory(kind)),
            content_entries(le.directory(kind)),
            "{} differs between byte orders",
            kind
        );
    }
    assert_eq!(be.thumbnail(), le.thumbnail());
}

// =============================================================================
// Thumbnail Tests
// =============================================================================

#[test]
fn test_thumbnail_is_extracted() {
    let doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::BigEndian)).unwrap();
    let thumbnail = doc.thumbnail().expect("thumbnail");
    assert_eq!(thumbnail, create_test_jpeg(16, 12, 70).as_slice());
    assert!(is_valid_jpeg(thumbnail));
}

#[test]
fn test_ifd1_without_thumbnail() {
    let tiff = ExifBuilder::new(ByteOrderType::LittleEndian)
        .ifd0(IfdBuilder::new().ascii(0x010F, "Nikon"))
        .ifd1(IfdBuilder::new().short(0x0103, 6))
        .build();
    let doc = ExifDocument::from_bytes(insert_exif(&create_test_jpeg(8, 8, 80), &tiff)).unwrap();

    assert!(doc.thumbnail().is_none());
    assert_eq!(doc.get_number(IfdKind::Ifd1, ExifTag::Compression), Some(6));
}

// =============================================================================
// Segment Location Tests
// =============================================================================

#[test]
fn test_segment_behind_large_comment() {
    let comment = vec![b'x'; 10_000];
    let data = insert_segment(&camera_jpeg(ByteOrderType::LittleEndian), 0xFE, &comment);

    let segment = locate_exif_segment(&MemoryReader::new(data.clone()), 64).unwrap();
    assert_eq!(segment.marker_offset, 2 + 4 + 10_000);

    let doc = ExifDocument::from_bytes(data).unwrap();
    assert_eq!(doc.segment(), &segment);
    assert_eq!(doc.get_ascii_string(IfdKind::Ifd0, ExifTag::Make).as_deref(), Some("Canon"));
}

#[test]
fn test_segment_found_at_every_window_alignment() {
    let base = camera_jpeg(ByteOrderType::BigEndian);
    let expected = locate_exif_segment(&MemoryReader::new(base.clone()), 4096).unwrap();

    for padding in 0..80 {
        let data = insert_segment(&base, 0xFE, &vec![0u8; padding]);
        let reader = MemoryReader::new(data);
        let segment = locate_exif_segment(&reader, 64)
            .unwrap_or_else(|e| panic!("padding {}: {}", padding, e));

        assert_eq!(segment.marker_offset, expected.marker_offset + 4 + padding as u64);
        assert_eq!(segment.declared_size, expected.declared_size);
    }
}

#[test]
fn test_open_with_small_scan_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commented.jpg");
    let data = insert_segment(&camera_jpeg(ByteOrderType::LittleEndian), 0xFE, &[b'c'; 3000]);
    std::fs::write(&path, &data).unwrap();

    let doc = ExifDocument::open_with(&path, OpenOptions { scan_window: 128 }).unwrap();
    assert_eq!(doc.source_path(), Some(path.as_path()));
    assert_eq!(doc.segment().marker_offset, 3006);
    assert!(doc.thumbnail().is_some());
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_not_a_jpeg() {
    let result = ExifDocument::from_bytes(b"GIF89a not a jpeg".to_vec());
    assert!(matches!(result, Err(ExifError::NotAJpeg)));
}

#[test]
fn test_jpeg_without_exif() {
    let result = ExifDocument::from_bytes(create_test_jpeg(32, 32, 80));
    assert!(matches!(result, Err(ExifError::NoExifSegment)));
}

#[test]
fn test_declared_size_past_end_of_file() {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x01, 0x00];
    data.extend_from_slice(b"Exif\0\0II*\0");

    let result = ExifDocument::from_bytes(data);
    assert!(matches!(result, Err(ExifError::Tiff(TiffError::Truncated { .. }))));
}

#[test]
fn test_truncated_payload() {
    let tiff = camera_exif(ByteOrderType::LittleEndian).build();
    let data = insert_exif(&create_test_jpeg(8, 8, 80), &tiff[..60]);

    let result = ExifDocument::from_bytes(data);
    assert!(matches!(result, Err(ExifError::Tiff(TiffError::Truncated { .. }))));
}

#[test]
fn test_invalid_byte_order_mark() {
    let data = insert_exif(&create_test_jpeg(8, 8, 80), b"XX\x2A\x00\x08\x00\x00\x00\x00\x00");
    let result = ExifDocument::from_bytes(data);
    assert!(matches!(
        result,
        Err(ExifError::Tiff(TiffError::InvalidMagic(0x5858)))
    ));
}

#[test]
fn test_malformed_exif_pointer() {
    let tiff = ExifBuilder::new(ByteOrderType::BigEndian)
        .ifd0(IfdBuilder::new().shorts(0x8769, &[1, 2]))
        .build();
    let result = ExifDocument::from_bytes(insert_exif(&create_test_jpeg(8, 8, 80), &tiff));
    assert!(matches!(
        result,
        Err(ExifError::Tiff(TiffError::InvalidTagValue { tag: 0x8769, .. }))
    ));
}

#[test]
fn test_zero_gps_pointer_is_absent() {
    let tiff = ExifBuilder::new(ByteOrderType::LittleEndian)
        .ifd0(IfdBuilder::new().ascii(0x010F, "Sony").long(0x8825, 0))
        .build();
    let doc = ExifDocument::from_bytes(insert_exif(&create_test_jpeg(8, 8, 80), &tiff)).unwrap();

    assert!(doc.directory(IfdKind::Gps).is_empty());
    assert!(doc.gps_location().is_none());
    assert_eq!(doc.get_number(IfdKind::Ifd0, ExifTag::GpsPointer), Some(0));
}

#[test]
fn test_unknown_field_type_is_skipped() {
    let tiff = ExifBuilder::new(ByteOrderType::LittleEndian)
        .ifd0(
            IfdBuilder::new()
                .ascii(0x010F, "Fujifilm")
                .opaque(0xC4A5, 13, 1, [1, 2, 3, 4]),
        )
        .gps(IfdBuilder::new().opaque(GpsTag::Status.as_u16(), 0, 1, [0; 4]))
        .build();
    let doc = ExifDocument::from_bytes(insert_exif(&create_test_jpeg(8, 8, 80), &tiff)).unwrap();

    let skipped = doc.skipped_entries();
    assert_eq!(skipped.len(), 2);
    assert_eq!(skipped[0].ifd, IfdKind::Ifd0);
    assert_eq!(skipped[0].tag, 0xC4A5);
    assert_eq!(skipped[0].field_type, 13);
    assert_eq!(skipped[1].ifd, IfdKind::Gps);

    assert_eq!(doc.directory(IfdKind::Ifd0).get(0xC4A5), None);
    assert_eq!(
        doc.get_ascii_string(IfdKind::Ifd0, ExifTag::Make).as_deref(),
        Some("Fujifilm")
    );
}
