//! Metadata helper tests on real JPEG files.
//!
//! Tests verify:
//! - Copyright notices, GPS position and direction survive a save
//! - GPS values written by cameras are read back in decimal degrees
//! - Text fields and the user comment round-trip

use exif_splice::{ExifDocument, ExifTag, GpsTag, IfdKind, TiffError, Value};

use super::test_utils::{
    camera_jpeg, create_test_jpeg, insert_exif, is_valid_jpeg, ByteOrderType, ExifBuilder,
    IfdBuilder,
};

fn save_and_reopen(doc: &ExifDocument) -> ExifDocument {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edited.jpg");
    doc.save(&path).unwrap();

    let saved = std::fs::read(&path).unwrap();
    assert!(is_valid_jpeg(&saved));
    ExifDocument::from_bytes(saved).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

// =============================================================================
// Copyright
// =============================================================================

#[test]
fn test_copyright_roundtrip() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::LittleEndian)).unwrap();
    assert!(doc.copyright().is_none());

    doc.set_copyright("Alice", Some("Bob"));
    let reopened = save_and_reopen(&doc);

    assert_eq!(
        reopened.get(IfdKind::Ifd0, ExifTag::Copyright),
        Some(&Value::Ascii(b"Alice\0Bob\0".to_vec()))
    );
    assert_eq!(reopened.photographer_copyright().as_deref(), Some("Alice"));
    assert_eq!(reopened.editor_copyright().as_deref(), Some("Bob"));
}

#[test]
fn test_editor_only_copyright() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::BigEndian)).unwrap();
    doc.set_editor_copyright(Some("Bob"));

    let reopened = save_and_reopen(&doc);
    assert_eq!(
        reopened.get_bytes(IfdKind::Ifd0, ExifTag::Copyright),
        Some(&b" \0Bob\0"[..])
    );
    assert_eq!(reopened.copyright(), Some((String::new(), "Bob".to_string())));
}

#[test]
fn test_camera_copyright_is_read() {
    let tiff = ExifBuilder::new(ByteOrderType::BigEndian)
        .ifd0(IfdBuilder::new().ascii(0x8298, "Studio X"))
        .build();
    let mut doc =
        ExifDocument::from_bytes(insert_exif(&create_test_jpeg(8, 8, 80), &tiff)).unwrap();
    assert_eq!(doc.photographer_copyright().as_deref(), Some("Studio X"));
    assert_eq!(doc.editor_copyright().as_deref(), Some(""));

    doc.set_editor_copyright(Some("Retoucher"));
    assert_eq!(
        doc.copyright(),
        Some(("Studio X".to_string(), "Retoucher".to_string()))
    );
}

// =============================================================================
// GPS
// =============================================================================

#[test]
fn test_gps_location_added_to_file_without_gps() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::LittleEndian)).unwrap();
    assert!(doc.gps_location().is_none());

    doc.set_gps_location(45.5017, -73.5673, 233.0).unwrap();
    let reopened = save_and_reopen(&doc);

    assert!(reopened.get(IfdKind::Ifd0, ExifTag::GpsPointer).is_some());
    assert_eq!(
        reopened.get(IfdKind::Gps, GpsTag::VersionId),
        Some(&Value::UByte(vec![2, 2, 0, 0]))
    );
    assert_eq!(
        reopened.get_ascii_string(IfdKind::Gps, GpsTag::LatitudeRef).as_deref(),
        Some("N")
    );
    assert_eq!(
        reopened.get_ascii_string(IfdKind::Gps, GpsTag::LongitudeRef).as_deref(),
        Some("W")
    );
    let dms = reopened.get_rationals(IfdKind::Gps, GpsTag::Latitude).unwrap();
    assert_eq!(&dms[..2], &[(45, 1), (30, 1)]);
    assert_eq!(dms[2].1, 1000);
    assert!((6119..=6120).contains(&dms[2].0));

    let location = reopened.gps_location().unwrap();
    assert_close(location.latitude, 45.5017);
    assert_close(location.longitude, -73.5673);
    assert_eq!(location.altitude, Some(233.0));

    // Everything else is untouched
    assert_eq!(reopened.thumbnail(), doc.thumbnail());
    assert_eq!(reopened.get_number(IfdKind::Exif, ExifTag::IsoSpeedRatings), Some(400));
}

#[test]
fn test_gps_below_sea_level_southern_hemisphere() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::BigEndian)).unwrap();
    doc.set_gps_location(-31.5592, 35.4732, -430.7).unwrap();
    let reopened = save_and_reopen(&doc);

    assert_eq!(reopened.get_number(IfdKind::Gps, GpsTag::AltitudeRef), Some(1));
    assert_eq!(reopened.get_rational(IfdKind::Gps, GpsTag::Altitude), Some((430, 1)));

    let location = reopened.gps_location().unwrap();
    assert_close(location.latitude, -31.5592);
    assert_close(location.longitude, 35.4732);
    assert_eq!(location.altitude, Some(-430.0));
}

#[test]
fn test_camera_gps_is_read() {
    let tiff = ExifBuilder::new(ByteOrderType::BigEndian)
        .ifd0(IfdBuilder::new().ascii(0x010F, "Apple"))
        .gps(
            IfdBuilder::new()
                .bytes(0x00, &[2, 2, 0, 0])
                .ascii(0x01, "S")
                .rationals(0x02, &[(33, 1), (5134, 100), (0, 1)])
                .ascii(0x03, "E")
                .rationals(0x04, &[(151, 1), (12, 1), (3600, 100)])
                .bytes(0x05, &[0])
                .rational(0x06, 5800, 100),
        )
        .build();
    let doc = ExifDocument::from_bytes(insert_exif(&create_test_jpeg(8, 8, 80), &tiff)).unwrap();

    let location = doc.gps_location().unwrap();
    assert_close(location.latitude, -(33.0 + 51.34 / 60.0));
    assert_close(location.longitude, 151.0 + 12.0 / 60.0 + 36.0 / 3600.0);
    assert_eq!(location.altitude, Some(58.0));
}

#[test]
fn test_invalid_gps_leaves_document_unchanged() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::LittleEndian)).unwrap();
    let before = doc.directories().clone();

    assert!(matches!(
        doc.set_gps_location(91.0, 0.0, 0.0),
        Err(TiffError::InvalidTagValue { .. })
    ));
    assert!(doc.set_gps_location(0.0, -180.5, 0.0).is_err());
    assert!(doc.set_gps_location(0.0, 0.0, f64::NAN).is_err());
    assert_eq!(doc.directories(), &before);
}

// =============================================================================
// Direction
// =============================================================================

#[test]
fn test_direction_roundtrip() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::LittleEndian)).unwrap();
    doc.set_direction(271.256).unwrap();
    let reopened = save_and_reopen(&doc);

    assert_eq!(
        reopened.get_rational(IfdKind::Gps, GpsTag::ImgDirection),
        Some((27126, 100))
    );
    let (degrees, reference) = reopened.direction().unwrap();
    assert_close(degrees, 271.26);
    assert_eq!(reference, "M");
}

#[test]
fn test_direction_out_of_range() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::LittleEndian)).unwrap();
    assert!(doc.set_direction(360.0).is_err());
    assert!(doc.set_direction(-0.5).is_err());
    assert!(doc.direction().is_none());
    assert!(doc.directory(IfdKind::Gps).is_empty());
}

// =============================================================================
// Text Fields
// =============================================================================

#[test]
fn test_text_fields_roundtrip() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::BigEndian)).unwrap();
    doc.set_artist("Alice Example");
    doc.set_software("exif-splice 0.1");
    doc.set_image_description("Harbour at dawn");
    doc.set_user_comment("Shot from the pier");

    let reopened = save_and_reopen(&doc);
    assert_eq!(reopened.artist().as_deref(), Some("Alice Example"));
    assert_eq!(reopened.software().as_deref(), Some("exif-splice 0.1"));
    assert_eq!(reopened.image_description().as_deref(), Some("Harbour at dawn"));
    assert_eq!(reopened.user_comment().as_deref(), Some("Shot from the pier"));

    let raw = reopened.get_bytes(IfdKind::Exif, ExifTag::UserComment).unwrap();
    assert_eq!(&raw[..8], b"ASCII\0\0\0");
}

#[test]
fn test_non_ascii_user_comment() {
    let mut doc = ExifDocument::from_bytes(camera_jpeg(ByteOrderType::LittleEndian)).unwrap();
    doc.set_user_comment("Café au lait");

    let reopened = save_and_reopen(&doc);
    let raw = reopened.get_bytes(IfdKind::Exif, ExifTag::UserComment).unwrap();
    assert_eq!(&raw[..8], &[0u8; 8]);
    assert_eq!(reopened.user_comment().as_deref(), Some("Café au lait"));
}
