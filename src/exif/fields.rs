//! Helpers for commonly edited EXIF fields.
//!
//! These wrap the typed accessors of [`ExifDocument`] with the encodings the
//! EXIF 2.2 specification prescribes for each field:
//!
//! - **Copyright**: one ASCII value holding the photographer's notice and the
//!   editor's notice, each NUL-terminated. A missing photographer notice is
//!   written as a single space so the editor notice stays second.
//! - **GPS position**: latitude and longitude as degree/minute/second rational
//!   triples with denominators 1, 1 and 1000, plus N/S and E/W reference
//!   letters. Altitude is a whole number of metres with an above/below sea
//!   level reference byte.
//! - **Image direction**: a rational in hundredths of a degree, always
//!   referenced to magnetic north.

use serde::Serialize;

use crate::error::TiffError;
use crate::format::tiff::{ExifTag, FieldType, GpsTag, Value};

use super::directory::IfdKind;
use super::document::ExifDocument;

/// GPSVersionID written alongside every location (version 2.2.0.0)
const GPS_VERSION: [u8; 4] = [2, 2, 0, 0];

/// Character code prefix of an ASCII UserComment
const USER_COMMENT_ASCII: [u8; 8] = *b"ASCII\0\0\0";

/// Character code prefix of a UserComment with unspecified encoding
const USER_COMMENT_UNDEFINED: [u8; 8] = [0; 8];

/// Denominator of the seconds component in a DMS triple
const SECONDS_DENOMINATOR: i64 = 1000;

/// Denominator used for the image direction
const DIRECTION_DENOMINATOR: i64 = 100;

/// Reference value for directions measured from magnetic north
const MAGNETIC_NORTH: &str = "M";

// =============================================================================
// GpsLocation
// =============================================================================

/// A position read back from the GPS directory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsLocation {
    /// Decimal degrees, negative south of the equator
    pub latitude: f64,
    /// Decimal degrees, negative west of Greenwich
    pub longitude: f64,
    /// Metres, negative below sea level
    pub altitude: Option<f64>,
}

/// Split an absolute coordinate into whole degrees, whole minutes and
/// thousandths of a second.
fn to_dms(value: f64) -> [(i64, i64); 3] {
    let value = value.abs();
    let degrees = value.floor();
    let minutes_total = (value - degrees) * 60.0;
    let minutes = minutes_total.floor();
    let seconds = ((minutes_total - minutes) * 60.0 * SECONDS_DENOMINATOR as f64).floor();

    [
        (degrees as i64, 1),
        (minutes as i64, 1),
        (seconds as i64, SECONDS_DENOMINATOR),
    ]
}

/// Combine a DMS triple into decimal degrees.
///
/// Returns `None` when the triple is incomplete or has a zero denominator.
fn from_dms(triple: &[(i64, i64)]) -> Option<f64> {
    if triple.len() < 3 || triple.iter().take(3).any(|(_, den)| *den == 0) {
        return None;
    }
    let part = |i: usize| triple[i].0 as f64 / triple[i].1 as f64;
    Some(part(0) + part(1) / 60.0 + part(2) / 3600.0)
}

fn invalid(tag: impl Into<u16>, message: impl Into<String>) -> TiffError {
    TiffError::InvalidTagValue {
        tag: tag.into(),
        message: message.into(),
    }
}

impl ExifDocument {
    // -------------------------------------------------------------------------
    // Copyright
    // -------------------------------------------------------------------------

    /// Photographer and editor copyright notices.
    ///
    /// A missing editor notice is returned as an empty string.
    pub fn copyright(&self) -> Option<(String, String)> {
        let bytes = match self.get(IfdKind::Ifd0, ExifTag::Copyright)? {
            Value::Ascii(bytes) => bytes,
            _ => return None,
        };

        let mut parts = bytes
            .split(|b| *b == 0)
            .map(|part| String::from_utf8_lossy(part).trim().to_string());
        let photographer = parts.next().unwrap_or_default();
        let editor = parts.next().unwrap_or_default();
        Some((photographer, editor))
    }

    /// Write both copyright notices. `None` or a blank editor omits it.
    pub fn set_copyright(&mut self, photographer: &str, editor: Option<&str>) {
        let photographer = match photographer.trim() {
            "" => " ",
            trimmed => trimmed,
        };

        let mut bytes = Vec::new();
        bytes.extend_from_slice(photographer.as_bytes());
        bytes.push(0);
        if let Some(editor) = editor.map(str::trim).filter(|e| !e.is_empty()) {
            bytes.extend_from_slice(editor.as_bytes());
            bytes.push(0);
        }

        self.set_value(IfdKind::Ifd0, ExifTag::Copyright, Value::Ascii(bytes));
    }

    pub fn photographer_copyright(&self) -> Option<String> {
        self.copyright().map(|(photographer, _)| photographer)
    }

    pub fn editor_copyright(&self) -> Option<String> {
        self.copyright().map(|(_, editor)| editor)
    }

    /// Replace the photographer notice, keeping the editor notice.
    pub fn set_photographer_copyright(&mut self, photographer: &str) {
        let editor = self.editor_copyright();
        self.set_copyright(photographer, editor.as_deref());
    }

    /// Replace the editor notice, keeping the photographer notice.
    pub fn set_editor_copyright(&mut self, editor: Option<&str>) {
        let photographer = self.photographer_copyright().unwrap_or_default();
        self.set_copyright(&photographer, editor);
    }

    // -------------------------------------------------------------------------
    // Plain text fields
    // -------------------------------------------------------------------------

    pub fn artist(&self) -> Option<String> {
        self.get_ascii_string(IfdKind::Ifd0, ExifTag::Artist)
    }

    pub fn set_artist(&mut self, artist: &str) {
        self.set_ascii_string(IfdKind::Ifd0, ExifTag::Artist, artist);
    }

    pub fn software(&self) -> Option<String> {
        self.get_ascii_string(IfdKind::Ifd0, ExifTag::Software)
    }

    pub fn set_software(&mut self, software: &str) {
        self.set_ascii_string(IfdKind::Ifd0, ExifTag::Software, software);
    }

    pub fn image_description(&self) -> Option<String> {
        self.get_ascii_string(IfdKind::Ifd0, ExifTag::ImageDescription)
    }

    pub fn set_image_description(&mut self, description: &str) {
        self.set_ascii_string(IfdKind::Ifd0, ExifTag::ImageDescription, description);
    }

    /// Text of the Exif UserComment.
    ///
    /// The leading 8-byte character code is dropped and the rest decoded as
    /// UTF-8. Trailing NULs and spaces are removed.
    pub fn user_comment(&self) -> Option<String> {
        let bytes = match self.get(IfdKind::Exif, ExifTag::UserComment)? {
            Value::Undefined(bytes) => bytes.as_slice(),
            _ => return None,
        };

        let text = bytes.get(USER_COMMENT_ASCII.len()..).unwrap_or(bytes);
        let text = String::from_utf8_lossy(text);
        Some(text.trim_end_matches(['\0', ' ']).to_string())
    }

    /// Write the Exif UserComment, tagged ASCII when the text allows it.
    pub fn set_user_comment(&mut self, comment: &str) {
        let code = if comment.is_ascii() {
            USER_COMMENT_ASCII
        } else {
            USER_COMMENT_UNDEFINED
        };
        let mut bytes = Vec::with_capacity(8 + comment.len());
        bytes.extend_from_slice(&code);
        bytes.extend_from_slice(comment.as_bytes());
        self.set_value(IfdKind::Exif, ExifTag::UserComment, Value::Undefined(bytes));
    }

    /// Raw MakerNote bytes.
    pub fn maker_note(&self) -> Option<&[u8]> {
        self.get_bytes(IfdKind::Exif, ExifTag::MakerNote)
    }

    pub fn set_maker_note(&mut self, note: &[u8]) {
        self.set_bytes(IfdKind::Exif, ExifTag::MakerNote, note);
    }

    // -------------------------------------------------------------------------
    // GPS position
    // -------------------------------------------------------------------------

    /// Write latitude, longitude and altitude into the GPS directory.
    ///
    /// Latitude and longitude are in decimal degrees (negative for south and
    /// west), altitude in metres (negative below sea level). Seconds are kept
    /// to a thousandth, altitude to a whole metre.
    ///
    /// # Errors
    /// `InvalidTagValue` if a coordinate is not finite or out of range.
    pub fn set_gps_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<(), TiffError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid(GpsTag::Latitude, format!("latitude {} out of range", latitude)));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid(GpsTag::Longitude, format!("longitude {} out of range", longitude)));
        }
        if !altitude.is_finite() || altitude.abs() > u32::MAX as f64 {
            return Err(invalid(GpsTag::Altitude, format!("altitude {} out of range", altitude)));
        }

        let lat_ref = if latitude >= 0.0 { "N" } else { "S" };
        let lon_ref = if longitude >= 0.0 { "E" } else { "W" };
        let alt_ref = if altitude >= 0.0 { 0 } else { 1 };

        self.set_value(IfdKind::Gps, GpsTag::VersionId, Value::UByte(GPS_VERSION.to_vec()));
        self.set_ascii_string(IfdKind::Gps, GpsTag::LatitudeRef, lat_ref);
        self.set_rationals(IfdKind::Gps, GpsTag::Latitude, FieldType::URational, &to_dms(latitude))?;
        self.set_ascii_string(IfdKind::Gps, GpsTag::LongitudeRef, lon_ref);
        self.set_rationals(
            IfdKind::Gps,
            GpsTag::Longitude,
            FieldType::URational,
            &to_dms(longitude),
        )?;
        self.set_value(IfdKind::Gps, GpsTag::AltitudeRef, Value::UByte(vec![alt_ref]));
        self.set_rational(
            IfdKind::Gps,
            GpsTag::Altitude,
            FieldType::URational,
            (altitude.abs() as i64, 1),
        )?;
        Ok(())
    }

    /// Read the position back in decimal degrees and metres.
    ///
    /// Returns `None` unless both latitude and longitude are present with
    /// non-zero denominators. A missing or malformed altitude only clears
    /// the altitude.
    pub fn gps_location(&self) -> Option<GpsLocation> {
        let signed = |value: f64, reference: Option<String>, negative: &str| match reference {
            Some(r) if r.eq_ignore_ascii_case(negative) => -value,
            _ => value,
        };

        let latitude = from_dms(&self.get_rationals(IfdKind::Gps, GpsTag::Latitude)?)?;
        let longitude = from_dms(&self.get_rationals(IfdKind::Gps, GpsTag::Longitude)?)?;
        let latitude = signed(
            latitude,
            self.get_ascii_string(IfdKind::Gps, GpsTag::LatitudeRef),
            "S",
        );
        let longitude = signed(
            longitude,
            self.get_ascii_string(IfdKind::Gps, GpsTag::LongitudeRef),
            "W",
        );

        let altitude = self
            .get_rational(IfdKind::Gps, GpsTag::Altitude)
            .filter(|(_, den)| *den != 0)
            .map(|(num, den)| num as f64 / den as f64)
            .map(|metres| match self.get_number(IfdKind::Gps, GpsTag::AltitudeRef) {
                Some(1) => -metres,
                _ => metres,
            });

        Some(GpsLocation {
            latitude,
            longitude,
            altitude,
        })
    }

    // -------------------------------------------------------------------------
    // Image direction
    // -------------------------------------------------------------------------

    /// Write the direction the camera was pointing, in degrees from
    /// magnetic north.
    ///
    /// # Errors
    /// `InvalidTagValue` unless `degrees` is in `[0, 360)`.
    pub fn set_direction(&mut self, degrees: f64) -> Result<(), TiffError> {
        if !degrees.is_finite() || !(0.0..360.0).contains(&degrees) {
            return Err(invalid(
                GpsTag::ImgDirection,
                format!("direction {} outside [0, 360)", degrees),
            ));
        }

        // Values just below 360 round up to a full turn, which is north again
        let full_turn = 360 * DIRECTION_DENOMINATOR;
        let hundredths = (degrees * DIRECTION_DENOMINATOR as f64).round() as i64 % full_turn;
        self.set_ascii_string(IfdKind::Gps, GpsTag::ImgDirectionRef, MAGNETIC_NORTH);
        self.set_rational(
            IfdKind::Gps,
            GpsTag::ImgDirection,
            FieldType::URational,
            (hundredths, DIRECTION_DENOMINATOR),
        )
    }

    /// Direction in degrees and its reference (`"M"` magnetic, `"T"` true).
    pub fn direction(&self) -> Option<(f64, String)> {
        let (num, den) = self.get_rational(IfdKind::Gps, GpsTag::ImgDirection)?;
        if den == 0 {
            return None;
        }
        let reference = self
            .get_ascii_string(IfdKind::Gps, GpsTag::ImgDirectionRef)
            .unwrap_or_default();
        Some((num as f64 / den as f64, reference))
    }
}

// =============================================================================
// Tests
// =============================================================================
