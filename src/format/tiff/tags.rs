//! EXIF field type and tag definitions.
//!
//! This module defines the vocabulary for EXIF parsing, including:
//! - Field types that determine how values are encoded
//! - Tag IDs that identify metadata fields in each directory
//!
//! Tag ids are only unique within a directory family: IFD0, IFD1 and the Exif
//! sub-IFD share one numbering space, while the GPS and Interoperability
//! directories each have their own (GPS tag 1 and Interop tag 1 are unrelated).

use serde::Serialize;

use crate::error::TiffError;

// =============================================================================
// Field Types
// =============================================================================

/// EXIF 2.2 field types that determine how values are encoded.
///
/// Each field type has a fixed component width in bytes, which is critical for:
/// - Determining if a value fits inline in an IFD entry
/// - Reading arrays of values correctly
///
/// Rationals are one component of 8 bytes made of two 4-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer
    UByte = 1,

    /// 8-bit ASCII character, NUL-terminated strings
    Ascii = 2,

    /// Unsigned 16-bit integer
    UShort = 3,

    /// Unsigned 32-bit integer
    ULong = 4,

    /// Two unsigned 32-bit integers: numerator, denominator
    URational = 5,

    /// Signed 8-bit integer
    SByte = 6,

    /// Opaque byte data
    Undefined = 7,

    /// Signed 16-bit integer
    SShort = 8,

    /// Signed 32-bit integer
    SLong = 9,

    /// Two signed 32-bit integers: numerator, denominator
    SRational = 10,
}

impl FieldType {
    /// Maximum bytes that can be stored inline in an IFD entry.
    pub const INLINE_THRESHOLD: usize = 4;

    /// Size of a single component of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::UByte => 1,
            FieldType::Ascii => 1,
            FieldType::UShort => 2,
            FieldType::ULong => 4,
            FieldType::URational => 8,
            FieldType::SByte => 1,
            FieldType::Undefined => 1,
            FieldType::SShort => 2,
            FieldType::SLong => 4,
            FieldType::SRational => 8,
        }
    }

    /// Create a FieldType from its numeric value.
    ///
    /// Returns `None` for unsupported or unknown type values.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::UByte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::UShort),
            4 => Some(FieldType::ULong),
            5 => Some(FieldType::URational),
            6 => Some(FieldType::SByte),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::SShort),
            9 => Some(FieldType::SLong),
            10 => Some(FieldType::SRational),
            _ => None,
        }
    }

    /// Get the numeric type id.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Total encoded size for `count` components, widened to `u64`.
    #[inline]
    pub fn total_bytes(self, count: u32) -> u64 {
        self.size_in_bytes() as u64 * count as u64
    }

    /// Check if a value with this type and count fits inline in an entry.
    #[inline]
    pub fn fits_inline(self, count: u32) -> bool {
        self.total_bytes(count) <= Self::INLINE_THRESHOLD as u64
    }

    /// Human-readable type name.
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::UByte => "BYTE",
            FieldType::Ascii => "ASCII",
            FieldType::UShort => "SHORT",
            FieldType::ULong => "LONG",
            FieldType::URational => "RATIONAL",
            FieldType::SByte => "SBYTE",
            FieldType::Undefined => "UNDEFINED",
            FieldType::SShort => "SSHORT",
            FieldType::SLong => "SLONG",
            FieldType::SRational => "SRATIONAL",
        }
    }
}

impl TryFrom<u16> for FieldType {
    type Error = TiffError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        FieldType::from_u16(value).ok_or(TiffError::UnknownFieldType(value))
    }
}

// =============================================================================
// Tags
// =============================================================================

/// Declares a tag enum together with its numeric conversions and display names.
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr => $label:expr, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )*
        }

        impl $name {
            /// Create a tag from its numeric value.
            ///
            /// Returns `None` for unrecognized tags. Unknown tags are not an
            /// error; they are decoded and preserved like any other entry.
            pub fn from_u16(value: u16) -> Option<Self> {
                match value {
                    $( $value => Some($name::$variant), )*
                    _ => None,
                }
            }

            /// Get the numeric tag ID.
            #[inline]
            pub const fn as_u16(self) -> u16 {
                self as u16
            }

            /// Tag name as written in the EXIF 2.2 specification.
            pub const fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )*
                }
            }
        }

        impl From<$name> for u16 {
            fn from(tag: $name) -> u16 {
                tag as u16
            }
        }
    };
}

tag_enum! {
    /// Tags of IFD0, IFD1 and the Exif sub-IFD.
    pub enum ExifTag {
        // ---------------------------------------------------------------------
        // Image structure (IFD0 / IFD1)
        // ---------------------------------------------------------------------
        ImageWidth = 0x0100 => "ImageWidth",
        ImageHeight = 0x0101 => "ImageLength",
        BitsPerSample = 0x0102 => "BitsPerSample",
        Compression = 0x0103 => "Compression",
        PhotometricInterpretation = 0x0106 => "PhotometricInterpretation",
        ImageDescription = 0x010E => "ImageDescription",
        Make = 0x010F => "Make",
        Model = 0x0110 => "Model",
        StripOffsets = 0x0111 => "StripOffsets",
        Orientation = 0x0112 => "Orientation",
        SamplesPerPixel = 0x0115 => "SamplesPerPixel",
        RowsPerStrip = 0x0116 => "RowsPerStrip",
        StripByteCounts = 0x0117 => "StripByteCounts",
        XResolution = 0x011A => "XResolution",
        YResolution = 0x011B => "YResolution",
        PlanarConfiguration = 0x011C => "PlanarConfiguration",
        ResolutionUnit = 0x0128 => "ResolutionUnit",
        TransferFunction = 0x012D => "TransferFunction",
        Software = 0x0131 => "Software",
        DateTime = 0x0132 => "DateTime",
        Artist = 0x013B => "Artist",
        WhitePoint = 0x013E => "WhitePoint",
        PrimaryChromaticities = 0x013F => "PrimaryChromaticities",
        /// Offset of the thumbnail JPEG stream, relative to the TIFF header
        JpegInterchangeFormat = 0x0201 => "JPEGInterchangeFormat",
        /// Length in bytes of the thumbnail JPEG stream
        JpegInterchangeFormatLength = 0x0202 => "JPEGInterchangeFormatLength",
        YCbCrCoefficients = 0x0211 => "YCbCrCoefficients",
        YCbCrSubSampling = 0x0212 => "YCbCrSubSampling",
        YCbCrPositioning = 0x0213 => "YCbCrPositioning",
        ReferenceBlackWhite = 0x0214 => "ReferenceBlackWhite",
        /// Photographer and editor copyright, NUL-separated
        Copyright = 0x8298 => "Copyright",

        // ---------------------------------------------------------------------
        // Directory pointers
        // ---------------------------------------------------------------------
        ExifPointer = 0x8769 => "ExifIFDPointer",
        GpsPointer = 0x8825 => "GPSInfoIFDPointer",
        InteropPointer = 0xA005 => "InteroperabilityIFDPointer",

        // ---------------------------------------------------------------------
        // Exif sub-IFD
        // ---------------------------------------------------------------------
        ExposureTime = 0x829A => "ExposureTime",
        FNumber = 0x829D => "FNumber",
        ExposureProgram = 0x8822 => "ExposureProgram",
        SpectralSensitivity = 0x8824 => "SpectralSensitivity",
        IsoSpeedRatings = 0x8827 => "ISOSpeedRatings",
        Oecf = 0x8828 => "OECF",
        ExifVersion = 0x9000 => "ExifVersion",
        DateTimeOriginal = 0x9003 => "DateTimeOriginal",
        DateTimeDigitized = 0x9004 => "DateTimeDigitized",
        ComponentsConfiguration = 0x9101 => "ComponentsConfiguration",
        CompressedBitsPerPixel = 0x9102 => "CompressedBitsPerPixel",
        ShutterSpeedValue = 0x9201 => "ShutterSpeedValue",
        ApertureValue = 0x9202 => "ApertureValue",
        BrightnessValue = 0x9203 => "BrightnessValue",
        ExposureBiasValue = 0x9204 => "ExposureBiasValue",
        MaxApertureValue = 0x9205 => "MaxApertureValue",
        SubjectDistance = 0x9206 => "SubjectDistance",
        MeteringMode = 0x9207 => "MeteringMode",
        LightSource = 0x9208 => "LightSource",
        Flash = 0x9209 => "Flash",
        FocalLength = 0x920A => "FocalLength",
        SubjectArea = 0x9214 => "SubjectArea",
        MakerNote = 0x927C => "MakerNote",
        UserComment = 0x9286 => "UserComment",
        SubSecTime = 0x9290 => "SubSecTime",
        SubSecTimeOriginal = 0x9291 => "SubSecTimeOriginal",
        SubSecTimeDigitized = 0x9292 => "SubSecTimeDigitized",
        FlashpixVersion = 0xA000 => "FlashpixVersion",
        ColorSpace = 0xA001 => "ColorSpace",
        PixelXDimension = 0xA002 => "PixelXDimension",
        PixelYDimension = 0xA003 => "PixelYDimension",
        RelatedSoundFile = 0xA004 => "RelatedSoundFile",
        FlashEnergy = 0xA20B => "FlashEnergy",
        SpatialFrequencyResponse = 0xA20C => "SpatialFrequencyResponse",
        FocalPlaneXResolution = 0xA20E => "FocalPlaneXResolution",
        FocalPlaneYResolution = 0xA20F => "FocalPlaneYResolution",
        FocalPlaneResolutionUnit = 0xA210 => "FocalPlaneResolutionUnit",
        SubjectLocation = 0xA214 => "SubjectLocation",
        ExposureIndex = 0xA215 => "ExposureIndex",
        SensingMethod = 0xA217 => "SensingMethod",
        FileSource = 0xA300 => "FileSource",
        SceneType = 0xA301 => "SceneType",
        CfaPattern = 0xA302 => "CFAPattern",
        CustomRendered = 0xA401 => "CustomRendered",
        ExposureMode = 0xA402 => "ExposureMode",
        WhiteBalance = 0xA403 => "WhiteBalance",
        DigitalZoomRatio = 0xA404 => "DigitalZoomRatio",
        FocalLengthIn35mmFilm = 0xA405 => "FocalLengthIn35mmFilm",
        SceneCaptureType = 0xA406 => "SceneCaptureType",
        GainControl = 0xA407 => "GainControl",
        Contrast = 0xA408 => "Contrast",
        Saturation = 0xA409 => "Saturation",
        Sharpness = 0xA40A => "Sharpness",
        DeviceSettingDescription = 0xA40B => "DeviceSettingDescription",
        SubjectDistanceRange = 0xA40C => "SubjectDistanceRange",
        ImageUniqueId = 0xA420 => "ImageUniqueID",
    }
}

tag_enum! {
    /// Tags of the GPS sub-IFD.
    pub enum GpsTag {
        VersionId = 0x00 => "GPSVersionID",
        LatitudeRef = 0x01 => "GPSLatitudeRef",
        Latitude = 0x02 => "GPSLatitude",
        LongitudeRef = 0x03 => "GPSLongitudeRef",
        Longitude = 0x04 => "GPSLongitude",
        AltitudeRef = 0x05 => "GPSAltitudeRef",
        Altitude = 0x06 => "GPSAltitude",
        TimeStamp = 0x07 => "GPSTimeStamp",
        Satellites = 0x08 => "GPSSatellites",
        Status = 0x09 => "GPSStatus",
        MeasureMode = 0x0A => "GPSMeasureMode",
        Dop = 0x0B => "GPSDOP",
        SpeedRef = 0x0C => "GPSSpeedRef",
        Speed = 0x0D => "GPSSpeed",
        TrackRef = 0x0E => "GPSTrackRef",
        Track = 0x0F => "GPSTrack",
        ImgDirectionRef = 0x10 => "GPSImgDirectionRef",
        ImgDirection = 0x11 => "GPSImgDirection",
        MapDatum = 0x12 => "GPSMapDatum",
        DestLatitudeRef = 0x13 => "GPSDestLatitudeRef",
        DestLatitude = 0x14 => "GPSDestLatitude",
        DestLongitudeRef = 0x15 => "GPSDestLongitudeRef",
        DestLongitude = 0x16 => "GPSDestLongitude",
        DestBearingRef = 0x17 => "GPSDestBearingRef",
        DestBearing = 0x18 => "GPSDestBearing",
        DestDistanceRef = 0x19 => "GPSDestDistanceRef",
        DestDistance = 0x1A => "GPSDestDistance",
        ProcessingMethod = 0x1B => "GPSProcessingMethod",
        AreaInformation = 0x1C => "GPSAreaInformation",
        DateStamp = 0x1D => "GPSDateStamp",
        Differential = 0x1E => "GPSDifferential",
    }
}

tag_enum! {
    /// Tags of the Interoperability sub-IFD.
    pub enum InteropTag {
        InteroperabilityIndex = 0x01 => "InteroperabilityIndex",
        InteroperabilityVersion = 0x02 => "InteroperabilityVersion",
    }
}

// =============================================================================
// Tests
// =============================================================================
