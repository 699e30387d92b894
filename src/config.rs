//! Command-line configuration for exif-splice.
//!
//! This module provides the configuration for the two subcommands:
//! - `show`: print the EXIF directories of a JPEG file
//! - `edit`: apply metadata edits and write the result to a new file
//!
//! Options can also be set through environment variables with the
//! `EXIF_SPLICE_` prefix:
//!
//! - `EXIF_SPLICE_SCAN_WINDOW` - Segment scan window in bytes (default: 4096)
//! - `EXIF_SPLICE_FORMAT` - Output format of `show` (default: text)
//! - `EXIF_SPLICE_PHOTOGRAPHER` - Photographer copyright notice for `edit`
//! - `EXIF_SPLICE_EDITOR` - Editor copyright notice for `edit`
//! - `EXIF_SPLICE_ARTIST` - Artist for `edit`
//! - `EXIF_SPLICE_SOFTWARE` - Software for `edit`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::exif::OpenOptions;
use crate::format::DEFAULT_SCAN_WINDOW;

// =============================================================================
// Limits
// =============================================================================

/// Smallest accepted scan window in bytes.
pub const MIN_SCAN_WINDOW: usize = 64;

/// Largest accepted scan window in bytes (16 MiB).
pub const MAX_SCAN_WINDOW: usize = 16 * 1024 * 1024;

fn validate_scan_window(scan_window: usize) -> Result<(), String> {
    if !(MIN_SCAN_WINDOW..=MAX_SCAN_WINDOW).contains(&scan_window) {
        return Err(format!(
            "scan_window must be between {} and {} bytes",
            MIN_SCAN_WINDOW, MAX_SCAN_WINDOW
        ));
    }
    Ok(())
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// exif-splice - Read and edit EXIF metadata in JPEG files.
///
/// Edits rewrite only the EXIF segment; the compressed image data is copied
/// byte for byte into a new file.
#[derive(Parser, Debug, Clone)]
#[command(name = "exif-splice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the EXIF directories of a JPEG file.
    Show(ShowConfig),

    /// Edit EXIF metadata and write the result to a new file.
    Edit(EditConfig),
}

/// Output format of the `show` command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON document
    Json,
}

// =============================================================================
// Show Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ShowConfig {
    /// JPEG file to inspect.
    pub file: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "EXIF_SPLICE_FORMAT")]
    pub format: OutputFormat,

    /// Window size in bytes used when scanning for the EXIF segment.
    #[arg(long, default_value_t = DEFAULT_SCAN_WINDOW, env = "EXIF_SPLICE_SCAN_WINDOW")]
    pub scan_window: usize,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ShowConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_scan_window(self.scan_window)
    }

    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            scan_window: self.scan_window,
        }
    }
}

// =============================================================================
// Edit Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct EditConfig {
    /// JPEG file to read.
    pub input: PathBuf,

    /// Where to write the edited JPEG. Must differ from the input.
    pub output: PathBuf,

    // =========================================================================
    // GPS
    // =========================================================================
    /// Latitude in decimal degrees, negative south of the equator.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees, negative west of Greenwich.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Altitude in metres, negative below sea level.
    #[arg(long, allow_negative_numbers = true)]
    pub alt: Option<f64>,

    /// Image direction in degrees from magnetic north.
    #[arg(long)]
    pub direction: Option<f64>,

    // =========================================================================
    // Text fields
    // =========================================================================
    /// Photographer copyright notice.
    #[arg(long, env = "EXIF_SPLICE_PHOTOGRAPHER")]
    pub photographer: Option<String>,

    /// Editor copyright notice.
    #[arg(long, env = "EXIF_SPLICE_EDITOR")]
    pub editor: Option<String>,

    /// Artist (author of the image).
    #[arg(long, env = "EXIF_SPLICE_ARTIST")]
    pub artist: Option<String>,

    /// Software used to process the image.
    #[arg(long, env = "EXIF_SPLICE_SOFTWARE")]
    pub software: Option<String>,

    /// Image description.
    #[arg(long)]
    pub description: Option<String>,

    /// User comment.
    #[arg(long)]
    pub comment: Option<String>,

    // =========================================================================
    // Scanning and logging
    // =========================================================================
    /// Window size in bytes used when scanning for the EXIF segment.
    #[arg(long, default_value_t = DEFAULT_SCAN_WINDOW, env = "EXIF_SPLICE_SCAN_WINDOW")]
    pub scan_window: usize,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl EditConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_scan_window(self.scan_window)?;

        if self.input == self.output {
            return Err("output must differ from input; files are never edited in place".to_string());
        }

        match (self.lat, self.lon, self.alt) {
            (Some(lat), Some(lon), Some(alt)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err("lat must be between -90 and 90".to_string());
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err("lon must be between -180 and 180".to_string());
                }
                if !alt.is_finite() {
                    return Err("alt must be a finite number".to_string());
                }
            }
            (None, None, None) => {}
            _ => return Err("lat, lon and alt must be given together".to_string()),
        }

        if let Some(direction) = self.direction {
            if !(0.0..360.0).contains(&direction) {
                return Err("direction must be at least 0 and less than 360".to_string());
            }
        }

        if !self.has_edits() {
            return Err("no edits requested".to_string());
        }

        Ok(())
    }

    /// Whether any edit option is set.
    pub fn has_edits(&self) -> bool {
        self.lat.is_some()
            || self.direction.is_some()
            || self.photographer.is_some()
            || self.editor.is_some()
            || self.artist.is_some()
            || self.software.is_some()
            || self.description.is_some()
            || self.comment.is_some()
    }

    /// GPS position as `(lat, lon, alt)` when all three are given.
    pub fn location(&self) -> Option<(f64, f64, f64)> {
        Some((self.lat?, self.lon?, self.alt?))
    }

    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            scan_window: self.scan_window,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
