//! exif-splice - Read and edit EXIF metadata in JPEG files.
//!
//! This binary dispatches the `show` and `edit` subcommands.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exif_splice::{
    config::{Cli, Command, EditConfig, OutputFormat, ShowConfig},
    ExifDocument, ExifError, IfdKind,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Show(config) => run_show(config),
        Command::Edit(config) => run_edit(config),
    }
}

// =============================================================================
// Show Command
// =============================================================================

fn run_show(config: ShowConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let doc = match ExifDocument::open_with(&config.file, config.open_options()) {
        Ok(doc) => doc,
        Err(e) => {
            error!("Failed to read {}: {}", config.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match config.format {
        OutputFormat::Text => print_text(&doc),
        OutputFormat::Json => {
            let json = show_json(&doc);
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    error!("Failed to encode JSON: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_text(doc: &ExifDocument) {
    println!("Byte order: {:?}", doc.byte_order());
    println!(
        "EXIF segment: offset {}, {} payload bytes",
        doc.segment().marker_offset,
        doc.segment().payload_len()
    );

    for (kind, dir) in doc.directories().iter() {
        if dir.is_empty() {
            continue;
        }
        println!();
        println!("[{}] {} entries", kind, dir.len());
        for (tag, value) in dir {
            let name = kind.tag_name(*tag).unwrap_or("Unknown");
            println!(
                "  0x{:04X} {:<28} {:<9} {}",
                tag,
                name,
                value.field_type().name(),
                value
            );
        }
    }

    if let Some(thumbnail) = doc.thumbnail() {
        println!();
        println!("Thumbnail: {} bytes", thumbnail.len());
    }

    let skipped = doc.skipped_entries();
    if !skipped.is_empty() {
        println!();
        println!("Skipped {} entries with unknown types:", skipped.len());
        for entry in skipped {
            println!(
                "  [{}] 0x{:04X} type {} x{}",
                entry.ifd, entry.tag, entry.field_type, entry.count
            );
        }
    }
}

fn show_json(doc: &ExifDocument) -> serde_json::Value {
    let mut directories = serde_json::Map::new();
    for (kind, dir) in doc.directories().iter() {
        let entries: Vec<_> = dir
            .iter()
            .map(|(tag, value)| {
                serde_json::json!({
                    "tag": tag,
                    "name": kind.tag_name(*tag),
                    "value": value,
                    "text": value.to_string(),
                })
            })
            .collect();
        directories.insert(kind.name().to_string(), entries.into());
    }

    serde_json::json!({
        "byte_order": doc.byte_order(),
        "segment": doc.segment(),
        "directories": directories,
        "thumbnail_bytes": doc.thumbnail().map(|t| t.len()),
        "gps": doc.gps_location(),
        "skipped": doc.skipped_entries(),
    })
}

// =============================================================================
// Edit Command
// =============================================================================

fn run_edit(config: EditConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match apply_edits(&config) {
        Ok(doc) => {
            info!(
                "Wrote {} ({} entries in IFD0, {} in GPS)",
                config.output.display(),
                doc.directory(IfdKind::Ifd0).len(),
                doc.directory(IfdKind::Gps).len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Edit failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn apply_edits(config: &EditConfig) -> Result<ExifDocument, ExifError> {
    let mut doc = ExifDocument::open_with(&config.input, config.open_options())?;

    if let Some((lat, lon, alt)) = config.location() {
        doc.set_gps_location(lat, lon, alt)?;
    }
    if let Some(direction) = config.direction {
        doc.set_direction(direction)?;
    }

    match (&config.photographer, &config.editor) {
        (Some(photographer), Some(editor)) => doc.set_copyright(photographer, Some(editor.as_str())),
        (Some(photographer), None) => doc.set_photographer_copyright(photographer),
        (None, Some(editor)) => doc.set_editor_copyright(Some(editor.as_str())),
        (None, None) => {}
    }

    if let Some(ref artist) = config.artist {
        doc.set_artist(artist);
    }
    if let Some(ref software) = config.software {
        doc.set_software(software);
    }
    if let Some(ref description) = config.description {
        doc.set_image_description(description);
    }
    if let Some(ref comment) = config.comment {
        doc.set_user_comment(comment);
    }

    doc.save(&config.output)?;
    Ok(doc)
}

// =============================================================================
// Logging
// =============================================================================

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "exif_splice=debug"
    } else {
        "exif_splice=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
