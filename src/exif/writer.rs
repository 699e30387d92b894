//! Splicing a new EXIF payload into a JPEG stream.
//!
//! The output is the source stream with its EXIF segment replaced:
//!
//! ```text
//! source[0 .. marker)  new APP1 header  new payload  source[segment end ..]
//! ```
//!
//! Everything outside the segment, including the compressed image data, is
//! copied byte for byte.
//!
//! # Atomic output
//!
//! Files are written to a randomly named sibling of the destination and renamed
//! into place only after every byte has been written and synced, so a failed
//! save never leaves a partial file at the destination.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ExifError, IoError};
use crate::format::jpeg::{put_app1_header, ExifSegment, APP1_HEADER_LEN};
use crate::io::RangeReader;

/// Bytes copied per read while streaming the tail of the source
const TAIL_CHUNK: usize = 64 * 1024;

// =============================================================================
// Assembler
// =============================================================================

/// Write `source` to `sink` with the EXIF segment replaced by `payload`.
///
/// `sink_name` identifies the sink in error messages. Returns the number of
/// bytes written.
pub fn assemble<R, W>(
    source: &R,
    segment: &ExifSegment,
    payload: &[u8],
    sink: &mut W,
    sink_name: &str,
) -> Result<u64, ExifError>
where
    R: RangeReader + ?Sized,
    W: Write + ?Sized,
{
    let write_err = |e| IoError::write(sink_name, e);

    let mut header = BytesMut::with_capacity(APP1_HEADER_LEN);
    put_app1_header(&mut header, payload.len())?;

    // Prefix starts with SOI and keeps any segments before APP1
    let prefix = source.read_exact_at(0, segment.marker_offset as usize)?;
    sink.write_all(&prefix).map_err(write_err)?;
    sink.write_all(&header).map_err(write_err)?;
    sink.write_all(payload).map_err(write_err)?;
    let mut written = (prefix.len() + header.len() + payload.len()) as u64;

    let size = source.size();
    let mut pos = segment.end();
    while pos < size {
        let len = TAIL_CHUNK.min((size - pos) as usize);
        let chunk = source.read_exact_at(pos, len)?;
        sink.write_all(&chunk).map_err(write_err)?;
        pos += len as u64;
        written += len as u64;
    }

    debug!(
        source = source.identifier(),
        sink = sink_name,
        payload = payload.len(),
        tail = size.saturating_sub(segment.end()),
        written,
        "Assembled JPEG"
    );

    Ok(written)
}

// =============================================================================
// AtomicOutput
// =============================================================================

/// Prefix of the temporary files created next to a destination
const TEMP_PREFIX: &str = ".exif-splice";

/// A file that only appears at its destination once finalized.
///
/// Dropping an unfinalized output removes the temporary file.
pub struct AtomicOutput {
    writer: BufWriter<NamedTempFile>,
    target_path: PathBuf,
}

impl AtomicOutput {
    /// Create a uniquely named temporary file in the directory of `target`.
    ///
    /// The temporary file lives in the same directory so the final rename
    /// stays on one filesystem.
    pub fn create(target: impl AsRef<Path>) -> Result<Self, IoError> {
        let target_path = target.as_ref().to_path_buf();
        let parent = match target_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(parent)
            .map_err(|e| IoError::open(parent.display(), e))?;
        debug!(
            temp = %temp.path().display(),
            target = %target_path.display(),
            "Created temporary output"
        );

        Ok(Self {
            writer: BufWriter::new(temp),
            target_path,
        })
    }

    /// Flush, sync and move the file to its destination.
    pub fn finalize(self) -> Result<(), IoError> {
        let target = self.target_path.display().to_string();
        let temp = self
            .writer
            .into_inner()
            .map_err(|e| IoError::write(&target, e.into_error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| IoError::write(&target, e))?;

        temp.persist(&self.target_path)
            .map_err(|e| IoError::write(&target, e.error))?;
        debug!(path = %target, "Finalized output");
        Ok(())
    }
}

impl Write for AtomicOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Whether `a` and `b` name the same existing file.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
