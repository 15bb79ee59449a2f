//! `Range` header parsing for tile archive requests
//!
//! Only a single `bytes=<start>-<end>` window is understood. Open-ended
//! requests are capped at [`READ_AHEAD_CAP`] bytes instead of running to the
//! end of the archive.

use thiserror::Error;

/// Largest window served for an open-ended `bytes=<start>-` request
pub const READ_AHEAD_CAP: u64 = 1024 * 1024;

/// Inclusive byte window into a file, `start <= end < size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the window
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` header for a file of `size` bytes
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

/// Reasons a `Range` header is rejected
///
/// Every variant is answered with `416 Range Not Satisfiable`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Unit other than `bytes`
    #[error("Only bytes ranges are supported")]
    UnsupportedUnit(String),

    /// Header does not follow `bytes=<start>-<end>`
    #[error("Invalid Range header: {0}")]
    Malformed(&'static str),

    /// Well-formed window that does not fit the file
    #[error("Range {start}-{end} not satisfiable for file of {size} bytes")]
    Unsatisfiable { start: u64, end: u64, size: u64 },
}

/// Parse an optional `Range` header against a file of `size` bytes
///
/// # Returns
/// * `Ok(None)` - no header, serve the whole file
/// * `Ok(Some(range))` - window clamped to the file
/// * `Err(RangeError)` - the request must be refused
pub fn parse_range(header: Option<&str>, size: u64) -> Result<Option<ByteRange>, RangeError> {
    let Some(header) = header else {
        return Ok(None);
    };

    let (unit, spec) = header
        .split_once('=')
        .ok_or(RangeError::Malformed("expected <unit>=<start>-<end>"))?;

    let unit = unit.trim();
    if !unit.eq_ignore_ascii_case("bytes") {
        return Err(RangeError::UnsupportedUnit(unit.to_string()));
    }

    let spec = spec.trim();
    if spec.contains(',') {
        return Err(RangeError::Malformed("multiple ranges are not supported"));
    }

    let (start_str, end_str) = spec
        .split_once('-')
        .ok_or(RangeError::Malformed("expected <start>-<end>"))?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        return Err(if end_str.is_empty() {
            RangeError::Malformed("empty range")
        } else {
            RangeError::Malformed("suffix ranges are not supported")
        });
    }

    let start = parse_offset(start_str)?;
    let end = if end_str.is_empty() {
        start
            .saturating_add(READ_AHEAD_CAP - 1)
            .min(size.saturating_sub(1))
    } else {
        parse_offset(end_str)?
    };

    if end < start || start >= size {
        return Err(RangeError::Unsatisfiable { start, end, size });
    }

    Ok(Some(ByteRange {
        start,
        end: end.min(size - 1),
    }))
}

/// Offsets are plain decimal digits; signs and overflow are malformed
fn parse_offset(value: &str) -> Result<u64, RangeError> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed("range offsets must be decimal integers"));
    }
    value
        .parse()
        .map_err(|_| RangeError::Malformed("range offset out of bounds"))
}
