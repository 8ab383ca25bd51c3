//! Capture metadata extraction from embedded EXIF blocks.
//!
//! A missing or unreadable EXIF block is an ordinary outcome for this crate
//! (screenshots, messenger exports, stripped files), so extraction reports it
//! as `None` rather than as an error.

use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Layout of EXIF date/time tags.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Device and capture time recovered from a file's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureMetadata {
    /// Raw device identifier (the EXIF `Model` tag).
    pub device_id: String,
    /// Capture time as recorded by the camera (wall clock, no zone).
    pub captured_at: NaiveDateTime,
}

/// Reads the device model and original capture time from EXIF.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts capture metadata from `path`.
    ///
    /// Both the `Model` and `DateTimeOriginal` tags must be present and the
    /// timestamp must parse; partial metadata yields `None`.
    pub fn extract(&self, path: &Path) -> Option<CaptureMetadata> {
        let exif = match read_exif(path) {
            Ok(exif) => exif,
            Err(reason) => {
                debug!(path = %path.display(), %reason, "no usable exif block");
                return None;
            }
        };

        let Some(device_id) = tag_string(&exif, Tag::Model) else {
            debug!(path = %path.display(), "exif block has no device model");
            return None;
        };

        let Some(raw_time) = tag_string(&exif, Tag::DateTimeOriginal) else {
            debug!(path = %path.display(), "exif block has no original capture time");
            return None;
        };

        let Some(captured_at) = parse_exif_datetime(&raw_time) else {
            debug!(path = %path.display(), value = %raw_time, "unparseable capture time");
            return None;
        };

        Some(CaptureMetadata {
            device_id,
            captured_at,
        })
    }
}

fn read_exif(path: &Path) -> Result<Exif, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut reader = BufReader::new(file);
    Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| e.to_string())
}

/// Returns a tag's string value with surrounding quotes and whitespace removed.
///
/// ASCII values are read raw: `display_value()` reformats date tags and
/// quotes plain strings.
fn tag_string(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let raw = match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
    .unwrap_or_else(|| field.display_value().to_string());

    let value = raw
        .trim()
        .trim_matches(['"', '\0'])
        .trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses an EXIF `YYYY:MM:DD HH:MM:SS` timestamp.
pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim().trim_matches('"'), EXIF_DATETIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_exif_datetime() {
        let parsed = parse_exif_datetime("2023:04:15 12:30:45").expect("should parse");
        assert_eq!(parsed.year(), 2023);
        assert_eq!(parsed.month(), 4);
        assert_eq!(parsed.day(), 15);
        assert_eq!(parsed.hour(), 12);
        assert_eq!(parsed.second(), 45);
    }

    #[test]
    fn test_parse_exif_datetime_strips_quotes() {
        assert!(parse_exif_datetime("\"2023:04:15 12:30:45\"").is_some());
    }

    #[test]
    fn test_parse_exif_datetime_rejects_other_layouts() {
        assert!(parse_exif_datetime("2023-04-15 12:30:45").is_none());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("").is_none());
    }

    #[test]
    fn test_extract_missing_file() {
        let extractor = MetadataExtractor::new();
        assert_eq!(
            extractor.extract(Path::new("/non/existent/photo.jpg")),
            None
        );
    }

    #[test]
    fn test_extract_file_without_exif() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("photo.jpg");
        fs::write(&path, "definitely not a jpeg").expect("Failed to write test file");

        assert_eq!(MetadataExtractor::new().extract(&path), None);
    }

    #[test]
    fn test_extract_jpeg_without_app1_segment() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("bare.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).expect("Failed to write test file");

        assert_eq!(MetadataExtractor::new().extract(&path), None);
    }
}
