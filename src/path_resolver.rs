//! Destination path resolution.
//!
//! A [`PathResolver`] holds an ordered list of [`ResolveStrategy`] values and
//! asks each one in turn to place a file; the first strategy that succeeds
//! decides the destination. The standard order is:
//!
//! 1. embedded EXIF metadata (device alias + capture time)
//! 2. `mmexport<epoch>` export names
//! 3. timestamps embedded in the file name
//!
//! Filename-based strategies do not know the device, so their destinations
//! have no alias segment.

use crate::alias::AliasResolver;
use crate::filename_matcher::{ExportCodeMatcher, TimestampNameMatcher};
use crate::metadata::MetadataExtractor;
use chrono::{Datelike, NaiveDateTime};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors raised by path resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No strategy could derive a destination for the file.
    #[error("no date could be derived for {}", .0.display())]
    UnresolvedPath(PathBuf),
}

/// Which strategy produced a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedBy {
    Metadata,
    ExportCode,
    TimestampName,
}

impl fmt::Display for ResolvedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolvedBy::Metadata => "metadata",
            ResolvedBy::ExportCode => "export code",
            ResolvedBy::TimestampName => "filename timestamp",
        };
        f.write_str(name)
    }
}

/// A candidate destination relative to the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    /// Device alias folder, absent when the device is unknown.
    pub alias: Option<String>,
    /// Capture time the year/month folders are derived from.
    pub captured_at: NaiveDateTime,
    /// The original file name, byte for byte.
    pub file_name: OsString,
    pub resolved_by: ResolvedBy,
}

impl ResolvedDestination {
    /// Four-digit year folder name.
    pub fn year(&self) -> String {
        format!("{:04}", self.captured_at.year())
    }

    /// Two-digit month folder name.
    pub fn month(&self) -> String {
        format!("{:02}", self.captured_at.month())
    }

    /// Returns `{alias}/{year}/{month}/{file_name}`, or
    /// `{year}/{month}/{file_name}` when there is no alias.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        if let Some(alias) = &self.alias {
            path.push(alias_segment(alias));
        }
        path.push(self.year());
        path.push(self.month());
        path.push(&self.file_name);
        path
    }
}

/// The final component of `path`, byte for byte.
pub fn raw_file_name(path: &Path) -> OsString {
    path.file_name().map(OsString::from).unwrap_or_default()
}

/// Makes an alias safe to use as a single path component.
fn alias_segment(alias: &str) -> String {
    let segment: String = alias
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    match segment.as_str() {
        "." | ".." => segment.replace('.', "_"),
        _ => segment,
    }
}

/// One way of deriving a destination for a file.
pub trait ResolveStrategy {
    /// Attempts to place `path`. `file_name` is its final component, lossily
    /// decoded for matching; the destination keeps the raw name.
    fn attempt(&self, path: &Path, file_name: &str) -> Option<ResolvedDestination>;
}

/// Places files by EXIF device model and original capture time.
pub struct MetadataStrategy {
    extractor: MetadataExtractor,
    aliases: AliasResolver,
}

impl MetadataStrategy {
    pub fn new(extractor: MetadataExtractor, aliases: AliasResolver) -> Self {
        Self { extractor, aliases }
    }
}

impl ResolveStrategy for MetadataStrategy {
    fn attempt(&self, path: &Path, _file_name: &str) -> Option<ResolvedDestination> {
        let metadata = self.extractor.extract(path)?;
        Some(ResolvedDestination {
            alias: Some(self.aliases.resolve(&metadata.device_id).to_string()),
            captured_at: metadata.captured_at,
            file_name: raw_file_name(path),
            resolved_by: ResolvedBy::Metadata,
        })
    }
}

/// Places `mmexport<epoch>` files by their embedded Unix time.
pub struct ExportCodeStrategy {
    matcher: ExportCodeMatcher,
}

impl ExportCodeStrategy {
    pub fn new(matcher: ExportCodeMatcher) -> Self {
        Self { matcher }
    }
}

impl ResolveStrategy for ExportCodeStrategy {
    fn attempt(&self, path: &Path, file_name: &str) -> Option<ResolvedDestination> {
        let captured_at = self.matcher.match_name(file_name)?;
        Some(ResolvedDestination {
            alias: None,
            captured_at,
            file_name: raw_file_name(path),
            resolved_by: ResolvedBy::ExportCode,
        })
    }
}

/// Places files whose names embed a formatted timestamp.
pub struct TimestampNameStrategy {
    matcher: TimestampNameMatcher,
}

impl TimestampNameStrategy {
    pub fn new(matcher: TimestampNameMatcher) -> Self {
        Self { matcher }
    }
}

impl ResolveStrategy for TimestampNameStrategy {
    fn attempt(&self, path: &Path, file_name: &str) -> Option<ResolvedDestination> {
        let captured_at = self.matcher.match_name(file_name)?;
        Some(ResolvedDestination {
            alias: None,
            captured_at,
            file_name: raw_file_name(path),
            resolved_by: ResolvedBy::TimestampName,
        })
    }
}

/// Runs resolution strategies in order; first success wins.
pub struct PathResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl PathResolver {
    /// Builds the standard metadata → export code → filename timestamp chain.
    pub fn new(aliases: AliasResolver, timestamps: TimestampNameMatcher) -> Self {
        Self::with_strategies(vec![
            Box::new(MetadataStrategy::new(MetadataExtractor::new(), aliases)),
            Box::new(ExportCodeStrategy::new(ExportCodeMatcher::new())),
            Box::new(TimestampNameStrategy::new(timestamps)),
        ])
    }

    /// Builds a resolver from an explicit strategy list, tried in order.
    pub fn with_strategies(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolves `path` to a destination relative to the destination root.
    pub fn resolve(&self, path: &Path) -> Result<ResolvedDestination, ResolveError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ResolveError::UnresolvedPath(path.to_path_buf()))?
            .to_string_lossy();

        let resolved = self
            .strategies
            .iter()
            .find_map(|strategy| strategy.attempt(path, &file_name))
            .ok_or_else(|| ResolveError::UnresolvedPath(path.to_path_buf()))?;

        debug!(
            path = %path.display(),
            by = %resolved.resolved_by,
            destination = %resolved.relative_path().display(),
            "resolved destination"
        );
        Ok(resolved)
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(AliasResolver::new(), TimestampNameMatcher::default())
    }
}
