//! Directory traversal.
//!
//! Walks a source tree and splits the files it finds into image, video and
//! audio lists using an [`ExtensionTable`]. Entries are visited in file-name
//! order so repeated runs see files in the same sequence.

use crate::file_category::{Category, ExtensionTable, file_extension};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Errors raised while walking a directory tree.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Media files found under a root, in traversal order.
#[derive(Debug, Default, Clone)]
pub struct MediaScan {
    pub images: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
    pub audio: Vec<PathBuf>,
}

impl MediaScan {
    /// Total number of collected files across all categories.
    pub fn total(&self) -> usize {
        self.images.len() + self.videos.len() + self.audio.len()
    }
}

fn walk(root: &Path) -> Result<impl Iterator<Item = Result<walkdir::DirEntry, ScanError>>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }

    let root_path = root.to_path_buf();
    Ok(WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(move |entry| {
            entry.map_err(|source| ScanError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root_path.clone()),
                source,
            })
        }))
}

/// Recursively collects media files under `root`.
///
/// Any traversal error aborts the scan; no files are touched before the scan
/// has completed.
pub fn scan_media(root: &Path, table: &ExtensionTable) -> Result<MediaScan, ScanError> {
    debug!(root = %root.display(), "start scanning");

    let mut scan = MediaScan::default();
    for entry in walk(root)? {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        match table.categorize(&path) {
            Some(Category::Image) => scan.images.push(path),
            Some(Category::Video) => scan.videos.push(path),
            Some(Category::Audio) => scan.audio.push(path),
            None => {}
        }
    }

    debug!(
        images = scan.images.len(),
        videos = scan.videos.len(),
        audio = scan.audio.len(),
        "scan finished"
    );
    Ok(scan)
}

/// Statistics for one distinct extension found under a directory.
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionSummary {
    /// Number of files with this extension.
    pub count: usize,
    /// First file seen with this extension.
    pub sample: PathBuf,
    /// Category from the extension table, if the extension is collected.
    pub category: Option<Category>,
    /// MIME type sniffed from the sample's content.
    pub mime_type: Option<String>,
}

/// Lists every distinct lower-cased extension under `root`.
///
/// Files without an extension are reported under the empty key. The MIME
/// type is detected from the first file seen for each extension.
pub fn list_extensions(
    root: &Path,
    table: &ExtensionTable,
) -> Result<BTreeMap<String, ExtensionSummary>, ScanError> {
    let mut summaries: BTreeMap<String, ExtensionSummary> = BTreeMap::new();

    for entry in walk(root)? {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let extension = file_extension(&path);
        summaries
            .entry(extension)
            .and_modify(|summary| summary.count += 1)
            .or_insert_with_key(|ext| ExtensionSummary {
                count: 1,
                category: table.extension_to_category(ext),
                mime_type: sniff_mime_type(&path),
                sample: path,
            });
    }

    Ok(summaries)
}

fn sniff_mime_type(path: &Path) -> Option<String> {
    match infer::get_from_path(path) {
        Ok(kind) => kind.map(|kind| kind.mime_type().to_string()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not sniff file type");
            None
        }
    }
}
