//! Conflict resolution for occupied destinations.
//!
//! Decision table for a candidate destination:
//!
//! | occupied | overwrite | no-skip | action                          |
//! |----------|-----------|---------|---------------------------------|
//! | no       | -         | -       | `Proceed`                       |
//! | on disk  | yes       | -       | `Overwrite`                     |
//! | yes      | no        | no      | `Skip`                          |
//! | yes      | no        | yes     | `Rename` to `<stem>_new_<ts>.<ext>` |
//!
//! A destination already claimed by another file in the same run is never
//! overwritten; it goes through the skip/rename rows instead.

use chrono::{Local, NaiveDateTime};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Timestamp layout used in renamed destinations.
pub const RENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// What to do with a candidate destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictAction {
    /// Destination is free.
    Proceed,
    /// Destination is occupied and policy says leave the file alone.
    Skip,
    /// Destination is occupied and will be replaced.
    Overwrite,
    /// Destination is occupied; the file goes to a derived name instead.
    Rename,
}

impl fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictAction::Proceed => "proceed",
            ConflictAction::Skip => "skip",
            ConflictAction::Overwrite => "overwrite",
            ConflictAction::Rename => "rename",
        };
        f.write_str(name)
    }
}

/// Flags that decide how occupied destinations are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictPolicy {
    /// Replace files that already exist at the destination.
    pub overwrite: bool,
    /// Rename instead of skipping when the destination is occupied.
    pub no_skip: bool,
}

/// The outcome of conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: PathBuf,
    pub action: ConflictAction,
}

/// Applies a [`ConflictPolicy`] to candidate destinations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver {
    policy: ConflictPolicy,
}

impl ConflictResolver {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Resolves `candidate` against the filesystem and the destinations
    /// already `claimed` in this run, using the current local time for renames.
    pub fn resolve(&self, candidate: &Path, claimed: &HashSet<PathBuf>) -> Resolution {
        self.resolve_at(candidate, claimed, Local::now().naive_local())
    }

    /// Like [`ConflictResolver::resolve`] with an explicit rename timestamp.
    pub fn resolve_at(
        &self,
        candidate: &Path,
        claimed: &HashSet<PathBuf>,
        now: NaiveDateTime,
    ) -> Resolution {
        let in_run = claimed.contains(candidate);
        if !in_run && !exists_on_disk(candidate) {
            return Resolution {
                path: candidate.to_path_buf(),
                action: ConflictAction::Proceed,
            };
        }

        if self.policy.overwrite && !in_run {
            return Resolution {
                path: candidate.to_path_buf(),
                action: ConflictAction::Overwrite,
            };
        }

        if !self.policy.no_skip {
            return Resolution {
                path: candidate.to_path_buf(),
                action: ConflictAction::Skip,
            };
        }

        let renamed = renamed_path(candidate, now);
        if claimed.contains(&renamed) || exists_on_disk(&renamed) {
            return Resolution {
                path: renamed,
                action: ConflictAction::Skip,
            };
        }

        Resolution {
            path: renamed,
            action: ConflictAction::Rename,
        }
    }
}

/// True when something (including a dangling symlink) is at `path`.
fn exists_on_disk(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Derives `<stem>_new_<YYYYMMDDHHMMSS><.ext>` next to `path`.
pub fn renamed_path(path: &Path, now: NaiveDateTime) -> PathBuf {
    let mut name = OsString::from(path.file_stem().unwrap_or_default());
    name.push("_new_");
    name.push(now.format(RENAME_TIMESTAMP_FORMAT).to_string());
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use regex::Regex;
    use tempfile::TempDir;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(12, 5, 9)
            .unwrap()
    }

    fn occupied_destination() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("photos/2023/04");
        fs::create_dir_all(&dir).expect("Failed to create destination");
        let path = dir.join("img.jpg");
        fs::write(&path, "existing").expect("Failed to write existing file");
        (temp_dir, path)
    }

    #[test]
    fn test_free_destination_proceeds() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let candidate = temp_dir.path().join("photos/2023/04/img.jpg");

        for (overwrite, no_skip) in [(false, false), (true, false), (false, true)] {
            let resolver = ConflictResolver::new(ConflictPolicy { overwrite, no_skip });
            let resolution = resolver.resolve(&candidate, &HashSet::new());
            assert_eq!(resolution.action, ConflictAction::Proceed);
            assert_eq!(resolution.path, candidate);
        }
    }

    #[test]
    fn test_existing_destination_with_overwrite() {
        let (_temp_dir, candidate) = occupied_destination();
        let resolver = ConflictResolver::new(ConflictPolicy {
            overwrite: true,
            no_skip: false,
        });

        let resolution = resolver.resolve(&candidate, &HashSet::new());
        assert_eq!(resolution.action, ConflictAction::Overwrite);
        assert_eq!(resolution.path, candidate);
    }

    #[test]
    fn test_overwrite_wins_over_no_skip() {
        let (_temp_dir, candidate) = occupied_destination();
        let resolver = ConflictResolver::new(ConflictPolicy {
            overwrite: true,
            no_skip: true,
        });

        let resolution = resolver.resolve(&candidate, &HashSet::new());
        assert_eq!(resolution.action, ConflictAction::Overwrite);
    }

    #[test]
    fn test_existing_destination_is_skipped_by_default() {
        let (_temp_dir, candidate) = occupied_destination();
        let resolver = ConflictResolver::default();

        let resolution = resolver.resolve(&candidate, &HashSet::new());
        assert_eq!(resolution.action, ConflictAction::Skip);
    }

    #[test]
    fn test_existing_destination_is_renamed_with_no_skip() {
        let (_temp_dir, candidate) = occupied_destination();
        let resolver = ConflictResolver::new(ConflictPolicy {
            overwrite: false,
            no_skip: true,
        });

        let resolution = resolver.resolve(&candidate, &HashSet::new());

        assert_eq!(resolution.action, ConflictAction::Rename);
        assert_eq!(resolution.path.parent(), candidate.parent());
        let name = resolution.path.file_name().unwrap().to_string_lossy();
        let pattern = Regex::new(r"^img_new_\d{14}\.jpg$").unwrap();
        assert!(pattern.is_match(&name), "unexpected renamed file: {}", name);
    }

    #[test]
    fn test_renamed_path_format() {
        assert_eq!(
            renamed_path(Path::new("photos/2023/04/img.jpg"), noon()),
            PathBuf::from("photos/2023/04/img_new_20240229120509.jpg")
        );
        assert_eq!(
            renamed_path(Path::new("2023/04/archive.tar.gz"), noon()),
            PathBuf::from("2023/04/archive.tar_new_20240229120509.gz")
        );
        assert_eq!(
            renamed_path(Path::new("2023/04/README"), noon()),
            PathBuf::from("2023/04/README_new_20240229120509")
        );
    }

    #[test]
    fn test_claimed_destination_is_never_overwritten() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let candidate = temp_dir.path().join("2023/04/img.jpg");
        let claimed = HashSet::from([candidate.clone()]);

        let overwrite = ConflictResolver::new(ConflictPolicy {
            overwrite: true,
            no_skip: false,
        });
        assert_eq!(
            overwrite.resolve_at(&candidate, &claimed, noon()).action,
            ConflictAction::Skip
        );

        let rename = ConflictResolver::new(ConflictPolicy {
            overwrite: true,
            no_skip: true,
        });
        let resolution = rename.resolve_at(&candidate, &claimed, noon());
        assert_eq!(resolution.action, ConflictAction::Rename);
        assert_eq!(
            resolution.path,
            temp_dir.path().join("2023/04/img_new_20240229120509.jpg")
        );
    }

    #[test]
    fn test_occupied_rename_target_is_skipped() {
        let (_temp_dir, candidate) = occupied_destination();
        let resolver = ConflictResolver::new(ConflictPolicy {
            overwrite: false,
            no_skip: true,
        });
        let taken = renamed_path(&candidate, noon());
        let claimed = HashSet::from([taken.clone()]);

        let resolution = resolver.resolve_at(&candidate, &claimed, noon());
        assert_eq!(resolution.action, ConflictAction::Skip);
        assert_eq!(resolution.path, taken);
    }
}
