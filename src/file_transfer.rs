/// File transfer into the destination tree.
///
/// This module copies or moves a single file to its finalized destination.
/// It creates the destination's parent directories as needed and, for copies,
/// syncs the new file to disk before reporting success.
use clap::ValueEnum;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// How files reach their destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransferMode {
    /// Copy the bytes and leave the source in place.
    Copy,
    /// Rename the source into place (same volume only).
    Move,
}

impl TransferMode {
    /// Past-tense verb for log and summary lines.
    pub fn past_tense(&self) -> &'static str {
        match self {
            TransferMode::Copy => "copied",
            TransferMode::Move => "moved",
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Copy => f.write_str("copy"),
            TransferMode::Move => f.write_str("move"),
        }
    }
}

/// Errors that can occur while transferring a file.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Failed to create the destination's parent directories.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to open the source file for reading.
    #[error("Failed to open source file {}: {source}", path.display())]
    OpenFailed { path: PathBuf, source: io::Error },
    /// Failed to create the destination file.
    #[error("Failed to create destination file {}: {source}", path.display())]
    CreateFailed { path: PathBuf, source: io::Error },
    /// Failed while copying bytes.
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// Failed to flush the copied file to disk.
    #[error("Failed to sync destination file {}: {source}", path.display())]
    SyncFailed { path: PathBuf, source: io::Error },
    /// Failed to rename the source into place.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Copies or moves files to finalized destinations.
pub struct TransferExecutor;

impl TransferExecutor {
    /// Transfers `source` to `destination`.
    ///
    /// Parent directories of `destination` are created if missing. An existing
    /// file at `destination` is replaced; deciding whether that is allowed is
    /// the conflict resolver's job.
    ///
    /// A failed rename in [`TransferMode::Move`] is reported as-is; there is
    /// no copy-and-delete fallback across volumes.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediasort::file_transfer::{TransferExecutor, TransferMode};
    /// use std::path::Path;
    ///
    /// let result = TransferExecutor::transfer(
    ///     Path::new("/camera/IMG_0001.jpg"),
    ///     Path::new("/photos/Pixel7/2023/04/IMG_0001.jpg"),
    ///     TransferMode::Copy,
    /// );
    ///
    /// if let Err(e) = result {
    ///     eprintln!("Transfer failed: {}", e);
    /// }
    /// ```
    pub fn transfer(source: &Path, destination: &Path, mode: TransferMode) -> TransferResult<()> {
        Self::ensure_parent_dir(destination)?;

        match mode {
            TransferMode::Copy => Self::copy_file(source, destination),
            TransferMode::Move => Self::move_file(source, destination),
        }
    }

    /// Creates the parent directory chain of `destination`.
    fn ensure_parent_dir(destination: &Path) -> TransferResult<()> {
        let Some(parent) = destination.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() || parent.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(parent).map_err(|e| TransferError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            source: e,
        })
    }

    fn copy_file(source: &Path, destination: &Path) -> TransferResult<()> {
        let mut reader = File::open(source).map_err(|e| TransferError::OpenFailed {
            path: source.to_path_buf(),
            source: e,
        })?;

        let mut writer = File::create(destination).map_err(|e| TransferError::CreateFailed {
            path: destination.to_path_buf(),
            source: e,
        })?;

        io::copy(&mut reader, &mut writer).map_err(|e| TransferError::CopyFailed {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        })?;

        writer.sync_all().map_err(|e| TransferError::SyncFailed {
            path: destination.to_path_buf(),
            source: e,
        })
    }

    fn move_file(source: &Path, destination: &Path) -> TransferResult<()> {
        fs::rename(source, destination).map_err(|e| TransferError::MoveFailed {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_copy_creates_directories_and_keeps_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("img.jpg");
        fs::write(&source, b"jpeg bytes").expect("Failed to write test file");
        let destination = temp_dir.path().join("out/cam/2023/04/img.jpg");

        TransferExecutor::transfer(&source, &destination, TransferMode::Copy)
            .expect("Failed to copy file");

        assert!(source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_move_uses_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dest_dir = temp_dir.path().join("2023/04");
        fs::create_dir_all(&dest_dir).expect("Failed to create destination directory");
        let source = temp_dir.path().join("img.jpg");
        fs::write(&source, b"jpeg bytes").expect("Failed to write test file");
        let destination = dest_dir.join("img.jpg");

        TransferExecutor::transfer(&source, &destination, TransferMode::Move)
            .expect("Failed to move file");

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_copy_replaces_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("new.jpg");
        let destination = temp_dir.path().join("old.jpg");
        fs::write(&source, b"new").expect("Failed to write test file");
        fs::write(&destination, b"old and longer").expect("Failed to write test file");

        TransferExecutor::transfer(&source, &destination, TransferMode::Copy)
            .expect("Failed to copy file");

        assert_eq!(fs::read(&destination).unwrap(), b"new");
    }

    #[test]
    fn test_missing_source_fails_per_mode() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("gone.jpg");
        let destination = temp_dir.path().join("out/gone.jpg");

        let copy = TransferExecutor::transfer(&source, &destination, TransferMode::Copy);
        assert!(matches!(copy, Err(TransferError::OpenFailed { .. })));

        let moved = TransferExecutor::transfer(&source, &destination, TransferMode::Move);
        assert!(matches!(moved, Err(TransferError::MoveFailed { .. })));
        assert!(!destination.exists());
    }

    #[test]
    fn test_directory_creation_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"a file, not a directory").expect("Failed to write test file");
        let source = temp_dir.path().join("img.jpg");
        fs::write(&source, b"x").expect("Failed to write test file");

        let result = TransferExecutor::transfer(
            &source,
            &blocker.join("2023/img.jpg"),
            TransferMode::Copy,
        );
        assert!(matches!(
            result,
            Err(TransferError::DirectoryCreationFailed { .. })
        ));
        assert!(source.exists());
    }
}
