//! mediasort - organize photos into dated folders
//!
//! This library resolves each media file to `<alias>/<year>/<month>/<name>`
//! using embedded EXIF metadata or filename conventions, resolves conflicts
//! with files already at the destination, and copies or moves files there
//! with per-file or whole-batch confirmation.

pub mod alias;
pub mod batch;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod file_category;
pub mod file_transfer;
pub mod filename_matcher;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod path_resolver;
pub mod prompt;
pub mod scan;

pub use alias::AliasResolver;
pub use batch::{BatchCoordinator, BatchError, BatchReport, FailureKind, TransferPlan};
pub use config::{ConfigError, OrganizerConfig, RunConfig};
pub use conflict::{ConflictAction, ConflictPolicy, ConflictResolver};
pub use file_category::{Category, ExtensionTable};
pub use file_transfer::{TransferError, TransferExecutor, TransferMode};
pub use metadata::{CaptureMetadata, MetadataExtractor};
pub use path_resolver::{PathResolver, ResolveError, ResolvedDestination};

pub use cli::{Command, run_cli};
