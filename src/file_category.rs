/// Media categorization by file extension.
///
/// This module maps lower-cased file extensions to the broad media categories
/// the organizer understands. The table is a plain value handed to the scanner
/// at construction, so tests can substitute their own mappings.
///
/// # Examples
///
/// ```
/// use mediasort::file_category::{Category, ExtensionTable};
/// use std::path::Path;
///
/// let table = ExtensionTable::default();
/// assert_eq!(table.categorize(Path::new("IMG_0001.JPG")), Some(Category::Image));
/// assert_eq!(table.categorize(Path::new("clip.mov")), Some(Category::Video));
/// assert_eq!(table.categorize(Path::new("track.flac")), None);
/// ```
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Represents a broad media category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Still images (JPG, PNG, GIF, BMP)
    Image,
    /// Video files (MP4, MOV, MKV, etc.)
    Video,
    /// Audio files (MP3)
    Audio,
}

impl Category {
    /// Returns a short lower-case label for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediasort::file_category::Category;
    ///
    /// assert_eq!(Category::Image.label(), "image");
    /// assert_eq!(Category::Audio.label(), "audio");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TableEntry {
    category: Category,
    enabled: bool,
}

/// Maps file extensions to media categories.
///
/// Entries may be registered as disabled: the extension is known to belong
/// to a category but files carrying it are not collected.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    entries: HashMap<String, TableEntry>,
}

impl ExtensionTable {
    /// Creates an empty table with no mappings.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates a table with the standard media mappings.
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.populate_standard_mappings();
        table
    }

    fn populate_standard_mappings(&mut self) {
        for ext in ["jpg", "jpeg", "png", "gif", "bmp"] {
            self.add_mapping(ext, Category::Image);
        }

        for ext in ["mp4", "mov", "avi", "wmv", "mkv", "rm", "f4v", "flv", "swf"] {
            self.add_mapping(ext, Category::Video);
        }

        self.add_mapping("mp3", Category::Audio);
        self.add_disabled_mapping("flac", Category::Audio);
        self.add_disabled_mapping("wav", Category::Audio);
    }

    /// Registers an enabled extension mapping. Extensions are stored lower-cased.
    pub fn add_mapping(&mut self, extension: &str, category: Category) {
        self.entries.insert(
            extension.to_lowercase(),
            TableEntry {
                category,
                enabled: true,
            },
        );
    }

    /// Registers an extension that is known but not collected.
    pub fn add_disabled_mapping(&mut self, extension: &str, category: Category) {
        self.entries.insert(
            extension.to_lowercase(),
            TableEntry {
                category,
                enabled: false,
            },
        );
    }

    /// Returns the category of an enabled extension (without the leading dot).
    pub fn extension_to_category(&self, extension: &str) -> Option<Category> {
        self.entries
            .get(&extension.to_lowercase())
            .filter(|entry| entry.enabled)
            .map(|entry| entry.category)
    }

    /// Returns the category of `path` based on its extension, if collected.
    pub fn categorize(&self, path: &Path) -> Option<Category> {
        self.extension_to_category(&file_extension(path))
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the lower-cased extension of `path` without the leading dot,
/// or an empty string when the path has none.
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        let table = ExtensionTable::default();
        for ext in ["jpg", "jpeg", "png", "gif", "bmp"] {
            assert_eq!(table.extension_to_category(ext), Some(Category::Image));
        }
    }

    #[test]
    fn test_video_extensions() {
        let table = ExtensionTable::default();
        for ext in ["mp4", "mov", "avi", "wmv", "mkv", "rm", "f4v", "flv", "swf"] {
            assert_eq!(table.extension_to_category(ext), Some(Category::Video));
        }
    }

    #[test]
    fn test_disabled_audio_extensions_are_not_collected() {
        let table = ExtensionTable::default();
        assert_eq!(table.extension_to_category("mp3"), Some(Category::Audio));
        assert_eq!(table.extension_to_category("flac"), None);
        assert_eq!(table.extension_to_category("wav"), None);
    }

    #[test]
    fn test_categorize_is_case_insensitive() {
        let table = ExtensionTable::default();
        assert_eq!(
            table.categorize(Path::new("/a/b/PHOTO.JPEG")),
            Some(Category::Image)
        );
        assert_eq!(table.categorize(Path::new("Movie.MkV")), Some(Category::Video));
    }

    #[test]
    fn test_unknown_and_missing_extensions() {
        let table = ExtensionTable::default();
        assert_eq!(table.categorize(Path::new("notes.txt")), None);
        assert_eq!(table.categorize(Path::new("README")), None);
    }

    #[test]
    fn test_custom_table_substitution() {
        let mut table = ExtensionTable::empty();
        table.add_mapping("HEIC", Category::Image);

        assert_eq!(table.categorize(Path::new("x.heic")), Some(Category::Image));
        assert_eq!(table.categorize(Path::new("x.jpg")), None);
    }

    #[test]
    fn test_file_extension_helper() {
        assert_eq!(file_extension(Path::new("a/b/c.TXT")), "txt");
        assert_eq!(file_extension(Path::new("noext")), "");
        assert_eq!(file_extension(Path::new("archive.tar.GZ")), "gz");
    }
}
