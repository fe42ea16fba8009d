use std::path::{Component, Path, PathBuf};

/// Extension trait for Path to provide convenient string and normalisation helpers
pub trait PathExt {
    /// Converts a path to a String using display(), which always succeeds
    /// but may use replacement characters for invalid Unicode.
    fn display_string(&self) -> String;

    /// Final component as a string slice, empty when there is none.
    fn file_name_str(&self) -> &str;

    /// File name without its last extension.
    fn file_stem_str(&self) -> &str;

    /// Extension including the leading dot, `None` when the file has no extension.
    fn dotted_extension(&self) -> Option<String>;

    /// Removes `.` components, folds `..` into the parent and drops empty segments
    /// without touching the filesystem.
    ///
    /// # Examples
    /// ```
    /// use hdlmanifest::ext::PathExt;
    /// use std::path::{Path, PathBuf};
    ///
    /// let path = Path::new("/repo/ip//core/./src/../constraints");
    /// assert_eq!(path.normalize_lexically(), PathBuf::from("/repo/ip/core/constraints"));
    /// ```
    fn normalize_lexically(&self) -> PathBuf;
}

impl PathExt for Path {
    fn display_string(&self) -> String {
        self.display().to_string()
    }

    fn file_name_str(&self) -> &str {
        self.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    }

    fn file_stem_str(&self) -> &str {
        self.file_stem().and_then(|n| n.to_str()).unwrap_or_default()
    }

    fn dotted_extension(&self) -> Option<String> {
        self.extension().and_then(|e| e.to_str()).map(|e| format!(".{e}"))
    }

    fn normalize_lexically(&self) -> PathBuf {
        let mut normalized = PathBuf::new();
        for component in self.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        normalized.push(component);
                    }
                }
                other => normalized.push(other),
            }
        }
        normalized
    }
}
