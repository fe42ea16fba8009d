//! Top-level file selection and project naming

use indexmap::IndexMap;
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::constants::{TOP_PREFIX, TOP_SUFFIX};
use crate::error::{Error, Result};
use crate::ext::PathExt;

/// Removes a `_top` suffix, or failing that a `top_` prefix.
///
/// # Examples
/// ```
/// use hdlmanifest::naming::strip_top_marker;
///
/// assert_eq!(strip_top_marker("cpu_top"), "cpu");
/// assert_eq!(strip_top_marker("top_cpu"), "cpu");
/// assert_eq!(strip_top_marker("cpu"), "cpu");
/// ```
pub fn strip_top_marker(name: &str) -> &str {
    name.strip_suffix(TOP_SUFFIX).or_else(|| name.strip_prefix(TOP_PREFIX)).unwrap_or(name)
}

/// Picks the top-level files out of the per-library manifest.
pub struct TopLevelResolver<'a> {
    names: Vec<String>,
    library_suffix: &'a str,
}

impl<'a> TopLevelResolver<'a> {
    /// # Arguments
    /// * `names` - Configured top-level names; empty selects the naming heuristic
    /// * `library_suffix` - Suffix removed from the library name by the heuristic
    pub fn new(names: Vec<String>, library_suffix: &'a str) -> Self {
        Self { names: names.into_iter().filter(|n| !n.is_empty()).collect(), library_suffix }
    }

    /// Files of every library whose name contains `library` that look like a top level.
    ///
    /// Configured names match when contained in the file name. Without names, a file matches
    /// when its name contains the library name (suffix removed) and its stem starts with
    /// `top_` or ends with `_top`.
    pub fn resolve(
        &self,
        library: &str,
        library_files: &IndexMap<String, Vec<PathBuf>>,
    ) -> Result<Vec<PathBuf>> {
        info!("Finding top-level file(s) for: {library}");
        let libraries: Vec<&Vec<PathBuf>> = library_files
            .iter()
            .filter(|(key, _)| key.contains(library))
            .map(|(_, files)| files)
            .collect();
        if libraries.is_empty() {
            warn!("No top-level libraries found for '{library}'");
        }

        let mut found: Vec<PathBuf> = Vec::new();
        let mut select = |file: &PathBuf| {
            if !found.contains(file) {
                info!("Top-level file: {}", file.display());
                found.push(file.clone());
            }
        };

        if self.names.is_empty() {
            warn!("No top-level names configured, searching for likely top-level files");
            let base = library.strip_suffix(self.library_suffix).unwrap_or(library);
            for file in libraries.iter().flat_map(|files| files.iter()) {
                let stem = file.file_stem_str();
                let positional = stem.starts_with(TOP_PREFIX) || stem.ends_with(TOP_SUFFIX);
                if positional && file.file_name_str().contains(base) {
                    select(file);
                }
            }
        } else {
            for name in &self.names {
                debug!("Configured top level: {name}");
                for file in libraries.iter().flat_map(|files| files.iter()) {
                    if file.file_name_str().contains(name.as_str()) {
                        select(file);
                    }
                }
            }
        }

        if found.is_empty() {
            return Err(Error::NoTopLevelFound { library: library.to_string() });
        }
        Ok(found)
    }
}

/// Top-level name used for naming: first configured name, else the first top-level file's stem.
pub fn top_level_name(configured: &[String], top_level_files: &[PathBuf]) -> Option<String> {
    configured
        .iter()
        .find(|n| !n.is_empty())
        .cloned()
        .or_else(|| top_level_files.first().map(|f| f.file_stem_str().to_string()))
        .filter(|n| !n.is_empty())
}

/// Derives the project name from an override, the top-level name and the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectNamer<'a> {
    pub override_name: Option<&'a str>,
    pub board: Option<&'a str>,
}

impl<'a> ProjectNamer<'a> {
    pub fn new(override_name: Option<&'a str>, board: Option<&'a str>) -> Self {
        Self {
            override_name: override_name.filter(|n| !n.is_empty()),
            board: board.filter(|b| !b.is_empty()),
        }
    }

    /// Override, else `<board>_<top>` (or `<top>` when both strip to the same name), else `<top>`.
    pub fn name(&self, top_level_name: Option<&str>) -> Result<String> {
        if let Some(name) = self.override_name {
            info!("Using project name override: {name}");
            return Ok(name.to_string());
        }

        let top = top_level_name.map(strip_top_marker).filter(|t| !t.is_empty());
        match (top, self.board) {
            (Some(top), Some(board)) => {
                let board = strip_top_marker(board);
                let name = if board == top { top.to_string() } else { format!("{board}_{top}") };
                info!("Using board and top-level entity name as project name: {name}");
                Ok(name)
            }
            (Some(top), None) => {
                info!("Using top-level entity name as project name: {top}");
                Ok(top.to_string())
            }
            (None, board) => Err(Error::ProjectName {
                top_level: top_level_name.unwrap_or_default().to_string(),
                board: board.unwrap_or_default().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(entries: &[(&str, &[&str])]) -> IndexMap<String, Vec<PathBuf>> {
        entries
            .iter()
            .map(|(lib, files)| (lib.to_string(), files.iter().map(PathBuf::from).collect()))
            .collect()
    }

    #[test]
    fn heuristic_finds_suffix_marked_file() {
        let files = manifest(&[("cpu_lib", &["/r/src/cpu_top.vhd", "/r/src/cpu_core.vhd"])]);
        let found = TopLevelResolver::new(vec![], "_lib").resolve("cpu_lib", &files).unwrap();
        assert_eq!(found, vec![PathBuf::from("/r/src/cpu_top.vhd")]);
    }

    #[test]
    fn heuristic_accepts_prefix_marker() {
        let files = manifest(&[("cpu_lib", &["/r/src/top_cpu.vhd", "/r/src/cpu_topology.vhd"])]);
        let found = TopLevelResolver::new(vec![], "_lib").resolve("cpu_lib", &files).unwrap();
        assert_eq!(found, vec![PathBuf::from("/r/src/top_cpu.vhd")]);
    }

    #[test]
    fn configured_names_match_by_substring_across_libraries() {
        let files = manifest(&[
            ("cpu_lib", &["/r/a/cpu_top.vhd", "/r/a/alu.vhd"]),
            ("cpu_lib_ext", &["/r/b/cpu_top_ext.vhd"]),
            ("fifo_lib", &["/r/c/cpu_top_copy.vhd"]),
        ]);
        let found = TopLevelResolver::new(vec!["cpu_top".into(), "alu".into()], "_lib")
            .resolve("cpu_lib", &files)
            .unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("/r/a/cpu_top.vhd"),
                PathBuf::from("/r/b/cpu_top_ext.vhd"),
                PathBuf::from("/r/a/alu.vhd"),
            ]
        );
    }

    #[test]
    fn no_match_is_fatal() {
        let files = manifest(&[("cpu_lib", &["/r/src/cpu_core.vhd"])]);
        let err = TopLevelResolver::new(vec![], "_lib").resolve("cpu_lib", &files).unwrap_err();
        assert!(matches!(err, Error::NoTopLevelFound { .. }));
        let err = TopLevelResolver::new(vec![], "_lib").resolve("gpu_lib", &files).unwrap_err();
        assert!(matches!(err, Error::NoTopLevelFound { .. }));
    }

    #[test]
    fn top_level_name_prefers_configuration() {
        let files = vec![PathBuf::from("/r/src/cpu_top.vhd")];
        assert_eq!(top_level_name(&["soc_top".into()], &files).as_deref(), Some("soc_top"));
        assert_eq!(top_level_name(&[], &files).as_deref(), Some("cpu_top"));
        assert_eq!(top_level_name(&[], &[]), None);
    }

    #[test]
    fn board_is_prefixed_unless_equal() {
        let namer = ProjectNamer::new(None, Some("devkit"));
        assert_eq!(namer.name(Some("cpu_top")).unwrap(), "devkit_cpu");
        let namer = ProjectNamer::new(None, Some("cpu_top"));
        assert_eq!(namer.name(Some("top_cpu")).unwrap(), "cpu");
    }

    #[test]
    fn override_always_wins() {
        let namer = ProjectNamer::new(Some("X"), Some("devkit"));
        assert_eq!(namer.name(Some("cpu_top")).unwrap(), "X");
        assert_eq!(namer.name(None).unwrap(), "X");
        assert_eq!(ProjectNamer::new(Some("X"), None).name(Some("cpu")).unwrap(), "X");
    }

    #[test]
    fn missing_top_level_name_is_an_error() {
        let err = ProjectNamer::new(Some(""), Some("devkit")).name(None).unwrap_err();
        assert!(matches!(err, Error::ProjectName { .. }));
        assert_eq!(ProjectNamer::new(None, None).name(Some("cpu_top")).unwrap(), "cpu");
    }
}
