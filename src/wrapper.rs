use indexmap::IndexMap;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::constants::COMMON_WRAPPER_DIR;
use crate::ext::PathExt;

/// Result of resolving duplicate wrapper file names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupOutcome {
    /// Surviving candidates in their original order.
    pub kept: Vec<PathBuf>,
    /// Candidates dropped in favour of another file with the same name.
    pub skipped: Vec<PathBuf>,
}

fn is_common_wrapper(path: &Path) -> bool {
    path.display_string().contains(COMMON_WRAPPER_DIR)
}

/// Keeps one wrapper per file name.
///
/// Within a group of same-named candidates, files outside `common_wrapper_files` take priority
/// over shared ones. When that does not separate the group, the first candidate seen wins.
pub fn deduplicate(candidates: &[PathBuf]) -> DedupOutcome {
    let mut groups: IndexMap<&str, Vec<&PathBuf>> = IndexMap::new();
    for candidate in candidates {
        groups.entry(candidate.file_name_str()).or_default().push(candidate);
    }

    let mut keep: Vec<&PathBuf> = Vec::new();
    for (name, group) in &groups {
        let specific: Vec<&PathBuf> =
            group.iter().copied().filter(|p| !is_common_wrapper(p)).collect();
        let mixed = !specific.is_empty() && specific.len() < group.len();

        if mixed {
            for path in group.iter().filter(|p| is_common_wrapper(p)) {
                info!("Two wrapper files found for '{name}', prioritising over {}", path.display());
            }
            for path in specific {
                if !keep.contains(&path) {
                    keep.push(path);
                }
            }
        } else {
            keep.push(group[0]);
            for path in &group[1..] {
                debug!("Duplicate wrapper file, skipping: {}", path.display());
            }
        }
    }

    let mut outcome = DedupOutcome::default();
    let mut emitted: Vec<&PathBuf> = Vec::new();
    for candidate in candidates {
        if keep.contains(&candidate) && !emitted.contains(&candidate) {
            emitted.push(candidate);
            outcome.kept.push(candidate.clone());
        } else {
            outcome.skipped.push(candidate.clone());
        }
    }
    outcome
}
