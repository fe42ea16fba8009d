use log::{debug, trace, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::ext::PathExt;
use crate::ignore::ExclusionEngine;

/// What one [`SourceDiscovery::discover`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Files appended to the accumulator.
    pub added: usize,
    /// Roots that did not exist or were not directories.
    pub missing_roots: Vec<PathBuf>,
}

/// Recursive file search honouring both exclusion tiers.
pub struct SourceDiscovery<'a> {
    engine: &'a ExclusionEngine,
}

impl<'a> SourceDiscovery<'a> {
    pub fn new(engine: &'a ExclusionEngine) -> Self {
        Self { engine }
    }

    /// Appends every accepted file under `roots` whose extension is in `extensions`
    /// (leading dot included) to `accumulator`, unless it is already there.
    ///
    /// A missing root contributes nothing and is reported instead of failing.
    pub fn discover<P, S>(
        &self,
        roots: &[P],
        extensions: &[S],
        accumulator: &mut Vec<PathBuf>,
    ) -> DiscoveryReport
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let mut report = DiscoveryReport::default();
        let mut known: HashSet<PathBuf> = accumulator.iter().cloned().collect();
        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                warn!("Search path does not exist: {}", root.display());
                report.missing_roots.push(root.to_path_buf());
                continue;
            }
            report.added += self.discover_root(root, extensions, accumulator, &mut known);
        }
        report
    }

    fn discover_root<S: AsRef<str>>(
        &self,
        root: &Path,
        extensions: &[S],
        accumulator: &mut Vec<PathBuf>,
        known: &mut HashSet<PathBuf>,
    ) -> usize {
        let marker_keywords = self.engine.marker_keywords(root);
        let mut added = 0;

        let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|entry| {
            let pruned = entry.file_type().is_dir() && self.engine.is_globally_excluded(entry.path());
            if pruned {
                trace!("Pruned directory: {}", entry.path().display());
            }
            !pruned
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under '{}': {e}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(extension) = path.dotted_extension() else {
                continue;
            };
            if !extensions.iter().any(|e| e.as_ref() == extension) {
                continue;
            }
            if !self.engine.accepts(path, &marker_keywords) {
                trace!("Excluded: {}", path.display());
                continue;
            }
            if !known.insert(path.to_path_buf()) {
                continue;
            }

            debug!("Found: {}", path.display());
            accumulator.push(path.to_path_buf());
            added += 1;
        }
        added
    }
}
