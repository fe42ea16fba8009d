//! Two-tier path exclusion: global keywords and globs, then per-root marker files

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, error, info};
use std::fs::read_to_string;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::ExclusionConfig;
use crate::error::Result;
use crate::ext::PathExt;

/// Supported vendors other than the build vendor.
///
/// An unsupported build vendor falls back to the first supported vendor.
pub fn vendor_exclusions(vendor: Option<&str>, supported_vendors: &[String]) -> Vec<String> {
    let Some(build_vendor) = resolve_build_vendor(vendor, supported_vendors) else {
        return Vec::new();
    };
    let excluded: Vec<String> =
        supported_vendors.iter().filter(|v| **v != build_vendor).cloned().collect();
    debug!("Excluded vendors: {excluded:?}");
    excluded
}

/// The vendor used for the build: `vendor` when supported, else the first supported one.
pub fn resolve_build_vendor(vendor: Option<&str>, supported_vendors: &[String]) -> Option<String> {
    match vendor {
        Some(v) if supported_vendors.iter().any(|s| s == v) => Some(v.to_string()),
        _ => {
            let fallback = supported_vendors.first().cloned();
            error!(
                "Vendor {vendor:?} is not in the supported vendor list {supported_vendors:?}, using {fallback:?}"
            );
            fallback
        }
    }
}

/// Reads a marker file: one keyword per line, blank lines ignored.
pub fn parse_marker_file(path: &Path) -> Result<Vec<String>> {
    let contents = read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Global exclusion rules plus the marker file name used for per-root rules.
#[derive(Debug, Clone)]
pub struct ExclusionEngine {
    keywords: Vec<String>,
    patterns: Vec<String>,
    globs: GlobSet,
    marker_filename: String,
}

impl ExclusionEngine {
    /// # Arguments
    /// * `config` - Configured keywords, globs and marker file name
    /// * `vendor_keywords` - Automatic exclusions for vendors other than the build vendor
    pub fn new(config: &ExclusionConfig, vendor_keywords: Vec<String>) -> Result<Self> {
        let mut keywords: Vec<String> = Vec::new();
        for keyword in config.keywords.iter().cloned().chain(vendor_keywords) {
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        info!("Exclude keywords: {keywords:?}");
        Self::build(keywords, config.globs.clone(), config.marker_filename.clone())
    }

    fn build(keywords: Vec<String>, patterns: Vec<String>, marker_filename: String) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            debug!("Adding exclude pattern: {pattern} to globset");
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self { keywords, patterns, globs: builder.build()?, marker_filename })
    }

    /// Copy of this engine with additional global keywords.
    pub fn with_keywords<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut engine = self.clone();
        for keyword in extra {
            let keyword = keyword.into();
            if !keyword.is_empty() && !engine.keywords.contains(&keyword) {
                engine.keywords.push(keyword);
            }
        }
        engine
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn marker_filename(&self) -> &str {
        &self.marker_filename
    }

    /// Tier one: keyword substring or glob match on the absolute path.
    pub fn is_globally_excluded(&self, path: &Path) -> bool {
        let text = path.display_string();
        self.keywords.iter().any(|k| text.contains(k.as_str())) || self.globs.is_match(path)
    }

    /// Keywords from every marker file under `root`, skipping globally excluded directories.
    pub fn marker_keywords(&self, root: &Path) -> Vec<String> {
        let mut keywords = Vec::new();
        let markers = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_globally_excluded(entry.path()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file() && entry.file_name() == self.marker_filename.as_str()
            });

        for marker in markers {
            match parse_marker_file(marker.path()) {
                Ok(lines) => {
                    debug!("Exclude terms from '{}': {lines:?}", marker.path().display());
                    for line in lines {
                        if !keywords.contains(&line) {
                            keywords.push(line);
                        }
                    }
                }
                Err(e) => error!("Cannot read '{}': {e}", marker.path().display()),
            }
        }
        keywords
    }

    /// Both tiers: a path is accepted when no keyword of either tier occurs in it.
    pub fn accepts(&self, path: &Path, marker_keywords: &[String]) -> bool {
        if self.is_globally_excluded(path) {
            return false;
        }
        let text = path.display_string();
        !marker_keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn engine(keywords: &[&str], globs: &[&str]) -> ExclusionEngine {
        let config = ExclusionConfig {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            globs: globs.iter().map(|g| g.to_string()).collect(),
            ..Default::default()
        };
        ExclusionEngine::new(&config, Vec::new()).unwrap()
    }

    fn vendors() -> Vec<String> {
        vec!["xilinx".into(), "altera".into()]
    }

    #[test]
    fn other_vendors_are_excluded() {
        assert_eq!(vendor_exclusions(Some("xilinx"), &vendors()), vec!["altera"]);
        assert_eq!(vendor_exclusions(Some("altera"), &vendors()), vec!["xilinx"]);
    }

    #[test]
    fn unsupported_vendor_falls_back_to_first() {
        assert_eq!(resolve_build_vendor(Some("lattice"), &vendors()).as_deref(), Some("xilinx"));
        assert_eq!(vendor_exclusions(None, &vendors()), vec!["altera"]);
        assert!(vendor_exclusions(Some("xilinx"), &[]).is_empty());
    }

    #[test]
    fn marker_file_lines_are_trimmed() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("EXCLUDE");
        fs::write(&marker, "  vendor/altera \n\n\t\nold_\n").unwrap();
        assert_eq!(parse_marker_file(&marker).unwrap(), vec!["vendor/altera", "old_"]);
    }

    #[test]
    fn keywords_and_globs_exclude() {
        let engine = engine(&["deprecated"], &["**/*_tb.vhd"]);
        assert!(engine.is_globally_excluded(Path::new("/r/deprecated/a.vhd")));
        assert!(engine.is_globally_excluded(Path::new("/r/src/cpu_tb.vhd")));
        assert!(!engine.accepts(Path::new("/r/src/cpu_tb.vhd"), &[]));
        assert!(engine.accepts(Path::new("/r/src/cpu.vhd"), &[]));
        assert!(!engine.accepts(Path::new("/r/src/old_cpu.vhd"), &["old_".into()]));
    }

    #[test]
    fn repeated_keywords_are_kept_once() {
        let config = ExclusionConfig {
            keywords: vec!["altera".into(), "deprecated".into(), "".into()],
            ..Default::default()
        };
        let engine =
            ExclusionEngine::new(&config, vec!["deprecated".into(), "altera".into()]).unwrap();
        assert_eq!(engine.keywords(), ["altera", "deprecated"]);
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let config = ExclusionConfig { globs: vec!["a[".into()], ..Default::default() };
        assert!(ExclusionEngine::new(&config, Vec::new()).is_err());
    }

    #[test]
    fn marker_keywords_skip_pruned_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("ip/deprecated")).unwrap();
        fs::write(dir.path().join("ip/EXCLUDE"), "vendor/altera\n").unwrap();
        fs::write(dir.path().join("ip/deprecated/EXCLUDE"), "everything\n").unwrap();

        let engine = engine(&["deprecated"], &[]);
        assert_eq!(engine.marker_keywords(dir.path()), vec!["vendor/altera"]);
        assert!(engine.marker_keywords(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn adding_keywords_never_accepts_more() {
        let paths = [
            "/r/ip/fifo/vendor/altera/fifo.qsys",
            "/r/ip/fifo/vendor/xilinx/fifo.xci",
            "/r/src/cpu.vhd",
            "/r/old/cpu.vhd",
        ];
        let count = |engine: &ExclusionEngine, markers: &[String]| {
            paths.iter().filter(|p| engine.accepts(Path::new(p), markers)).count()
        };

        let base = engine(&[], &[]);
        let narrower = base.with_keywords(["old"]);
        let markers = vec!["altera".to_string()];

        assert!(count(&narrower, &[]) <= count(&base, &[]));
        assert!(count(&base, &markers) <= count(&base, &[]));
        assert!(count(&narrower, &markers) <= count(&narrower, &[]));
        assert_eq!(count(&narrower, &markers), 2);
    }
}
