//! Vendor IP cores materialised from the master vendor IP layout

use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{IpCatalog, IpCatalogNode, IpCoreConfig, TargetConfig, VendorProfile};
use crate::constants::{extensions, ip_exclusions, tags, vendors, COMMON_WRAPPER_DIR, WRAPPER_SUFFIX};
use crate::discovery::{DiscoveryReport, SourceDiscovery};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::ignore::ExclusionEngine;
use crate::layout::tags::substitute;
use crate::layout::DirRole;

/// One enabled IP core with its search paths and classified directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorIpCatalogEntry {
    pub name: String,
    pub category: String,
    /// Empty when the core sits directly under its category.
    pub subcategory: String,
    pub library: String,
    pub wrapper_file: Option<String>,
    pub search_paths: Vec<PathBuf>,
    pub classified_dirs: IndexMap<DirRole, Vec<PathBuf>>,
}

impl VendorIpCatalogEntry {
    fn new(name: &str, category: &str, subcategory: &str, core: &IpCoreConfig) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            library: core.library.clone(),
            wrapper_file: core.wrapper_file.clone().filter(|w| !w.is_empty()),
            search_paths: Vec::new(),
            classified_dirs: IndexMap::new(),
        }
    }

    pub fn dirs(&self, role: &DirRole) -> &[PathBuf] {
        self.classified_dirs.get(role).map(Vec::as_slice).unwrap_or_default()
    }

    /// Name of the shared wrapper directory: the wrapper file without its `_wrapper` suffix.
    pub fn common_wrapper_name(&self) -> Option<&str> {
        self.wrapper_file.as_deref().map(|w| w.strip_suffix(WRAPPER_SUFFIX).unwrap_or(w))
    }
}

/// Enabled cores of `catalog` keyed by name; a later core with the same name replaces an earlier one.
pub fn enabled_entries(catalog: &IpCatalog) -> IndexMap<String, VendorIpCatalogEntry> {
    let mut entries = IndexMap::new();
    for (category, nodes) in catalog {
        for (key, node) in nodes {
            match node {
                IpCatalogNode::Core(core) if core.enabled => {
                    debug!("No subcategory: {category}|{key}");
                    entries.insert(key.clone(), VendorIpCatalogEntry::new(key, category, "", core));
                }
                IpCatalogNode::Subcategory(cores) => {
                    for (name, core) in cores.iter().filter(|(_, core)| core.enabled) {
                        debug!("Subcategory: {category}|{key}|{name}");
                        entries
                            .insert(name.clone(), VendorIpCatalogEntry::new(name, category, key, core));
                    }
                }
                IpCatalogNode::Core(_) => {}
            }
        }
    }
    entries
}

/// Vendor IP needs a complete target; an enabled core also needs a library.
pub fn validate_requirements(
    dependency: &str,
    target: &TargetConfig,
    catalog: &IpCatalog,
) -> Result<()> {
    let missing = target.missing_fields();
    if !missing.is_empty() {
        return Err(Error::VendorIpRequirements {
            dependency: dependency.to_string(),
            reason: format!("missing {}", missing.join(", ")),
        });
    }
    if let Some(entry) = enabled_entries(catalog).values().find(|e| e.library.is_empty()) {
        return Err(Error::VendorIpRequirements {
            dependency: dependency.to_string(),
            reason: format!("IP core '{}' has no library", entry.name),
        });
    }
    Ok(())
}

/// Builds per-core search paths from the master template.
pub struct VendorIpInstantiator {
    /// Master template with target tags bound, each path ending in `<NAME>`.
    template: Vec<String>,
}

impl VendorIpInstantiator {
    /// Binds `<VENDOR>`, `<TOOL_VERSION>`, `<FAMILY>` and `<DEVICE>` once for the whole run.
    pub fn new(master_template: &[String], target: &TargetConfig) -> Self {
        let bindings = [
            (tags::VENDOR, target.vendor.as_deref()),
            (tags::TOOL_VERSION, target.tool_version.as_deref()),
            (tags::FAMILY, target.family.as_deref()),
            (tags::DEVICE, target.device.as_deref()),
        ];

        let mut template: Vec<String> = Vec::new();
        for path in master_template {
            let bound = bindings
                .iter()
                .fold(path.clone(), |acc, (tag, value)| substitute(&acc, tag, value.unwrap_or_default()));
            let head = bound.split(tags::NAME).next().unwrap_or_default().trim_end_matches('/');
            let rooted = format!("{head}/{}", tags::NAME);
            if !template.contains(&rooted) {
                info!("Master vendor IP path: {rooted}");
                template.push(rooted);
            }
        }
        Self { template }
    }

    pub fn template(&self) -> &[String] {
        &self.template
    }

    /// Primary paths for the entry, then common wrapper paths not already present.
    pub fn search_paths(&self, entry: &VendorIpCatalogEntry) -> Vec<PathBuf> {
        let bind = |path: &str, name: &str| -> PathBuf {
            let bound = substitute(path, tags::NAME, name);
            let bound = substitute(&bound, tags::IPCAT, &entry.category);
            let bound = substitute(&bound, tags::IPSUBCAT, &entry.subcategory);
            Path::new(&bound).normalize_lexically()
        };

        let mut paths: Vec<PathBuf> = self.template.iter().map(|p| bind(p, &entry.name)).collect();

        if let Some(wrapper_name) = entry.common_wrapper_name() {
            for path in self.template.iter().filter(|p| p.contains(COMMON_WRAPPER_DIR)) {
                let common = bind(path, wrapper_name);
                if !paths.contains(&common) {
                    paths.push(common);
                }
            }
        }

        for path in &paths {
            info!("IP search path for '{}': {}", entry.name, path.display());
        }
        paths
    }

    /// Resolves every enabled core of `catalog`; identical inputs and disk state give identical entries.
    pub fn instantiate(&self, catalog: &IpCatalog) -> Vec<VendorIpCatalogEntry> {
        enabled_entries(catalog)
            .into_values()
            .map(|mut entry| {
                entry.search_paths = self.search_paths(&entry);
                entry.classified_dirs = classify_subdirs(&entry.search_paths);
                entry
            })
            .collect()
    }
}

/// Immediate subdirectories of each path, grouped by role. Missing paths contribute nothing.
pub fn classify_subdirs(paths: &[PathBuf]) -> IndexMap<DirRole, Vec<PathBuf>> {
    let mut classified: IndexMap<DirRole, Vec<PathBuf>> = IndexMap::new();
    for path in paths {
        let Ok(read_dir) = fs::read_dir(path) else {
            debug!("Cannot list '{}'", path.display());
            continue;
        };
        let mut subdirs: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| entry.path())
            .collect();
        subdirs.sort();

        for dir in subdirs {
            let role = DirRole::from_dir_name(dir.file_name_str());
            debug!("Top-level path {role}: {}", dir.display());
            let dirs = classified.entry(role).or_default();
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
    }
    classified
}

/// Keywords added on top of the global ones for (IP design files, IP wrapper HDL files).
pub fn ip_exclusion_keywords(vendor: &str, ip_name: &str) -> (Vec<String>, Vec<String>) {
    let mut design: Vec<String> = ip_exclusions::DESIGN.iter().map(|k| k.to_string()).collect();
    let mut wrapper: Vec<String> = ip_exclusions::WRAPPER.iter().map(|k| k.to_string()).collect();
    if vendor == vendors::ALTERA {
        let generated = format!("/ip/{ip_name}");
        info!("Excluding generated IP path: {generated}");
        design.insert(0, generated.clone());
        wrapper.insert(0, generated);
    }
    (design, wrapper)
}

/// Files found for one IP core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpSourceSet {
    pub design_files: Vec<PathBuf>,
    pub wrapper_files: Vec<PathBuf>,
    pub constraint_files: Vec<PathBuf>,
}

/// Collects design, wrapper and constraint files of IP cores.
pub struct IpSourceCollector<'a> {
    engine: &'a ExclusionEngine,
    vendor: &'a str,
    profile: &'a VendorProfile,
}

impl<'a> IpSourceCollector<'a> {
    pub fn new(engine: &'a ExclusionEngine, vendor: &'a str, profile: &'a VendorProfile) -> Self {
        Self { engine, vendor, profile }
    }

    /// Appends the entry's files to `sources`, returning the reports of every search.
    pub fn collect(
        &self,
        entry: &VendorIpCatalogEntry,
        sources: &mut IpSourceSet,
    ) -> Vec<DiscoveryReport> {
        let (design_keywords, wrapper_keywords) = ip_exclusion_keywords(self.vendor, &entry.name);
        let src_dirs = entry.dirs(&DirRole::Src);
        let constraint_dirs = entry.dirs(&DirRole::Constraints);
        if src_dirs.is_empty() {
            debug!("IP core '{}' has no source directory", entry.name);
        }

        let design_engine = self.engine.with_keywords(design_keywords);
        let wrapper_engine = self.engine.with_keywords(wrapper_keywords);

        info!("Searching for vendor IP design files of '{}'", entry.name);
        let design = SourceDiscovery::new(&design_engine).discover(
            src_dirs,
            &self.profile.ip_extensions,
            &mut sources.design_files,
        );
        info!("Searching for vendor IP HDL wrapper files of '{}'", entry.name);
        let wrappers = SourceDiscovery::new(&wrapper_engine).discover(
            src_dirs,
            extensions::HDL,
            &mut sources.wrapper_files,
        );
        let constraints = SourceDiscovery::new(self.engine).discover(
            constraint_dirs,
            &self.profile.constraint_extensions,
            &mut sources.constraint_files,
        );
        vec![design, wrappers, constraints]
    }
}
