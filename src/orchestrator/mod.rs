//! One build run, from settings to the manifest handed to the build tool
//!
//! Phases run strictly in order and stop at the first hard error:
//! 1. dependencies are constructed and checked against the layouts, then brought onto
//!    disk and their layouts resolved
//! 2. board settings are applied and the exclusion context is built
//! 3. HDL, constraint and vendor IP files are discovered
//! 4. the top level is resolved and the project named

pub mod context;
pub mod manifest;

pub use context::BuildContext;
pub use manifest::{BuildManifest, BuildTool, BuildWarning, ManifestWriter};

use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{Settings, VendorProfile};
use crate::constants::{categories, extensions, BUILD_DIR};
use crate::dependency::Dependency;
use crate::discovery::{DiscoveryReport, SourceDiscovery};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::ignore::{resolve_build_vendor, vendor_exclusions, ExclusionEngine};
use crate::layout::DirRole;
use crate::naming::{top_level_name, ProjectNamer, TopLevelResolver};
use crate::repository::{CredentialCache, DependencyRepository, VersionControl};
use crate::vendor_ip::{validate_requirements, IpSourceCollector, IpSourceSet, VendorIpInstantiator};
use crate::wrapper;

/// Where the vendor tool builds the project.
///
/// Top levels living under `boards` build into `build/<project>`, everything else into
/// `build/<vendor>/<tool_version>/<project>`.
pub fn build_output_path(local_path: &Path, vendor: &str, tool_version: &str, project: &str) -> PathBuf {
    if local_path.display_string().contains(categories::BOARDS) {
        local_path.join(BUILD_DIR).join(project)
    } else {
        local_path.join(BUILD_DIR).join(vendor).join(tool_version).join(project)
    }
}

/// Runs every phase for one settings file.
pub struct BuildOrchestrator<'a> {
    settings: &'a Settings,
    vcs: &'a dyn VersionControl,
    credentials: CredentialCache,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(settings: &'a Settings, vcs: &'a dyn VersionControl, credentials: CredentialCache) -> Self {
        Self { settings, vcs, credentials }
    }

    /// Builds the manifest and hands it to `tool`. Nothing reaches `tool` after a hard error.
    pub fn run(&mut self, tool: &mut dyn BuildTool) -> Result<BuildManifest> {
        let manifest = self.build()?;
        tool.consume(&manifest)?;
        Ok(manifest)
    }

    pub fn build(&mut self) -> Result<BuildManifest> {
        let repo_root = self.settings.resolve_repo_root()?;
        info!("Repository root: {}", repo_root.display());
        let mut context = BuildContext::new(self.settings, repo_root);

        let mut dependencies = self.resolve_dependencies(&mut context)?;
        self.apply_board(&mut context, &mut dependencies)?;

        let vendor = resolve_build_vendor(context.target.vendor.as_deref(), &self.settings.supported_vendors)
            .ok_or_else(|| Error::ConfigValidation("no supported vendors configured".into()))?;
        let engine = ExclusionEngine::new(
            &self.settings.exclusion,
            vendor_exclusions(Some(&vendor), &self.settings.supported_vendors),
        )?;
        let profile = self.settings.vendor_profile(&vendor);

        let mut manifest = BuildManifest::default();
        for dependency in &dependencies {
            if dependency.default_include && !dependency.is_vendor_ip_master() {
                collect_sources(dependency, &engine, &profile, &mut manifest, &mut context);
            }
            if dependency.declares_vendor_ip() {
                collect_vendor_ip(dependency, &dependencies, &engine, &profile, &vendor, &mut manifest, &mut context)?;
            }
        }
        manifest.library_files.retain(|_, files| !files.is_empty());

        self.finish(&mut manifest, &dependencies, &context, &vendor)?;

        if !context.warnings.is_empty() {
            warn!("Completed with {} warning(s):", context.warnings.len());
            for warning in &context.warnings {
                warn!("  {warning}");
            }
        }
        manifest.warnings = context.warnings;
        Ok(manifest)
    }

    /// Phase 1: construct every enabled dependency, then sync them and resolve their layouts.
    ///
    /// Construction errors and missing layouts surface before the first checkout.
    fn resolve_dependencies(&mut self, context: &mut BuildContext) -> Result<Vec<Dependency>> {
        let mut dependencies = Vec::new();
        for (name, config) in &self.settings.dependencies {
            if !config.enabled {
                debug!("Dependency '{name}' is disabled");
                continue;
            }
            let dependency = Dependency::from_config(name, config, self.settings, &context.repo_root)?;
            if !self.settings.layouts.contains_key(&dependency.category) {
                return Err(Error::MissingLayout { category: dependency.category });
            }
            dependencies.push(dependency);
        }

        let mut repository =
            DependencyRepository::new(self.vcs, &mut self.credentials, self.settings.checkout);
        for dependency in &mut dependencies {
            repository.sync(dependency)?;
            dependency.resolve_layout(&self.settings.layouts, &context.repo_root)?;
            for attribute in &dependency.layout.unset_attributes {
                context.warn(BuildWarning::AttributeResolution {
                    dependency: dependency.name.clone(),
                    attribute: attribute.clone(),
                });
            }
        }
        Ok(dependencies)
    }

    /// Phase 2: the board's settings file takes precedence over the project target.
    fn apply_board(&self, context: &mut BuildContext, dependencies: &mut [Dependency]) -> Result<()> {
        let board_key = self.settings.board.as_deref();
        let Some(board) = dependencies
            .iter_mut()
            .find(|d| d.is_board() && board_key.is_none_or(|key| key == d.name))
        else {
            return Ok(());
        };

        info!("Found board: {}.{}", board.library_name, board.name);
        if let Some(settings) = board.load_board_settings()?.cloned() {
            context.apply_board_settings(&settings);
            board.target = board.target.overridden_by(&settings.target);
        }
        Ok(())
    }

    /// Phase 4: top-level files, project name and build path.
    fn finish(
        &self,
        manifest: &mut BuildManifest,
        dependencies: &[Dependency],
        context: &BuildContext,
        vendor: &str,
    ) -> Result<()> {
        let tool_version = context.target.tool_version.clone().unwrap_or_default();
        let board = dependencies
            .iter()
            .find(|d| d.is_board() && self.settings.board.as_deref().is_none_or(|key| key == d.name));
        let top = dependencies.iter().find(|d| d.is_top_level);

        let (library, local_path) = match (top, board) {
            (Some(top), _) => {
                info!("Found top level: {}.{}", top.library_name, top.name);
                (top.library_name.clone(), top.local_path.clone())
            }
            (None, Some(board)) => (
                board.library_name.clone(),
                board.local_path.join(vendor).join(&board.name).join(&tool_version),
            ),
            (None, None) => {
                return Err(Error::ConfigValidation(
                    "neither a top-level nor a board dependency is configured".into(),
                ))
            }
        };

        let top_files = TopLevelResolver::new(context.top_level_names.clone(), &self.settings.library_suffix)
            .resolve(&library, &manifest.library_files)?;
        let top_name = top_level_name(&context.top_level_names, &top_files);
        let project_name = ProjectNamer::new(
            self.settings.project_name_override.as_deref(),
            board.map(|b| b.name.as_str()),
        )
        .name(top_name.as_deref())?;

        manifest.build_output_path = build_output_path(&local_path, vendor, &tool_version, &project_name);
        info!("Build path: {}", manifest.build_output_path.display());
        manifest.project_name = project_name;
        manifest.top_level_library = library;
        manifest.top_level_files = top_files;
        Ok(())
    }
}

fn record_missing(context: &mut BuildContext, dependency: &str, report: DiscoveryReport) {
    for path in report.missing_roots {
        context.warn(BuildWarning::MissingDependency { dependency: dependency.to_string(), path });
    }
}

fn role_dir_or_warn<'d>(dependency: &'d Dependency, role: &DirRole, context: &mut BuildContext) -> Option<&'d Path> {
    let dir = dependency.role_dir(role);
    if dir.is_none() {
        context.warn(BuildWarning::MissingRoleDir {
            dependency: dependency.name.clone(),
            role: role.to_string(),
        });
    }
    dir
}

/// HDL sources into the dependency's library, constraints into the shared list.
fn collect_sources(
    dependency: &Dependency,
    engine: &ExclusionEngine,
    profile: &VendorProfile,
    manifest: &mut BuildManifest,
    context: &mut BuildContext,
) {
    info!("Processing: {}.{}", dependency.library_name, dependency.name);
    let discovery = SourceDiscovery::new(engine);

    if let Some(src_dir) = role_dir_or_warn(dependency, &DirRole::Src, context) {
        let files = manifest.library_files.entry(dependency.library_name.clone()).or_default();
        let report = discovery.discover(&[src_dir], extensions::HDL, files);
        record_missing(context, &dependency.name, report);
    }
    if let Some(constraints_dir) = role_dir_or_warn(dependency, &DirRole::Constraints, context) {
        let report = discovery.discover(
            &[constraints_dir],
            &profile.constraint_extensions,
            &mut manifest.constraint_files,
        );
        record_missing(context, &dependency.name, report);
    }
}

/// IP design, wrapper and constraint files for every enabled core the dependency declares.
fn collect_vendor_ip(
    dependency: &Dependency,
    dependencies: &[Dependency],
    engine: &ExclusionEngine,
    profile: &VendorProfile,
    vendor: &str,
    manifest: &mut BuildManifest,
    context: &mut BuildContext,
) -> Result<()> {
    let Some(catalog) = dependency.ip.as_ref() else {
        return Ok(());
    };
    validate_requirements(&dependency.name, &dependency.target, catalog)?;
    info!("Processing IP for: {}", dependency.name);

    let master = dependencies
        .iter()
        .find(|d| d.is_vendor_ip_master())
        .ok_or_else(|| Error::VendorIpRequirements {
            dependency: dependency.name.clone(),
            reason: "no default-included vendor_ip dependency provides the IP layout".into(),
        })?;
    let template = master.vendor_ip_template().unwrap_or_default();

    let entries = VendorIpInstantiator::new(template, &dependency.target).instantiate(catalog);
    let collector = IpSourceCollector::new(engine, vendor, profile);
    let mut wrappers: indexmap::IndexMap<String, Vec<PathBuf>> = indexmap::IndexMap::new();

    for entry in &entries {
        info!("Processing enabled IP: {}", entry.name);
        let mut sources = IpSourceSet::default();
        for report in collector.collect(entry, &mut sources) {
            record_missing(context, &entry.name, report);
        }
        extend_unique(&mut manifest.ip_files, sources.design_files);
        extend_unique(&mut manifest.constraint_files, sources.constraint_files);
        extend_unique(wrappers.entry(entry.library.clone()).or_default(), sources.wrapper_files);
    }

    for (library, candidates) in wrappers {
        let outcome = wrapper::deduplicate(&candidates);
        for path in outcome.skipped {
            context.warn(BuildWarning::DuplicateWrapper { library: library.clone(), path });
        }
        extend_unique(manifest.library_files.entry(library).or_default(), outcome.kept);
    }
    Ok(())
}

fn extend_unique(target: &mut Vec<PathBuf>, files: Vec<PathBuf>) {
    let mut known: HashSet<PathBuf> = target.iter().cloned().collect();
    for file in files {
        if known.insert(file.clone()) {
            target.push(file);
        }
    }
}
