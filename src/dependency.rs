//! Project dependencies and their per-category data

use indexmap::IndexMap;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{read_structured, BoardSettings, DependencyConfig, IpCatalog, Settings, TargetConfig};
use crate::constants::{categories, tags};
use crate::error::{Error, Result};
use crate::layout::{
    retag_paths, AttributeValue, DirRole, LayoutResolver, LayoutSet, ResolvedLayout, RetagAxis,
    TagSource,
};
use crate::repository;

/// Data only meaningful for one dependency category.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyKind {
    Library {
        /// Middle segment of a `category/contributor/name` path.
        contributor: Option<String>,
    },
    Board {
        /// File name searched for under the board's settings directory.
        settings_file: String,
        settings: Option<BoardSettings>,
    },
    VendorIp {
        /// Resolved layout turned back into a wildcard template.
        template: Vec<String>,
    },
    Other,
}

#[derive(Debug, Clone)]
pub struct Dependency {
    pub name: String,
    pub category: String,
    /// Root URL as configured; the credential cache is keyed by it.
    pub url: String,
    /// Path relative to the repository root.
    pub path: String,
    pub remote_path: String,
    pub local_path: PathBuf,
    pub remote_rev: Option<String>,
    pub required_libs: Vec<String>,
    pub is_top_level: bool,
    pub default_include: bool,
    /// Project target with this dependency's overrides applied.
    pub target: TargetConfig,
    pub library_name: String,
    pub attributes: IndexMap<String, String>,
    pub ip: Option<IpCatalog>,
    pub layout: ResolvedLayout,
    pub kind: DependencyKind,
}

impl Dependency {
    /// Builds a dependency from its settings entry. Performs no filesystem access.
    pub fn from_config(
        name: &str,
        config: &DependencyConfig,
        settings: &Settings,
        repo_root: &Path,
    ) -> Result<Self> {
        let category = category_from_path(&config.path, settings)?;
        let remote_path = repository::remote_path(
            &config.url,
            &config.path,
            config.subpath.as_deref(),
            settings.credentials.bitbucket_username.as_deref(),
        )?;
        let local_path = repository::local_path(repo_root, &config.path);
        let library_name = library_name_for(
            name,
            &category,
            &settings.lib_append_categories,
            &settings.library_suffix,
        );

        let kind = match category.as_str() {
            categories::LIBRARY => DependencyKind::Library {
                contributor: contributor_from_path(name, &config.path),
            },
            categories::BOARDS => {
                DependencyKind::Board { settings_file: settings.board_settings_file(), settings: None }
            }
            categories::VENDOR_IP => DependencyKind::VendorIp { template: Vec::new() },
            _ => DependencyKind::Other,
        };

        info!("Dependency '{name}': category {category}, library {library_name}");
        debug!("Remote path: {remote_path}");
        debug!("Local path: {}", local_path.display());

        Ok(Self {
            name: name.to_string(),
            category,
            url: config.url.clone(),
            path: config.path.clone(),
            remote_path,
            local_path,
            remote_rev: config.rev.clone(),
            required_libs: config.required_libs.clone(),
            is_top_level: settings.name.as_deref() == Some(name),
            default_include: config.default_include,
            target: settings.target.overridden_by(&config.target),
            library_name,
            attributes: config.attributes.clone(),
            ip: config.ip.clone().filter(|catalog| !catalog.is_empty()),
            layout: ResolvedLayout::default(),
            kind,
        })
    }

    pub fn is_board(&self) -> bool {
        matches!(self.kind, DependencyKind::Board { .. })
    }

    /// The dependency whose layout serves as template for every vendor IP core.
    pub fn is_vendor_ip_master(&self) -> bool {
        matches!(self.kind, DependencyKind::VendorIp { .. }) && self.default_include
    }

    pub fn declares_vendor_ip(&self) -> bool {
        self.ip.is_some()
    }

    pub fn role_dir(&self, role: &DirRole) -> Option<&Path> {
        self.layout.role_dir(role)
    }

    pub fn vendor_ip_template(&self) -> Option<&[String]> {
        match &self.kind {
            DependencyKind::VendorIp { template } => Some(template),
            _ => None,
        }
    }

    pub fn board_settings(&self) -> Option<&BoardSettings> {
        match &self.kind {
            DependencyKind::Board { settings, .. } => settings.as_ref(),
            _ => None,
        }
    }

    /// Directory names whose children become role directories.
    fn top_markers(&self) -> Vec<String> {
        match self.category.as_str() {
            categories::BOARDS | categories::VENDOR_IP => {
                self.target.tool_version.iter().cloned().collect()
            }
            _ => vec![self.name.clone()],
        }
    }

    /// Expands this dependency's category layout below `repo_root`.
    ///
    /// Vendor IP dependencies additionally keep a retagged copy of the result as template.
    pub fn resolve_layout(&mut self, layouts: &LayoutSet, repo_root: &Path) -> Result<()> {
        let template = layouts
            .get(&self.category)
            .ok_or_else(|| Error::MissingLayout { category: self.category.clone() })?;
        debug!("Using layout '{}' for '{}'", self.category, self.name);

        let resolved = LayoutResolver::new(&*self, self.top_markers()).resolve(template, repo_root);

        if let DependencyKind::VendorIp { .. } = self.kind {
            let axes = [
                RetagAxis::new(Some(self.name.as_str()), tags::NAME),
                RetagAxis::new(self.target.vendor.as_deref(), tags::VENDOR),
                RetagAxis::new(self.target.tool_version.as_deref(), tags::TOOL_VERSION),
                RetagAxis::new(self.target.family.as_deref(), tags::FAMILY),
                RetagAxis::new(self.target.device.as_deref(), tags::DEVICE),
            ];
            let retagged = retag_paths(&resolved.paths, &axes, repo_root);
            for path in &retagged {
                debug!("Vendor IP template path: {path}");
            }
            self.kind = DependencyKind::VendorIp { template: retagged };
        }

        self.layout = resolved;
        Ok(())
    }

    /// Finds and loads the board settings file under the board's settings directory.
    ///
    /// A board settings `ip` catalog makes the board a vendor IP declaring dependency.
    pub fn load_board_settings(&mut self) -> Result<Option<&BoardSettings>> {
        let Dependency { name, kind, layout, ip, .. } = self;
        let DependencyKind::Board { settings_file, settings } = kind else {
            return Ok(None);
        };
        let Some(settings_dir) = layout.role_dir(&DirRole::Settings) else {
            warn!("Board '{name}' has no settings directory in its layout");
            return Ok(None);
        };

        let mut found = None;
        for entry in WalkDir::new(settings_dir).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.file_name().to_string_lossy().contains(settings_file.as_str())
            {
                found = Some(entry);
                break;
            }
        }
        let Some(entry) = found else {
            warn!(
                "No board settings file '{settings_file}' found under '{}'",
                settings_dir.display()
            );
            return Ok(None);
        };

        info!("Found settings file for board '{name}': {}", entry.path().display());
        let loaded: BoardSettings = read_structured(entry.path())?;
        if let Some(catalog) = loaded.ip.as_ref().filter(|c| !c.is_empty()) {
            *ip = Some(catalog.clone());
        }
        *settings = Some(loaded);
        Ok(settings.as_ref())
    }
}

impl TagSource for Dependency {
    fn attribute(&self, name: &str) -> AttributeValue<'_> {
        match name {
            "name" => AttributeValue::from_option(Some(&self.name)),
            "category" => AttributeValue::from_option(Some(&self.category)),
            "url" => AttributeValue::from_option(Some(&self.url)),
            "library" | "lib" => AttributeValue::from_option(Some(&self.library_name)),
            "vendor" => AttributeValue::from_option(self.target.vendor.as_deref()),
            "tool_version" => AttributeValue::from_option(self.target.tool_version.as_deref()),
            "family" => AttributeValue::from_option(self.target.family.as_deref()),
            "device" => AttributeValue::from_option(self.target.device.as_deref()),
            "remote_rev" => AttributeValue::from_option(self.remote_rev.as_deref()),
            "contrib_lib" => match &self.kind {
                DependencyKind::Library { contributor } => {
                    AttributeValue::from_option(contributor.as_deref())
                }
                _ => AttributeValue::Unset,
            },
            other => match self.attributes.get(other) {
                Some(value) => AttributeValue::from_option(Some(value)),
                None => AttributeValue::Unknown,
            },
        }
    }
}

/// First path segment, mapped back through `category_mapping`; must be a supported category.
pub fn category_from_path(path: &str, settings: &Settings) -> Result<String> {
    let top = path.split('/').next().unwrap_or_default();
    let category = settings.category_for_dir(top);
    if settings.categories.iter().any(|c| c == category) {
        Ok(category.to_string())
    } else {
        Err(Error::UnknownCategory {
            path: path.to_string(),
            category: category.to_string(),
            supported: settings.categories.join(", "),
        })
    }
}

/// Contributor segment of a `category/contributor/name` path.
pub fn contributor_from_path(name: &str, path: &str) -> Option<String> {
    let segments: Vec<&str> = path.split('/').collect();
    match segments.as_slice() {
        [_, contributor, last] if *last == name => Some(contributor.to_string()),
        _ => {
            debug!("No contributor for '{name}'");
            None
        }
    }
}

/// HDL library name: `name` plus `suffix` for categories listed in `append_categories`.
pub fn library_name_for(
    name: &str,
    category: &str,
    append_categories: &[String],
    suffix: &str,
) -> String {
    if !append_categories.iter().any(|c| c == category) {
        return name.to_string();
    }
    if name.len() > suffix.len() && name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}
