//! Settings loading and validation

use crate::config::types::{
    CredentialsConfig, DependencyConfig, ExclusionConfig, NameList, TargetConfig, VendorProfile,
};
use crate::constants::{
    categories, vendors, DEFAULT_BOARD_SETTINGS, DEFAULT_LIBRARY_SUFFIX, REPO_ROOT_ENV,
    SETTINGS_FILENAMES,
};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::layout::LayoutSet;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Project settings: the build target, the dependency catalog and the layout templates.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Key of the dependency holding the design's top level.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub repo_root: Option<PathBuf>,
    #[serde(default)]
    pub top_level: Option<NameList>,
    #[serde(default)]
    pub project_name_override: Option<String>,
    #[serde(default = "get_default_checkout")]
    pub checkout: bool,
    #[serde(default)]
    pub target: TargetConfig,
    /// Key of the board dependency, if any.
    #[serde(default)]
    pub board: Option<String>,
    /// Board settings file stem, `default_settings` when unset.
    #[serde(default)]
    pub board_settings: Option<String>,
    #[serde(default)]
    pub exclusion: ExclusionConfig,
    #[serde(default = "get_default_supported_vendors")]
    pub supported_vendors: Vec<String>,
    #[serde(default)]
    pub vendors: IndexMap<String, VendorProfile>,
    #[serde(default = "get_default_categories")]
    pub categories: Vec<String>,
    /// Category to top directory name, for repositories whose directories differ from categories.
    #[serde(default)]
    pub category_mapping: IndexMap<String, String>,
    #[serde(default = "get_default_lib_append_categories")]
    pub lib_append_categories: Vec<String>,
    #[serde(default = "get_default_library_suffix")]
    pub library_suffix: String,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub layouts: LayoutSet,
    #[serde(default)]
    pub layouts_file: Option<PathBuf>,
    #[serde(default)]
    pub dependencies: IndexMap<String, DependencyConfig>,
}

impl Settings {
    /// Loads settings from a file, or from the first known settings file inside a directory.
    ///
    /// A relative `layouts_file` is resolved against the settings file's directory and merged
    /// into `layouts`; inline templates win on conflicting categories.
    pub fn load<P: AsRef<Path>>(location: P) -> Result<Self> {
        let location = location.as_ref();
        let settings_file = if location.is_dir() {
            find_settings_file(location)?
        } else {
            location.to_path_buf()
        };

        debug!("Loading settings from '{}'", settings_file.display());
        let mut settings: Settings = read_structured(&settings_file)?;

        if let Some(layouts_file) = settings.layouts_file.clone() {
            let base = settings_file.parent().unwrap_or_else(|| Path::new("."));
            let layouts_path =
                if layouts_file.is_absolute() { layouts_file } else { base.join(layouts_file) };
            settings.merge_layouts_file(&layouts_path)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Adds every category of `path` not already defined inline.
    pub fn merge_layouts_file(&mut self, path: &Path) -> Result<()> {
        debug!("Loading layouts from '{}'", path.display());
        let from_file: LayoutSet = read_structured(path)?;
        for (category, template) in from_file {
            self.layouts.entry(category).or_insert(template);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, dependency) in &self.dependencies {
            if dependency.url.trim().is_empty() {
                return Err(Error::ConfigValidation(format!(
                    "dependency '{name}' must have a non-empty url"
                )));
            }
            if dependency.path.trim().is_empty() {
                return Err(Error::ConfigValidation(format!(
                    "dependency '{name}' must have a non-empty path"
                )));
            }
        }

        if let Some(vendor) = self.target.vendor.as_deref().filter(|v| !v.is_empty()) {
            if !self.supported_vendors.iter().any(|v| v == vendor) {
                return Err(Error::ConfigValidation(format!(
                    "vendor '{vendor}' is not one of the supported vendors [{}]",
                    self.supported_vendors.join(", ")
                )));
            }
        }

        if self.exclusion.marker_filename.trim().is_empty() {
            return Err(Error::ConfigValidation(
                "exclusion.marker_filename must not be empty".into(),
            ));
        }

        for (vendor, profile) in &self.vendors {
            let extensions = profile.ip_extensions.iter().chain(&profile.constraint_extensions);
            for extension in extensions {
                if !extension.starts_with('.') || extension.len() < 2 {
                    return Err(Error::ConfigValidation(format!(
                        "extension '{extension}' of vendor '{vendor}' must start with '.' and have at least 1 character after it"
                    )));
                }
            }
        }

        for key in [&self.name, &self.board].into_iter().flatten() {
            if !self.dependencies.contains_key(key) {
                return Err(Error::ConfigValidation(format!(
                    "'{key}' is not a declared dependency"
                )));
            }
        }

        Ok(())
    }

    /// Configured repo root, then `$REPO_ROOT`.
    pub fn resolve_repo_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.repo_root {
            return Ok(root.clone());
        }
        std::env::var_os(REPO_ROOT_ENV).map(PathBuf::from).ok_or_else(|| {
            Error::ConfigValidation(format!(
                "repo_root is not configured and ${REPO_ROOT_ENV} is not set"
            ))
        })
    }

    /// Built-in extension profile for `vendor`, overridden by the `vendors` table.
    pub fn vendor_profile(&self, vendor: &str) -> VendorProfile {
        let builtin = VendorProfile::builtin(vendor);
        match self.vendors.get(vendor) {
            Some(custom) => VendorProfile {
                ip_extensions: if custom.ip_extensions.is_empty() {
                    builtin.ip_extensions
                } else {
                    custom.ip_extensions.clone()
                },
                constraint_extensions: if custom.constraint_extensions.is_empty() {
                    builtin.constraint_extensions
                } else {
                    custom.constraint_extensions.clone()
                },
            },
            None => builtin,
        }
    }

    /// Top directory name a category lives in.
    pub fn category_dir<'a>(&'a self, category: &'a str) -> &'a str {
        self.category_mapping.get(category).map(String::as_str).unwrap_or(category)
    }

    /// Category whose top directory is `dir`, or `dir` itself when nothing maps to it.
    pub fn category_for_dir<'a>(&'a self, dir: &'a str) -> &'a str {
        self.category_mapping
            .iter()
            .find(|(_, mapped)| mapped.as_str() == dir)
            .map(|(category, _)| category.as_str())
            .unwrap_or(dir)
    }

    /// File name of the board settings, `<board_settings>.yml`.
    pub fn board_settings_file(&self) -> String {
        match self.board_settings.as_deref().filter(|s| !s.is_empty()) {
            Some(stem) if stem.ends_with(".yml") || stem.ends_with(".yaml") => stem.to_string(),
            Some(stem) => format!("{stem}.yml"),
            None => DEFAULT_BOARD_SETTINGS.to_string(),
        }
    }
}

fn find_settings_file(dir: &Path) -> Result<PathBuf> {
    SETTINGS_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.exists())
        .ok_or_else(|| Error::ConfigNotFound {
            settings_dir: dir.display_string(),
            settings_files: SETTINGS_FILENAMES.join(", "),
        })
}

/// Reads JSON when the file ends in `.json`, YAML otherwise.
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Ok(serde_yaml::from_str(&content)?),
    }
}

fn get_default_checkout() -> bool {
    true
}

fn get_default_supported_vendors() -> Vec<String> {
    vec![vendors::XILINX.to_string(), vendors::ALTERA.to_string()]
}

fn get_default_categories() -> Vec<String> {
    [categories::LIBRARY, categories::BOARDS, categories::VENDOR_IP]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn get_default_lib_append_categories() -> Vec<String> {
    vec![categories::LIBRARY.to_string()]
}

fn get_default_library_suffix() -> String {
    DEFAULT_LIBRARY_SUFFIX.to_string()
}
