//! Typed building blocks of the settings file

use crate::constants::{extensions, DEFAULT_MARKER_FILENAME};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single name or a list of names (`top_level: cpu_top` or `top_level: [a, b]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NameList {
    One(String),
    Many(Vec<String>),
}

impl NameList {
    /// Non-empty names in declaration order.
    pub fn names(&self) -> Vec<String> {
        match self {
            NameList::One(name) => vec![name.clone()],
            NameList::Many(names) => names.clone(),
        }
        .into_iter()
        .filter(|n| !n.is_empty())
        .collect()
    }
}

/// FPGA target description shared by the project, dependencies and board settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub tool_version: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
}

impl TargetConfig {
    /// Fields set in `other` take precedence over the ones in `self`.
    pub fn overridden_by(&self, other: &TargetConfig) -> TargetConfig {
        TargetConfig {
            vendor: other.vendor.clone().or_else(|| self.vendor.clone()),
            tool_version: other.tool_version.clone().or_else(|| self.tool_version.clone()),
            family: other.family.clone().or_else(|| self.family.clone()),
            device: other.device.clone().or_else(|| self.device.clone()),
        }
    }

    /// Names of the fields that are missing or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("vendor", &self.vendor),
            ("tool_version", &self.tool_version),
            ("family", &self.family),
            ("device", &self.device),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Global exclusion settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExclusionConfig {
    /// Substrings that exclude any path containing them.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Glob patterns matched against absolute paths.
    #[serde(default)]
    pub globs: Vec<String>,
    /// Name of the per-directory marker file listing extra keywords.
    #[serde(default = "get_default_marker_filename")]
    pub marker_filename: String,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            globs: Vec::new(),
            marker_filename: get_default_marker_filename(),
        }
    }
}

/// Extensions collected for one FPGA vendor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VendorProfile {
    #[serde(default)]
    pub ip_extensions: Vec<String>,
    #[serde(default)]
    pub constraint_extensions: Vec<String>,
}

impl VendorProfile {
    /// Built-in profile for `vendor`, empty when the vendor is not known.
    pub fn builtin(vendor: &str) -> Self {
        let (ip, constraints): (&[&str], &[&str]) = match vendor {
            crate::constants::vendors::XILINX => {
                (extensions::XILINX_IP, extensions::XILINX_CONSTRAINTS)
            }
            crate::constants::vendors::ALTERA => {
                (extensions::ALTERA_IP, extensions::ALTERA_CONSTRAINTS)
            }
            _ => (&[], &[]),
        };
        Self {
            ip_extensions: ip.iter().map(|e| e.to_string()).collect(),
            constraint_extensions: constraints.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Usernames used when talking to remote repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub username: Option<String>,
    /// Injected into the netloc of bitbucket-hosted URLs.
    #[serde(default)]
    pub bitbucket_username: Option<String>,
}

/// One vendor IP core in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IpCoreConfig {
    pub enabled: bool,
    #[serde(default)]
    pub library: String,
    #[serde(default)]
    pub wrapper_file: Option<String>,
}

/// Second catalog level: either a core directly or a subcategory of cores.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IpCatalogNode {
    Core(IpCoreConfig),
    Subcategory(IndexMap<String, IpCoreConfig>),
}

/// `category -> (name | subcategory -> name) -> core`.
pub type IpCatalog = IndexMap<String, IndexMap<String, IpCatalogNode>>;

/// Settings of one project dependency.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DependencyConfig {
    pub url: String,
    /// Path relative to the repository root; its first segment names the category.
    pub path: String,
    #[serde(default)]
    pub subpath: Option<String>,
    #[serde(default)]
    pub rev: Option<String>,
    #[serde(default = "get_default_enabled")]
    pub enabled: bool,
    /// Whether the dependency's sources are collected by default.
    #[serde(default)]
    pub default_include: bool,
    #[serde(default)]
    pub required_libs: Vec<String>,
    /// Extra attribute values available as layout tags.
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    #[serde(flatten)]
    pub target: TargetConfig,
    /// Vendor IP catalog declared by this dependency.
    #[serde(default)]
    pub ip: Option<IpCatalog>,
}

/// Contents of a board settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BoardSettings {
    #[serde(flatten)]
    pub target: TargetConfig,
    #[serde(default)]
    pub top_level: Option<NameList>,
    #[serde(default)]
    pub ip: Option<IpCatalog>,
}

fn get_default_marker_filename() -> String {
    DEFAULT_MARKER_FILENAME.to_string()
}

fn get_default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_list_accepts_string_or_list() {
        let one: NameList = serde_yaml::from_str("cpu_top").unwrap();
        assert_eq!(one.names(), vec!["cpu_top".to_string()]);
        let many: NameList = serde_yaml::from_str("[a, '', b]").unwrap();
        assert_eq!(many.names(), vec!["a".to_string(), "b".to_string()]);
        let empty: NameList = serde_yaml::from_str("''").unwrap();
        assert!(empty.names().is_empty());
    }

    #[test]
    fn target_override_prefers_other() {
        let project = TargetConfig {
            vendor: Some("xilinx".into()),
            tool_version: Some("2018.3".into()),
            ..Default::default()
        };
        let board = TargetConfig { tool_version: Some("2019.1".into()), ..Default::default() };
        let merged = project.overridden_by(&board);
        assert_eq!(merged.vendor.as_deref(), Some("xilinx"));
        assert_eq!(merged.tool_version.as_deref(), Some("2019.1"));
        assert_eq!(merged.missing_fields(), vec!["family", "device"]);
    }

    #[test]
    fn catalog_distinguishes_cores_from_subcategories() {
        let yaml = r#"
memory:
  fifo:
    enabled: true
    library: fifo_lib
    wrapper_file: fifo_wrapper
  ram:
    dual_port:
      enabled: false
      library: ram_lib
"#;
        let catalog: IpCatalog = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(catalog["memory"]["fifo"], IpCatalogNode::Core(_)));
        let IpCatalogNode::Subcategory(ram) = &catalog["memory"]["ram"] else {
            panic!("Expected Subcategory")
        };
        assert!(!ram["dual_port"].enabled);
    }

    #[test]
    fn builtin_vendor_profiles() {
        assert_eq!(VendorProfile::builtin("xilinx").ip_extensions, vec![".xci"]);
        assert_eq!(
            VendorProfile::builtin("altera").constraint_extensions,
            vec![".sdc", ".qsf", ".tcl"]
        );
        assert!(VendorProfile::builtin("lattice").ip_extensions.is_empty());
    }

    #[test]
    fn dependency_defaults() {
        let dep: DependencyConfig =
            serde_yaml::from_str("url: https://git.example.org/repo\npath: libs/fifo\n").unwrap();
        assert!(dep.enabled);
        assert!(!dep.default_include);
        assert!(dep.required_libs.is_empty());
        assert_eq!(dep.target, TargetConfig::default());
    }
}
