use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::constants::STDOUT_INDICATOR;
use crate::error::Result;

/// Recoverable condition met during a run; the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// A declared search root does not exist.
    MissingDependency { dependency: String, path: PathBuf },
    /// A known attribute had no value, so a layout segment resolved to nothing.
    AttributeResolution { dependency: String, attribute: String },
    /// A layout did not yield a directory with the given role.
    MissingRoleDir { dependency: String, role: String },
    /// A wrapper file lost against another file with the same name.
    DuplicateWrapper { library: String, path: PathBuf },
}

impl Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildWarning::MissingDependency { dependency, path } => {
                write!(f, "{dependency}: search path '{}' does not exist", path.display())
            }
            BuildWarning::AttributeResolution { dependency, attribute } => {
                write!(f, "{dependency}: attribute '{attribute}' has no value")
            }
            BuildWarning::MissingRoleDir { dependency, role } => {
                write!(f, "{dependency}: no {role} in layout")
            }
            BuildWarning::DuplicateWrapper { library, path } => {
                write!(f, "{library}: skipped duplicate wrapper '{}'", path.display())
            }
        }
    }
}

/// Everything the downstream build tool needs to compile the design.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildManifest {
    pub project_name: String,
    pub top_level_library: String,
    pub top_level_files: Vec<PathBuf>,
    /// HDL files per library, in discovery order.
    pub library_files: IndexMap<String, Vec<PathBuf>>,
    pub constraint_files: Vec<PathBuf>,
    pub ip_files: Vec<PathBuf>,
    pub build_output_path: PathBuf,
    pub warnings: Vec<BuildWarning>,
}

impl BuildManifest {
    /// Hex SHA-256 of the manifest's JSON form.
    pub fn fingerprint(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&json)))
    }
}

/// Consumer of the finished manifest, e.g. a compile-order or project generator.
pub trait BuildTool {
    fn consume(&mut self, manifest: &BuildManifest) -> Result<()>;
}

/// Writes the manifest as pretty JSON to a file or stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestWriter {
    destination: Option<PathBuf>,
}

impl ManifestWriter {
    /// `-` selects stdout.
    pub fn new(output: &str) -> Self {
        let destination = (output != STDOUT_INDICATOR).then(|| PathBuf::from(output));
        Self { destination }
    }

    pub fn destination_label(&self) -> String {
        match &self.destination {
            Some(path) => path.display().to_string(),
            None => "stdout".to_string(),
        }
    }
}

impl BuildTool for ManifestWriter {
    fn consume(&mut self, manifest: &BuildManifest) -> Result<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        match &self.destination {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, format!("{json}\n"))?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{json}")?;
            }
        }
        Ok(())
    }
}
