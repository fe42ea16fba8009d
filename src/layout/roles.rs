use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Canonical role of a directory found directly under a dependency's top marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirRole {
    Constraints,
    Docs,
    Netlists,
    Scripts,
    Settings,
    Simulation,
    Src,
    Other(String),
}

impl DirRole {
    /// Maps a directory name through the normalisation table.
    pub fn from_dir_name(name: &str) -> Self {
        match name {
            "constraints" | "constr" | "constrs" => DirRole::Constraints,
            "docs" | "doc" | "documents" | "documentation" => DirRole::Docs,
            "netlists" | "net" | "nets" => DirRole::Netlists,
            "scripts" | "script" => DirRole::Scripts,
            "settings" | "setting" => DirRole::Settings,
            "simulation" | "sim" | "sims" => DirRole::Simulation,
            "src" | "srcs" | "sources" => DirRole::Src,
            other => DirRole::Other(other.to_string()),
        }
    }

    /// Attribute name, e.g. `src_dir` or `constraints_dir`.
    pub fn attribute_name(&self) -> String {
        let base = match self {
            DirRole::Constraints => "constraints",
            DirRole::Docs => "docs",
            DirRole::Netlists => "netlists",
            DirRole::Scripts => "scripts",
            DirRole::Settings => "settings",
            DirRole::Simulation => "simulation",
            DirRole::Src => "src",
            DirRole::Other(name) => name.as_str(),
        };
        format!("{base}_dir")
    }
}

impl Display for DirRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.attribute_name())
    }
}

impl Serialize for DirRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.attribute_name())
    }
}
