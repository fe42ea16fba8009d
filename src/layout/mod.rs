//! Layout templates: nested directory descriptions expanded per dependency.

pub mod resolver;
pub mod retag;
pub mod roles;
pub mod tags;

pub use resolver::{LayoutResolver, ResolvedLayout};
pub use retag::{retag_path, retag_paths, RetagAxis};
pub use roles::DirRole;
pub use tags::{resolve_tag, AttributeValue, TagResolution, TagSource, TagValues};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One node of a layout template.
///
/// ```yaml
/// <NAME>:
///   - src:
///       - <NAME>_top.vhd
///   - constraints: ~
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LayoutTemplate {
    /// `null`: the key above is a terminal directory.
    Terminal,
    /// A terminal leaf name.
    Leaf(String),
    /// Nested templates or leaf names.
    List(Vec<LayoutTemplate>),
    /// Directory names (possibly tag-bearing) mapped to their children.
    Dir(IndexMap<String, LayoutTemplate>),
}

impl LayoutTemplate {
    /// `null`, empty strings, empty lists and empty maps all mark a terminal directory.
    pub fn is_terminal(&self) -> bool {
        match self {
            LayoutTemplate::Terminal => true,
            LayoutTemplate::Leaf(s) => s.is_empty(),
            LayoutTemplate::List(items) => items.is_empty(),
            LayoutTemplate::Dir(map) => map.is_empty(),
        }
    }
}

/// Layout templates keyed by dependency category.
pub type LayoutSet = IndexMap<String, LayoutTemplate>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nested_yaml() {
        let yaml = r#"
<NAME>:
  - src:
      - <NAME>_top.vhd
  - constraints: ~
"#;
        let template: LayoutTemplate = serde_yaml::from_str(yaml).unwrap();
        let LayoutTemplate::Dir(root) = &template else { panic!("Expected Dir") };
        let LayoutTemplate::List(items) = &root["<NAME>"] else { panic!("Expected List") };
        assert_eq!(items.len(), 2);
        let LayoutTemplate::Dir(constraints) = &items[1] else { panic!("Expected Dir") };
        assert!(constraints["constraints"].is_terminal());
    }

    #[test]
    fn deserializes_json_null_as_terminal() {
        let template: LayoutTemplate =
            serde_json::from_str(r#"{"src": {"<NAME>_top.vhd": null}}"#).unwrap();
        let LayoutTemplate::Dir(root) = template else { panic!("Expected Dir") };
        let LayoutTemplate::Dir(src) = &root["src"] else { panic!("Expected Dir") };
        assert_eq!(src["<NAME>_top.vhd"], LayoutTemplate::Terminal);
    }
}
