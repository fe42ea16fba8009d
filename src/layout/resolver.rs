use indexmap::IndexMap;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::roles::DirRole;
use super::tags::{resolve_tag, TagSource};
use super::LayoutTemplate;

/// Concrete paths produced from one layout template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLayout {
    /// Every terminal path, in traversal order. Duplicates are kept.
    pub paths: Vec<PathBuf>,
    /// Directories found directly under a top marker, keyed by normalised role.
    pub role_dirs: IndexMap<DirRole, PathBuf>,
    /// Known attributes that resolved to nothing while expanding.
    pub unset_attributes: Vec<String>,
}

impl ResolvedLayout {
    pub fn role_dir(&self, role: &DirRole) -> Option<&Path> {
        self.role_dirs.get(role).map(PathBuf::as_path)
    }
}

/// Expands a [`LayoutTemplate`] into absolute paths for one owner.
pub struct LayoutResolver<'a> {
    owner: &'a dyn TagSource,
    top_markers: Vec<String>,
}

impl<'a> LayoutResolver<'a> {
    /// # Arguments
    /// * `owner` - Attribute source used to bind `<ATTR>` tags
    /// * `top_markers` - Resolved directory names whose immediate children get a role
    pub fn new(owner: &'a dyn TagSource, top_markers: Vec<String>) -> Self {
        Self { owner, top_markers }
    }

    /// Walks `template` below `root`. Running it twice on identical input yields identical output.
    pub fn resolve(&self, template: &LayoutTemplate, root: &Path) -> ResolvedLayout {
        let mut resolved = ResolvedLayout::default();
        self.walk(template, root, &mut resolved);
        resolved
    }

    fn walk(&self, node: &LayoutTemplate, root: &Path, out: &mut ResolvedLayout) {
        match node {
            LayoutTemplate::Dir(entries) => {
                for (key, value) in entries {
                    let key = self.resolve_segment(key, out);
                    let path = root.join(&key);
                    if self.top_markers.contains(&key) {
                        self.record_roles(value, &path, out);
                    }
                    if value.is_terminal() {
                        debug!("Layout path: {}", path.display());
                        out.paths.push(path);
                    } else {
                        self.walk(value, &path, out);
                    }
                }
            }
            LayoutTemplate::List(items) => {
                for item in items {
                    match item {
                        LayoutTemplate::Leaf(name) => {
                            let name = self.resolve_segment(name, out);
                            let path = root.join(name);
                            debug!("Layout path: {}", path.display());
                            out.paths.push(path);
                        }
                        LayoutTemplate::Terminal => {}
                        nested => self.walk(nested, root, out),
                    }
                }
            }
            LayoutTemplate::Leaf(name) => {
                let name = self.resolve_segment(name, out);
                out.paths.push(root.join(name));
            }
            LayoutTemplate::Terminal => {}
        }
    }

    fn resolve_segment(&self, segment: &str, out: &mut ResolvedLayout) -> String {
        let resolution = resolve_tag(segment, self.owner);
        for attribute in resolution.unset {
            if !out.unset_attributes.contains(&attribute) {
                out.unset_attributes.push(attribute);
            }
        }
        resolution.value
    }

    /// Records the children of a top-marker node as role directories. First one wins.
    fn record_roles(&self, value: &LayoutTemplate, marker_path: &Path, out: &mut ResolvedLayout) {
        let mut children = Vec::new();
        match value {
            LayoutTemplate::Dir(entries) => children.extend(entries.keys().cloned()),
            LayoutTemplate::List(items) => {
                for item in items {
                    match item {
                        LayoutTemplate::Dir(entries) => children.extend(entries.keys().cloned()),
                        LayoutTemplate::Leaf(name) => children.push(name.clone()),
                        _ => {}
                    }
                }
            }
            _ => return,
        }

        for child in children {
            let name = self.resolve_segment(&child, out);
            if name.is_empty() {
                continue;
            }
            let role = DirRole::from_dir_name(&name);
            let dir = marker_path.join(&name);
            if let Some(existing) = out.role_dirs.get(&role) {
                warn!(
                    "More than one path found for {role}: keeping '{}', ignoring '{}'",
                    existing.display(),
                    dir.display()
                );
                continue;
            }
            debug!("Created attribute {role}: {}", dir.display());
            out.role_dirs.insert(role, dir);
        }
    }
}
