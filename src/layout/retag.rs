use log::{debug, warn};
use std::path::Path;

use crate::ext::PathExt;

/// One dynamic axis to turn back into a tag, e.g. the vendor name into `<VENDOR>`.
#[derive(Debug, Clone, Copy)]
pub struct RetagAxis<'a> {
    pub term: Option<&'a str>,
    pub tag: &'a str,
}

impl<'a> RetagAxis<'a> {
    pub fn new(term: Option<&'a str>, tag: &'a str) -> Self {
        Self { term, tag }
    }
}

/// Converts one concrete path back into a wildcard template.
///
/// The anchor is `{repo_root}/{term}`; everything after it has `term` replaced by `tag`.
/// When the anchor is absent the repo root itself is used as anchor. A path outside the
/// repo root is returned unchanged.
///
/// # Examples
/// ```
/// use hdlmanifest::layout::retag_path;
/// use std::path::Path;
///
/// let retagged = retag_path(
///     "/repo/vendor_ip/xilinx/vendor_ip/src",
///     "vendor_ip",
///     "<NAME>",
///     Path::new("/repo"),
/// );
/// assert_eq!(retagged, "/repo/vendor_ip/xilinx/<NAME>/src");
/// ```
pub fn retag_path(path: &str, term: &str, tag: &str, repo_root: &Path) -> String {
    if term.is_empty() {
        return path.to_string();
    }

    let root = repo_root.display_string();
    let root = root.trim_end_matches('/');
    let term_root = format!("{root}/{term}");

    let (anchor, rest) = match strip_anchor(path, &term_root) {
        Some(rest) => (term_root.as_str(), rest),
        None => match strip_anchor(path, root) {
            Some(rest) => {
                debug!("'{term_root}' not found in '{path}', anchoring at repo root");
                (root, rest)
            }
            None => {
                warn!("Cannot retag '{path}': not under repo root '{root}'");
                return path.to_string();
            }
        },
    };

    let renamed = rest.replace(term, tag);
    let rebuilt = if renamed.is_empty() { anchor.to_string() } else { format!("{anchor}/{renamed}") };
    debug!("Rebuilt layout: {rebuilt}");
    rebuilt
}

/// Applies each axis in turn to every path, skipping axes without a term.
pub fn retag_paths<P: AsRef<Path>>(
    paths: &[P],
    axes: &[RetagAxis<'_>],
    repo_root: &Path,
) -> Vec<String> {
    let mut retagged: Vec<String> =
        paths.iter().map(|p| p.as_ref().display_string()).collect();
    for axis in axes {
        let Some(term) = axis.term.filter(|t| !t.is_empty()) else {
            continue;
        };
        retagged = retagged
            .iter()
            .map(|p| retag_path(p, term, axis.tag, repo_root))
            .collect();
    }
    retagged
}

/// Returns what follows `anchor` in `path` when `anchor` is a whole-segment prefix.
fn strip_anchor<'p>(path: &'p str, anchor: &str) -> Option<&'p str> {
    let rest = path.strip_prefix(anchor)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}
