use indexmap::IndexMap;
use log::{debug, warn};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Value of a named attribute as seen by a tag lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// Attribute is known and carries a non-empty value.
    Set(&'a str),
    /// Attribute is known but empty or not configured.
    Unset,
    /// No attribute of that name exists.
    Unknown,
}

impl<'a> AttributeValue<'a> {
    /// Maps an optional value onto `Set` or `Unset`, treating empty strings as unset.
    pub fn from_option(value: Option<&'a str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => AttributeValue::Set(v),
            _ => AttributeValue::Unset,
        }
    }
}

/// Anything that can answer `<ATTR>` lookups in layout templates.
pub trait TagSource {
    /// Looks up an attribute by its lower-case name (`<TOOL_VERSION>` asks for `tool_version`).
    fn attribute(&self, name: &str) -> AttributeValue<'_>;
}

/// Ad-hoc attribute table, mostly used for vendor IP substitution and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagValues {
    values: IndexMap<String, Option<String>>,
}

impl TagValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a known attribute; `None` marks it as known but unset.
    pub fn with(mut self, name: &str, value: Option<&str>) -> Self {
        self.values.insert(name.to_lowercase(), value.map(str::to_string));
        self
    }
}

impl TagSource for TagValues {
    fn attribute(&self, name: &str) -> AttributeValue<'_> {
        match self.values.get(name) {
            Some(value) => AttributeValue::from_option(value.as_deref()),
            None => AttributeValue::Unknown,
        }
    }
}

/// Outcome of resolving one template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagResolution {
    pub value: String,
    /// Known attributes that had no value; non-empty means `value` was blanked.
    pub unset: Vec<String>,
}

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"<([^<>]+)>").expect("tag pattern is valid"))
}

/// Returns true when `segment` carries at least one `<...>` tag.
pub fn has_tag(segment: &str) -> bool {
    tag_regex().is_match(segment)
}

/// Binds every `<ATTR>` tag in `segment` to the owner's attribute values.
///
/// * No tag: the segment is returned unchanged.
/// * Known attribute with a value: the tag is replaced by the value.
/// * Known attribute without a value: the whole segment resolves to an empty string
///   and the attribute is reported in [`TagResolution::unset`].
/// * Unknown attribute: the tag is kept literally.
pub fn resolve_tag(segment: &str, owner: &dyn TagSource) -> TagResolution {
    if !has_tag(segment) {
        return TagResolution { value: segment.to_string(), unset: Vec::new() };
    }

    let mut unset = Vec::new();
    let value = tag_regex()
        .replace_all(segment, |caps: &Captures| {
            let name = caps[1].to_lowercase();
            match owner.attribute(&name) {
                AttributeValue::Set(v) => v.to_string(),
                AttributeValue::Unset => {
                    unset.push(name);
                    String::new()
                }
                AttributeValue::Unknown => {
                    debug!("Attribute not found for tag '{}', keeping it literal", &caps[0]);
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    if unset.is_empty() {
        debug!("Resolved '{segment}' to '{value}'");
        TagResolution { value, unset }
    } else {
        warn!("Attribute(s) {unset:?} have no value, '{segment}' resolves to an empty string");
        TagResolution { value: String::new(), unset }
    }
}

/// Replaces every occurrence of `tag` with `value` without any attribute lookup.
pub fn substitute(template: &str, tag: &str, value: &str) -> String {
    template.replace(tag, value)
}
