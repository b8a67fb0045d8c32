//! Archive-local names for fetched locations
//!
//! A location gets exactly one name per "will be rewritten" flag for the
//! whole run. Documents live under `content/`, opaque resources (images and
//! the like) under `content/resources/`.

use std::collections::{BTreeMap, HashMap};

use crate::utils::url::{url_basename, Url};

pub const CONTENT_DIRECTORY: &str = "content";
pub const RESOURCES_DIRECTORY: &str = "content/resources";

/// Used when a location has no usable last path segment
pub const FALLBACK_NAME: &str = "index";

/// A document called `resources` would shadow the resources directory
const RESERVED_NAME: &str = "resources";
const RESERVED_REPLACEMENT: &str = "resources-1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
    pub location: String,
    pub modify: bool,
}

#[derive(Debug, Default)]
pub struct NameRegistry {
    by_location: HashMap<(String, bool), String>,
    by_name: BTreeMap<String, RegistryEntry>,
}

impl NameRegistry {
    pub fn new() -> NameRegistry {
        NameRegistry::default()
    }

    pub fn resolve(&mut self, location: &Url, modify: bool) -> String {
        self.resolve_with_suffix(location, modify, None)
    }

    /// Returns the archive name of `location`, assigning one on first sight
    ///
    /// `suffix` is appended as an extension when the derived name has none.
    /// Names already taken by another location get `-2`, `-3`, ... inserted
    /// before the extension.
    pub fn resolve_with_suffix(&mut self, location: &Url, modify: bool, suffix: Option<&str>) -> String {
        let key = (location.as_str().to_string(), modify);
        if let Some(name) = self.by_location.get(&key) {
            return name.clone();
        }

        let (stem, extension) = derive_name(location, modify, suffix);
        let separator = if extension.is_empty() { "" } else { "." };

        let mut name = format!("{stem}{separator}{extension}");
        let mut i = 2;
        while self.by_name.contains_key(&name) {
            name = format!("{stem}-{i}{separator}{extension}");
            i += 1;
        }

        self.by_name.insert(
            name.clone(),
            RegistryEntry {
                location: key.0.clone(),
                modify,
            },
        );
        self.by_location.insert(key, name.clone());

        name
    }

    pub fn lookup(&self, location: &Url, modify: bool) -> Option<&str> {
        self.by_location
            .get(&(location.as_str().to_string(), modify))
            .map(String::as_str)
    }

    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.by_name.get(name)
    }

    pub fn location_of(&self, name: &str) -> Option<&str> {
        self.entry(name).map(|entry| entry.location.as_str())
    }

    /// True for names registered as rewritten documents
    pub fn is_document(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|entry| entry.modify)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Splits the would-be name into directory-qualified stem and extension
fn derive_name(location: &Url, modify: bool, suffix: Option<&str>) -> (String, String) {
    let mut base = sanitize_component(&url_basename(location));

    if base.is_empty() {
        base = FALLBACK_NAME.to_string();
    }
    if modify && base == RESERVED_NAME {
        base = RESERVED_REPLACEMENT.to_string();
    }

    let (stem, mut extension) = match base.split_once('.') {
        Some((stem, extension)) => (stem.to_string(), extension.to_string()),
        None => (base, String::new()),
    };
    if extension.is_empty() {
        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            extension = suffix.trim_start_matches('.').to_string();
        }
    }

    let directory = if modify {
        CONTENT_DIRECTORY
    } else {
        RESOURCES_DIRECTORY
    };

    (format!("{directory}/{stem}"), extension)
}

/// Decoded path segments may carry separators or characters archive readers
/// choke on
fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
