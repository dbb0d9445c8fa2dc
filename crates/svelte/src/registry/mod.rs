//! Prose component registry: which HTML tags are rendered through which Svelte components.

mod scan;

pub use scan::{alias_directory, scan_prose_components};

use crate::transform::script::Import;
use indexmap::IndexMap;
use jana_core::JanaError;
use std::path::Path;

/// File extension of component files discovered in the prose directory.
pub const COMPONENT_EXTENSION: &str = "svelte";

/// Default prose component directory, relative to the project root.
pub const DEFAULT_PROSE_DIR: &str = "src/lib/components/prose";

/// HTML tags that may be mapped to prose components.
pub const PROSE_TAGS: &[&str] = &[
    "a",
    "blockquote",
    "code",
    "del",
    "em",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "img",
    "li",
    "ol",
    "p",
    "pre",
    "strong",
    "table",
    "tbody",
    "td",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Returns true if `tag` is a recognized lowercase prose tag.
pub fn is_prose_tag(tag: &str) -> bool {
    PROSE_TAGS.contains(&tag)
}

/// A prose tag mapped to the component that renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEntry {
    /// Lowercase HTML tag (e.g. `p`).
    pub tag: String,
    /// Component binding and wrapper tag name (e.g. `P`).
    pub name: String,
    /// Module path used in the import (e.g. `$lib/components/prose/P.svelte`).
    pub path: String,
}

impl ComponentEntry {
    /// Creates an entry, deriving the component name from `path`.
    pub fn new(tag: impl Into<String>, path: impl Into<String>) -> Self {
        let tag = tag.into();
        let path = path.into();
        let name = component_name(&tag, &path);
        Self { tag, name, path }
    }

    /// The import statement for this component.
    pub fn import_line(&self) -> String {
        Import {
            binding: &self.name,
            source: &self.path,
        }
        .to_string()
    }
}

/// Read-only mapping from lowercase prose tag to component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRegistry {
    entries: IndexMap<String, ComponentEntry>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `root/prose_dir` into a registry.
    pub fn build(root: &Path, prose_dir: &str) -> Result<Self, JanaError> {
        let scanned = scan_prose_components(root, prose_dir)?;
        log::debug!(
            "found {} prose component(s) in {}",
            scanned.len(),
            root.join(prose_dir).display()
        );
        Ok(Self::from_paths(&scanned))
    }

    /// Builds a registry from a tag to path mapping.
    pub fn from_paths(paths: &IndexMap<String, String>) -> Self {
        let mut registry = Self::new();
        for (tag, path) in paths {
            registry.insert(tag, path);
        }
        registry
    }

    /// Inserts or replaces the component for `tag`.
    ///
    /// The tag is lowercased. Returns false and leaves the registry untouched
    /// if it is not a recognized prose tag.
    ///
    /// Every import path gets its own binding. A path already registered for
    /// another tag reuses that binding; otherwise, when the derived name is
    /// already bound to another path, the capitalized tag is used instead,
    /// with a numeric suffix if that is taken too.
    pub fn insert(&mut self, tag: &str, path: &str) -> bool {
        let tag = tag.to_ascii_lowercase();
        if !is_prose_tag(&tag) {
            log::warn!("Ignoring component for unsupported tag `{}` ({})", tag, path);
            return false;
        }

        let mut entry = ComponentEntry::new(tag.clone(), path);
        let shared = self
            .entries
            .values()
            .find(|other| other.tag != tag && other.path == path);
        if let Some(other) = shared {
            entry.name = other.name.clone();
        } else if self.is_bound_elsewhere(&tag, &entry.name, path) {
            let fallback = capitalize(&tag);
            let mut name = fallback.clone();
            let mut suffix = 2;
            while self.is_bound_elsewhere(&tag, &name, path) {
                name = format!("{}{}", fallback, suffix);
                suffix += 1;
            }
            log::debug!(
                "component name `{}` is taken, importing {} as `{}`",
                entry.name,
                path,
                name
            );
            entry.name = name;
        }

        self.entries.insert(tag, entry);
        true
    }

    /// True if `name` is used by an entry for another tag with a different path.
    fn is_bound_elsewhere(&self, tag: &str, name: &str, path: &str) -> bool {
        self.entries
            .values()
            .any(|entry| entry.tag != tag && entry.name == name && entry.path != path)
    }

    /// Looks up the component for an exact, lowercase tag name.
    pub fn get(&self, tag: &str) -> Option<&ComponentEntry> {
        self.entries.get(tag)
    }

    /// Returns the module path registered for `tag`.
    pub fn path(&self, tag: &str) -> Option<&str> {
        self.get(tag).map(|entry| entry.path.as_str())
    }

    /// Number of mapped tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no tag is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentEntry> {
        self.entries.values()
    }
}

/// Derives the wrapper/binding name for a component.
///
/// Uses the component file name when it is a usable capitalized identifier
/// (`$lib/custom/MyP.svelte` gives `MyP`), otherwise capitalizes the tag.
pub fn component_name(tag: &str, path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file
        .strip_suffix(&format!(".{}", COMPONENT_EXTENSION))
        .unwrap_or(file);

    if is_component_identifier(stem) {
        stem.to_string()
    } else {
        capitalize(tag)
    }
}

fn is_component_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
