//! Discovery of prose components on disk.

use super::{COMPONENT_EXTENSION, is_prose_tag};
use indexmap::IndexMap;
use jana_core::JanaError;
use std::path::Path;

/// Project-relative source directory that the `$lib` alias points to.
const LIB_SOURCE_DIR: &str = "src/lib";
/// Import alias for [`LIB_SOURCE_DIR`].
const LIB_ALIAS: &str = "$lib";

/// Lists `root/prose_dir` and maps each recognized tag to its component import path.
///
/// A file is picked up when its extension is `.svelte` and its lowercased
/// stem is a prose tag: `H1.svelte` maps `h1` to
/// `$lib/components/prose/H1.svelte` for the default directory. Everything
/// else is skipped. A missing directory yields an empty mapping; a directory
/// that exists but cannot be listed is an error.
pub fn scan_prose_components(
    root: &Path,
    prose_dir: &str,
) -> Result<IndexMap<String, String>, JanaError> {
    let dir = root.join(prose_dir);
    if !dir.is_dir() {
        return Ok(IndexMap::new());
    }

    let entries = std::fs::read_dir(&dir).map_err(|err| JanaError::registry(&dir, err))?;
    let mut file_names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| JanaError::registry(&dir, err))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            file_names.push(name.to_string());
        }
    }
    file_names.sort();

    let alias = alias_directory(prose_dir);
    let mut components = IndexMap::new();
    for file_name in file_names {
        let Some(tag) = candidate_tag(&file_name) else {
            continue;
        };
        if !is_prose_tag(&tag) {
            continue;
        }
        components
            .entry(tag)
            .or_insert_with(|| format!("{}/{}", alias, file_name));
    }

    Ok(components)
}

/// Rewrites a project-relative directory to its import form (`src/lib/x` becomes `$lib/x`).
///
/// Directories outside `src/lib` are returned normalized but otherwise unchanged.
pub fn alias_directory(prose_dir: &str) -> String {
    let normalized = prose_dir.replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./").trim_end_matches('/');

    match trimmed.strip_prefix(LIB_SOURCE_DIR) {
        Some("") => LIB_ALIAS.to_string(),
        Some(rest) if rest.starts_with('/') => format!("{}{}", LIB_ALIAS, rest),
        _ => trimmed.to_string(),
    }
}

fn candidate_tag(file_name: &str) -> Option<String> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    (extension == COMPONENT_EXTENSION && !stem.is_empty()).then(|| stem.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DEFAULT_PROSE_DIR as DEFAULT_DIR;
    use std::fs;

    fn touch(dir: &Path, names: &[&str]) {
        fs::create_dir_all(dir).unwrap();
        for name in names {
            fs::write(dir.join(name), "").unwrap();
        }
    }

    fn expected(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(tag, path)| (tag.to_string(), path.to_string()))
            .collect()
    }

    #[test]
    fn missing_directory_yields_empty_mapping() {
        let result = scan_prose_components(Path::new("/nonexistent/path"), DEFAULT_DIR).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn discovers_known_tag_components() {
        let tmp = tempfile::tempdir().unwrap();
        touch(
            &tmp.path().join(DEFAULT_DIR),
            &["P.svelte", "H1.svelte", "Pre.svelte"],
        );

        let result = scan_prose_components(tmp.path(), DEFAULT_DIR).unwrap();
        assert_eq!(
            result,
            expected(&[
                ("h1", "$lib/components/prose/H1.svelte"),
                ("p", "$lib/components/prose/P.svelte"),
                ("pre", "$lib/components/prose/Pre.svelte"),
            ])
        );
    }

    #[test]
    fn ignores_other_extensions_and_unknown_tags() {
        let tmp = tempfile::tempdir().unwrap();
        touch(
            &tmp.path().join(DEFAULT_DIR),
            &["P.svelte", "README.md", "utils.ts", "CustomWidget.svelte", "p.ts"],
        );
        fs::create_dir_all(tmp.path().join(DEFAULT_DIR).join("Em.svelte")).unwrap();

        let result = scan_prose_components(tmp.path(), DEFAULT_DIR).unwrap();
        assert_eq!(result, expected(&[("p", "$lib/components/prose/P.svelte")]));
    }

    #[test]
    fn replaces_lib_prefix_with_alias() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("src/lib/prose"), &["A.svelte"]);

        let result = scan_prose_components(tmp.path(), "src/lib/prose").unwrap();
        assert_eq!(result, expected(&[("a", "$lib/prose/A.svelte")]));
    }

    #[test]
    fn alias_directory_normalizes_paths() {
        assert_eq!(alias_directory("src/lib/components/prose"), "$lib/components/prose");
        assert_eq!(alias_directory("./src/lib/prose/"), "$lib/prose");
        assert_eq!(alias_directory("src/lib"), "$lib");
        assert_eq!(alias_directory("src/library"), "src/library");
        assert_eq!(alias_directory("src/components"), "src/components");
    }

    #[test]
    fn scanning_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        touch(
            &tmp.path().join(DEFAULT_DIR),
            &["Ul.svelte", "Li.svelte", "Ol.svelte", "Td.svelte"],
        );

        let first = scan_prose_components(tmp.path(), DEFAULT_DIR).unwrap();
        let second = scan_prose_components(tmp.path(), DEFAULT_DIR).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(DEFAULT_DIR);
        touch(&dir, &["P.svelte"]);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o000)).unwrap();

        let result = scan_prose_components(tmp.path(), DEFAULT_DIR);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        // Root can list the directory regardless of its mode.
        if result.is_ok() {
            return;
        }
        assert!(matches!(result, Err(JanaError::Registry { .. })));
    }
}
