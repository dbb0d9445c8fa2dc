//! Svelte `<script>` block scanning and import injection.
//!
//! Raw markup is never fully parsed. Only the opening tag is tokenized (tag
//! name plus attributes, respecting quotes) so an instance script can be told
//! apart from `<script module>` / `<script context="module">`, and the script
//! body is scanned for `import` statements to find bindings already in scope.

use std::collections::HashSet;

const SCRIPT_TAG: &str = "script";

/// An attribute on a scanned opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttribute<'a> {
    /// Attribute name as written.
    pub name: &'a str,
    /// Unquoted value, `None` for bare attributes.
    pub value: Option<&'a str>,
}

/// A `<script ...>` opening tag found at the start of raw markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag<'a> {
    /// Byte offset just past the closing `>` of the opening tag.
    pub content_start: usize,
    /// Byte offset of the matching `</script`, or the end of input.
    pub content_end: usize,
    /// Attributes in source order.
    pub attributes: Vec<TagAttribute<'a>>,
}

impl ScriptTag<'_> {
    /// True for `<script module>` and `<script context="module">`.
    pub fn is_module(&self) -> bool {
        self.attributes.iter().any(|attr| {
            attr.name.eq_ignore_ascii_case("module")
                || (attr.name.eq_ignore_ascii_case("context") && attr.value == Some("module"))
        })
    }
}

/// Scans the opening `<script>` tag that `source` starts with (after leading whitespace).
pub fn parse_script_tag(source: &str) -> Option<ScriptTag<'_>> {
    let start = source.len() - source.trim_start().len();
    let rest = &source[start..];
    let after_lt = rest.strip_prefix('<')?;
    let name_len = after_lt
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(after_lt.len());
    if !after_lt[..name_len].eq_ignore_ascii_case(SCRIPT_TAG) {
        return None;
    }

    let attrs_start = start + 1 + name_len;
    let (attributes, tag_end) = scan_attributes(source, attrs_start)?;
    let content_end = find_ignore_ascii_case(&source[tag_end..], "</script")
        .map_or(source.len(), |offset| tag_end + offset);

    Some(ScriptTag {
        content_start: tag_end,
        content_end,
        attributes,
    })
}

/// Returns true if `source` starts with an instance (non-module) script.
pub fn is_instance_script(source: &str) -> bool {
    parse_script_tag(source).is_some_and(|tag| !tag.is_module())
}

/// Returns true if `source` starts with a module script.
pub fn is_module_script(source: &str) -> bool {
    parse_script_tag(source).is_some_and(|tag| tag.is_module())
}

/// Tokenizes attributes up to the closing `>`, returning them and the offset past it.
fn scan_attributes(source: &str, from: usize) -> Option<(Vec<TagAttribute<'_>>, usize)> {
    let bytes = source.as_bytes();
    let mut attributes = Vec::new();
    let mut i = from;

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        if bytes[i] == b'>' {
            return Some((attributes, i + 1));
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = &source[name_start..i];

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'=' {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let value = match bytes.get(j) {
                Some(&quote @ (b'"' | b'\'')) => {
                    let value_start = j + 1;
                    let value_end = source[value_start..]
                        .find(quote as char)
                        .map(|offset| value_start + offset)?;
                    i = value_end + 1;
                    &source[value_start..value_end]
                }
                _ => {
                    let value_start = j;
                    while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>'
                    {
                        j += 1;
                    }
                    i = j;
                    &source[value_start..j]
                }
            };
            attributes.push(TagAttribute {
                name,
                value: Some(value),
            });
        } else {
            attributes.push(TagAttribute { name, value: None });
        }
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Import statements of a script body, with multi-line specifier lists joined.
fn import_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut pending: Option<String> = None;

    for piece in script.split([';', '\n']) {
        let piece = piece.trim();
        if pending.is_none() && !piece.starts_with("import") {
            continue;
        }
        let statement = pending.get_or_insert_with(String::new);
        if !statement.is_empty() {
            statement.push(' ');
        }
        statement.push_str(piece);
        if statement.matches('{').count() <= statement.matches('}').count() {
            statements.extend(pending.take());
        }
    }

    statements.extend(pending);
    statements
}

/// Local bindings introduced by `import` statements in a script body.
///
/// Handles default, named (`{ A, B as C }`) and namespace (`* as X`) imports,
/// including specifier lists spread over several lines.
pub fn imported_bindings(script: &str) -> HashSet<String> {
    let mut bindings = HashSet::new();

    for statement in import_statements(script) {
        let Some(rest) = statement.strip_prefix("import") else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) && !rest.starts_with('{') {
            continue;
        }
        let Some((clause, _source)) = rest.rsplit_once(" from ") else {
            continue;
        };
        let clause = clause.trim().trim_start_matches("type ").trim();

        let (default_part, named_part) = match clause.find('{') {
            Some(open) => {
                let close = clause[open..].find('}').map_or(clause.len(), |c| open + c);
                (&clause[..open], Some(&clause[open + 1..close]))
            }
            None => (clause, None),
        };

        for part in default_part.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let local = match part.strip_prefix('*') {
                Some(namespace) => namespace.trim().trim_start_matches("as").trim(),
                None => part,
            };
            if !local.is_empty() {
                bindings.insert(local.to_string());
            }
        }

        for specifier in named_part.into_iter().flat_map(|named| named.split(',')) {
            let specifier = specifier.trim();
            if specifier.is_empty() {
                continue;
            }
            let local = specifier
                .rsplit_once(" as ")
                .map_or(specifier, |(_, local)| local)
                .trim();
            bindings.insert(local.to_string());
        }
    }

    bindings
}

/// A default import to place in the instance script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Import<'a> {
    /// Local binding name.
    pub binding: &'a str,
    /// Module specifier.
    pub source: &'a str,
}

impl std::fmt::Display for Import<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "import {} from \"{}\"", self.binding, self.source)
    }
}

/// Inserts the imports whose binding is not yet declared right after the opening tag.
///
/// Returns `None` when `source` does not start with a script tag; returns
/// the input unchanged when every binding is already imported.
pub fn add_imports(source: &str, imports: &[Import<'_>]) -> Option<String> {
    let tag = parse_script_tag(source)?;
    let existing = imported_bindings(&source[tag.content_start..tag.content_end]);

    let mut insertion = String::new();
    let mut added = HashSet::new();
    for import in imports {
        if existing.contains(import.binding) || !added.insert(import.binding) {
            continue;
        }
        insertion.push('\n');
        insertion.push_str(&import.to_string());
    }

    let mut result = String::with_capacity(source.len() + insertion.len());
    result.push_str(&source[..tag.content_start]);
    result.push_str(&insertion);
    result.push_str(&source[tag.content_start..]);
    Some(result)
}

/// Creates a new instance script containing exactly `imports`.
pub fn instance_script(imports: &[Import<'_>]) -> String {
    let mut script = String::from("<script>");
    for import in imports {
        script.push('\n');
        script.push_str(&import.to_string());
    }
    script.push_str("\n</script>");
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: Import<'static> = Import {
        binding: "P",
        source: "$lib/prose/P.svelte",
    };

    #[test]
    fn scans_instance_and_module_scripts() {
        assert!(is_instance_script("<script>\nlet x = 1\n</script>"));
        assert!(is_instance_script("  <script lang=\"ts\">\n</script>"));
        assert!(is_module_script("<script module>\n</script>"));
        assert!(is_module_script("<script context=\"module\">\n</script>"));
        assert!(is_module_script("<script lang='ts' context='module'></script>"));
        assert!(!is_instance_script("<script module>\n</script>"));
        assert!(!is_instance_script("<scripts>"));
        assert!(!is_instance_script("<style>p {}</style>"));
        assert!(!is_instance_script("<p><script></script></p>"));
    }

    #[test]
    fn tag_scanner_reports_attributes_and_bounds() {
        let source = r#"<script lang="ts" generics="T extends { a: 1 }">body</script>"#;
        let tag = parse_script_tag(source).unwrap();
        assert_eq!(
            tag.attributes,
            vec![
                TagAttribute {
                    name: "lang",
                    value: Some("ts")
                },
                TagAttribute {
                    name: "generics",
                    value: Some("T extends { a: 1 }")
                },
            ]
        );
        assert_eq!(&source[tag.content_start..tag.content_end], "body");
    }

    #[test]
    fn unterminated_open_tag_is_not_a_script() {
        assert!(parse_script_tag("<script lang=\"ts\"").is_none());
    }

    #[test]
    fn collects_import_bindings() {
        let bindings = imported_bindings(
            "import P from \"$lib/P.svelte\";\nimport Def, { A, B as C } from 'x'\nimport * as ns from 'y'\nimport './side-effect.css'\nconst imported = 1",
        );
        for name in ["P", "Def", "A", "C", "ns"] {
            assert!(bindings.contains(name), "missing {name}");
        }
        assert!(!bindings.contains("B"));
        assert_eq!(bindings.len(), 5);
    }

    #[test]
    fn collects_bindings_from_multiline_imports() {
        let bindings = imported_bindings(
            "import {\n  P,\n  Q as R\n} from \"x\"\nimport {\n  S } from 'y'; let t = { u: 1 }\nconst v = {\n  w: 2\n}",
        );
        for name in ["P", "R", "S"] {
            assert!(bindings.contains(name), "missing {name}");
        }
        assert_eq!(bindings.len(), 3);
    }

    #[test]
    fn multiline_import_prevents_duplicate() {
        let source = "<script>\nimport {\n  P,\n  Q\n} from \"$lib/prose/index.js\"\n</script>";
        let result = add_imports(source, &[P]).unwrap();
        assert_eq!(result, source);
        assert!(!result.contains("import P"));
    }

    #[test]
    fn injects_after_opening_tag() {
        let result = add_imports("<script>\nlet x = 1\n</script>", &[P]).unwrap();
        assert_eq!(
            result,
            "<script>\nimport P from \"$lib/prose/P.svelte\"\nlet x = 1\n</script>"
        );
    }

    #[test]
    fn skips_existing_imports() {
        let source = "<script>\nimport P from \"$lib/prose/P.svelte\"\n</script>";
        let result = add_imports(source, &[P, P]).unwrap();
        assert_eq!(result, source);
        assert_eq!(result.matches("import P").count(), 1);
    }

    #[test]
    fn creates_script_with_exact_imports() {
        let h1 = Import {
            binding: "H1",
            source: "$lib/prose/H1.svelte",
        };
        assert_eq!(
            instance_script(&[P, h1]),
            "<script>\nimport P from \"$lib/prose/P.svelte\"\nimport H1 from \"$lib/prose/H1.svelte\"\n</script>"
        );
    }
}
