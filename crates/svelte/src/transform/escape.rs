//! Escaping of Svelte-significant characters in verbatim code.
//!
//! Svelte treats `{` and `}` as expression delimiters anywhere in the markup,
//! so literal text inside `<code>` and `<pre>` must be emitted as character
//! references. Text elsewhere is left alone.

use crate::hast::Node;

/// Elements whose text content is verbatim.
pub const VERBATIM_TAGS: &[&str] = &["code", "pre"];

/// Replaces text under `code`/`pre` with escaped raw markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeStage;

impl EscapeStage {
    /// Escapes every text node whose nearest element ancestor is verbatim.
    pub fn run(&self, tree: &mut Node) {
        visit(tree, false);
    }
}

fn visit(node: &mut Node, in_verbatim: bool) {
    match node {
        Node::Text(text) => {
            if in_verbatim && let Some(escaped) = escape_verbatim(&text.value) {
                *node = Node::raw(escaped);
            }
        }
        Node::Element(element) => {
            let verbatim = VERBATIM_TAGS.contains(&element.tag_name.as_str());
            for child in &mut element.children {
                visit(child, verbatim);
            }
        }
        Node::Root(root) => {
            for child in &mut root.children {
                visit(child, in_verbatim);
            }
        }
        Node::Raw(_) => {}
    }
}

/// Escapes `< > & { }` to character references.
///
/// Returns `None` when `value` contains none of them.
///
/// ```
/// use jana_svelte::transform::escape_verbatim;
///
/// assert_eq!(escape_verbatim("{a && b}").as_deref(), Some("&#123;a &amp;&amp; b&#125;"));
/// assert_eq!(escape_verbatim("plain"), None);
/// ```
pub fn escape_verbatim(value: &str) -> Option<String> {
    if !value.contains(['<', '>', '&', '{', '}']) {
        return None;
    }

    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(c),
        }
    }
    Some(escaped)
}
